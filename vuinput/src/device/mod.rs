// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

pub mod capabilities;


use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

use log::{debug, info, trace, warn};
use uinput_ioctls::SYSNAME_BUFFER_LEN;

use crate::codes::{EV_ABS, EV_FF, EV_KEY, EV_REL};
use crate::control::{ControlRequest, DeviceFile, UinputFile};
use crate::descriptor::DeviceDescriptor;
use crate::error::{Error, Result};
use crate::event::InputEvent;

pub use capabilities::{Capability, CapabilitySet};

pub const DEFAULT_DEVICE_PATH: &str = "/dev/uinput";
pub const SYS_INPUT_DIR: &str = "/sys/devices/virtual/input/";
pub const DEV_INPUT_DIR: &str = "/dev/input/";

/// Time the rest of the input stack needs to pick up a freshly created
/// device. Events written earlier are likely to be lost by consumers.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// File is open, nothing registered yet.
    Open,
    /// At least one capability bit registered, descriptor not committed.
    Configuring,
    /// Descriptor written and `UI_DEV_CREATE` done.
    Active,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Released,
    Pressed,
}

impl ButtonState {
    pub fn value(self) -> i32 {
        match self {
            ButtonState::Released => 0,
            ButtonState::Pressed => 1,
        }
    }
}

/// A virtual input device backed by one open uinput file.
///
/// The handle is used from one thread at a time; every operation takes
/// `&mut self`. Dropping a handle that was not closed destroys the kernel
/// device and closes the file, ignoring errors.
#[derive(Debug)]
pub struct VirtualDevice<F: DeviceFile = UinputFile> {
    file: Option<F>,
    state: DeviceState,
    capabilities: CapabilitySet,
    settle_delay: Duration,
}

impl VirtualDevice {
    /// Opens a uinput node, conventionally [`DEFAULT_DEVICE_PATH`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidArgument(
                "device path must not be empty".to_string(),
            ));
        }
        let file = UinputFile::open(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => Error::NotFound {
                path: path.to_path_buf(),
                source,
            },
            _ => Error::Io(source),
        })?;
        debug!("opened {}", path.display());
        Ok(Self::from_file(file))
    }
}

impl<F: DeviceFile> VirtualDevice<F> {
    pub fn from_file(file: F) -> Self {
        Self {
            file: Some(file),
            state: DeviceState::Open,
            capabilities: CapabilitySet::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub fn set_settle_delay(&mut self, delay: Duration) {
        self.settle_delay = delay;
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Enables one capability bit. If the kernel refuses it, the device is
    /// torn down and the handle is closed before the error is returned.
    pub fn register(&mut self, capability: Capability) -> Result<()> {
        match self.state {
            DeviceState::Closed => return Err(Error::ClosedDevice),
            DeviceState::Active => {
                return Err(Error::InvalidArgument(
                    "capabilities cannot change after the device has been created".to_string(),
                ))
            }
            DeviceState::Open | DeviceState::Configuring => {}
        }

        let request = capability.request();
        let call = request.name();
        debug!("ioctl {} {:?}", call, capability);
        self.with_rollback(|file| {
            file.control(request)
                .map_err(|source| Error::Protocol { call, source })
        })?;

        self.capabilities.insert(capability);
        self.state = DeviceState::Configuring;
        Ok(())
    }

    pub fn enable_event(&mut self, type_: u16) -> Result<()> {
        self.register(Capability::Event(type_))
    }

    /// Enables `EV_KEY` (once) and the given key codes.
    pub fn enable_key(&mut self, codes: impl IntoIterator<Item = u16>) -> Result<()> {
        self.enable_event_once(EV_KEY)?;
        for code in codes {
            self.register(Capability::Key(code))?;
        }
        Ok(())
    }

    pub fn enable_relative(&mut self, codes: impl IntoIterator<Item = u16>) -> Result<()> {
        self.enable_event_once(EV_REL)?;
        for code in codes {
            self.register(Capability::Relative(code))?;
        }
        Ok(())
    }

    pub fn enable_absolute(&mut self, codes: impl IntoIterator<Item = u16>) -> Result<()> {
        self.enable_event_once(EV_ABS)?;
        for code in codes {
            self.register(Capability::Absolute(code))?;
        }
        Ok(())
    }

    pub fn enable_force_feedback(&mut self, effects: impl IntoIterator<Item = u16>) -> Result<()> {
        self.enable_event_once(EV_FF)?;
        for effect in effects {
            self.register(Capability::ForceFeedback(effect))?;
        }
        Ok(())
    }

    fn enable_event_once(&mut self, type_: u16) -> Result<()> {
        if self.capabilities.contains(Capability::Event(type_)) {
            return Ok(());
        }
        self.enable_event(type_)
    }

    /// Writes the descriptor and creates the kernel device.
    ///
    /// Invalid descriptors are rejected without touching the handle. A failed
    /// write or `UI_DEV_CREATE` tears the device down. After creation this
    /// sleeps for the settle delay, so callers have to tolerate ~200ms here.
    pub fn commit(&mut self, descriptor: &DeviceDescriptor) -> Result<()> {
        match self.state {
            DeviceState::Closed => return Err(Error::ClosedDevice),
            DeviceState::Active => {
                return Err(Error::InvalidArgument(
                    "device has already been created".to_string(),
                ))
            }
            DeviceState::Open | DeviceState::Configuring => {}
        }
        descriptor.validate()?;
        if self.capabilities.wants_force_feedback() && descriptor.effects_max() < 1 {
            return Err(Error::effects_max_below_minimum());
        }

        let bytes = descriptor.encode();
        debug!(
            "writing device descriptor for {} ({} bytes)",
            descriptor.name(),
            bytes.len()
        );
        self.with_rollback(|file| {
            let written = file.write(&bytes)?;
            if written != bytes.len() {
                return Err(Error::Io(io::Error::new(
                    ErrorKind::WriteZero,
                    format!(
                        "failed to write uidev struct to device file: {written} of {} bytes written",
                        bytes.len()
                    ),
                )));
            }
            Ok(())
        })?;

        debug!("ioctl UI_DEV_CREATE for {}", descriptor.name());
        self.with_rollback(|file| {
            file.control(ControlRequest::DevCreate)
                .map_err(|source| Error::Protocol {
                    call: "UI_DEV_CREATE",
                    source,
                })
        })?;
        self.state = DeviceState::Active;

        if !self.settle_delay.is_zero() {
            sleep(self.settle_delay);
        }
        info!("created virtual device {}", descriptor.name());
        Ok(())
    }

    /// Destroys the kernel device, then closes the file. Both steps always
    /// run; the first error is returned. Closing twice is `ClosedDevice`.
    pub fn close(&mut self) -> Result<()> {
        let mut file = self.file.take().ok_or(Error::ClosedDevice)?;
        self.state = DeviceState::Closed;

        debug!("ioctl UI_DEV_DESTROY");
        let destroyed = file
            .control(ControlRequest::DevDestroy)
            .map_err(|source| Error::Protocol {
                call: "UI_DEV_DESTROY",
                source,
            });
        let closed = file.close().map_err(Error::Io);
        destroyed.and(closed)
    }

    /// `/sys/devices/virtual/input/<sysname>` of the created device.
    pub fn syspath(&mut self) -> Result<PathBuf> {
        let file = self.active_file()?;
        let mut buf = [0u8; SYSNAME_BUFFER_LEN];
        file.control(ControlRequest::GetSysname(&mut buf))
            .map_err(|source| Error::Protocol {
                call: "UI_GET_SYSNAME",
                source,
            })?;
        let len = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
        let sysname = String::from_utf8_lossy(&buf[..len]);
        let syspath = Path::new(SYS_INPUT_DIR).join(sysname.as_ref());
        debug!("syspath: {}", syspath.display());
        Ok(syspath)
    }

    /// The `/dev/input/eventN` node udev creates for this device.
    pub fn devnode(&mut self) -> Result<PathBuf> {
        let syspath = self.syspath()?;
        fetch_device_node(&syspath)
    }

    pub fn write_event(&mut self, type_: u16, code: u16, value: i32) -> Result<()> {
        let file = self.active_file()?;
        write_record(file, &InputEvent::new(type_, code, value))
    }

    /// Writes `SYN_REPORT`. Readers see nothing of a batch before it.
    pub fn sync(&mut self) -> Result<()> {
        let file = self.active_file()?;
        write_record(file, &InputEvent::sync())
    }

    /// Writes the events in order, then a sync event. Stops at the first
    /// failure; events already written stay written.
    pub fn send_events(&mut self, events: &[InputEvent]) -> Result<()> {
        let file = self.active_file()?;
        for event in events {
            write_record(file, event)?;
        }
        write_record(file, &InputEvent::sync())
    }

    /// One `EV_KEY` event per code with the given state, then a sync event.
    pub fn send_buttons(&mut self, codes: &[u16], state: ButtonState) -> Result<()> {
        let events: Vec<InputEvent> = codes
            .iter()
            .map(|code| InputEvent::new(EV_KEY, *code, state.value()))
            .collect();
        self.send_events(&events)
    }

    pub fn send_relative(&mut self, moves: &[(u16, i32)]) -> Result<()> {
        let events: Vec<InputEvent> = moves
            .iter()
            .map(|(code, value)| InputEvent::new(EV_REL, *code, *value))
            .collect();
        self.send_events(&events)
    }

    pub fn send_absolute(&mut self, positions: &[(u16, i32)]) -> Result<()> {
        let events: Vec<InputEvent> = positions
            .iter()
            .map(|(code, value)| InputEvent::new(EV_ABS, *code, *value))
            .collect();
        self.send_events(&events)
    }

    pub(crate) fn active_file(&mut self) -> Result<&mut F> {
        if self.state != DeviceState::Active {
            return Err(Error::ClosedDevice);
        }
        self.file.as_mut().ok_or(Error::ClosedDevice)
    }

    /// Runs one configuration step; on failure the half-built device is torn
    /// down before the error is handed back.
    fn with_rollback<T>(&mut self, step: impl FnOnce(&mut F) -> Result<T>) -> Result<T> {
        let file = self.file.as_mut().ok_or(Error::ClosedDevice)?;
        match step(file) {
            Ok(value) => Ok(value),
            Err(err) => {
                debug!("configuration failed, tearing down: {}", err);
                self.teardown();
                Err(err)
            }
        }
    }

    /// Best-effort destroy and close. Errors are logged and dropped.
    fn teardown(&mut self) {
        self.state = DeviceState::Closed;
        let Some(mut file) = self.file.take() else {
            return;
        };
        if let Err(e) = file.control(ControlRequest::DevDestroy) {
            warn!("failed to destroy device during teardown: {}", e);
        }
        if let Err(e) = file.close() {
            warn!("failed to close device file during teardown: {}", e);
        }
    }
}

impl<F: DeviceFile> Drop for VirtualDevice<F> {
    fn drop(&mut self) {
        if self.file.is_some() {
            debug!("virtual device dropped without close");
            self.teardown();
        }
    }
}

fn write_record<F: DeviceFile>(file: &mut F, event: &InputEvent) -> Result<()> {
    let bytes = event.encode();
    let written = file.write(&bytes)?;
    if written != bytes.len() {
        return Err(Error::Io(io::Error::new(
            ErrorKind::WriteZero,
            format!("short write of input event: {written} of {} bytes", bytes.len()),
        )));
    }
    trace!(
        "wrote event type {} code {} value {}",
        event.type_,
        event.code,
        event.value
    );
    Ok(())
}

pub fn fetch_device_node(syspath: &Path) -> Result<PathBuf> {
    for entry in fs::read_dir(syspath)? {
        let entry = entry?; // propagate per-entry errors
        if let Some(name) = entry.file_name().to_str() {
            if name.starts_with("event") {
                return Ok(Path::new(DEV_INPUT_DIR).join(name));
            }
        }
    }
    Err(Error::NotFound {
        path: syspath.to_path_buf(),
        source: io::Error::new(ErrorKind::NotFound, "no event device found"),
    })
}
