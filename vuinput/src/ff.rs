// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! Force-feedback requests the kernel queues on a device with `EV_FF`.
//!
//! A client that uploads or erases an effect on the evdev node blocks until
//! the owner of the uinput file answers. The owner sees an `EV_UINPUT` event
//! on the uinput file and completes the exchange with a begin/end pair of
//! control calls around its own handling of the effect.

use std::io::{ErrorKind, Read};

use log::{debug, trace};
use uinput_ioctls::{FfEffectRecord, FfEraseRecord, FfUploadRecord};

use crate::codes::{EV_UINPUT, UI_FF_ERASE, UI_FF_UPLOAD};
use crate::control::{ControlRequest, DeviceFile};
use crate::device::VirtualDevice;
use crate::effect::ForceFeedbackEffect;
use crate::error::{Error, Result};
use crate::event::{InputEvent, INPUT_EVENT_SIZE};

/// An effect upload as filled in by `UI_BEGIN_FF_UPLOAD`.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest {
    record: FfUploadRecord,
}

impl UploadRequest {
    pub fn request_id(&self) -> u32 {
        self.record.request_id
    }

    pub fn effect(&self) -> ForceFeedbackEffect {
        ForceFeedbackEffect::from(&self.record.effect)
    }

    /// The effect being replaced when a client updates an existing slot.
    pub fn old_effect(&self) -> ForceFeedbackEffect {
        ForceFeedbackEffect::from(&self.record.old)
    }

    pub fn raw_effect(&self) -> &FfEffectRecord {
        &self.record.effect
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EraseRequest {
    record: FfEraseRecord,
}

impl EraseRequest {
    pub fn request_id(&self) -> u32 {
        self.record.request_id
    }

    pub fn effect_id(&self) -> u32 {
        self.record.effect_id
    }
}

/// What the callback is asked to handle. Exactly one per exchange.
#[derive(Debug, Clone, Copy)]
pub enum FfRequest<'a> {
    Upload(&'a UploadRequest),
    Erase(&'a EraseRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfOutcome {
    /// Nothing was pending on the file.
    NoEvent,
    /// An event arrived that is not a force-feedback request.
    Ignored,
    Uploaded { request_id: u32, retval: i32 },
    Erased { request_id: u32, retval: i32 },
}

pub type FfCallback<'a> = &'a mut dyn FnMut(FfRequest<'_>) -> i32;

impl<F: DeviceFile> VirtualDevice<F> {
    /// Reads one event from the device file and, if it is an upload or erase
    /// request, runs `callback` on it and hands its return value back to the
    /// kernel. Meant to be called in a loop.
    ///
    /// On `/dev/uinput` this blocks until the kernel has something to
    /// deliver. Nothing pending counts as success ([`FfOutcome::NoEvent`]).
    /// Devices registered without `EV_FF` fail with
    /// [`Error::InvalidArgument`], since the kernel never queues a request
    /// for them.
    pub fn handle_force_feedback(&mut self, callback: Option<FfCallback<'_>>) -> Result<FfOutcome> {
        let Some(callback) = callback else {
            return Err(Error::InvalidArgument(
                "force feedback callback must not be empty".to_string(),
            ));
        };
        self.active_file()?;
        if !self.capabilities().wants_force_feedback() {
            return Err(Error::InvalidArgument(
                "device was not created with force feedback support".to_string(),
            ));
        }
        let file = self.active_file()?;

        let Some(event) = read_event(file)? else {
            return Ok(FfOutcome::NoEvent);
        };
        if event.type_ != EV_UINPUT {
            trace!("ignoring event type {} code {}", event.type_, event.code);
            return Ok(FfOutcome::Ignored);
        }

        // the kernel passes the request id in the value field
        let request_id = event.value as u32;
        match event.code {
            UI_FF_UPLOAD => upload(file, request_id, callback),
            UI_FF_ERASE => erase(file, request_id, callback),
            other => {
                debug!("ignoring uinput request code {}", other);
                Ok(FfOutcome::Ignored)
            }
        }
    }
}

fn read_event<F: DeviceFile>(file: &mut F) -> Result<Option<InputEvent>> {
    file.wait_readable()?;
    let mut buf = [0u8; INPUT_EVENT_SIZE];
    let len = match file.read(&mut buf) {
        Ok(len) => len,
        Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(None),
        Err(e) => return Err(Error::Io(e)),
    };
    if len == 0 {
        return Ok(None);
    }
    if len != INPUT_EVENT_SIZE {
        return Err(Error::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("partial input event: {len} of {INPUT_EVENT_SIZE} bytes read"),
        )));
    }
    Ok(Some(InputEvent::decode(&buf)))
}

fn upload<F: DeviceFile>(
    file: &mut F,
    request_id: u32,
    callback: FfCallback<'_>,
) -> Result<FfOutcome> {
    let mut record = FfUploadRecord {
        request_id,
        ..Default::default()
    };
    debug!("ff upload {}: begin", request_id);
    file.control(ControlRequest::BeginFfUpload(&mut record))
        .map_err(|source| Error::Protocol {
            call: "UI_BEGIN_FF_UPLOAD",
            source,
        })?;

    let mut request = UploadRequest { record };
    let retval = callback(FfRequest::Upload(&request));
    request.record.retval = retval;

    debug!("ff upload {}: end, retval {}", request_id, retval);
    file.control(ControlRequest::EndFfUpload(&request.record))
        .map_err(|source| Error::Protocol {
            call: "UI_END_FF_UPLOAD",
            source,
        })?;
    Ok(FfOutcome::Uploaded { request_id, retval })
}

fn erase<F: DeviceFile>(
    file: &mut F,
    request_id: u32,
    callback: FfCallback<'_>,
) -> Result<FfOutcome> {
    let mut record = FfEraseRecord {
        request_id,
        ..Default::default()
    };
    debug!("ff erase {}: begin", request_id);
    file.control(ControlRequest::BeginFfErase(&mut record))
        .map_err(|source| Error::Protocol {
            call: "UI_BEGIN_FF_ERASE",
            source,
        })?;

    let mut request = EraseRequest { record };
    let retval = callback(FfRequest::Erase(&request));
    request.record.retval = retval;

    debug!("ff erase {}: end, retval {}", request_id, retval);
    file.control(ControlRequest::EndFfErase(&request.record))
        .map_err(|source| Error::Protocol {
            call: "UI_END_FF_ERASE",
            source,
        })?;
    Ok(FfOutcome::Erased { request_id, retval })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{EV_KEY, KEY_A};
    use crate::descriptor::DeviceDescriptor;
    use crate::device::Capability;
    use crate::effect::{effect_record, EffectKind, EffectPayload, EffectUnion, RumbleEffect};
    use crate::fake::{Call, FakeDevice};
    use std::io;
    use std::time::Duration;

    fn rumble_device(fake: &FakeDevice) -> VirtualDevice<FakeDevice> {
        let mut device = VirtualDevice::from_file(fake.clone());
        device.set_settle_delay(Duration::ZERO);
        device.enable_force_feedback([crate::codes::FF_RUMBLE]).unwrap();
        let descriptor = DeviceDescriptor::new("rumble pad")
            .with_force_feedback(4)
            .unwrap();
        device.commit(&descriptor).unwrap();
        fake.state.borrow_mut().calls.clear();
        device
    }

    #[test]
    fn upload_runs_callback_once_and_echoes_retval() {
        let fake = FakeDevice::new();
        let mut effect = effect_record(EffectKind::Rumble, 2);
        effect.set_rumble(&RumbleEffect {
            strong_magnitude: 0x8000,
            weak_magnitude: 0x100,
        });
        fake.state.borrow_mut().upload_effect = effect;
        let mut device = rumble_device(&fake);
        fake.queue_event(InputEvent::new(EV_UINPUT, UI_FF_UPLOAD, 7));

        let mut seen = Vec::new();
        let mut callback = |request: FfRequest<'_>| {
            match request {
                FfRequest::Upload(upload) => seen.push((upload.request_id(), upload.effect())),
                FfRequest::Erase(_) => panic!("unexpected erase"),
            }
            -5
        };
        let outcome = device.handle_force_feedback(Some(&mut callback)).unwrap();

        assert_eq!(
            outcome,
            FfOutcome::Uploaded {
                request_id: 7,
                retval: -5
            }
        );
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, 7);
        assert_eq!(seen[0].1.id, 2);
        assert_eq!(
            seen[0].1.payload,
            Some(EffectPayload::Rumble(RumbleEffect {
                strong_magnitude: 0x8000,
                weak_magnitude: 0x100,
            }))
        );
        assert_eq!(
            fake.calls(),
            vec![
                Call::BeginUpload(7),
                Call::EndUpload {
                    request_id: 7,
                    retval: -5
                },
            ]
        );
    }

    #[test]
    fn erase_mirrors_upload() {
        let fake = FakeDevice::new();
        fake.state.borrow_mut().erase_effect_id = 3;
        let mut device = rumble_device(&fake);
        fake.queue_event(InputEvent::new(EV_UINPUT, UI_FF_ERASE, 12));

        let mut erased = Vec::new();
        let mut callback = |request: FfRequest<'_>| {
            if let FfRequest::Erase(erase) = request {
                erased.push(erase.effect_id());
            }
            0
        };
        let outcome = device.handle_force_feedback(Some(&mut callback)).unwrap();

        assert_eq!(
            outcome,
            FfOutcome::Erased {
                request_id: 12,
                retval: 0
            }
        );
        assert_eq!(erased, vec![3]);
        assert_eq!(
            fake.calls(),
            vec![
                Call::BeginErase(12),
                Call::EndErase {
                    request_id: 12,
                    retval: 0
                },
            ]
        );
    }

    #[test]
    fn other_events_are_ignored() {
        let fake = FakeDevice::new();
        let mut device = rumble_device(&fake);
        fake.queue_event(InputEvent::new(EV_KEY, KEY_A, 1));
        fake.queue_event(InputEvent::new(EV_UINPUT, 99, 1));

        let mut calls = 0;
        let mut callback = |_: FfRequest<'_>| {
            calls += 1;
            0
        };
        assert_eq!(
            device.handle_force_feedback(Some(&mut callback)).unwrap(),
            FfOutcome::Ignored
        );
        assert_eq!(
            device.handle_force_feedback(Some(&mut callback)).unwrap(),
            FfOutcome::Ignored
        );
        assert_eq!(calls, 0);
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn empty_reads_are_no_event() {
        let fake = FakeDevice::new();
        let mut device = rumble_device(&fake);
        fake.queue_bytes(Vec::new());

        let mut callback = |_: FfRequest<'_>| -> i32 { panic!("no request pending") };
        // zero-byte read, then nothing queued at all
        for _ in 0..2 {
            assert_eq!(
                device.handle_force_feedback(Some(&mut callback)).unwrap(),
                FfOutcome::NoEvent
            );
        }
    }

    #[test]
    fn partial_and_failed_reads_are_io_errors() {
        let fake = FakeDevice::new();
        let mut device = rumble_device(&fake);
        fake.queue_bytes(vec![0u8; 10]);
        fake.queue_error(io::ErrorKind::PermissionDenied);

        let mut callback = |_: FfRequest<'_>| 0;
        match device.handle_force_feedback(Some(&mut callback)) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected {:?}", other),
        }
        match device.handle_force_feedback(Some(&mut callback)) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_callback_is_rejected_before_reading() {
        let fake = FakeDevice::new();
        let mut device = rumble_device(&fake);
        fake.queue_event(InputEvent::new(EV_UINPUT, UI_FF_UPLOAD, 1));

        let err = device.handle_force_feedback(None).unwrap_err();
        assert_eq!(err.to_string(), "force feedback callback must not be empty");
        // the queued request is still there
        assert_eq!(fake.state.borrow().reads.len(), 1);
    }

    #[test]
    fn failed_begin_skips_callback() {
        let fake = FakeDevice::new();
        let mut device = rumble_device(&fake);
        fake.state.borrow_mut().fail_on = Some("UI_BEGIN_FF_UPLOAD");
        fake.queue_event(InputEvent::new(EV_UINPUT, UI_FF_UPLOAD, 4));

        let mut ran = false;
        let mut callback = |_: FfRequest<'_>| {
            ran = true;
            0
        };
        let err = device.handle_force_feedback(Some(&mut callback)).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol {
                call: "UI_BEGIN_FF_UPLOAD",
                ..
            }
        ));
        assert!(!ran);
        assert_eq!(fake.calls(), vec![Call::BeginUpload(4)]);
    }

    #[test]
    fn inactive_device_is_closed() {
        let fake = FakeDevice::new();
        let mut device = VirtualDevice::from_file(fake.clone());
        device.register(Capability::Event(crate::codes::EV_FF)).unwrap();

        let mut callback = |_: FfRequest<'_>| 0;
        assert!(matches!(
            device.handle_force_feedback(Some(&mut callback)),
            Err(Error::ClosedDevice)
        ));
    }

    #[test]
    fn device_without_force_feedback_is_rejected() {
        let fake = FakeDevice::new();
        let mut device = VirtualDevice::from_file(fake.clone());
        device.set_settle_delay(Duration::ZERO);
        device.enable_key([KEY_A]).unwrap();
        device.commit(&DeviceDescriptor::new("keyboard")).unwrap();
        fake.queue_event(InputEvent::new(EV_UINPUT, UI_FF_UPLOAD, 7));

        let mut calls = 0;
        let mut callback = |_: FfRequest<'_>| {
            calls += 1;
            0
        };
        assert!(matches!(
            device.handle_force_feedback(Some(&mut callback)),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(calls, 0);
        assert_eq!(fake.state.borrow().reads.len(), 1);
    }

    #[test]
    fn closed_device_is_closed() {
        let fake = FakeDevice::new();
        let mut device = rumble_device(&fake);
        device.close().unwrap();
        fake.queue_event(InputEvent::new(EV_UINPUT, UI_FF_UPLOAD, 1));

        let mut callback = |_: FfRequest<'_>| 0;
        assert!(matches!(
            device.handle_force_feedback(Some(&mut callback)),
            Err(Error::ClosedDevice)
        ));
        assert_eq!(fake.state.borrow().reads.len(), 1);
    }
}
