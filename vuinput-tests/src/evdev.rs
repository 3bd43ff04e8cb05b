// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::fs::{File, OpenOptions};
use std::io::Read;
use std::os::fd::AsRawFd;
use std::path::Path;

use uinput_ioctls::FfEffectRecord;
use vuinput::event::{InputEvent, INPUT_EVENT_SIZE};

// EVIOCSFF: the kernel writes the assigned effect id back into the record
nix::ioctl_write_ptr!(eviocsff, b'E', 0x80, FfEffectRecord);

/// Read side of a created device, opened through its `/dev/input/eventN`.
pub struct EventReader {
    file: File,
}

impl EventReader {
    pub fn open(devnode: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(devnode)
            .map_err(|e| {
                anyhow::anyhow!("could not open event device {}: {e}", devnode.display())
            })?;
        Ok(Self { file })
    }

    /// Blocks until the next event is available.
    pub fn next_event(&mut self) -> anyhow::Result<InputEvent> {
        let mut buf = [0u8; INPUT_EVENT_SIZE];
        self.file.read_exact(&mut buf)?;
        Ok(InputEvent::decode(&buf))
    }

    /// Uploads `effect` like a game would and returns the id the device
    /// assigned. Blocks until the owner of the uinput file has answered.
    pub fn upload_effect(&mut self, effect: &FfEffectRecord) -> anyhow::Result<i16> {
        let mut record = *effect;
        // SAFETY: record is a live ff_effect the kernel may read and update.
        unsafe { eviocsff(self.file.as_raw_fd(), &mut record as *mut FfEffectRecord) }
            .map_err(|e| anyhow::anyhow!("EVIOCSFF failed: {e}"))?;
        Ok(record.id)
    }
}

/// `CLOCK_MONOTONIC` as (seconds, microseconds).
pub fn monotonic_time() -> (i64, i64) {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: ts is a valid, writable timespec.
    unsafe {
        libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts);
    }
    (ts.tv_sec as i64, ts.tv_nsec as i64 / 1000)
}
