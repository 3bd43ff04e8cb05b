// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use crate::codes::{EV_SYN, SYN_REPORT};
use crate::wire;

/// Size of `struct input_event` with 64-bit `timeval` fields.
pub const INPUT_EVENT_SIZE: usize = 24;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeVal {
    pub sec: i64,
    pub usec: i64,
}

/// `struct input_event`:
///
/// ```text
/// struct input_event {
///   struct timeval time;   // 2 x 64 bit
///   __u16 type;
///   __u16 code;
///   __s32 value;
/// };
/// ```
///
/// Encoded little-endian without padding. The time is left zero for events
/// written to uinput, the kernel stamps them itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputEvent {
    pub time: TimeVal,
    pub type_: u16,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    pub fn new(type_: u16, code: u16, value: i32) -> Self {
        Self {
            time: TimeVal::default(),
            type_,
            code,
            value,
        }
    }

    pub fn sync() -> Self {
        Self::new(EV_SYN, SYN_REPORT, 0)
    }

    pub fn is_sync(&self) -> bool {
        self.type_ == EV_SYN && self.code == SYN_REPORT
    }

    pub fn encode(&self) -> [u8; INPUT_EVENT_SIZE] {
        let mut buf = [0u8; INPUT_EVENT_SIZE];
        wire::put(&mut buf, 0, &self.time.sec.to_le_bytes());
        wire::put(&mut buf, 8, &self.time.usec.to_le_bytes());
        wire::put(&mut buf, 16, &self.type_.to_le_bytes());
        wire::put(&mut buf, 18, &self.code.to_le_bytes());
        wire::put(&mut buf, 20, &self.value.to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8; INPUT_EVENT_SIZE]) -> Self {
        Self {
            time: TimeVal {
                sec: wire::i64_at(buf, 0),
                usec: wire::i64_at(buf, 8),
            },
            type_: wire::u16_at(buf, 16),
            code: wire::u16_at(buf, 18),
            value: wire::i32_at(buf, 20),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{EV_KEY, EV_UINPUT, KEY_ESC, UI_FF_UPLOAD};

    #[test]
    fn decode_reverses_encode() {
        let events = [
            InputEvent::new(EV_KEY, KEY_ESC, 1),
            InputEvent::sync(),
            InputEvent::new(EV_UINPUT, UI_FF_UPLOAD, 7),
            InputEvent {
                time: TimeVal {
                    sec: 1_700_000_000,
                    usec: 999_999,
                },
                type_: 0xffff,
                code: 0x1234,
                value: i32::MIN,
            },
        ];
        for event in events {
            assert_eq!(InputEvent::decode(&event.encode()), event);
        }
    }

    #[test]
    fn encode_uses_kernel_field_offsets() {
        let bytes = InputEvent::new(EV_KEY, 0x0102, -2).encode();
        assert_eq!(&bytes[0..16], &[0u8; 16]);
        assert_eq!(&bytes[16..18], &[0x01, 0x00]);
        assert_eq!(&bytes[18..20], &[0x02, 0x01]);
        assert_eq!(&bytes[20..24], &[0xfe, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn sync_event_is_syn_report() {
        let sync = InputEvent::sync();
        assert!(sync.is_sync());
        assert_eq!(sync.value, 0);
        assert!(!InputEvent::new(EV_KEY, KEY_ESC, 0).is_sync());
    }
}
