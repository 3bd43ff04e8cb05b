// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! Kernel ABI of `/dev/uinput`: ioctl request numbers, `nix` wrappers for
//! them and the `#[repr(C)]` force-feedback records the kernel reads and
//! fills during the upload/erase exchange.

use std::mem::{offset_of, size_of};

use nix::{
    ioctl_none, ioctl_read_buf, ioctl_readwrite, ioctl_write_int, ioctl_write_ptr,
    request_code_none, request_code_read, request_code_readwrite, request_code_write,
};

/// Maximum length of a device name, `UINPUT_MAX_NAME_SIZE`.
pub const UINPUT_MAX_NAME_SIZE: usize = 80;
/// Number of absolute axis slots, `ABS_CNT`.
pub const ABS_CNT: usize = 64;
/// 64 characters for the sysfs name plus the terminating NUL.
pub const SYSNAME_BUFFER_LEN: usize = 65;

/// Size of the payload union inside `struct ff_effect` on 64-bit kernels.
pub const FF_EFFECT_PAYLOAD_LEN: usize = 32;
/// Offset of the payload union inside `struct ff_effect`.
pub const FF_EFFECT_PAYLOAD_OFFSET: usize = 16;
/// Total size of `struct ff_effect`.
pub const FF_EFFECT_SIZE: usize = 48;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FfTrigger {
    pub button: u16,
    pub interval: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FfReplay {
    pub length: u16,
    pub delay: u16,
}

/// `struct ff_effect`. The union is kept as raw bytes so that the header
/// stays 16 bytes and the record 48 bytes on every target; `vuinput`
/// decodes the payload according to `type_`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FfEffectRecord {
    pub type_: u16,
    pub id: i16,
    pub direction: u16,
    pub trigger: FfTrigger,
    pub replay: FfReplay,
    // the kernel aligns the union to 8 bytes on 64-bit targets
    pub padding: u16,
    pub payload: [u8; FF_EFFECT_PAYLOAD_LEN],
}

/// `struct uinput_ff_upload`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FfUploadRecord {
    pub request_id: u32,
    pub retval: i32,
    pub effect: FfEffectRecord,
    pub old: FfEffectRecord,
}

/// `struct uinput_ff_erase`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FfEraseRecord {
    pub request_id: u32,
    pub retval: i32,
    pub effect_id: u32,
}

const _: () = assert!(size_of::<FfEffectRecord>() == FF_EFFECT_SIZE);
const _: () = assert!(offset_of!(FfEffectRecord, payload) == FF_EFFECT_PAYLOAD_OFFSET);
const _: () = assert!(size_of::<FfUploadRecord>() == 104);
const _: () = assert!(offset_of!(FfUploadRecord, effect) == 8);
const _: () = assert!(offset_of!(FfUploadRecord, old) == 56);
const _: () = assert!(size_of::<FfEraseRecord>() == 12);

pub const UI_DEV_CREATE: u64 = request_code_none!(b'U', 1);
pub const UI_DEV_DESTROY: u64 = request_code_none!(b'U', 2);

pub const UI_GET_SYSNAME_WITHOUT_SIZE: u64 = request_code_read!(b'U', 44, 0);
//#define UI_GET_SYSNAME(len)	_IOC(_IOC_READ, UINPUT_IOCTL_BASE, 44, len)
pub const UI_GET_SYSNAME: u64 = request_code_read!(b'U', 44, SYSNAME_BUFFER_LEN);

pub const UI_SET_EVBIT: u64 = request_code_write!(b'U', 100, size_of::<libc::c_int>());
pub const UI_SET_KEYBIT: u64 = request_code_write!(b'U', 101, size_of::<libc::c_int>());
pub const UI_SET_RELBIT: u64 = request_code_write!(b'U', 102, size_of::<libc::c_int>());
pub const UI_SET_ABSBIT: u64 = request_code_write!(b'U', 103, size_of::<libc::c_int>());
pub const UI_SET_FFBIT: u64 = request_code_write!(b'U', 107, size_of::<libc::c_int>());

pub const UI_BEGIN_FF_UPLOAD: u64 =
    request_code_readwrite!(b'U', 200, size_of::<FfUploadRecord>());
pub const UI_END_FF_UPLOAD: u64 = request_code_write!(b'U', 201, size_of::<FfUploadRecord>());
pub const UI_BEGIN_FF_ERASE: u64 =
    request_code_readwrite!(b'U', 202, size_of::<FfEraseRecord>());
pub const UI_END_FF_ERASE: u64 = request_code_write!(b'U', 203, size_of::<FfEraseRecord>());

ioctl_none!(ui_dev_create, b'U', 1);
ioctl_none!(ui_dev_destroy, b'U', 2);

ioctl_read_buf! { ui_get_sysname, b'U', 44, u8 }

ioctl_write_int!(ui_set_evbit, b'U', 100);
ioctl_write_int!(ui_set_keybit, b'U', 101);
ioctl_write_int!(ui_set_relbit, b'U', 102);
ioctl_write_int!(ui_set_absbit, b'U', 103);
ioctl_write_int!(ui_set_ffbit, b'U', 107);

ioctl_readwrite!(ui_begin_ff_upload, b'U', 200, FfUploadRecord);
ioctl_write_ptr!(ui_end_ff_upload, b'U', 201, FfUploadRecord);
ioctl_readwrite!(ui_begin_ff_erase, b'U', 202, FfEraseRecord);
ioctl_write_ptr!(ui_end_ff_erase, b'U', 203, FfEraseRecord);
