// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

// Little-endian field access on fixed kernel records. Callers pass offsets
// inside the record, so the slices below never go out of bounds.

fn array<const N: usize>(buf: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[at..at + N]);
    out
}

pub(crate) fn u16_at(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes(array(buf, at))
}

pub(crate) fn i16_at(buf: &[u8], at: usize) -> i16 {
    i16::from_le_bytes(array(buf, at))
}

pub(crate) fn u32_at(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(array(buf, at))
}

pub(crate) fn i32_at(buf: &[u8], at: usize) -> i32 {
    i32::from_le_bytes(array(buf, at))
}

pub(crate) fn u64_at(buf: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(array(buf, at))
}

pub(crate) fn i64_at(buf: &[u8], at: usize) -> i64 {
    i64::from_le_bytes(array(buf, at))
}

pub(crate) fn put(buf: &mut [u8], at: usize, bytes: &[u8]) {
    buf[at..at + bytes.len()].copy_from_slice(bytes);
}
