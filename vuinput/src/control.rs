// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::{AsFd, AsRawFd, IntoRawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use libc::O_NONBLOCK;
use log::trace;
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use uinput_ioctls::*;

/// One numbered control request against an open uinput file.
#[derive(Debug)]
pub enum ControlRequest<'a> {
    SetEventBit(u16),
    SetKeyBit(u16),
    SetRelBit(u16),
    SetAbsBit(u16),
    SetFfBit(u16),
    DevCreate,
    DevDestroy,
    GetSysname(&'a mut [u8; SYSNAME_BUFFER_LEN]),
    BeginFfUpload(&'a mut FfUploadRecord),
    EndFfUpload(&'a FfUploadRecord),
    BeginFfErase(&'a mut FfEraseRecord),
    EndFfErase(&'a FfEraseRecord),
}

impl ControlRequest<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            ControlRequest::SetEventBit(_) => "UI_SET_EVBIT",
            ControlRequest::SetKeyBit(_) => "UI_SET_KEYBIT",
            ControlRequest::SetRelBit(_) => "UI_SET_RELBIT",
            ControlRequest::SetAbsBit(_) => "UI_SET_ABSBIT",
            ControlRequest::SetFfBit(_) => "UI_SET_FFBIT",
            ControlRequest::DevCreate => "UI_DEV_CREATE",
            ControlRequest::DevDestroy => "UI_DEV_DESTROY",
            ControlRequest::GetSysname(_) => "UI_GET_SYSNAME",
            ControlRequest::BeginFfUpload(_) => "UI_BEGIN_FF_UPLOAD",
            ControlRequest::EndFfUpload(_) => "UI_END_FF_UPLOAD",
            ControlRequest::BeginFfErase(_) => "UI_BEGIN_FF_ERASE",
            ControlRequest::EndFfErase(_) => "UI_END_FF_ERASE",
        }
    }

    /// The request number as passed to ioctl(2).
    pub fn code(&self) -> u64 {
        match self {
            ControlRequest::SetEventBit(_) => UI_SET_EVBIT,
            ControlRequest::SetKeyBit(_) => UI_SET_KEYBIT,
            ControlRequest::SetRelBit(_) => UI_SET_RELBIT,
            ControlRequest::SetAbsBit(_) => UI_SET_ABSBIT,
            ControlRequest::SetFfBit(_) => UI_SET_FFBIT,
            ControlRequest::DevCreate => UI_DEV_CREATE,
            ControlRequest::DevDestroy => UI_DEV_DESTROY,
            ControlRequest::GetSysname(_) => UI_GET_SYSNAME,
            ControlRequest::BeginFfUpload(_) => UI_BEGIN_FF_UPLOAD,
            ControlRequest::EndFfUpload(_) => UI_END_FF_UPLOAD,
            ControlRequest::BeginFfErase(_) => UI_BEGIN_FF_ERASE,
            ControlRequest::EndFfErase(_) => UI_END_FF_ERASE,
        }
    }
}

/// An open uinput file: event records go through `Read`/`Write`, everything
/// else through [`control`](DeviceFile::control).
pub trait DeviceFile: Read + Write {
    /// Issues the request and reports whether the kernel accepted it.
    fn control(&mut self, request: ControlRequest<'_>) -> Result<(), Errno>;

    /// Blocks until a read would not block. Files that cannot wait return
    /// immediately and let the read report that nothing is there.
    fn wait_readable(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(self) -> io::Result<()>
    where
        Self: Sized,
    {
        drop(self);
        Ok(())
    }
}

/// `/dev/uinput` (or a compatible node such as vuinputd's) opened read-write.
#[derive(Debug)]
pub struct UinputFile {
    file: File,
}

impl UinputFile {
    /// Opens the node read-write and non-blocking. Read access is needed for
    /// the force-feedback requests the kernel queues on the file.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(O_NONBLOCK)
            .mode(0o660)
            .open(path)?;
        Ok(Self { file })
    }
}

impl Read for UinputFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for UinputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl DeviceFile for UinputFile {
    fn control(&mut self, request: ControlRequest<'_>) -> Result<(), Errno> {
        let fd = self.file.as_raw_fd();
        trace!("fd {}: ioctl {} ({:#x})", fd, request.name(), request.code());
        // SAFETY: fd belongs to self.file and stays open for the duration of
        // the call. Every pointer argument refers to a live record whose size
        // is the one encoded in the request number.
        let result = unsafe {
            match request {
                ControlRequest::SetEventBit(code) => ui_set_evbit(fd, code.into()),
                ControlRequest::SetKeyBit(code) => ui_set_keybit(fd, code.into()),
                ControlRequest::SetRelBit(code) => ui_set_relbit(fd, code.into()),
                ControlRequest::SetAbsBit(code) => ui_set_absbit(fd, code.into()),
                ControlRequest::SetFfBit(code) => ui_set_ffbit(fd, code.into()),
                ControlRequest::DevCreate => ui_dev_create(fd),
                ControlRequest::DevDestroy => ui_dev_destroy(fd),
                ControlRequest::GetSysname(buf) => ui_get_sysname(fd, buf.as_mut_slice()),
                ControlRequest::BeginFfUpload(record) => ui_begin_ff_upload(fd, record),
                ControlRequest::EndFfUpload(record) => ui_end_ff_upload(fd, record),
                ControlRequest::BeginFfErase(record) => ui_begin_ff_erase(fd, record),
                ControlRequest::EndFfErase(record) => ui_end_ff_erase(fd, record),
            }
        };
        result.map(|_| ())
    }

    fn wait_readable(&mut self) -> io::Result<()> {
        let mut fds = [PollFd::new(self.file.as_fd(), PollFlags::POLLIN)];
        loop {
            match poll(&mut fds, PollTimeout::NONE) {
                Ok(_) => return Ok(()),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn close(self) -> io::Result<()> {
        let fd = self.file.into_raw_fd();
        // SAFETY: into_raw_fd handed over ownership, nothing else closes fd.
        if unsafe { libc::close(fd) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
