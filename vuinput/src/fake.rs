// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! In-memory stand-in for the uinput node. Records every call so tests can
//! assert on the exact sequence the library produced.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::rc::Rc;

use nix::errno::Errno;
use uinput_ioctls::{FfEffectRecord, SYSNAME_BUFFER_LEN};

use crate::control::{ControlRequest, DeviceFile};
use crate::event::{InputEvent, INPUT_EVENT_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetBit(&'static str, u16),
    Create,
    Destroy,
    GetSysname,
    BeginUpload(u32),
    EndUpload { request_id: u32, retval: i32 },
    BeginErase(u32),
    EndErase { request_id: u32, retval: i32 },
    Write(Vec<u8>),
    Close,
}

#[derive(Debug)]
pub enum QueuedRead {
    Bytes(Vec<u8>),
    Fail(io::ErrorKind),
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub calls: Vec<Call>,
    pub reads: VecDeque<QueuedRead>,
    /// Name of the control request that fails with `EINVAL`.
    pub fail_on: Option<&'static str>,
    /// Zero-based index of the `write` call that fails.
    pub fail_write: Option<usize>,
    pub short_write: bool,
    pub sysname: Vec<u8>,
    pub upload_effect: FfEffectRecord,
    pub upload_old: FfEffectRecord,
    pub erase_effect_id: u32,
    writes: usize,
}

impl FakeState {
    pub fn writes(&self) -> Vec<InputEvent> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Write(bytes) if bytes.len() == INPUT_EVENT_SIZE => {
                    let mut buf = [0u8; INPUT_EVENT_SIZE];
                    buf.copy_from_slice(bytes);
                    Some(InputEvent::decode(&buf))
                }
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls.iter().filter(|call| *call == wanted).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeDevice {
    pub state: Rc<RefCell<FakeState>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(call: &'static str) -> Self {
        let fake = Self::new();
        fake.state.borrow_mut().fail_on = Some(call);
        fake
    }

    pub fn queue_event(&self, event: InputEvent) {
        self.queue_bytes(event.encode().to_vec());
    }

    pub fn queue_bytes(&self, bytes: Vec<u8>) {
        self.state.borrow_mut().reads.push_back(QueuedRead::Bytes(bytes));
    }

    pub fn queue_error(&self, kind: io::ErrorKind) {
        self.state.borrow_mut().reads.push_back(QueuedRead::Fail(kind));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn written_events(&self) -> Vec<InputEvent> {
        self.state.borrow().writes()
    }
}

impl Read for FakeDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.state.borrow_mut().reads.pop_front() {
            None => Err(io::ErrorKind::WouldBlock.into()),
            Some(QueuedRead::Fail(kind)) => Err(kind.into()),
            Some(QueuedRead::Bytes(bytes)) => {
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                Ok(len)
            }
        }
    }
}

impl Write for FakeDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        let index = state.writes;
        state.writes += 1;
        if state.fail_write == Some(index) {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        let len = if state.short_write { buf.len() / 2 } else { buf.len() };
        state.calls.push(Call::Write(buf[..len].to_vec()));
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl DeviceFile for FakeDevice {
    fn control(&mut self, request: ControlRequest<'_>) -> Result<(), Errno> {
        let mut state = self.state.borrow_mut();
        let name = request.name();
        let call = match request {
            ControlRequest::SetEventBit(code)
            | ControlRequest::SetKeyBit(code)
            | ControlRequest::SetRelBit(code)
            | ControlRequest::SetAbsBit(code)
            | ControlRequest::SetFfBit(code) => Call::SetBit(name, code),
            ControlRequest::DevCreate => Call::Create,
            ControlRequest::DevDestroy => Call::Destroy,
            ControlRequest::GetSysname(buf) => {
                let len = state.sysname.len().min(SYSNAME_BUFFER_LEN);
                buf[..len].copy_from_slice(&state.sysname[..len]);
                Call::GetSysname
            }
            ControlRequest::BeginFfUpload(record) => {
                record.effect = state.upload_effect;
                record.old = state.upload_old;
                Call::BeginUpload(record.request_id)
            }
            ControlRequest::EndFfUpload(record) => Call::EndUpload {
                request_id: record.request_id,
                retval: record.retval,
            },
            ControlRequest::BeginFfErase(record) => {
                record.effect_id = state.erase_effect_id;
                Call::BeginErase(record.request_id)
            }
            ControlRequest::EndFfErase(record) => Call::EndErase {
                request_id: record.request_id,
                retval: record.retval,
            },
        };
        state.calls.push(call);
        if state.fail_on == Some(name) {
            return Err(Errno::EINVAL);
        }
        Ok(())
    }

    fn close(self) -> io::Result<()> {
        self.state.borrow_mut().calls.push(Call::Close);
        Ok(())
    }
}
