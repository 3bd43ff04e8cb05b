// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! Ready-made device classes on top of [`VirtualDevice`].
//!
//! Each class registers its capability bits, commits the descriptor it was
//! given (after filling in axis ranges where it has axes) and offers senders
//! that write whole, synced batches.

mod dial;
mod gamepad;
mod keyboard;
mod mouse;
mod touchpad;


use std::path::PathBuf;

use crate::control::DeviceFile;
use crate::device::{ButtonState, VirtualDevice};
use crate::error::Result;

pub use dial::Dial;
pub use gamepad::{Gamepad, GamepadButton, HatDirection};
pub use keyboard::Keyboard;
pub use mouse::{Mouse, MouseButton};
pub use touchpad::{AxisRange, TouchPad};

/// Access shared by all device classes.
pub trait DeviceClass<F: DeviceFile> {
    fn device(&mut self) -> &mut VirtualDevice<F>;

    fn close(&mut self) -> Result<()> {
        self.device().close()
    }

    fn syspath(&mut self) -> Result<PathBuf> {
        self.device().syspath()
    }

    fn devnode(&mut self) -> Result<PathBuf> {
        self.device().devnode()
    }
}

/// Down and sync, then up and sync.
pub(crate) fn press_and_release<F: DeviceFile>(
    device: &mut VirtualDevice<F>,
    code: u16,
) -> Result<()> {
    device.send_buttons(&[code], ButtonState::Pressed)?;
    device.send_buttons(&[code], ButtonState::Released)
}
