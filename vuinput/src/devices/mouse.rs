// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::path::Path;

use crate::codes::{BTN_LEFT, BTN_MIDDLE, BTN_RIGHT, REL_HWHEEL, REL_WHEEL, REL_X, REL_Y};
use crate::control::{DeviceFile, UinputFile};
use crate::descriptor::DeviceDescriptor;
use crate::device::{ButtonState, VirtualDevice};
use crate::error::{Error, Result};

use super::{press_and_release, DeviceClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn code(self) -> u16 {
        match self {
            MouseButton::Left => BTN_LEFT,
            MouseButton::Right => BTN_RIGHT,
            MouseButton::Middle => BTN_MIDDLE,
        }
    }
}

/// A relative pointer with three buttons and both wheels.
#[derive(Debug)]
pub struct Mouse<F: DeviceFile = UinputFile> {
    device: VirtualDevice<F>,
}

impl Mouse {
    pub fn open(path: impl AsRef<Path>, name: &str) -> Result<Self> {
        Self::create(VirtualDevice::open(path)?, DeviceDescriptor::new(name))
    }
}

impl<F: DeviceFile> Mouse<F> {
    pub fn create(mut device: VirtualDevice<F>, descriptor: DeviceDescriptor) -> Result<Self> {
        device.enable_key([BTN_LEFT, BTN_RIGHT, BTN_MIDDLE])?;
        device.enable_relative([REL_X, REL_Y, REL_WHEEL, REL_HWHEEL])?;
        device.commit(&descriptor)?;
        Ok(Self { device })
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) -> Result<()> {
        self.device.send_relative(&[(REL_X, dx), (REL_Y, dy)])
    }

    pub fn move_left(&mut self, pixels: i32) -> Result<()> {
        self.device.send_relative(&[(REL_X, negate(pixels)?)])
    }

    pub fn move_right(&mut self, pixels: i32) -> Result<()> {
        self.device.send_relative(&[(REL_X, pixels)])
    }

    pub fn move_up(&mut self, pixels: i32) -> Result<()> {
        self.device.send_relative(&[(REL_Y, negate(pixels)?)])
    }

    pub fn move_down(&mut self, pixels: i32) -> Result<()> {
        self.device.send_relative(&[(REL_Y, pixels)])
    }

    /// Scrolls by `delta` detents; positive is up (or right when horizontal).
    pub fn wheel(&mut self, horizontal: bool, delta: i32) -> Result<()> {
        let axis = if horizontal { REL_HWHEEL } else { REL_WHEEL };
        self.device.send_relative(&[(axis, delta)])
    }

    pub fn click(&mut self, button: MouseButton) -> Result<()> {
        press_and_release(&mut self.device, button.code())
    }

    pub fn left_click(&mut self) -> Result<()> {
        self.click(MouseButton::Left)
    }

    pub fn right_click(&mut self) -> Result<()> {
        self.click(MouseButton::Right)
    }

    pub fn middle_click(&mut self) -> Result<()> {
        self.click(MouseButton::Middle)
    }

    pub fn button_down(&mut self, button: MouseButton) -> Result<()> {
        self.device.send_buttons(&[button.code()], ButtonState::Pressed)
    }

    pub fn button_up(&mut self, button: MouseButton) -> Result<()> {
        self.device.send_buttons(&[button.code()], ButtonState::Released)
    }
}

fn negate(pixels: i32) -> Result<i32> {
    pixels
        .checked_neg()
        .ok_or_else(|| Error::InvalidArgument(format!("cannot move by -({pixels}) pixels")))
}

impl<F: DeviceFile> DeviceClass<F> for Mouse<F> {
    fn device(&mut self) -> &mut VirtualDevice<F> {
        &mut self.device
    }
}
