// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::path::Path;

use crate::codes::{ABS_X, ABS_Y, BTN_LEFT, BTN_RIGHT, BTN_TOUCH};
use crate::control::{DeviceFile, UinputFile};
use crate::descriptor::{AxisInfo, DeviceDescriptor};
use crate::device::{ButtonState, VirtualDevice};
use crate::error::{Error, Result};

use super::{press_and_release, DeviceClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl AxisRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// An absolute pointer, typically sized to the screen it drives.
#[derive(Debug)]
pub struct TouchPad<F: DeviceFile = UinputFile> {
    device: VirtualDevice<F>,
}

impl TouchPad {
    pub fn open(path: impl AsRef<Path>, name: &str, x: AxisRange, y: AxisRange) -> Result<Self> {
        Self::create(VirtualDevice::open(path)?, DeviceDescriptor::new(name), x, y)
    }
}

impl<F: DeviceFile> TouchPad<F> {
    pub fn create(
        mut device: VirtualDevice<F>,
        mut descriptor: DeviceDescriptor,
        x: AxisRange,
        y: AxisRange,
    ) -> Result<Self> {
        for (axis, range) in [("x", x), ("y", y)] {
            if range.min >= range.max {
                return Err(Error::InvalidArgument(format!(
                    "{axis} range is empty: min {} must be below max {}",
                    range.min, range.max
                )));
            }
        }
        descriptor.set_axis(ABS_X, AxisInfo::range(x.min, x.max))?;
        descriptor.set_axis(ABS_Y, AxisInfo::range(y.min, y.max))?;

        device.enable_key([BTN_LEFT, BTN_RIGHT, BTN_TOUCH])?;
        device.enable_absolute([ABS_X, ABS_Y])?;
        device.commit(&descriptor)?;
        Ok(Self { device })
    }

    /// Moves the cursor to an absolute position. The kernel clamps values
    /// outside the configured ranges.
    pub fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.device.send_absolute(&[(ABS_X, x), (ABS_Y, y)])
    }

    pub fn left_click(&mut self) -> Result<()> {
        press_and_release(&mut self.device, BTN_LEFT)
    }

    pub fn right_click(&mut self) -> Result<()> {
        press_and_release(&mut self.device, BTN_RIGHT)
    }

    pub fn touch_down(&mut self) -> Result<()> {
        self.device.send_buttons(&[BTN_TOUCH], ButtonState::Pressed)
    }

    pub fn touch_up(&mut self) -> Result<()> {
        self.device.send_buttons(&[BTN_TOUCH], ButtonState::Released)
    }
}

impl<F: DeviceFile> DeviceClass<F> for TouchPad<F> {
    fn device(&mut self) -> &mut VirtualDevice<F> {
        &mut self.device
    }
}
