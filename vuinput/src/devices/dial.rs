// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::path::Path;

use crate::codes::REL_DIAL;
use crate::control::{DeviceFile, UinputFile};
use crate::descriptor::DeviceDescriptor;
use crate::device::VirtualDevice;
use crate::error::Result;

use super::DeviceClass;

#[derive(Debug)]
pub struct Dial<F: DeviceFile = UinputFile> {
    device: VirtualDevice<F>,
}

impl Dial {
    pub fn open(path: impl AsRef<Path>, name: &str) -> Result<Self> {
        Self::create(VirtualDevice::open(path)?, DeviceDescriptor::new(name))
    }
}

impl<F: DeviceFile> Dial<F> {
    pub fn create(mut device: VirtualDevice<F>, descriptor: DeviceDescriptor) -> Result<Self> {
        device.enable_relative([REL_DIAL])?;
        device.commit(&descriptor)?;
        Ok(Self { device })
    }

    /// Positive turns clockwise.
    pub fn turn(&mut self, delta: i32) -> Result<()> {
        self.device.send_relative(&[(REL_DIAL, delta)])
    }
}

impl<F: DeviceFile> DeviceClass<F> for Dial<F> {
    fn device(&mut self) -> &mut VirtualDevice<F> {
        &mut self.device
    }
}
