// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::ops::RangeInclusive;
use std::path::Path;

use crate::codes::{KEY_ESC, KEY_MICMUTE};
use crate::control::{DeviceFile, UinputFile};
use crate::descriptor::DeviceDescriptor;
use crate::device::{ButtonState, VirtualDevice};
use crate::error::{Error, Result};

use super::{press_and_release, DeviceClass};

pub const KEYBOARD_KEYS: RangeInclusive<u16> = KEY_ESC..=KEY_MICMUTE;

/// A keyboard with every key from `KEY_ESC` to `KEY_MICMUTE`.
#[derive(Debug)]
pub struct Keyboard<F: DeviceFile = UinputFile> {
    device: VirtualDevice<F>,
}

impl Keyboard {
    pub fn open(path: impl AsRef<Path>, name: &str) -> Result<Self> {
        Self::create(VirtualDevice::open(path)?, DeviceDescriptor::new(name))
    }
}

impl<F: DeviceFile> Keyboard<F> {
    pub fn create(mut device: VirtualDevice<F>, descriptor: DeviceDescriptor) -> Result<Self> {
        device.enable_key(KEYBOARD_KEYS)?;
        device.commit(&descriptor)?;
        Ok(Self { device })
    }

    pub fn key_press(&mut self, key: u16) -> Result<()> {
        check_key(key)?;
        press_and_release(&mut self.device, key)
    }

    pub fn key_down(&mut self, key: u16) -> Result<()> {
        check_key(key)?;
        self.device.send_buttons(&[key], ButtonState::Pressed)
    }

    pub fn key_up(&mut self, key: u16) -> Result<()> {
        check_key(key)?;
        self.device.send_buttons(&[key], ButtonState::Released)
    }
}

impl<F: DeviceFile> DeviceClass<F> for Keyboard<F> {
    fn device(&mut self) -> &mut VirtualDevice<F> {
        &mut self.device
    }
}

fn check_key(key: u16) -> Result<()> {
    if !KEYBOARD_KEYS.contains(&key) {
        return Err(Error::InvalidArgument(format!(
            "failed to perform key event, key code {key} is out of range"
        )));
    }
    Ok(())
}
