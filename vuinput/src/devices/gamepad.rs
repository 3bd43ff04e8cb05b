// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::path::Path;

use log::debug;

use crate::codes::*;
use crate::control::{DeviceFile, UinputFile};
use crate::descriptor::{AxisInfo, DeviceDescriptor};
use crate::device::{ButtonState, VirtualDevice};
use crate::error::{Error, Result};
use crate::ff::{FfCallback, FfOutcome};

use super::{press_and_release, DeviceClass};

pub const STICK_MIN: i32 = -32768;
pub const STICK_MAX: i32 = 32767;
pub const TRIGGER_MIN: i32 = 0;
pub const TRIGGER_MAX: i32 = 255;

const STICK_AXES: [u16; 4] = [ABS_X, ABS_Y, ABS_RX, ABS_RY];
const TRIGGER_AXES: [u16; 2] = [ABS_Z, ABS_RZ];
const HAT_AXES: [u16; 2] = [ABS_HAT0X, ABS_HAT0Y];

/// Effects a rumble gamepad accepts uploads for.
pub const RUMBLE_EFFECTS: [u16; 4] = [FF_RUMBLE, FF_PERIODIC, FF_CONSTANT, FF_RAMP];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamepadButton {
    South,
    East,
    North,
    West,
    LeftShoulder,
    RightShoulder,
    LeftTrigger,
    RightTrigger,
    Select,
    Start,
    Mode,
    LeftThumb,
    RightThumb,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
}

impl GamepadButton {
    pub const ALL: [GamepadButton; 17] = [
        GamepadButton::South,
        GamepadButton::East,
        GamepadButton::North,
        GamepadButton::West,
        GamepadButton::LeftShoulder,
        GamepadButton::RightShoulder,
        GamepadButton::LeftTrigger,
        GamepadButton::RightTrigger,
        GamepadButton::Select,
        GamepadButton::Start,
        GamepadButton::Mode,
        GamepadButton::LeftThumb,
        GamepadButton::RightThumb,
        GamepadButton::DpadUp,
        GamepadButton::DpadDown,
        GamepadButton::DpadLeft,
        GamepadButton::DpadRight,
    ];

    pub fn code(self) -> u16 {
        match self {
            GamepadButton::South => BTN_SOUTH,
            GamepadButton::East => BTN_EAST,
            GamepadButton::North => BTN_NORTH,
            GamepadButton::West => BTN_WEST,
            GamepadButton::LeftShoulder => BTN_TL,
            GamepadButton::RightShoulder => BTN_TR,
            GamepadButton::LeftTrigger => BTN_TL2,
            GamepadButton::RightTrigger => BTN_TR2,
            GamepadButton::Select => BTN_SELECT,
            GamepadButton::Start => BTN_START,
            GamepadButton::Mode => BTN_MODE,
            GamepadButton::LeftThumb => BTN_THUMBL,
            GamepadButton::RightThumb => BTN_THUMBR,
            GamepadButton::DpadUp => BTN_DPAD_UP,
            GamepadButton::DpadDown => BTN_DPAD_DOWN,
            GamepadButton::DpadLeft => BTN_DPAD_LEFT,
            GamepadButton::DpadRight => BTN_DPAD_RIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HatDirection {
    Up,
    Down,
    Left,
    Right,
}

impl HatDirection {
    fn axis_and_value(self) -> (u16, i32) {
        match self {
            HatDirection::Up => (ABS_HAT0Y, -1),
            HatDirection::Down => (ABS_HAT0Y, 1),
            HatDirection::Left => (ABS_HAT0X, -1),
            HatDirection::Right => (ABS_HAT0X, 1),
        }
    }
}

/// A dual-stick gamepad with analog triggers and a hat, optionally accepting
/// force-feedback uploads.
#[derive(Debug)]
pub struct Gamepad<F: DeviceFile = UinputFile> {
    device: VirtualDevice<F>,
    rumble: bool,
}

impl Gamepad {
    pub fn open(path: impl AsRef<Path>, name: &str) -> Result<Self> {
        Self::create(VirtualDevice::open(path)?, DeviceDescriptor::new(name))
    }

    pub fn open_with_rumble(path: impl AsRef<Path>, name: &str, effects_max: u32) -> Result<Self> {
        // checked before the node is touched
        let descriptor = DeviceDescriptor::new(name).with_force_feedback(effects_max)?;
        Self::create_with(VirtualDevice::open(path)?, descriptor, true)
    }
}

impl<F: DeviceFile> Gamepad<F> {
    pub fn create(device: VirtualDevice<F>, descriptor: DeviceDescriptor) -> Result<Self> {
        Self::create_with(device, descriptor, false)
    }

    /// Like [`create`](Self::create), with `effects_max` effect slots for
    /// rumble and the other effects in [`RUMBLE_EFFECTS`].
    pub fn with_rumble(
        device: VirtualDevice<F>,
        descriptor: DeviceDescriptor,
        effects_max: u32,
    ) -> Result<Self> {
        let descriptor = descriptor.with_force_feedback(effects_max)?;
        Self::create_with(device, descriptor, true)
    }

    fn create_with(
        mut device: VirtualDevice<F>,
        mut descriptor: DeviceDescriptor,
        rumble: bool,
    ) -> Result<Self> {
        for axis in STICK_AXES {
            descriptor.set_axis(axis, AxisInfo::range(STICK_MIN, STICK_MAX))?;
        }
        for axis in TRIGGER_AXES {
            descriptor.set_axis(axis, AxisInfo::range(TRIGGER_MIN, TRIGGER_MAX))?;
        }
        for axis in HAT_AXES {
            descriptor.set_axis(axis, AxisInfo::range(-1, 1))?;
        }

        device.enable_key(GamepadButton::ALL.iter().map(|button| button.code()))?;
        device.enable_absolute(STICK_AXES.into_iter().chain(TRIGGER_AXES).chain(HAT_AXES))?;
        if rumble {
            device.enable_force_feedback(RUMBLE_EFFECTS)?;
        }
        device.commit(&descriptor)?;
        debug!("gamepad {} created (rumble: {})", descriptor.name(), rumble);
        Ok(Self { device, rumble })
    }

    pub fn has_rumble(&self) -> bool {
        self.rumble
    }

    pub fn button_press(&mut self, button: GamepadButton) -> Result<()> {
        press_and_release(&mut self.device, button.code())
    }

    pub fn button_down(&mut self, button: GamepadButton) -> Result<()> {
        self.device.send_buttons(&[button.code()], ButtonState::Pressed)
    }

    pub fn button_up(&mut self, button: GamepadButton) -> Result<()> {
        self.device.send_buttons(&[button.code()], ButtonState::Released)
    }

    /// `x` and `y` in `[-1.0, 1.0]`; positive `y` points down.
    pub fn left_stick_move(&mut self, x: f32, y: f32) -> Result<()> {
        self.stick_move(ABS_X, ABS_Y, x, y)
    }

    pub fn right_stick_move(&mut self, x: f32, y: f32) -> Result<()> {
        self.stick_move(ABS_RX, ABS_RY, x, y)
    }

    pub fn left_stick_move_x(&mut self, x: f32) -> Result<()> {
        self.axis_move(ABS_X, x)
    }

    pub fn left_stick_move_y(&mut self, y: f32) -> Result<()> {
        self.axis_move(ABS_Y, y)
    }

    pub fn right_stick_move_x(&mut self, x: f32) -> Result<()> {
        self.axis_move(ABS_RX, x)
    }

    pub fn right_stick_move_y(&mut self, y: f32) -> Result<()> {
        self.axis_move(ABS_RY, y)
    }

    /// `force` in `[0.0, 1.0]`.
    pub fn left_trigger_force(&mut self, force: f32) -> Result<()> {
        let value = trigger_value(force)?;
        self.device.send_absolute(&[(ABS_Z, value)])
    }

    pub fn right_trigger_force(&mut self, force: f32) -> Result<()> {
        let value = trigger_value(force)?;
        self.device.send_absolute(&[(ABS_RZ, value)])
    }

    pub fn hat_press(&mut self, direction: HatDirection) -> Result<()> {
        self.device.send_absolute(&[direction.axis_and_value()])
    }

    pub fn hat_release(&mut self, direction: HatDirection) -> Result<()> {
        let (axis, _) = direction.axis_and_value();
        self.device.send_absolute(&[(axis, 0)])
    }

    /// See [`VirtualDevice::handle_force_feedback`].
    pub fn handle_force_feedback(&mut self, callback: Option<FfCallback<'_>>) -> Result<FfOutcome> {
        self.device.handle_force_feedback(callback)
    }

    fn stick_move(&mut self, x_axis: u16, y_axis: u16, x: f32, y: f32) -> Result<()> {
        let x = stick_value(x)?;
        let y = stick_value(y)?;
        self.device.send_absolute(&[(x_axis, x), (y_axis, y)])
    }

    fn axis_move(&mut self, axis: u16, value: f32) -> Result<()> {
        let value = stick_value(value)?;
        self.device.send_absolute(&[(axis, value)])
    }
}

impl<F: DeviceFile> DeviceClass<F> for Gamepad<F> {
    fn device(&mut self) -> &mut VirtualDevice<F> {
        &mut self.device
    }
}

fn stick_value(value: f32) -> Result<i32> {
    if !(-1.0..=1.0).contains(&value) {
        return Err(Error::InvalidArgument(format!(
            "stick value {value} must be between -1.0 and 1.0"
        )));
    }
    Ok((value * STICK_MAX as f32).round() as i32)
}

fn trigger_value(force: f32) -> Result<i32> {
    if !(0.0..=1.0).contains(&force) {
        return Err(Error::InvalidArgument(format!(
            "trigger force {force} must be between 0.0 and 1.0"
        )));
    }
    Ok((force * TRIGGER_MAX as f32).round() as i32)
}
