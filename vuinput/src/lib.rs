// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! Virtual input devices through Linux uinput.
//!
//! A [`VirtualDevice`] owns one open uinput file. Register capabilities,
//! [`commit`](VirtualDevice::commit) a [`DeviceDescriptor`], then write
//! events. Devices with force feedback also have to answer the effect
//! uploads the kernel queues on the file, see
//! [`handle_force_feedback`](VirtualDevice::handle_force_feedback).
//!
//! ```no_run
//! use vuinput::codes::KEY_A;
//! use vuinput::devices::{DeviceClass, Keyboard};
//!
//! let mut keyboard = Keyboard::open(vuinput::DEFAULT_DEVICE_PATH, "my keyboard")?;
//! keyboard.key_press(KEY_A)?;
//! keyboard.close()?;
//! # Ok::<(), vuinput::Error>(())
//! ```

pub mod codes;
pub mod control;
pub mod descriptor;
pub mod device;
pub mod devices;
pub mod effect;
pub mod error;
pub mod event;
pub mod ff;

mod wire;

#[cfg(test)]
mod fake;

pub use control::{ControlRequest, DeviceFile, UinputFile};
pub use descriptor::{AxisInfo, DeviceDescriptor, InputId};
pub use device::{
    ButtonState, Capability, CapabilitySet, DeviceState, VirtualDevice, DEFAULT_DEVICE_PATH,
    DEFAULT_SETTLE_DELAY,
};
pub use effect::{EffectKind, EffectPayload, EffectUnion, ForceFeedbackEffect};
pub use error::{Error, Result};
pub use event::InputEvent;
pub use ff::{EraseRequest, FfOutcome, FfRequest, UploadRequest};
