// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use uinput_ioctls::{ABS_CNT, UINPUT_MAX_NAME_SIZE};

use crate::codes::BUS_USB;
use crate::error::{Error, Result};

/// Size of the legacy `struct uinput_user_dev` written before `UI_DEV_CREATE`.
pub const DESCRIPTOR_SIZE: usize = UINPUT_MAX_NAME_SIZE + 8 + 4 + 4 * ABS_CNT * 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputId {
    pub bustype: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisInfo {
    pub min: i32,
    pub max: i32,
    pub fuzz: i32,
    pub flat: i32,
}

impl AxisInfo {
    pub fn range(min: i32, max: i32) -> Self {
        Self {
            min,
            max,
            ..Default::default()
        }
    }
}

/// Everything the kernel needs to know about a device before it is created:
///
/// ```text
/// struct uinput_user_dev {
///     char name[UINPUT_MAX_NAME_SIZE];
///     struct input_id id;
///     __u32 ff_effects_max;
///     __s32 absmax[ABS_CNT];
///     __s32 absmin[ABS_CNT];
///     __s32 absfuzz[ABS_CNT];
///     __s32 absflat[ABS_CNT];
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    name: String,
    id: InputId,
    effects_max: u32,
    absmax: [i32; ABS_CNT],
    absmin: [i32; ABS_CNT],
    absfuzz: [i32; ABS_CNT],
    absflat: [i32; ABS_CNT],
}

impl DeviceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: InputId {
                bustype: BUS_USB,
                vendor: 0x4711,
                product: 0x0815,
                version: 1,
            },
            effects_max: 0,
            absmax: [0; ABS_CNT],
            absmin: [0; ABS_CNT],
            absfuzz: [0; ABS_CNT],
            absflat: [0; ABS_CNT],
        }
    }

    pub fn with_id(mut self, id: InputId) -> Self {
        self.id = id;
        self
    }

    /// Reserves `effects_max` effect slots for force feedback. Zero slots
    /// would make every upload fail, so it is rejected here.
    pub fn with_force_feedback(mut self, effects_max: u32) -> Result<Self> {
        if effects_max < 1 {
            return Err(Error::effects_max_below_minimum());
        }
        self.effects_max = effects_max;
        Ok(self)
    }

    pub fn with_axis(mut self, code: u16, info: AxisInfo) -> Result<Self> {
        self.set_axis(code, info)?;
        Ok(self)
    }

    pub fn set_axis(&mut self, code: u16, info: AxisInfo) -> Result<()> {
        let slot = code as usize;
        if slot >= ABS_CNT {
            return Err(Error::InvalidArgument(format!(
                "absolute axis {code} is out of range (maximum of {} axes)",
                ABS_CNT
            )));
        }
        self.absmin[slot] = info.min;
        self.absmax[slot] = info.max;
        self.absfuzz[slot] = info.fuzz;
        self.absflat[slot] = info.flat;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> InputId {
        self.id
    }

    pub fn effects_max(&self) -> u32 {
        self.effects_max
    }

    pub fn axis(&self, code: u16) -> Option<AxisInfo> {
        let slot = code as usize;
        (slot < ABS_CNT).then(|| AxisInfo {
            min: self.absmin[slot],
            max: self.absmax[slot],
            fuzz: self.absfuzz[slot],
            flat: self.absflat[slot],
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidArgument(
                "device name may not be empty".to_string(),
            ));
        }
        if self.name.len() > UINPUT_MAX_NAME_SIZE {
            return Err(Error::InvalidArgument(format!(
                "device name {} is too long (maximum of {} characters allowed)",
                self.name, UINPUT_MAX_NAME_SIZE
            )));
        }
        Ok(())
    }

    /// Serializes the descriptor into the layout of `struct uinput_user_dev`.
    /// The name is zero padded; call [`validate`](Self::validate) first, a
    /// longer name is cut at 80 bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(DESCRIPTOR_SIZE);

        let mut name = [0u8; UINPUT_MAX_NAME_SIZE];
        let len = self.name.len().min(UINPUT_MAX_NAME_SIZE);
        name[..len].copy_from_slice(&self.name.as_bytes()[..len]);
        buf.extend_from_slice(&name);

        buf.extend_from_slice(&self.id.bustype.to_le_bytes());
        buf.extend_from_slice(&self.id.vendor.to_le_bytes());
        buf.extend_from_slice(&self.id.product.to_le_bytes());
        buf.extend_from_slice(&self.id.version.to_le_bytes());
        buf.extend_from_slice(&self.effects_max.to_le_bytes());

        for table in [&self.absmax, &self.absmin, &self.absfuzz, &self.absflat] {
            for value in table.iter() {
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
        buf
    }
}
