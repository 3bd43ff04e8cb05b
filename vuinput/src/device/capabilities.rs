// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use bit_set::BitSet;

use crate::codes::EV_FF;
use crate::control::ControlRequest;

/// One bit to enable before the device is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Event(u16),
    Key(u16),
    Relative(u16),
    Absolute(u16),
    ForceFeedback(u16),
}

impl Capability {
    pub(crate) fn request(self) -> ControlRequest<'static> {
        match self {
            Capability::Event(code) => ControlRequest::SetEventBit(code),
            Capability::Key(code) => ControlRequest::SetKeyBit(code),
            Capability::Relative(code) => ControlRequest::SetRelBit(code),
            Capability::Absolute(code) => ControlRequest::SetAbsBit(code),
            Capability::ForceFeedback(code) => ControlRequest::SetFfBit(code),
        }
    }
}

/// The bits registered on a device so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilitySet {
    events: BitSet,
    keys: BitSet,
    relative: BitSet,
    absolute: BitSet,
    force_feedback: BitSet,
}

impl CapabilitySet {
    fn bits(&self, capability: Capability) -> (&BitSet, u16) {
        match capability {
            Capability::Event(code) => (&self.events, code),
            Capability::Key(code) => (&self.keys, code),
            Capability::Relative(code) => (&self.relative, code),
            Capability::Absolute(code) => (&self.absolute, code),
            Capability::ForceFeedback(code) => (&self.force_feedback, code),
        }
    }

    pub(crate) fn insert(&mut self, capability: Capability) {
        let (bits, code) = match capability {
            Capability::Event(code) => (&mut self.events, code),
            Capability::Key(code) => (&mut self.keys, code),
            Capability::Relative(code) => (&mut self.relative, code),
            Capability::Absolute(code) => (&mut self.absolute, code),
            Capability::ForceFeedback(code) => (&mut self.force_feedback, code),
        };
        bits.insert(code as usize);
    }

    pub fn contains(&self, capability: Capability) -> bool {
        let (bits, code) = self.bits(capability);
        bits.contains(code as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
            && self.keys.is_empty()
            && self.relative.is_empty()
            && self.absolute.is_empty()
            && self.force_feedback.is_empty()
    }

    pub fn event_types(&self) -> impl Iterator<Item = u16> + '_ {
        self.events.iter().map(|bit| bit as u16)
    }

    pub fn keys(&self) -> impl Iterator<Item = u16> + '_ {
        self.keys.iter().map(|bit| bit as u16)
    }

    pub fn absolute_axes(&self) -> impl Iterator<Item = u16> + '_ {
        self.absolute.iter().map(|bit| bit as u16)
    }

    /// True once either `EV_FF` or any effect type has been registered.
    pub fn wants_force_feedback(&self) -> bool {
        self.events.contains(EV_FF as usize) || !self.force_feedback.is_empty()
    }
}
