// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! Decoding of `struct ff_effect`.
//!
//! The kernel hands over effects as a fixed header followed by a union whose
//! active member is selected by `type`. [`FfEffectRecord`] keeps the union as
//! 32 raw bytes; this module is the only place that reads them. The typed
//! view is [`ForceFeedbackEffect`], built with `From<&FfEffectRecord>`.
//!
//! Payload layout on 64-bit kernels (offsets relative to the payload):
//!
//! ```text
//! rumble     strong@0 weak@2
//! constant   level@0 envelope@2..10
//! ramp       start@0 end@2 envelope@4..12
//! periodic   waveform@0 period@2 magnitude@4 offset@6 phase@8
//!            envelope@10..18 custom_len@20 custom_data@24..32
//! condition  2 x 12 bytes, one block per axis
//! ```
//!
//! `struct ff_condition_effect` is six 16-bit fields, so the second axis
//! block starts at payload offset 12, not 16.

use uinput_ioctls::{FfEffectRecord, FfReplay, FfTrigger, FF_EFFECT_PAYLOAD_LEN};

use crate::codes::*;
use crate::wire::{i16_at, put, u16_at, u32_at, u64_at};

const CONDITION_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Envelope {
    pub attack_length: u16,
    pub attack_level: u16,
    pub fade_length: u16,
    pub fade_level: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RumbleEffect {
    pub strong_magnitude: u16,
    pub weak_magnitude: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstantEffect {
    pub level: i16,
    pub envelope: Envelope,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RampEffect {
    pub start_level: i16,
    pub end_level: i16,
    pub envelope: Envelope,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodicEffect {
    pub waveform: u16,
    pub period: u16,
    pub magnitude: i16,
    pub offset: i16,
    pub phase: u16,
    pub envelope: Envelope,
    pub custom_len: u32,
    /// User-space address of the custom waveform samples in the process that
    /// uploaded the effect. Only meaningful to that process.
    pub custom_data: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionEffect {
    pub right_saturation: u16,
    pub left_saturation: u16,
    pub right_coeff: i16,
    pub left_coeff: i16,
    pub deadband: u16,
    pub center: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Rumble,
    Periodic,
    Constant,
    Ramp,
    Spring,
    Friction,
    Damper,
    Inertia,
    Unknown(u16),
}

impl EffectKind {
    pub fn from_tag(tag: u16) -> Self {
        match tag {
            FF_RUMBLE => EffectKind::Rumble,
            FF_PERIODIC => EffectKind::Periodic,
            FF_CONSTANT => EffectKind::Constant,
            FF_RAMP => EffectKind::Ramp,
            FF_SPRING => EffectKind::Spring,
            FF_FRICTION => EffectKind::Friction,
            FF_DAMPER => EffectKind::Damper,
            FF_INERTIA => EffectKind::Inertia,
            other => EffectKind::Unknown(other),
        }
    }

    pub fn tag(&self) -> u16 {
        match self {
            EffectKind::Rumble => FF_RUMBLE,
            EffectKind::Periodic => FF_PERIODIC,
            EffectKind::Constant => FF_CONSTANT,
            EffectKind::Ramp => FF_RAMP,
            EffectKind::Spring => FF_SPRING,
            EffectKind::Friction => FF_FRICTION,
            EffectKind::Damper => FF_DAMPER,
            EffectKind::Inertia => FF_INERTIA,
            EffectKind::Unknown(tag) => *tag,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectPayload {
    Rumble(RumbleEffect),
    Periodic(PeriodicEffect),
    Constant(ConstantEffect),
    Ramp(RampEffect),
    Condition([ConditionEffect; 2]),
}

/// Typed view of an effect record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForceFeedbackEffect {
    pub kind: EffectKind,
    pub id: i16,
    pub direction: u16,
    pub trigger: FfTrigger,
    pub replay: FfReplay,
    /// `None` for tags this crate does not know.
    pub payload: Option<EffectPayload>,
}

impl From<&FfEffectRecord> for ForceFeedbackEffect {
    fn from(record: &FfEffectRecord) -> Self {
        let kind = EffectKind::from_tag(record.type_);
        let payload = match kind {
            EffectKind::Rumble => Some(EffectPayload::Rumble(record.rumble())),
            EffectKind::Periodic => Some(EffectPayload::Periodic(record.periodic())),
            EffectKind::Constant => Some(EffectPayload::Constant(record.constant())),
            EffectKind::Ramp => Some(EffectPayload::Ramp(record.ramp())),
            EffectKind::Spring
            | EffectKind::Friction
            | EffectKind::Damper
            | EffectKind::Inertia => Some(EffectPayload::Condition(record.condition())),
            EffectKind::Unknown(_) => None,
        };
        Self {
            kind,
            id: record.id,
            direction: record.direction,
            trigger: record.trigger,
            replay: record.replay,
            payload,
        }
    }
}

/// Raw accessors on the union. Each one reads the payload as if its variant
/// were active; which one is active is decided by `type_` alone. Calling the
/// wrong accessor yields meaningless values but never panics.
pub trait EffectUnion {
    fn rumble(&self) -> RumbleEffect;
    fn periodic(&self) -> PeriodicEffect;
    fn constant(&self) -> ConstantEffect;
    fn ramp(&self) -> RampEffect;
    fn condition(&self) -> [ConditionEffect; 2];

    fn set_rumble(&mut self, effect: &RumbleEffect);
    fn set_periodic(&mut self, effect: &PeriodicEffect);
    fn set_constant(&mut self, effect: &ConstantEffect);
    fn set_ramp(&mut self, effect: &RampEffect);
    fn set_condition(&mut self, effect: &[ConditionEffect; 2]);
}

fn envelope_at(buf: &[u8], at: usize) -> Envelope {
    Envelope {
        attack_length: u16_at(buf, at),
        attack_level: u16_at(buf, at + 2),
        fade_length: u16_at(buf, at + 4),
        fade_level: u16_at(buf, at + 6),
    }
}

fn put_envelope(buf: &mut [u8], at: usize, envelope: &Envelope) {
    put(buf, at, &envelope.attack_length.to_le_bytes());
    put(buf, at + 2, &envelope.attack_level.to_le_bytes());
    put(buf, at + 4, &envelope.fade_length.to_le_bytes());
    put(buf, at + 6, &envelope.fade_level.to_le_bytes());
}

fn condition_at(buf: &[u8], at: usize) -> ConditionEffect {
    ConditionEffect {
        right_saturation: u16_at(buf, at),
        left_saturation: u16_at(buf, at + 2),
        right_coeff: i16_at(buf, at + 4),
        left_coeff: i16_at(buf, at + 6),
        deadband: u16_at(buf, at + 8),
        center: i16_at(buf, at + 10),
    }
}

fn put_condition(buf: &mut [u8], at: usize, condition: &ConditionEffect) {
    put(buf, at, &condition.right_saturation.to_le_bytes());
    put(buf, at + 2, &condition.left_saturation.to_le_bytes());
    put(buf, at + 4, &condition.right_coeff.to_le_bytes());
    put(buf, at + 6, &condition.left_coeff.to_le_bytes());
    put(buf, at + 8, &condition.deadband.to_le_bytes());
    put(buf, at + 10, &condition.center.to_le_bytes());
}

impl EffectUnion for FfEffectRecord {
    fn rumble(&self) -> RumbleEffect {
        let u = &self.payload;
        RumbleEffect {
            strong_magnitude: u16_at(u, 0),
            weak_magnitude: u16_at(u, 2),
        }
    }

    fn periodic(&self) -> PeriodicEffect {
        let u = &self.payload;
        PeriodicEffect {
            waveform: u16_at(u, 0),
            period: u16_at(u, 2),
            magnitude: i16_at(u, 4),
            offset: i16_at(u, 6),
            phase: u16_at(u, 8),
            envelope: envelope_at(u, 10),
            custom_len: u32_at(u, 20),
            custom_data: u64_at(u, 24),
        }
    }

    fn constant(&self) -> ConstantEffect {
        let u = &self.payload;
        ConstantEffect {
            level: i16_at(u, 0),
            envelope: envelope_at(u, 2),
        }
    }

    fn ramp(&self) -> RampEffect {
        let u = &self.payload;
        RampEffect {
            start_level: i16_at(u, 0),
            end_level: i16_at(u, 2),
            envelope: envelope_at(u, 4),
        }
    }

    fn condition(&self) -> [ConditionEffect; 2] {
        let u = &self.payload;
        [condition_at(u, 0), condition_at(u, CONDITION_SIZE)]
    }

    fn set_rumble(&mut self, effect: &RumbleEffect) {
        let u = &mut self.payload;
        *u = [0; FF_EFFECT_PAYLOAD_LEN];
        put(u, 0, &effect.strong_magnitude.to_le_bytes());
        put(u, 2, &effect.weak_magnitude.to_le_bytes());
    }

    fn set_periodic(&mut self, effect: &PeriodicEffect) {
        let u = &mut self.payload;
        *u = [0; FF_EFFECT_PAYLOAD_LEN];
        put(u, 0, &effect.waveform.to_le_bytes());
        put(u, 2, &effect.period.to_le_bytes());
        put(u, 4, &effect.magnitude.to_le_bytes());
        put(u, 6, &effect.offset.to_le_bytes());
        put(u, 8, &effect.phase.to_le_bytes());
        put_envelope(u, 10, &effect.envelope);
        put(u, 20, &effect.custom_len.to_le_bytes());
        put(u, 24, &effect.custom_data.to_le_bytes());
    }

    fn set_constant(&mut self, effect: &ConstantEffect) {
        let u = &mut self.payload;
        *u = [0; FF_EFFECT_PAYLOAD_LEN];
        put(u, 0, &effect.level.to_le_bytes());
        put_envelope(u, 2, &effect.envelope);
    }

    fn set_ramp(&mut self, effect: &RampEffect) {
        let u = &mut self.payload;
        *u = [0; FF_EFFECT_PAYLOAD_LEN];
        put(u, 0, &effect.start_level.to_le_bytes());
        put(u, 2, &effect.end_level.to_le_bytes());
        put_envelope(u, 4, &effect.envelope);
    }

    fn set_condition(&mut self, effect: &[ConditionEffect; 2]) {
        let u = &mut self.payload;
        *u = [0; FF_EFFECT_PAYLOAD_LEN];
        put_condition(u, 0, &effect[0]);
        put_condition(u, CONDITION_SIZE, &effect[1]);
    }
}

/// Builds a record with the given tag, the way the kernel would hand it over.
pub fn effect_record(kind: EffectKind, id: i16) -> FfEffectRecord {
    FfEffectRecord {
        type_: kind.tag(),
        id,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    const ENVELOPE: Envelope = Envelope {
        attack_length: 100,
        attack_level: 0x1000,
        fade_length: 250,
        fade_level: 0x2000,
    };

    #[test]
    fn record_layout_is_fixed() {
        assert_eq!(size_of::<FfEffectRecord>(), 48);
        assert_eq!(offset_of!(FfEffectRecord, payload), 16);
    }

    #[test]
    fn rumble_round_trip() {
        let mut record = effect_record(EffectKind::Rumble, 3);
        let rumble = RumbleEffect {
            strong_magnitude: 0xc000,
            weak_magnitude: 0x4000,
        };
        record.set_rumble(&rumble);
        assert_eq!(record.rumble(), rumble);
        // rumble only occupies the first four payload bytes
        assert_eq!(&record.payload[..4], &[0x00, 0xc0, 0x00, 0x40]);
        assert!(record.payload[4..].iter().all(|b| *b == 0));
    }

    #[test]
    fn periodic_uses_the_whole_payload() {
        let mut record = effect_record(EffectKind::Periodic, 0);
        let periodic = PeriodicEffect {
            waveform: FF_SINE,
            period: 20,
            magnitude: -12000,
            offset: 300,
            phase: 90,
            envelope: ENVELOPE,
            custom_len: 4,
            custom_data: 0x7fff_dead_beef,
        };
        record.set_periodic(&periodic);
        assert_eq!(record.periodic(), periodic);
        assert_eq!(u64_at(&record.payload, 24), 0x7fff_dead_beef);
    }

    #[test]
    fn constant_and_ramp_round_trip() {
        let mut record = effect_record(EffectKind::Constant, 1);
        let constant = ConstantEffect {
            level: -0x4000,
            envelope: ENVELOPE,
        };
        record.set_constant(&constant);
        assert_eq!(record.constant(), constant);

        let mut record = effect_record(EffectKind::Ramp, 2);
        let ramp = RampEffect {
            start_level: -100,
            end_level: 32000,
            envelope: ENVELOPE,
        };
        record.set_ramp(&ramp);
        assert_eq!(record.ramp(), ramp);
    }

    #[test]
    fn condition_blocks_follow_kernel_stride() {
        let mut record = effect_record(EffectKind::Spring, 4);
        let conditions = [
            ConditionEffect {
                right_saturation: 0xffff,
                left_saturation: 0x7fff,
                right_coeff: 1000,
                left_coeff: -1000,
                deadband: 10,
                center: -5,
            },
            ConditionEffect {
                right_saturation: 1,
                left_saturation: 2,
                right_coeff: 3,
                left_coeff: 4,
                deadband: 5,
                center: 6,
            },
        ];
        record.set_condition(&conditions);
        assert_eq!(record.condition(), conditions);
        assert_eq!(u16_at(&record.payload, 12), 1);
    }

    #[test]
    fn typed_view_follows_the_tag() {
        let mut record = effect_record(EffectKind::Rumble, 9);
        record.direction = 0x4000;
        record.replay = FfReplay {
            length: 500,
            delay: 10,
        };
        record.set_rumble(&RumbleEffect {
            strong_magnitude: 1,
            weak_magnitude: 2,
        });

        let effect = ForceFeedbackEffect::from(&record);
        assert_eq!(effect.kind, EffectKind::Rumble);
        assert_eq!(effect.id, 9);
        assert_eq!(effect.direction, 0x4000);
        assert_eq!(effect.replay.length, 500);
        assert_eq!(
            effect.payload,
            Some(EffectPayload::Rumble(RumbleEffect {
                strong_magnitude: 1,
                weak_magnitude: 2,
            }))
        );

        record.type_ = FF_DAMPER;
        let effect = ForceFeedbackEffect::from(&record);
        assert_eq!(effect.kind, EffectKind::Damper);
        assert!(matches!(effect.payload, Some(EffectPayload::Condition(_))));
    }

    #[test]
    fn unknown_tag_has_no_payload() {
        let record = FfEffectRecord {
            type_: 0x42,
            ..Default::default()
        };
        let effect = ForceFeedbackEffect::from(&record);
        assert_eq!(effect.kind, EffectKind::Unknown(0x42));
        assert_eq!(effect.payload, None);
    }

    #[test]
    fn mismatched_accessor_does_not_panic() {
        let mut record = effect_record(EffectKind::Rumble, 0);
        record.set_rumble(&RumbleEffect {
            strong_magnitude: 0xffff,
            weak_magnitude: 0xffff,
        });
        let _ = record.periodic();
        let _ = record.condition();
        let _ = record.ramp();
        let _ = record.constant();
    }
}
