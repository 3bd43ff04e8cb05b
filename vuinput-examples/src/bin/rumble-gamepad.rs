// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

// Creates a gamepad with force feedback and answers every effect upload and
// erase until killed. Try it with `fftest /dev/input/eventN`.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, warn};
use vuinput::devices::{DeviceClass, Gamepad};
use vuinput::{
    DeviceDescriptor, EffectPayload, FfOutcome, FfRequest, ForceFeedbackEffect, VirtualDevice,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Virtual gamepad that logs force-feedback effects")]
struct Args {
    /// Device path (with /dev/)
    #[arg(long, default_value = vuinput::DEFAULT_DEVICE_PATH)]
    device: PathBuf,

    /// Device name
    #[arg(long, default_value = "vuinput rumble gamepad")]
    name: String,

    /// Number of effect slots offered to clients
    #[arg(long, default_value_t = 16)]
    effects_max: u32,
}

fn describe(effect: &ForceFeedbackEffect) -> String {
    match effect.payload {
        Some(EffectPayload::Rumble(rumble)) => format!(
            "rumble strong {} weak {} for {}ms",
            rumble.strong_magnitude, rumble.weak_magnitude, effect.replay.length
        ),
        Some(EffectPayload::Periodic(periodic)) => format!(
            "periodic waveform {:#x} period {} magnitude {}",
            periodic.waveform, periodic.period, periodic.magnitude
        ),
        Some(EffectPayload::Constant(constant)) => format!("constant level {}", constant.level),
        Some(EffectPayload::Ramp(ramp)) => {
            format!("ramp {} -> {}", ramp.start_level, ramp.end_level)
        }
        Some(EffectPayload::Condition(conditions)) => format!(
            "condition center {}/{}",
            conditions[0].center, conditions[1].center
        ),
        None => format!("unknown effect {:?}", effect.kind),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    let args = Args::parse();

    let mut gamepad = Gamepad::with_rumble(
        VirtualDevice::open(&args.device)?,
        DeviceDescriptor::new(args.name),
        args.effects_max,
    )?;
    info!("devnode: {}", gamepad.devnode()?.display());

    let mut effects: HashMap<i16, ForceFeedbackEffect> = HashMap::new();
    let mut callback = |request: FfRequest<'_>| -> i32 {
        match request {
            FfRequest::Upload(upload) => {
                let effect = upload.effect();
                info!("upload {}: {}", effect.id, describe(&effect));
                effects.insert(effect.id, effect);
            }
            FfRequest::Erase(erase) => {
                let id = erase.effect_id() as i16;
                if effects.remove(&id).is_none() {
                    warn!("erase of unknown effect {}", id);
                }
                info!("erase {}", id);
            }
        }
        0
    };

    loop {
        match gamepad.handle_force_feedback(Some(&mut callback))? {
            FfOutcome::NoEvent | FfOutcome::Ignored => {}
            outcome => debug!("{:?}", outcome),
        }
    }
}
