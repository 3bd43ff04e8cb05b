// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::path::PathBuf;
use std::thread::sleep;
use std::time::Duration;

use clap::Parser;
use log::info;
use vuinput::codes::*;
use vuinput::devices::{DeviceClass, Keyboard};
use vuinput::{DeviceDescriptor, InputId, VirtualDevice};

#[derive(Debug, Parser)]
#[command(author, version, about = "Creates a virtual keyboard and types a word")]
struct Args {
    /// Device path (with /dev/)
    #[arg(long, default_value = vuinput::DEFAULT_DEVICE_PATH)]
    device: PathBuf,

    /// Device name
    #[arg(long, default_value = "vuinput demo keyboard")]
    name: String,

    #[arg(long, default_value_t = 0x4711)]
    vendor: u16,

    #[arg(long, default_value_t = 0x0815)]
    product: u16,

    /// Lowercase letters to type
    #[arg(long, default_value = "hello")]
    word: String,
}

fn letter_key(letter: char) -> Option<u16> {
    let key = match letter {
        'a' => KEY_A,
        'b' => KEY_B,
        'c' => KEY_C,
        'd' => KEY_D,
        'e' => KEY_E,
        'f' => KEY_F,
        'g' => KEY_G,
        'h' => KEY_H,
        'i' => KEY_I,
        'j' => KEY_J,
        'k' => KEY_K,
        'l' => KEY_L,
        'm' => KEY_M,
        'n' => KEY_N,
        'o' => KEY_O,
        'p' => KEY_P,
        'q' => KEY_Q,
        'r' => KEY_R,
        's' => KEY_S,
        't' => KEY_T,
        'u' => KEY_U,
        'v' => KEY_V,
        'w' => KEY_W,
        'x' => KEY_X,
        'y' => KEY_Y,
        'z' => KEY_Z,
        ' ' => KEY_SPACE,
        _ => return None,
    };
    Some(key)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    let args = Args::parse();

    let keys = args
        .word
        .chars()
        .map(|c| letter_key(c).ok_or_else(|| anyhow::anyhow!("cannot type {c:?}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let descriptor = DeviceDescriptor::new(args.name).with_id(InputId {
        bustype: BUS_USB,
        vendor: args.vendor,
        product: args.product,
        version: 1,
    });
    let mut keyboard = Keyboard::create(VirtualDevice::open(&args.device)?, descriptor)?;
    info!("syspath: {}", keyboard.syspath()?.display());

    for key in keys {
        keyboard.key_press(key)?;
        sleep(Duration::from_millis(50));
    }

    keyboard.close()?;
    Ok(())
}
