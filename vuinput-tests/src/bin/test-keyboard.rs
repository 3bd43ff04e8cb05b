// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::path::PathBuf;

use clap::Parser;
use log::debug;
use vuinput::codes::{EV_KEY, KEY_SPACE};
use vuinput::devices::{DeviceClass, Keyboard};
use vuinput::{ButtonState, DeviceDescriptor, InputEvent, InputId, VirtualDevice};
use vuinput_tests::evdev::{monotonic_time, EventReader};
use vuinput_tests::test_log::{LoggedInputEvent, TestLog};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Device path (with /dev/)
    #[arg(long, default_value = vuinput::DEFAULT_DEVICE_PATH)]
    dev_path: PathBuf,

    /// Key to press
    #[arg(long, default_value_t = KEY_SPACE)]
    key: u16,
}

/// Writes one synced batch and reads back as many events as it contained.
fn send_read_and_log(
    keyboard: &mut Keyboard,
    reader: &mut EventReader,
    key: u16,
    state: ButtonState,
) -> anyhow::Result<Vec<LoggedInputEvent>> {
    let expected = [InputEvent::new(EV_KEY, key, state.value()), InputEvent::sync()];

    let (sent_sec, sent_usec) = monotonic_time();
    keyboard.device().send_buttons(&[key], state)?;

    let mut logged = Vec::with_capacity(expected.len());
    for want in expected {
        let got = reader.next_event()?;
        let (recv_sec, recv_usec) = monotonic_time();
        debug!("received type {} code {} value {}", got.type_, got.code, got.value);
        logged.push(LoggedInputEvent {
            tv_sec: sent_sec,
            tv_usec: sent_usec,
            duration_usec: (recv_sec - sent_sec) * 1_000_000 + (recv_usec - sent_usec),
            type_: want.type_,
            code: want.code,
            value: want.value,
            send_and_receive_match: got.type_ == want.type_
                && got.code == want.code
                && got.value == want.value,
        });
    }
    Ok(logged)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let descriptor = DeviceDescriptor::new("Example device").with_id(InputId {
        bustype: vuinput::codes::BUS_USB,
        vendor: 0xbeef,
        product: 0xdead,
        version: 1,
    });
    let mut keyboard = Keyboard::create(VirtualDevice::open(&args.dev_path)?, descriptor)?;

    let syspath = keyboard.syspath()?;
    println!("syspath: {}", syspath.display());
    let devnode = keyboard.devnode()?;
    println!("devnode: {}", devnode.display());

    let mut reader = EventReader::open(&devnode)?;
    let mut events = send_read_and_log(&mut keyboard, &mut reader, args.key, ButtonState::Pressed)?;
    events.extend(send_read_and_log(
        &mut keyboard,
        &mut reader,
        args.key,
        ButtonState::Released,
    )?);

    let log = TestLog { events };
    println!("{}", log.to_line()?);

    keyboard.close()?;
    Ok(())
}
