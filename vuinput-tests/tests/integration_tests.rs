// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

// These need a writable /dev/uinput and udev creating /dev/input nodes:
// cargo test -p vuinput-tests --features requires-uinput

#[cfg(feature = "requires-uinput")]
use std::process::Command;
#[cfg(feature = "requires-uinput")]
use std::thread;
#[cfg(feature = "requires-uinput")]
use vuinput::devices::{DeviceClass, Gamepad, GamepadButton, Mouse};
#[cfg(feature = "requires-uinput")]
use vuinput::effect::{effect_record, EffectKind, EffectUnion, RumbleEffect};
#[cfg(feature = "requires-uinput")]
use vuinput::{FfOutcome, FfRequest};
#[cfg(feature = "requires-uinput")]
use vuinput_tests::evdev::EventReader;
#[cfg(feature = "requires-uinput")]
use vuinput_tests::test_log::TestLog;

#[cfg(feature = "requires-uinput")]
#[test]
fn test_keyboard_on_host() {
    let test_keyboard = env!("CARGO_BIN_EXE_test-keyboard");

    let out = Command::new(test_keyboard)
        .output()
        .expect("failed to launch test-keyboard");

    let stdout = String::from_utf8_lossy(&out.stdout);
    println!("stdout: {}", stdout);
    println!("stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(out.status.success());

    let log = TestLog::from_output(&stdout).expect("test-keyboard printed no event log");
    assert_eq!(log.events.len(), 4);
    assert!(log.all_match());
}

#[cfg(feature = "requires-uinput")]
#[test]
fn test_syspath_of_created_mouse_exists() {
    let mut mouse = Mouse::open(vuinput::DEFAULT_DEVICE_PATH, "vuinput test mouse")
        .unwrap_or_else(|e| panic!("failed to create mouse: {e}"));

    let syspath = mouse.syspath().unwrap();
    assert!(syspath.starts_with("/sys/devices/virtual/input/"));
    assert!(syspath.exists());

    mouse.move_by(5, 5).unwrap();
    mouse.close().unwrap();
    assert!(mouse.move_by(1, 1).is_err());
}

#[cfg(feature = "requires-uinput")]
#[test]
fn test_rumble_gamepad_buttons_and_sticks() {
    let mut gamepad = Gamepad::open_with_rumble(vuinput::DEFAULT_DEVICE_PATH, "vuinput test pad", 4)
        .unwrap_or_else(|e| panic!("failed to create gamepad: {e}"));

    gamepad.button_press(GamepadButton::Start).unwrap();
    gamepad.left_stick_move(0.2, 1.0).unwrap();
    gamepad.right_stick_move_y(-0.5).unwrap();
    gamepad.close().unwrap();
}

#[cfg(feature = "requires-uinput")]
#[test]
fn test_rumble_gamepad_answers_effect_upload() {
    let mut gamepad = Gamepad::open_with_rumble(vuinput::DEFAULT_DEVICE_PATH, "vuinput ff pad", 4)
        .unwrap_or_else(|e| panic!("failed to create gamepad: {e}"));
    let devnode = gamepad.devnode().unwrap();

    let client = thread::spawn(move || {
        let mut reader = EventReader::open(&devnode)?;
        let mut effect = effect_record(EffectKind::Rumble, -1);
        effect.replay.length = 500;
        effect.set_rumble(&RumbleEffect {
            strong_magnitude: 0xc000,
            weak_magnitude: 0x4000,
        });
        reader.upload_effect(&effect)
    });

    let mut uploads = Vec::new();
    let mut callback = |request: FfRequest<'_>| {
        if let FfRequest::Upload(upload) = request {
            uploads.push(upload.effect());
        }
        0
    };
    loop {
        match gamepad.handle_force_feedback(Some(&mut callback)).unwrap() {
            FfOutcome::Uploaded { retval, .. } => {
                assert_eq!(retval, 0);
                break;
            }
            FfOutcome::NoEvent | FfOutcome::Ignored => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    let id = client.join().unwrap().unwrap();
    assert!(id >= 0);
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].kind, EffectKind::Rumble);
    gamepad.close().unwrap();
}

#[cfg(feature = "requires-uinput")]
#[test]
fn test_missing_device_node() {
    let err = Mouse::open("/dev/does-not-exist-uinput", "mouse").unwrap_err();
    assert!(err.is_not_found());
}
