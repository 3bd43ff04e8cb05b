// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use serde::{Deserialize, Serialize};

/// Prefix of the stdout line carrying the serialized log.
pub const EVENT_LOG_PREFIX: &str = "Event log: ";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggedInputEvent {
    pub tv_sec: i64,

    pub tv_usec: i64,

    /// Time between writing to uinput and reading back from evdev.
    pub duration_usec: i64,

    pub type_: u16,

    pub code: u16,

    pub value: i32,

    pub send_and_receive_match: bool,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct TestLog {
    pub events: Vec<LoggedInputEvent>,
}

impl TestLog {
    pub fn to_line(&self) -> serde_json::Result<String> {
        Ok(format!("{}{}", EVENT_LOG_PREFIX, serde_json::to_string(self)?))
    }

    /// Finds the event log line in the output of a test binary.
    pub fn from_output(stdout: &str) -> anyhow::Result<Self> {
        let line = stdout
            .lines()
            .find_map(|line| line.strip_prefix(EVENT_LOG_PREFIX))
            .ok_or_else(|| anyhow::anyhow!("no event log in output"))?;
        Ok(serde_json::from_str(line)?)
    }

    pub fn all_match(&self) -> bool {
        self.events.iter().all(|e| e.send_and_receive_match)
    }
}
