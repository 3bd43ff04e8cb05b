// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::io;
use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("could not open device file {}: {source}", path.display())]
    NotFound { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),

    /// The kernel rejected a control call.
    #[error("{call} ioctl failed: {source}")]
    Protocol { call: &'static str, source: Errno },

    #[error("device is closed")]
    ClosedDevice,
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    pub(crate) fn effects_max_below_minimum() -> Self {
        Error::InvalidArgument(
            "effectsMax is below the minimum value of 1, use the non-rumble constructor if you don't want rumble support"
                .to_string(),
        )
    }
}
