// SPDX-License-Identifier: Apache-2.0
//
// Error types for hidtester

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no device opened.")]
    NotOpen,
    #[error("no matching devices")]
    NoMatch,
    #[error("buffer length is 0. Use --length to specify.")]
    ZeroLength,
    #[error("{0}")]
    Hid(#[from] hidapi::HidError),
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Console write failures end the run; everything else only fails the
    /// command that hit it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
