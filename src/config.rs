// SPDX-License-Identifier: Apache-2.0
//
// Runtime settings for hidtester

use crate::render::Base;

/// Largest report buffer that can be sent or read.
pub const MAX_BUF: usize = 1024;
/// Buffer size handed to the library for report descriptors.
pub const MAX_DESCRIPTOR: usize = 4096;

pub const DEFAULT_LENGTH: usize = 64;
pub const DEFAULT_TIMEOUT_MS: i32 = 250;
pub const DEFAULT_WIDTH: usize = 32;

/// Settings changed by `--length`, `--timeout`, `--base` and `--width`
/// as they are reached on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Report length in bytes. Zero means "take it from the data list".
    pub length: usize,
    /// Input read timeout, -1 blocks.
    pub timeout_ms: i32,
    pub base: Base,
    /// Bytes printed per line.
    pub width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            base: Base::Hex,
            width: DEFAULT_WIDTH,
        }
    }
}
