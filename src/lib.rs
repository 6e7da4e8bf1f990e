// SPDX-License-Identifier: Apache-2.0
//
// hidtester: send and receive HID reports from the command line

pub mod args;
pub mod config;
pub mod console;
pub mod error;
pub mod hid;
pub mod parse;
pub mod render;
pub mod session;

use tracing_subscriber::EnvFilter;

pub use args::Command;
pub use error::{Error, Result};
pub use session::Session;

/// Log to stderr so stdout carries only tool output. `RUST_LOG` wins when
/// set; otherwise `--verbose` anywhere on the command line means debug.
pub fn init_logging(commands: &[Command]) {
    let verbose = commands.contains(&Command::Verbose);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Execute `commands` against the system HID library, writing to stdout.
pub fn run(commands: Vec<Command>) -> anyhow::Result<()> {
    let backend = hid::HidApiBackend::new()
        .map_err(|e| anyhow::anyhow!("Failed to initialize HID API: {e}"))?;
    tracing::info!(commands = commands.len(), "HID API ready");

    let mut session = Session::new(backend, std::io::stdout());
    session.run(commands)?;
    Ok(())
}
