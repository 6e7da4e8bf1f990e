// SPDX-License-Identifier: Apache-2.0
//
// User-facing output for hidtester

use std::fmt;
use std::io::{self, Write};

/// Status text and report data written to the terminal.
///
/// Status messages honour `--quiet`, settings chatter needs `--verbose`, and
/// report data is always written. Every write is flushed so a prompt like
/// `Reading ...` shows up before a blocking read.
pub struct Console<W: Write> {
    out: W,
    quiet: bool,
    verbose: bool,
    line_open: bool,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            quiet: false,
            verbose: false,
            line_open: false,
        }
    }

    pub fn set_quiet(&mut self) {
        self.quiet = true;
    }

    pub fn set_verbose(&mut self) {
        self.verbose = true;
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn msg(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.emit(args)
    }

    pub fn info(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.emit(args)
    }

    /// Like [`Console::msg`], but starts on a fresh line when a prompt such
    /// as `Writing ...` is still open.
    pub fn error(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        if self.line_open {
            self.emit(format_args!("\n"))?;
        }
        self.emit(args)
    }

    pub fn data(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.emit(args)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        let text = args.to_string();
        if text.is_empty() {
            return Ok(());
        }
        self.line_open = !text.ends_with('\n');
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }
}
