// SPDX-License-Identifier: Apache-2.0
//
// Command execution for hidtester

use std::io::Write;

use crate::args::Command;
use crate::config::{Settings, MAX_DESCRIPTOR};
use crate::console::Console;
use crate::error::{Error, Result};
use crate::hid::{Filter, HidBackend, HidHandle};
use crate::parse::VidPid;
use crate::render::{format_device, format_report, ListStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Report {
    Feature,
    Output,
}

/// Word used in `Error on <verb>: ...`
fn verb(command: &Command) -> &'static str {
    match command {
        Command::List(_) => "list",
        Command::Open | Command::OpenPath(_) => "open",
        Command::Close => "close",
        Command::SendFeature(_) | Command::SendOutput(_) => "send",
        Command::GetReportDescriptor
        | Command::ReadFeature(_)
        | Command::ReadInput
        | Command::ReadInputForever
        | Command::ReadInputReport(_) => "read",
        _ => "set",
    }
}

/// Runs commands one after another against at most one open device.
pub struct Session<B: HidBackend, W: Write> {
    backend: B,
    console: Console<W>,
    settings: Settings,
    filter: Filter,
    device: Option<B::Device>,
}

impl<B: HidBackend, W: Write> Session<B, W> {
    pub fn new(backend: B, out: W) -> Self {
        Self {
            backend,
            console: Console::new(out),
            settings: Settings::default(),
            filter: Filter::default(),
            device: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    /// Execute every command in order, then close the device if one is
    /// still open. Only console write failures stop the run early.
    pub fn run<I>(&mut self, commands: I) -> Result<()>
    where
        I: IntoIterator<Item = Command>,
    {
        for command in commands {
            self.execute(command)?;
        }
        self.finish()
    }

    /// Execute a single command. Device and library failures are reported
    /// on the console and swallowed.
    pub fn execute(&mut self, command: Command) -> Result<()> {
        tracing::debug!(?command, "execute");
        let verb = verb(&command);
        match self.apply(command) {
            Err(e) if !e.is_fatal() => {
                tracing::warn!(verb, error = %e, "command failed");
                self.console.error(format_args!("Error on {verb}: {e}\n"))?;
                Ok(())
            }
            other => other,
        }
    }

    pub fn finish(&mut self) -> Result<()> {
        self.release()
    }

    pub fn into_output(self) -> W {
        self.console.into_inner()
    }

    fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::VidPid(VidPid {
                vendor_id,
                product_id,
            }) => {
                self.filter.vendor_id = vendor_id;
                self.filter.product_id = product_id;
                self.console.info(format_args!(
                    "Looking for vid/pid 0x{vendor_id:04X} / 0x{product_id:04X}  ({vendor_id} / {product_id})\n"
                ))?;
            }
            Command::UsagePage(usage_page) => {
                self.filter.usage_page = usage_page;
                self.console.info(format_args!(
                    "Set usagePage to 0x{usage_page:04X} ({usage_page})\n"
                ))?;
            }
            Command::Usage(usage) => {
                self.filter.usage = usage;
                self.console
                    .info(format_args!("Set usage to 0x{usage:04X} ({usage})\n"))?;
            }
            Command::Serial(serial) => {
                self.console.info(format_args!("Set serial to {serial}\n"))?;
                self.filter.serial = Some(serial);
            }
            Command::List(style) => self.list(style)?,
            Command::Open => self.open()?,
            Command::OpenPath(path) => self.open_path(&path)?,
            Command::Close => self.close()?,
            Command::GetReportDescriptor => self.report_descriptor()?,
            Command::SendFeature(data) => self.send(Report::Feature, &data)?,
            Command::SendOutput(data) => self.send(Report::Output, &data)?,
            Command::ReadFeature(report_id) => self.read_feature(report_id)?,
            Command::ReadInput => self.read_input(false)?,
            Command::ReadInputForever => self.read_input(true)?,
            Command::ReadInputReport(report_id) => self.read_input_report(report_id)?,
            Command::Length(length) => {
                self.settings.length = length;
                self.console.info(format_args!("Set buflen to {length}\n"))?;
            }
            Command::Timeout(timeout_ms) => {
                self.settings.timeout_ms = timeout_ms;
                self.console
                    .info(format_args!("Set timeout_millis to {timeout_ms}\n"))?;
            }
            Command::Base(base) => {
                self.settings.base = base;
                self.console
                    .info(format_args!("Set print_base to {}\n", base.radix()))?;
            }
            Command::Width(width) => {
                self.settings.width = width;
                self.console.info(format_args!("Set print_width to {width}\n"))?;
            }
            Command::Quiet => self.console.set_quiet(),
            Command::Verbose => self.console.set_verbose(),
        }
        Ok(())
    }

    fn list(&mut self, style: ListStyle) -> Result<()> {
        let devices = self
            .backend
            .enumerate(self.filter.vendor_id, self.filter.product_id)?;
        for info in devices.iter().filter(|info| self.filter.matches(info)) {
            self.console
                .data(format_args!("{}", format_device(info, style)))?;
        }
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        self.release()?;
        let filter = &self.filter;

        let device = if filter.is_vid_pid_only() {
            self.console.msg(format_args!(
                "Opening device, vid/pid: 0x{:04X}/0x{:04X}\n",
                filter.vendor_id, filter.product_id
            ))?;
            self.backend
                .open(filter.vendor_id, filter.product_id, filter.serial.as_deref())?
        } else {
            self.console.msg(format_args!(
                "Opening device, vid/pid:0x{:04X}/0x{:04X}, usagePage/usage: {:X}/{:X}\n",
                filter.vendor_id, filter.product_id, filter.usage_page, filter.usage
            ))?;
            // last match wins
            let path = self
                .backend
                .enumerate(filter.vendor_id, filter.product_id)?
                .into_iter()
                .filter(|info| filter.matches(info))
                .last()
                .map(|info| info.path)
                .ok_or(Error::NoMatch)?;
            tracing::debug!(path = %path, "matched device");
            self.backend.open_path(&path)?
        };

        self.device = Some(device);
        self.console.msg(format_args!("Device opened\n"))?;
        Ok(())
    }

    fn open_path(&mut self, path: &str) -> Result<()> {
        self.release()?;
        self.console
            .msg(format_args!("Opening device. path: {path}\n"))?;
        self.device = Some(self.backend.open_path(path)?);
        self.console.msg(format_args!("Device opened\n"))?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.console.msg(format_args!("Closing device\n"))?;
        self.device = None;
        Ok(())
    }

    /// Close the open device, if any, announcing it.
    fn release(&mut self) -> Result<()> {
        if self.device.is_some() {
            self.close()?;
        }
        Ok(())
    }

    fn report_descriptor(&mut self) -> Result<()> {
        let device = self.device.as_mut().ok_or(Error::NotOpen)?;
        let mut buf = vec![0u8; MAX_DESCRIPTOR];
        let len = device.get_report_descriptor(&mut buf)?;
        self.console.data(format_args!("Report Descriptor:\n"))?;
        self.console.data(format_args!(
            "{}",
            format_report(&buf[..len], self.settings.base, self.settings.width)
        ))?;
        Ok(())
    }

    fn send(&mut self, report: Report, data: &[u8]) -> Result<()> {
        // a zero length adopts the data length for the rest of the run
        if self.settings.length == 0 {
            self.settings.length = data.len();
        }
        let length = self.settings.length;
        let device = self.device.as_mut().ok_or(Error::NotOpen)?;

        let mut buf = vec![0u8; length];
        let copied = data.len().min(length);
        buf[..copied].copy_from_slice(&data[..copied]);

        let written = match report {
            Report::Output => {
                self.console
                    .msg(format_args!("Writing output report of {length}-bytes..."))?;
                device.write(&buf)?
            }
            Report::Feature => {
                self.console
                    .msg(format_args!("Writing {length}-byte feature report..."))?;
                device.send_feature_report(&buf)?;
                length
            }
        };

        self.console.msg(format_args!("wrote {written} bytes:\n"))?;
        if !self.console.is_quiet() {
            self.console.data(format_args!(
                "{}",
                format_report(&buf, self.settings.base, self.settings.width)
            ))?;
        }
        Ok(())
    }

    fn read_input(&mut self, forever: bool) -> Result<()> {
        let Settings {
            length,
            timeout_ms,
            base,
            width,
        } = self.settings;
        let device = self.device.as_mut().ok_or(Error::NotOpen)?;
        if length == 0 {
            return Err(Error::ZeroLength);
        }

        let mut buf = vec![0u8; length];
        loop {
            self.console.msg(format_args!(
                "Reading up to {length}-byte input report, {timeout_ms} msec timeout..."
            ))?;
            let read = device.read_timeout(&mut buf, timeout_ms)?;
            self.console.msg(format_args!("read {read} bytes:\n"))?;
            if read > 0 {
                self.console
                    .data(format_args!("{}", format_report(&buf, base, width)))?;
                buf.fill(0);
            }
            if !forever {
                return Ok(());
            }
        }
    }

    fn read_feature(&mut self, report_id: u8) -> Result<()> {
        let length = self.settings.length;
        let device = self.device.as_mut().ok_or(Error::NotOpen)?;
        if length == 0 {
            return Err(Error::ZeroLength);
        }

        let mut buf = vec![0u8; length];
        buf[0] = report_id;
        self.console.msg(format_args!(
            "Reading {length}-byte feature report, report_id {report_id}..."
        ))?;
        let read = device.get_feature_report(&mut buf)?;
        self.console.msg(format_args!("read {read} bytes:\n"))?;
        self.console.data(format_args!(
            "{}",
            format_report(&buf, self.settings.base, self.settings.width)
        ))?;
        Ok(())
    }

    fn read_input_report(&mut self, report_id: u8) -> Result<()> {
        let length = self.settings.length;
        let device = self.device.as_mut().ok_or(Error::NotOpen)?;
        if length == 0 {
            return Err(Error::ZeroLength);
        }

        let mut buf = vec![0u8; length];
        buf[0] = report_id;
        self.console.msg(format_args!(
            "Reading {length}-byte input report using get_input_report, report_id {report_id}..."
        ))?;
        let read = device.get_input_report(&mut buf)?;
        self.console.msg(format_args!("read {read} bytes:\n"))?;
        self.console.data(format_args!(
            "{}",
            format_report(&buf, self.settings.base, self.settings.width)
        ))?;
        Ok(())
    }
}
