// SPDX-License-Identifier: Apache-2.0
//
// Command line argument parsing for hidtester

use std::collections::BTreeMap;
use std::ffi::OsString;

use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};

use crate::parse::{
    parse_base, parse_byte, parse_data_list, parse_length, parse_timeout, parse_usage,
    parse_vid_pid, parse_width, DataList, VidPid,
};
use crate::render::{Base, ListStyle};

const AFTER_HELP: &str = "\
Notes:
  Commands are executed in the order given.
  --vidpid, --usagePage, --usage and --serial filter --open and the --list commands.
  --length, --timeout, --base, --width, --quiet and --verbose apply to the commands after them.

Examples:
  List all devices
    hidtester --list
  List details of all devices with vendorId 0x2341
    hidtester --vidpid 2341 --list-detail
  Open vid/pid xxxx:yyyy and print its report descriptor
    hidtester --vidpid xxxx:yyyy --open --get-report-descriptor
  Open the device with usagePage 0xFFAB, send Feature report on reportId 1
    hidtester -l 9 --usagePage 0xFFAB --open --send-feature 1,99,44,22
  Send a 64-byte Output report, then read a 64-byte Input report
    hidtester --vidpid xxxx:yyyy -l 64 --open --send-output 1,2,3 --read-input
  Read Input reports continuously with a 1500 msec timeout
    hidtester --vidpid xxxx:yyyy -l 64 -t 1500 --open --read-input-forever
  Send fade-to-RGB #FF00FF to a blink(1)
    hidtester --vidpid 27b8:01ed -l 9 --open --send-feature 1,99,255,0,255";

// Every option is collected with its argv position so the run can replay
// them in command-line order.

/// hidtester: send and receive HID reports from the command line
#[derive(Parser, Debug)]
#[command(name = "hidtester", version)]
#[command(about = "Open HID devices and send/receive Feature, Output and Input reports")]
#[command(arg_required_else_help = true, after_help = AFTER_HELP)]
pub struct Cli {
    /// Filter by vendorId/productId (hex, '/', ':' or ',' delimited)
    #[arg(long, value_name = "VID/PID", value_parser = parse_vid_pid, action = ArgAction::Append)]
    vidpid: Vec<VidPid>,

    /// Filter by usagePage
    #[arg(long = "usagePage", value_name = "NUMBER", value_parser = parse_usage, action = ArgAction::Append)]
    usage_page: Vec<u16>,

    /// Filter by usage
    #[arg(long, value_name = "NUMBER", value_parser = parse_usage, action = ArgAction::Append)]
    usage: Vec<u16>,

    /// Filter by serial number
    #[arg(long, value_name = "STRING", action = ArgAction::Append)]
    serial: Vec<String>,

    /// List HID devices (by filters)
    #[arg(long, num_args = 0, default_missing_value = "true", action = ArgAction::Append)]
    list: Vec<bool>,

    /// List HID devices with usages (by filters)
    #[arg(long, num_args = 0, default_missing_value = "true", action = ArgAction::Append)]
    list_usages: Vec<bool>,

    /// List HID devices with details (by filters)
    #[arg(long, num_args = 0, default_missing_value = "true", action = ArgAction::Append)]
    list_detail: Vec<bool>,

    /// Open device with previously selected filters
    #[arg(long, num_args = 0, default_missing_value = "true", action = ArgAction::Append)]
    open: Vec<bool>,

    /// Open device by path (as shown by --list-detail)
    #[arg(long, value_name = "PATH", action = ArgAction::Append)]
    open_path: Vec<String>,

    /// Close currently open device
    #[arg(long, num_args = 0, default_missing_value = "true", action = ArgAction::Append)]
    close: Vec<bool>,

    /// Get the report descriptor
    #[arg(long, num_args = 0, default_missing_value = "true", action = ArgAction::Append)]
    get_report_descriptor: Vec<bool>,

    /// Send Feature report (1st byte is reportId, if used)
    #[arg(long, value_name = "DATALIST", value_parser = parse_data_list, action = ArgAction::Append)]
    send_feature: Vec<DataList>,

    /// Send Output report to device
    #[arg(long, visible_alias = "send-out", value_name = "DATALIST", value_parser = parse_data_list, action = ArgAction::Append)]
    send_output: Vec<DataList>,

    /// Read Feature report (with reportId, 0 if unused)
    #[arg(long, value_name = "REPORT_ID", value_parser = parse_byte, action = ArgAction::Append)]
    read_feature: Vec<u8>,

    /// Read Input reports
    #[arg(long, visible_alias = "read-in", num_args = 0, default_missing_value = "true", action = ArgAction::Append)]
    read_input: Vec<bool>,

    /// Read Input reports in a loop forever
    #[arg(long, num_args = 0, default_missing_value = "true", action = ArgAction::Append)]
    read_input_forever: Vec<bool>,

    /// Read Input report from specific reportId
    #[arg(long, value_name = "REPORT_ID", value_parser = parse_byte, action = ArgAction::Append)]
    read_input_report: Vec<u8>,

    /// Set buffer length in bytes of report to send/read
    #[arg(short = 'l', long, visible_alias = "buflen", value_name = "LEN", value_parser = parse_length, action = ArgAction::Append)]
    length: Vec<usize>,

    /// Timeout in millisecs to wait for input reads (-1 blocks)
    #[arg(short = 't', long, value_name = "MSECS", allow_negative_numbers = true, value_parser = parse_timeout, action = ArgAction::Append)]
    timeout: Vec<i32>,

    /// Set decimal (10) or hex (16) buffer print mode
    #[arg(short = 'b', long, value_name = "BASE", value_parser = parse_base, action = ArgAction::Append)]
    base: Vec<Base>,

    /// Bytes per line when printing buffers
    #[arg(short = 'w', long, value_name = "BYTES", value_parser = parse_width, action = ArgAction::Append)]
    width: Vec<usize>,

    /// Print out nothing except when reading data
    #[arg(short = 'q', long, num_args = 0, default_missing_value = "true", action = ArgAction::Append)]
    quiet: Vec<bool>,

    /// Print out extra information
    #[arg(short = 'v', long, num_args = 0, default_missing_value = "true", action = ArgAction::Append)]
    verbose: Vec<bool>,
}

/// One step of a run, in command-line order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    VidPid(VidPid),
    UsagePage(u16),
    Usage(u16),
    Serial(String),
    List(ListStyle),
    Open,
    OpenPath(String),
    Close,
    GetReportDescriptor,
    SendFeature(Vec<u8>),
    SendOutput(Vec<u8>),
    ReadFeature(u8),
    ReadInput,
    ReadInputForever,
    ReadInputReport(u8),
    Length(usize),
    Timeout(i32),
    Base(Base),
    Width(usize),
    Quiet,
    Verbose,
}

/// Reassembles per-option value lists into one sequence keyed by argv position
struct Script<'m> {
    matches: &'m ArgMatches,
    steps: BTreeMap<usize, Command>,
}

impl<'m> Script<'m> {
    fn new(matches: &'m ArgMatches) -> Self {
        Self {
            matches,
            steps: BTreeMap::new(),
        }
    }

    fn push<T>(&mut self, id: &str, values: Vec<T>, make: impl Fn(T) -> Command) {
        let Some(indices) = self.matches.indices_of(id) else {
            return;
        };
        for (index, value) in indices.zip(values) {
            self.steps.insert(index, make(value));
        }
    }

    fn finish(self) -> Vec<Command> {
        self.steps.into_values().collect()
    }
}

impl Cli {
    fn into_commands(self, matches: &ArgMatches) -> Vec<Command> {
        let mut script = Script::new(matches);
        script.push("vidpid", self.vidpid, Command::VidPid);
        script.push("usage_page", self.usage_page, Command::UsagePage);
        script.push("usage", self.usage, Command::Usage);
        script.push("serial", self.serial, Command::Serial);
        script.push("list", self.list, |_| Command::List(ListStyle::Brief));
        script.push("list_usages", self.list_usages, |_| Command::List(ListStyle::Usages));
        script.push("list_detail", self.list_detail, |_| Command::List(ListStyle::Detail));
        script.push("open", self.open, |_| Command::Open);
        script.push("open_path", self.open_path, Command::OpenPath);
        script.push("close", self.close, |_| Command::Close);
        script.push("get_report_descriptor", self.get_report_descriptor, |_| {
            Command::GetReportDescriptor
        });
        script.push("send_feature", self.send_feature, Command::SendFeature);
        script.push("send_output", self.send_output, Command::SendOutput);
        script.push("read_feature", self.read_feature, Command::ReadFeature);
        script.push("read_input", self.read_input, |_| Command::ReadInput);
        script.push("read_input_forever", self.read_input_forever, |_| {
            Command::ReadInputForever
        });
        script.push("read_input_report", self.read_input_report, Command::ReadInputReport);
        script.push("length", self.length, Command::Length);
        script.push("timeout", self.timeout, Command::Timeout);
        script.push("base", self.base, Command::Base);
        script.push("width", self.width, Command::Width);
        script.push("quiet", self.quiet, |_| Command::Quiet);
        script.push("verbose", self.verbose, |_| Command::Verbose);
        script.finish()
    }
}

/// Parse `args` (program name first) into the ordered list of commands.
pub fn parse_from<I, T>(args: I) -> Result<Vec<Command>, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Cli::command().try_get_matches_from(args)?;
    let cli = Cli::from_arg_matches(&matches)?;
    Ok(cli.into_commands(&matches))
}
