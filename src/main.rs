// SPDX-License-Identifier: Apache-2.0
//
// hidtester: open HID devices and send/receive Feature, Output and Input
// reports for interactive firmware testing
//
// Run: hidtester --vidpid 27b8:01ed -l 9 --open --send-feature 1,99,255,0,255

fn main() -> anyhow::Result<()> {
    // Parse command line arguments, keeping their order
    let commands = hidtester::args::parse_from(std::env::args_os()).unwrap_or_else(|e| e.exit());

    hidtester::init_logging(&commands);

    // Every command runs in sequence; device errors are reported, not fatal
    hidtester::run(commands)
}
