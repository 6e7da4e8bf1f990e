// SPDX-License-Identifier: Apache-2.0
//
// Report buffer and device listing formatting for hidtester

use std::fmt::Write;

use crate::hid::DeviceInfo;

/// Print mode for report bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    Decimal,
    Hex,
}

impl Base {
    pub fn radix(self) -> u32 {
        match self {
            Base::Decimal => 10,
            Base::Hex => 16,
        }
    }
}

/// Listing flavour selected by `--list`, `--list-usages` or `--list-detail`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    Brief,
    Usages,
    Detail,
}

/// Render `buf` as ` 0A 1B ...` (or ` 10  27 ...`), breaking the line after
/// every `width` bytes except the last, always ending with a newline.
pub fn format_report(buf: &[u8], base: Base, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::with_capacity(buf.len() * 4 + 1);
    for (i, byte) in buf.iter().enumerate() {
        let _ = match base {
            Base::Decimal => write!(out, " {byte:3}"),
            Base::Hex => write!(out, " {byte:02X}"),
        };
        if i % width == width - 1 && i + 1 < buf.len() {
            out.push('\n');
        }
    }
    out.push('\n');
    out
}

pub fn format_device(info: &DeviceInfo, style: ListStyle) -> String {
    let manufacturer = info.manufacturer.as_deref().unwrap_or("");
    let product = info.product.as_deref().unwrap_or("");

    let mut out = match style {
        ListStyle::Usages => format!(
            "{:04X}/{:04X} / {:04X}/{:04X}  {} - {}\n",
            info.vendor_id, info.product_id, info.usage_page, info.usage, manufacturer, product
        ),
        ListStyle::Brief | ListStyle::Detail => format!(
            "{:04X}/{:04X}: {} - {}\n",
            info.vendor_id, info.product_id, manufacturer, product
        ),
    };

    if style == ListStyle::Detail {
        let _ = writeln!(out, "  vendorId:      0x{:04X}", info.vendor_id);
        let _ = writeln!(out, "  productId:     0x{:04X}", info.product_id);
        let _ = writeln!(out, "  usagePage:     0x{:04X}", info.usage_page);
        let _ = writeln!(out, "  usage:         0x{:04X}", info.usage);
        let _ = writeln!(
            out,
            "  serial_number: {}",
            info.serial_number.as_deref().unwrap_or("")
        );
        let _ = writeln!(out, "  interface:     {}", info.interface_number);
        let _ = writeln!(out, "  release:       0x{:04X}", info.release_number);
        let _ = writeln!(out, "  path: {}", info.path);
        out.push('\n');
    }
    out
}
