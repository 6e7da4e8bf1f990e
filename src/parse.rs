// SPDX-License-Identifier: Apache-2.0
//
// Argument value parsers for hidtester

use crate::config::MAX_BUF;
use crate::render::Base;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid number '{0}'")]
    Invalid(String),
    #[error("{value} is out of range (expected {min}..={max})")]
    OutOfRange { value: i64, min: i64, max: i64 },
    #[error("expected VID/PID in hex, e.g. 27b8/01ed")]
    VidPid,
    #[error("no bytes in data list")]
    EmptyList,
    #[error("print base must be 10 or 16")]
    Base,
}

/// Vendor/product pair given to `--vidpid`. Zero means "any".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VidPid {
    pub vendor_id: u16,
    pub product_id: u16,
}

/// Parse an integer the way `strtol(s, NULL, 0)` reads it:
/// `0x` prefix is hex, a leading `0` is octal, anything else decimal.
pub fn parse_number(text: &str) -> Result<i64, ParseError> {
    let invalid = || ParseError::Invalid(text.to_string());
    let trimmed = text.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (radix, digits) = if let Some(hex) = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
    {
        (16, hex)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(invalid());
    }
    let value = i64::from_str_radix(digits, radix).map_err(|_| invalid())?;
    Ok(if negative { -value } else { value })
}

fn in_range<T: TryFrom<i64>>(value: i64, min: i64, max: i64) -> Result<T, ParseError> {
    if value < min || value > max {
        return Err(ParseError::OutOfRange { value, min, max });
    }
    T::try_from(value).map_err(|_| ParseError::OutOfRange { value, min, max })
}

pub fn parse_byte(text: &str) -> Result<u8, ParseError> {
    in_range(parse_number(text)?, 0, u8::MAX as i64)
}

pub fn parse_length(text: &str) -> Result<usize, ParseError> {
    in_range(parse_number(text)?, 0, MAX_BUF as i64)
}

pub fn parse_timeout(text: &str) -> Result<i32, ParseError> {
    in_range(parse_number(text)?, -1, i32::MAX as i64)
}

pub fn parse_width(text: &str) -> Result<usize, ParseError> {
    in_range(parse_number(text)?, 1, MAX_BUF as i64)
}

/// Usage pages and usages: C-style number first, bare hex (`FFAB`) when
/// that fails or reads as zero.
pub fn parse_usage(text: &str) -> Result<u16, ParseError> {
    match parse_number(text) {
        Ok(value) if value != 0 => in_range(value, 0, u16::MAX as i64),
        parsed => match u16::from_str_radix(text.trim(), 16) {
            Ok(value) => Ok(value),
            Err(_) => parsed.and_then(|value| in_range(value, 0, u16::MAX as i64)),
        },
    }
}

fn parse_hex_id(token: &str) -> Result<u16, ParseError> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ParseError::VidPid);
    }
    u16::from_str_radix(digits, 16).map_err(|_| ParseError::VidPid)
}

/// `27b8/01ed`, `27b8:01ed`, `0x27b8,0x01ed` or a lone vendor id.
pub fn parse_vid_pid(text: &str) -> Result<VidPid, ParseError> {
    let tokens: Vec<&str> = text
        .split(['/', ':', ',', ' '])
        .filter(|t| !t.is_empty())
        .collect();

    match tokens.as_slice() {
        [vendor] => Ok(VidPid {
            vendor_id: parse_hex_id(vendor)?,
            product_id: 0,
        }),
        [vendor, product] => Ok(VidPid {
            vendor_id: parse_hex_id(vendor)?,
            product_id: parse_hex_id(product)?,
        }),
        _ => Err(ParseError::VidPid),
    }
}

/// Bytes given to `--send-feature` / `--send-output`
pub type DataList = Vec<u8>;

/// Comma and/or space separated bytes, e.g. `1,99,0xff,0`.
pub fn parse_data_list(text: &str) -> Result<DataList, ParseError> {
    let bytes = text
        .split([',', ' '])
        .filter(|t| !t.is_empty())
        .map(parse_byte)
        .collect::<Result<Vec<u8>, _>>()?;
    if bytes.is_empty() {
        return Err(ParseError::EmptyList);
    }
    Ok(bytes)
}

pub fn parse_base(text: &str) -> Result<Base, ParseError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "10" | "dec" | "decimal" => Ok(Base::Decimal),
        "16" | "hex" => Ok(Base::Hex),
        _ => Err(ParseError::Base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_follow_strtol_prefixes() {
        assert_eq!(parse_number("42"), Ok(42));
        assert_eq!(parse_number("0x2A"), Ok(42));
        assert_eq!(parse_number("052"), Ok(42));
        assert_eq!(parse_number("0"), Ok(0));
        assert_eq!(parse_number("-1"), Ok(-1));
        assert!(parse_number("0x").is_err());
        assert!(parse_number("0x-5").is_err());
        assert!(parse_number("twelve").is_err());
    }

    #[test]
    fn byte_range_is_enforced() {
        assert_eq!(parse_byte("255"), Ok(255));
        assert_eq!(
            parse_byte("256"),
            Err(ParseError::OutOfRange { value: 256, min: 0, max: 255 })
        );
    }

    #[test]
    fn length_is_capped_at_max_buf() {
        assert_eq!(parse_length("1024"), Ok(1024));
        assert!(parse_length("1025").is_err());
        assert_eq!(parse_length("0"), Ok(0));
    }

    #[test]
    fn timeout_allows_blocking() {
        assert_eq!(parse_timeout("-1"), Ok(-1));
        assert!(parse_timeout("-2").is_err());
    }

    #[test]
    fn usage_accepts_bare_hex() {
        assert_eq!(parse_usage("0xFFAB"), Ok(0xFFAB));
        assert_eq!(parse_usage("FFAB"), Ok(0xFFAB));
        assert_eq!(parse_usage("12"), Ok(12));
        assert_eq!(parse_usage("0"), Ok(0));
        assert_eq!(parse_usage("0x0"), Ok(0));
        assert!(parse_usage("0x10000").is_err());
        assert!(parse_usage("zz").is_err());
    }

    #[test]
    fn vid_pid_separators() {
        let expected = VidPid { vendor_id: 0x27b8, product_id: 0x01ed };
        assert_eq!(parse_vid_pid("27b8/01ed"), Ok(expected));
        assert_eq!(parse_vid_pid("27B8:01ED"), Ok(expected));
        assert_eq!(parse_vid_pid("0x27b8,0x01ed"), Ok(expected));
        assert_eq!(parse_vid_pid("27b8 01ed"), Ok(expected));
        assert_eq!(
            parse_vid_pid("2341"),
            Ok(VidPid { vendor_id: 0x2341, product_id: 0 })
        );
        assert_eq!(parse_vid_pid("1/2/3"), Err(ParseError::VidPid));
        assert_eq!(parse_vid_pid("12345/1"), Err(ParseError::VidPid));
        assert_eq!(parse_vid_pid(""), Err(ParseError::VidPid));
    }

    #[test]
    fn data_list_mixes_bases() {
        assert_eq!(parse_data_list("1,99,0xff, 0"), Ok(vec![1, 99, 255, 0]));
        assert_eq!(parse_data_list("1 2"), Ok(vec![1, 2]));
        assert_eq!(parse_data_list(" , "), Err(ParseError::EmptyList));
        assert!(parse_data_list("1,300").is_err());
    }

    #[test]
    fn base_names() {
        assert_eq!(parse_base("16"), Ok(Base::Hex));
        assert_eq!(parse_base("hex"), Ok(Base::Hex));
        assert_eq!(parse_base("10"), Ok(Base::Decimal));
        assert_eq!(parse_base("8"), Err(ParseError::Base));
    }
}
