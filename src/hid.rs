// SPDX-License-Identifier: Apache-2.0
//
// HID device access for hidtester

use std::ffi::CString;

use hidapi::{HidApi, HidDevice, HidError, HidResult};

/// One enumerated HID interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub usage_page: u16,
    pub usage: u16,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub interface_number: i32,
    pub release_number: u16,
}

impl From<&hidapi::DeviceInfo> for DeviceInfo {
    fn from(info: &hidapi::DeviceInfo) -> Self {
        Self {
            path: info.path().to_string_lossy().into_owned(),
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            usage_page: info.usage_page(),
            usage: info.usage(),
            serial_number: info.serial_number().map(str::to_owned),
            manufacturer: info.manufacturer_string().map(str::to_owned),
            product: info.product_string().map(str::to_owned),
            interface_number: info.interface_number(),
            release_number: info.release_number(),
        }
    }
}

/// Device selection set by `--vidpid`, `--usagePage`, `--usage` and `--serial`.
/// Zero and `None` match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub vendor_id: u16,
    pub product_id: u16,
    pub usage_page: u16,
    pub usage: u16,
    pub serial: Option<String>,
}

impl Filter {
    pub fn matches(&self, info: &DeviceInfo) -> bool {
        (self.vendor_id == 0 || info.vendor_id == self.vendor_id)
            && (self.product_id == 0 || info.product_id == self.product_id)
            && (self.usage_page == 0 || info.usage_page == self.usage_page)
            && (self.usage == 0 || info.usage == self.usage)
            && self
                .serial
                .as_deref()
                .map_or(true, |serial| info.serial_number.as_deref() == Some(serial))
    }

    /// A plain vid/pid open is possible when both ids are known and no usage
    /// narrowing is requested.
    pub fn is_vid_pid_only(&self) -> bool {
        self.vendor_id != 0 && self.product_id != 0 && self.usage_page == 0 && self.usage == 0
    }
}

/// Enumeration and open calls of the HID library
pub trait HidBackend {
    type Device: HidHandle;

    /// List interfaces for `vendor_id`/`product_id`, zero meaning any.
    fn enumerate(&mut self, vendor_id: u16, product_id: u16) -> HidResult<Vec<DeviceInfo>>;

    fn open(
        &mut self,
        vendor_id: u16,
        product_id: u16,
        serial: Option<&str>,
    ) -> HidResult<Self::Device>;

    fn open_path(&mut self, path: &str) -> HidResult<Self::Device>;
}

/// Report transfers on an open device. Dropping the handle closes it.
pub trait HidHandle {
    fn write(&mut self, data: &[u8]) -> HidResult<usize>;

    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> HidResult<usize>;

    fn send_feature_report(&mut self, data: &[u8]) -> HidResult<()>;

    /// `buf[0]` carries the report id on entry.
    fn get_feature_report(&mut self, buf: &mut [u8]) -> HidResult<usize>;

    /// `buf[0]` carries the report id on entry.
    fn get_input_report(&mut self, buf: &mut [u8]) -> HidResult<usize>;

    fn get_report_descriptor(&mut self, buf: &mut [u8]) -> HidResult<usize>;
}

/// Backend over the system HIDAPI library
pub struct HidApiBackend {
    api: HidApi,
}

impl HidApiBackend {
    pub fn new() -> HidResult<Self> {
        Ok(Self {
            api: HidApi::new_without_enumerate()?,
        })
    }
}

impl HidBackend for HidApiBackend {
    type Device = HidDevice;

    fn enumerate(&mut self, vendor_id: u16, product_id: u16) -> HidResult<Vec<DeviceInfo>> {
        tracing::debug!(vendor_id, product_id, "hid enumerate");
        self.api.reset_devices()?;
        self.api.add_devices(vendor_id, product_id)?;
        Ok(self.api.device_list().map(DeviceInfo::from).collect())
    }

    fn open(
        &mut self,
        vendor_id: u16,
        product_id: u16,
        serial: Option<&str>,
    ) -> HidResult<HidDevice> {
        tracing::debug!(vendor_id, product_id, serial = ?serial, "hid open");
        match serial {
            Some(serial) => self.api.open_serial(vendor_id, product_id, serial),
            None => self.api.open(vendor_id, product_id),
        }
    }

    fn open_path(&mut self, path: &str) -> HidResult<HidDevice> {
        tracing::debug!(path, "hid open_path");
        let path = CString::new(path).map_err(|e| HidError::HidApiError {
            message: format!("invalid device path: {e}"),
        })?;
        self.api.open_path(&path)
    }
}

impl HidHandle for HidDevice {
    fn write(&mut self, data: &[u8]) -> HidResult<usize> {
        tracing::debug!(len = data.len(), "hid write");
        HidDevice::write(self, data)
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> HidResult<usize> {
        tracing::debug!(len = buf.len(), timeout_ms, "hid read_timeout");
        HidDevice::read_timeout(self, buf, timeout_ms)
    }

    fn send_feature_report(&mut self, data: &[u8]) -> HidResult<()> {
        tracing::debug!(len = data.len(), "hid send_feature_report");
        HidDevice::send_feature_report(self, data)
    }

    fn get_feature_report(&mut self, buf: &mut [u8]) -> HidResult<usize> {
        tracing::debug!(len = buf.len(), report_id = ?buf.first(), "hid get_feature_report");
        HidDevice::get_feature_report(self, buf)
    }

    fn get_input_report(&mut self, buf: &mut [u8]) -> HidResult<usize> {
        tracing::debug!(len = buf.len(), report_id = ?buf.first(), "hid get_input_report");
        HidDevice::get_input_report(self, buf)
    }

    fn get_report_descriptor(&mut self, buf: &mut [u8]) -> HidResult<usize> {
        tracing::debug!("hid get_report_descriptor");
        HidDevice::get_report_descriptor(self, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(vendor_id: u16, product_id: u16, usage_page: u16, usage: u16) -> DeviceInfo {
        DeviceInfo {
            path: format!("{vendor_id:04x}:{product_id:04x}:{usage_page:04x}"),
            vendor_id,
            product_id,
            usage_page,
            usage,
            serial_number: Some("A1".into()),
            manufacturer: None,
            product: None,
            interface_number: 0,
            release_number: 0,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::default().matches(&device(1, 2, 3, 4)));
    }

    #[test]
    fn each_field_narrows() {
        let info = device(0x2341, 0x8036, 0xffab, 0x0200);
        let mut filter = Filter { vendor_id: 0x2341, ..Filter::default() };
        assert!(filter.matches(&info));
        filter.usage_page = 0xffab;
        assert!(filter.matches(&info));
        filter.usage = 0x0201;
        assert!(!filter.matches(&info));
    }

    #[test]
    fn serial_must_match_exactly() {
        let info = device(1, 2, 3, 4);
        let mut filter = Filter { serial: Some("A1".into()), ..Filter::default() };
        assert!(filter.matches(&info));
        filter.serial = Some("A".into());
        assert!(!filter.matches(&info));

        let mut anonymous = info.clone();
        anonymous.serial_number = None;
        assert!(!filter.matches(&anonymous));
    }

    #[test]
    fn vid_pid_only_needs_both_ids_and_no_usage() {
        let mut filter = Filter { vendor_id: 1, product_id: 2, ..Filter::default() };
        assert!(filter.is_vid_pid_only());
        filter.usage = 1;
        assert!(!filter.is_vid_pid_only());
        assert!(!Filter { vendor_id: 1, ..Filter::default() }.is_vid_pid_only());
    }
}
