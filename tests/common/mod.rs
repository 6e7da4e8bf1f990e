#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use hidapi::{HidError, HidResult};
use hidtester::hid::{DeviceInfo, HidBackend, HidHandle};
use hidtester::{Command, Session};

/// Scripted devices plus a log of every library call made against them
#[derive(Default)]
pub struct Bus {
    pub devices: Vec<DeviceInfo>,
    pub calls: Vec<String>,
    pub written: Vec<Vec<u8>>,
    /// Replies to `read_timeout`, an empty entry is a timeout. Running dry
    /// fails the read like an unplugged device.
    pub inputs: VecDeque<Vec<u8>>,
    pub feature_reply: Vec<u8>,
    pub input_reply: Vec<u8>,
    pub descriptor: Vec<u8>,
}

pub type Shared = Rc<RefCell<Bus>>;

pub fn bus(devices: Vec<DeviceInfo>) -> Shared {
    Rc::new(RefCell::new(Bus {
        devices,
        ..Bus::default()
    }))
}

pub fn device(path: &str, vendor_id: u16, product_id: u16, usage_page: u16, usage: u16) -> DeviceInfo {
    DeviceInfo {
        path: path.to_string(),
        vendor_id,
        product_id,
        usage_page,
        usage,
        serial_number: Some(format!("SN-{path}")),
        manufacturer: Some("Acme".to_string()),
        product: Some(format!("Widget {path}")),
        interface_number: 0,
        release_number: 0x0100,
    }
}

fn hid_error(message: &str) -> HidError {
    HidError::HidApiError {
        message: message.to_string(),
    }
}

pub struct MockBackend(pub Shared);

pub struct MockDevice {
    path: String,
    bus: Shared,
}

impl HidBackend for MockBackend {
    type Device = MockDevice;

    fn enumerate(&mut self, vendor_id: u16, product_id: u16) -> HidResult<Vec<DeviceInfo>> {
        let mut bus = self.0.borrow_mut();
        bus.calls.push(format!("enumerate {vendor_id:04x}:{product_id:04x}"));
        Ok(bus
            .devices
            .iter()
            .filter(|d| vendor_id == 0 || d.vendor_id == vendor_id)
            .filter(|d| product_id == 0 || d.product_id == product_id)
            .cloned()
            .collect())
    }

    fn open(
        &mut self,
        vendor_id: u16,
        product_id: u16,
        serial: Option<&str>,
    ) -> HidResult<MockDevice> {
        let mut bus = self.0.borrow_mut();
        bus.calls.push(format!("open {vendor_id:04x}:{product_id:04x}"));
        let path = bus
            .devices
            .iter()
            .find(|d| {
                d.vendor_id == vendor_id
                    && d.product_id == product_id
                    && serial.map_or(true, |s| d.serial_number.as_deref() == Some(s))
            })
            .map(|d| d.path.clone())
            .ok_or_else(|| hid_error("unable to open device"))?;
        Ok(MockDevice {
            path,
            bus: self.0.clone(),
        })
    }

    fn open_path(&mut self, path: &str) -> HidResult<MockDevice> {
        let mut bus = self.0.borrow_mut();
        bus.calls.push(format!("open_path {path}"));
        if !bus.devices.iter().any(|d| d.path == path) {
            return Err(hid_error("unable to open device"));
        }
        Ok(MockDevice {
            path: path.to_string(),
            bus: self.0.clone(),
        })
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.bus.borrow_mut().calls.push(format!("close {}", self.path));
    }
}

fn fill(buf: &mut [u8], reply: &[u8]) -> usize {
    let len = reply.len().min(buf.len());
    buf[..len].copy_from_slice(&reply[..len]);
    len
}

impl HidHandle for MockDevice {
    fn write(&mut self, data: &[u8]) -> HidResult<usize> {
        let mut bus = self.bus.borrow_mut();
        bus.calls.push(format!("write {}", data.len()));
        bus.written.push(data.to_vec());
        Ok(data.len())
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> HidResult<usize> {
        let mut bus = self.bus.borrow_mut();
        bus.calls.push(format!("read {} {timeout_ms}", buf.len()));
        let reply = bus
            .inputs
            .pop_front()
            .ok_or_else(|| hid_error("device disconnected"))?;
        Ok(fill(buf, &reply))
    }

    fn send_feature_report(&mut self, data: &[u8]) -> HidResult<()> {
        let mut bus = self.bus.borrow_mut();
        bus.calls.push(format!("send_feature {}", data.len()));
        bus.written.push(data.to_vec());
        Ok(())
    }

    fn get_feature_report(&mut self, buf: &mut [u8]) -> HidResult<usize> {
        let mut bus = self.bus.borrow_mut();
        bus.calls.push(format!("get_feature {} {}", buf[0], buf.len()));
        let reply = bus.feature_reply.clone();
        Ok(fill(buf, &reply))
    }

    fn get_input_report(&mut self, buf: &mut [u8]) -> HidResult<usize> {
        let mut bus = self.bus.borrow_mut();
        bus.calls.push(format!("get_input {} {}", buf[0], buf.len()));
        let reply = bus.input_reply.clone();
        Ok(fill(buf, &reply))
    }

    fn get_report_descriptor(&mut self, buf: &mut [u8]) -> HidResult<usize> {
        let bus = self.bus.borrow();
        Ok(fill(buf, &bus.descriptor))
    }
}

/// Run `commands` to completion and return everything printed.
pub fn run(bus: &Shared, commands: Vec<Command>) -> String {
    let mut session = Session::new(MockBackend(bus.clone()), Vec::new());
    session.run(commands).expect("console writes to a Vec never fail");
    String::from_utf8(session.into_output()).expect("utf-8 output")
}
