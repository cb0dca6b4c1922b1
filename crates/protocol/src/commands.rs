//! Sensor command set
//!
//! Both sensor families are HID-class devices driven through class requests
//! on the default control endpoint. Commands are opaque 8-byte payloads
//! sent with SET_REPORT; results come back either through a GET_REPORT style
//! control read (variant 0) or the interrupt IN endpoint (variant 1).

use std::time::Duration;

/// Control interface number
pub const CONTROL_INTERFACE: u8 = 0x00;
/// Data interface number
pub const DATA_INTERFACE: u8 = 0x01;
/// Interfaces claimed on every sensor, in claim order
pub const INTERFACES: [u8; 2] = [CONTROL_INTERFACE, DATA_INTERFACE];

/// Configuration value selected after open
pub const CONFIGURATION: u8 = 0x01;

/// Interrupt IN endpoint on the data interface
pub const INTERRUPT_ENDPOINT: u8 = 0x82;

/// Command and interrupt report length
pub const REPORT_LEN: usize = 8;
/// Buffer size for the "get data" control read
pub const DATA_BLOCK_LEN: usize = 256;

/// Per-transfer timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Number of all-zero polling commands in a variant 0 read
pub const VARIANT0_POLL_COUNT: usize = 7;

/// Control transfer setup packet fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlSetup {
    /// bmRequestType
    pub request_type: u8,
    /// bRequest
    pub request: u8,
    /// wValue
    pub value: u16,
    /// wIndex
    pub index: u16,
}

/// SET_REPORT carrying an 8-byte command to interface 1
pub const COMMAND_SETUP: ControlSetup = ControlSetup {
    request_type: 0x21,
    request: 0x09,
    value: 0x0200,
    index: 0x01,
};

/// SET_REPORT carrying the variant 1 "ini" message to interface 0
pub const INI_SETUP: ControlSetup = ControlSetup {
    request_type: 0x21,
    request: 0x09,
    value: 0x0201,
    index: 0x00,
};

/// Class IN request fetching the variant 0 data block
pub const GET_DATA_SETUP: ControlSetup = ControlSetup {
    request_type: 0xa1,
    request: 0x01,
    value: 0x0300,
    index: 0x01,
};

/// Payload of the variant 1 "ini" message
pub const INI_PAYLOAD: [u8; 2] = [0x01, 0x01];

/// Named 8-byte command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub name: &'static str,
    pub bytes: [u8; REPORT_LEN],
}

pub const CMD0: Command = Command {
    name: "cmd0",
    bytes: [0, 0, 0, 0, 0, 0, 0, 0],
};
pub const CMD1: Command = Command {
    name: "cmd1",
    bytes: [10, 11, 12, 13, 0, 0, 2, 0],
};
pub const CMD2: Command = Command {
    name: "cmd2",
    bytes: [10, 11, 12, 13, 0, 0, 1, 0],
};
pub const CMD3: Command = Command {
    name: "cmd3",
    bytes: [0x52, 0, 0, 0, 0, 0, 0, 0],
};
pub const CMD4: Command = Command {
    name: "cmd4",
    bytes: [0x54, 0, 0, 0, 0, 0, 0, 0],
};

/// Request a temperature report (variant 1)
pub const TEMPERATURE: Command = Command {
    name: "temperature",
    bytes: [0x01, 0x80, 0x33, 0x01, 0x00, 0x00, 0x00, 0x00],
};
pub const INI1: Command = Command {
    name: "ini1",
    bytes: [0x01, 0x82, 0x77, 0x01, 0x00, 0x00, 0x00, 0x00],
};
pub const INI2: Command = Command {
    name: "ini2",
    bytes: [0x01, 0x86, 0xff, 0x01, 0x00, 0x00, 0x00, 0x00],
};
