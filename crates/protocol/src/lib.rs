//! Protocol library for temper
//!
//! This crate defines the wire protocol spoken by the two supported USB
//! temperature sensor families: the identity table used to classify a
//! device, the fixed command set, the control transfer setups, and the
//! decoding of a raw temperature code from a device response.
//!
//! Nothing here touches a USB stack; transfers are executed by the `sensor`
//! crate through the capability traits in `common`.
//!
//! # Example
//!
//! ```
//! use protocol::{DeviceIdentity, DeviceVariant, RawSample, decode_variant1};
//!
//! let variant = DeviceVariant::classify(DeviceIdentity::new(0x0c45, 0x7401)).unwrap();
//! assert_eq!(variant, DeviceVariant::Variant1);
//!
//! let report = [0x80, 0x02, 0x00, 0xc8, 0x00, 0x00, 0x00, 0x00];
//! assert_eq!(decode_variant1(&report).unwrap(), RawSample(200));
//! ```

pub mod commands;
pub mod decode;
pub mod error;
pub mod types;

pub use commands::{
    CMD0, CMD1, CMD2, CMD3, CMD4, COMMAND_SETUP, CONFIGURATION, CONTROL_INTERFACE, Command,
    ControlSetup, DATA_BLOCK_LEN, DATA_INTERFACE, DEFAULT_TIMEOUT, GET_DATA_SETUP, INI_PAYLOAD,
    INI_SETUP, INI1, INI2, INTERFACES, INTERRUPT_ENDPOINT, REPORT_LEN, TEMPERATURE,
    VARIANT0_POLL_COUNT,
};
pub use decode::{decode_variant0, decode_variant1, hex_dump};
pub use error::{ProtocolError, Result, UsbError};
pub use types::{DeviceIdentity, DeviceVariant, RawSample, SUPPORTED_DEVICES};
