//! Sensor identity and sample types
//!
//! This module defines the device identities the driver recognises, the
//! protocol variant each identity maps to, and the raw sample produced by a
//! temperature read.

use crate::error::{ProtocolError, Result};
use std::fmt;

/// Vendor/product pair read from a device descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    /// USB Vendor ID
    pub vendor_id: u16,
    /// USB Product ID
    pub product_id: u16,
}

impl DeviceIdentity {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

/// Sensor firmware family
///
/// The discriminant is the index into [`SUPPORTED_DEVICES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceVariant {
    /// 1130:660c, control-read protocol
    Variant0,
    /// 0c45:7401, interrupt-read protocol
    Variant1,
}

/// Identities the driver talks to, indexed by variant
pub const SUPPORTED_DEVICES: [(DeviceIdentity, DeviceVariant); 2] = [
    (DeviceIdentity::new(0x1130, 0x660c), DeviceVariant::Variant0),
    (DeviceIdentity::new(0x0c45, 0x7401), DeviceVariant::Variant1),
];

impl DeviceVariant {
    /// Classify a device by its vendor/product identity
    ///
    /// No other descriptor field is inspected.
    pub fn classify(identity: DeviceIdentity) -> Result<Self> {
        SUPPORTED_DEVICES
            .iter()
            .find(|(known, _)| *known == identity)
            .map(|(_, variant)| *variant)
            .ok_or(ProtocolError::Unsupported {
                vendor_id: identity.vendor_id,
                product_id: identity.product_id,
            })
    }

    /// Identity this variant is matched against
    pub fn identity(self) -> DeviceIdentity {
        SUPPORTED_DEVICES[self.index()].0
    }

    /// Position in the supported device table
    pub fn index(self) -> usize {
        match self {
            DeviceVariant::Variant0 => 0,
            DeviceVariant::Variant1 => 1,
        }
    }
}

impl fmt::Display for DeviceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "variant{}", self.index())
    }
}

/// Unconverted 16-bit temperature code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawSample(pub u16);
