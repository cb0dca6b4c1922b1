//! Bounded, ordered sensor slots
//!
//! Slots keep enumeration order from open to report, so the location tag of
//! slot `i` always labels the reading taken from slot `i`.

use crate::engine;
use crate::usb::transfers::CommandChannel;
use common::SensorIo;
use protocol::{DeviceIdentity, DeviceVariant, ProtocolError, UsbError};
use std::time::Duration;
use thiserror::Error;

/// Maximum number of sensors driven in one session
pub const CAPACITY: usize = 10;

/// Serial-number string descriptor index used to label output rows
pub type LocationTag = u8;

/// Non-fatal fault recorded while opening a sensor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionFault {
    #[error("could not open device: {0}")]
    Open(UsbError),

    #[error("could not detach kernel driver from interface {interface}: {error}")]
    Detach { interface: u8, error: UsbError },

    #[error("could not set configuration: {0}")]
    Configure(UsbError),

    #[error("could not claim interface {interface}: {error}")]
    Claim { interface: u8, error: UsbError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("capacity exceeded: at most {capacity} sensors per session")]
    CapacityExceeded { capacity: usize },
}

/// A classified, open sensor
///
/// Only the session manager constructs these, and only after the device has
/// been classified, so every transfer goes to a device of known variant.
pub struct OpenSensor<H> {
    pub(crate) handle: H,
    variant: DeviceVariant,
    identity: DeviceIdentity,
    location: LocationTag,
    bus_number: u8,
    address: u8,
    faults: Vec<SessionFault>,
}

impl<H: SensorIo> OpenSensor<H> {
    pub(crate) fn new(
        handle: H,
        variant: DeviceVariant,
        identity: DeviceIdentity,
        location: LocationTag,
        bus_number: u8,
        address: u8,
        faults: Vec<SessionFault>,
    ) -> Self {
        Self {
            handle,
            variant,
            identity,
            location,
            bus_number,
            address,
            faults,
        }
    }

    pub fn variant(&self) -> DeviceVariant {
        self.variant
    }

    pub fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    pub fn location(&self) -> LocationTag {
        self.location
    }

    pub fn bus_number(&self) -> u8 {
        self.bus_number
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Tolerated faults from detach, configuration and claim
    pub fn faults(&self) -> &[SessionFault] {
        &self.faults
    }

    /// Run the variant's open handshake
    pub fn initialize(&mut self, timeout: Duration) -> Result<(), ProtocolError> {
        let protocol = engine::protocol_for(self.variant);
        let mut channel = CommandChannel::new(&mut self.handle, timeout);
        protocol.initialize(&mut channel)
    }

    /// Read the current temperature in degrees Celsius
    pub fn read_temperature(&mut self, timeout: Duration) -> Result<f32, ProtocolError> {
        engine::get_temperature(&mut self.handle, self.variant, timeout)
    }
}

/// One position in the session
pub enum Slot<H> {
    /// Sensor opened; interfaces claimed where possible
    Open(OpenSensor<H>),
    /// Sensor seen but not opened
    Empty {
        location: LocationTag,
        fault: SessionFault,
    },
}

impl<H> Slot<H> {
    pub fn location(&self) -> LocationTag {
        match self {
            Slot::Open(sensor) => sensor.location,
            Slot::Empty { location, .. } => *location,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Slot::Open(_))
    }
}

/// Fixed-capacity ordered collection of slots
pub struct DeviceSlots<H> {
    slots: Vec<Slot<H>>,
}

impl<H> DeviceSlots<H> {
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(CAPACITY),
        }
    }

    /// Append a slot, rejecting it once [`CAPACITY`] is reached
    pub fn try_push(&mut self, slot: Slot<H>) -> Result<(), SlotError> {
        if self.is_full() {
            return Err(SlotError::CapacityExceeded { capacity: CAPACITY });
        }
        self.slots.push(slot);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= CAPACITY
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots holding an open sensor
    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_open()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot<H>> {
        self.slots.iter()
    }

    /// Open sensors in slot order
    pub fn open_sensors_mut(&mut self) -> impl Iterator<Item = &mut OpenSensor<H>> {
        self.slots.iter_mut().filter_map(|slot| match slot {
            Slot::Open(sensor) => Some(sensor),
            Slot::Empty { .. } => None,
        })
    }
}

impl<H> Default for DeviceSlots<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> IntoIterator for DeviceSlots<H> {
    type Item = Slot<H>;
    type IntoIter = std::vec::IntoIter<Slot<H>>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter()
    }
}
