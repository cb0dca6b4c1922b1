//! Sensor session manager
//!
//! Enumerates the bus, opens every supported sensor (at most [`CAPACITY`]),
//! prepares its interfaces and hands back the ordered slots. Faults while
//! opening are recorded and logged; they never abort the batch.

use crate::usb::slots::{CAPACITY, DeviceSlots, OpenSensor, Slot, SessionFault};
use common::{DiscoveredDevice, SensorBus, SensorIo};
use protocol::{CONFIGURATION, DeviceIdentity, DeviceVariant, INTERFACES, UsbError};
use tracing::{debug, info, warn};

/// Result of [`SessionManager::open_all`]
pub struct OpenedSession<H> {
    /// Slots in enumeration order
    pub slots: DeviceSlots<H>,
    /// Supported sensors dropped because the slots were full
    pub overflow: usize,
}

/// A supported sensor found on the bus
#[derive(Debug, Clone)]
pub struct SensorListing {
    pub variant: DeviceVariant,
    pub identity: DeviceIdentity,
    pub bus_number: u8,
    pub address: u8,
    pub location: u8,
}

/// Session manager
///
/// Owns no state beyond the bus; every handle it opens is owned by the
/// returned slots until passed back to [`SessionManager::close`].
pub struct SessionManager<'a, B> {
    bus: &'a B,
}

impl<'a, B: SensorBus> SessionManager<'a, B> {
    pub fn new(bus: &'a B) -> Self {
        Self { bus }
    }

    /// Enumerate and classify without opening anything
    pub fn discover(&self) -> Result<Vec<SensorListing>, UsbError> {
        Ok(self
            .supported_devices()?
            .into_iter()
            .map(|(device, variant)| SensorListing {
                variant,
                identity: device.identity,
                bus_number: device.bus_number,
                address: device.address,
                location: device.serial_index,
            })
            .collect())
    }

    /// Open every supported sensor on the bus
    pub fn open_all(&self) -> Result<OpenedSession<B::Handle>, UsbError> {
        let mut slots = DeviceSlots::new();
        let mut overflow = 0;

        for (device, variant) in self.supported_devices()? {
            // Checked before opening so an overflowing sensor is never touched
            if slots.is_full() {
                overflow += 1;
                continue;
            }

            let slot = self.open_sensor(&device, variant);
            if let Err(e) = slots.try_push(slot) {
                warn!("{}", e);
                overflow += 1;
            }
        }

        if overflow > 0 {
            warn!(
                "Capacity exceeded: {} supported sensor(s) ignored, at most {} per session",
                overflow, CAPACITY
            );
        }

        info!(
            "Opened {} of {} sensor slot(s)",
            slots.open_count(),
            slots.len()
        );
        Ok(OpenedSession { slots, overflow })
    }

    /// Release both interfaces and close the handle
    pub fn close(&self, sensor: OpenSensor<B::Handle>) {
        let (bus_number, address) = (sensor.bus_number(), sensor.address());
        let mut handle = sensor.handle;
        for interface in INTERFACES {
            if let Err(e) = handle.release_interface(interface) {
                debug!("Failed to release interface {}: {}", interface, e);
            }
        }
        drop(handle);
        debug!("Closed sensor bus={}, addr={}", bus_number, address);
    }

    /// Supported devices in enumeration order
    fn supported_devices(
        &self,
    ) -> Result<Vec<(DiscoveredDevice<B::Device>, DeviceVariant)>, UsbError> {
        let devices = self.bus.enumerate()?;
        Ok(devices
            .into_iter()
            .filter_map(|device| match DeviceVariant::classify(device.identity) {
                Ok(variant) => {
                    debug!(
                        "Sensor {} ({}) found: bus={}, addr={}",
                        device.identity, variant, device.bus_number, device.address
                    );
                    Some((device, variant))
                }
                Err(_) => None,
            })
            .collect())
    }

    fn open_sensor(
        &self,
        device: &DiscoveredDevice<B::Device>,
        variant: DeviceVariant,
    ) -> Slot<B::Handle> {
        let location = device.serial_index;

        let mut handle = match self.bus.open(&device.device) {
            Ok(handle) => handle,
            Err(e) => {
                let fault = SessionFault::Open(e);
                warn!(
                    "Sensor {} at bus={}, addr={}: {}",
                    device.identity, device.bus_number, device.address, fault
                );
                return Slot::Empty { location, fault };
            }
        };

        let mut faults = Vec::new();

        for interface in INTERFACES {
            match handle.detach_kernel_driver(interface) {
                Ok(()) => debug!("Detached kernel driver from interface {}", interface),
                Err(UsbError::NotFound) => {
                    debug!("No kernel driver attached to interface {}", interface)
                }
                Err(error) => {
                    let fault = SessionFault::Detach { interface, error };
                    warn!("{}, continuing anyway", fault);
                    faults.push(fault);
                }
            }
        }

        if let Err(e) = handle.set_configuration(CONFIGURATION) {
            let fault = SessionFault::Configure(e);
            warn!("{}", fault);
            faults.push(fault);
        }

        for interface in INTERFACES {
            match handle.claim_interface(interface) {
                Ok(()) => debug!("Claimed interface {}", interface),
                Err(error) => {
                    let fault = SessionFault::Claim { interface, error };
                    warn!("{}", fault);
                    faults.push(fault);
                }
            }
        }

        Slot::Open(OpenSensor::new(
            handle,
            variant,
            device.identity,
            location,
            device.bus_number,
            device.address,
            faults,
        ))
    }
}
