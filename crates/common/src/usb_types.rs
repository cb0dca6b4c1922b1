//! USB capability traits
//!
//! The driver only needs a handful of blocking operations from the host USB
//! stack. They are expressed as two traits so the session manager and the
//! protocol engine can run against real hardware (`rusb`) or a scripted bus
//! in tests.

use protocol::{ControlSetup, DeviceIdentity, UsbError};
use std::time::Duration;

/// A device seen during bus enumeration
#[derive(Debug, Clone)]
pub struct DiscoveredDevice<D> {
    /// Vendor/product pair from the device descriptor
    pub identity: DeviceIdentity,
    /// Serial-number string descriptor index (0 if none)
    pub serial_index: u8,
    /// Bus number
    pub bus_number: u8,
    /// Device address on the bus
    pub address: u8,
    /// Bus-specific device reference used to open it
    pub device: D,
}

/// Enumeration and open
pub trait SensorBus {
    /// Bus-specific device reference
    type Device;
    /// Open connection; dropping it closes the device
    type Handle: SensorIo;

    /// List every device on every bus, in bus order
    fn enumerate(&self) -> Result<Vec<DiscoveredDevice<Self::Device>>, UsbError>;

    /// Open a device for transfers
    fn open(&self, device: &Self::Device) -> Result<Self::Handle, UsbError>;
}

/// Operations on an open device
///
/// All calls block until the transfer completes or `timeout` elapses.
pub trait SensorIo {
    /// Detach the kernel driver bound to `interface`
    ///
    /// Returns `UsbError::NotFound` when no driver was attached.
    fn detach_kernel_driver(&mut self, interface: u8) -> Result<(), UsbError>;

    /// Select the active configuration
    fn set_configuration(&mut self, configuration: u8) -> Result<(), UsbError>;

    /// Claim an interface
    fn claim_interface(&mut self, interface: u8) -> Result<(), UsbError>;

    /// Release a claimed interface
    fn release_interface(&mut self, interface: u8) -> Result<(), UsbError>;

    /// Host-to-device control transfer, returns bytes written
    fn write_control(
        &mut self,
        setup: ControlSetup,
        data: &[u8],
        timeout: Duration,
    ) -> Result<usize, UsbError>;

    /// Device-to-host control transfer, returns bytes read into `buf`
    fn read_control(
        &mut self,
        setup: ControlSetup,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, UsbError>;

    /// Interrupt IN transfer, returns bytes read into `buf`
    fn read_interrupt(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, UsbError>;
}
