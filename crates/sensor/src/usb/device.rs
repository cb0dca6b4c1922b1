//! rusb-backed USB access
//!
//! This module implements the capability traits from `common` on top of
//! libusb via rusb, and maps rusb errors into the protocol's `UsbError`.

use common::{DiscoveredDevice, SensorBus, SensorIo};
use protocol::{ControlSetup, DeviceIdentity, UsbError};
use rusb::{Context, Device, DeviceHandle, LogLevel, UsbContext};
use std::time::Duration;
use tracing::{debug, warn};

/// USB bus backed by a libusb context
pub struct RusbBus {
    /// USB context for device operations
    context: Context,
}

impl RusbBus {
    /// Create a new libusb context
    ///
    /// With `verbose` set, libusb's own logging is raised to debug.
    pub fn new(verbose: bool) -> Result<Self, UsbError> {
        let mut context = Context::new().map_err(map_rusb_error)?;
        context.set_log_level(if verbose {
            LogLevel::Debug
        } else {
            LogLevel::None
        });

        Ok(Self { context })
    }
}

impl SensorBus for RusbBus {
    type Device = Device<Context>;
    type Handle = RusbHandle;

    fn enumerate(&self) -> Result<Vec<DiscoveredDevice<Device<Context>>>, UsbError> {
        let devices = self.context.devices().map_err(map_rusb_error)?;
        let mut found = Vec::with_capacity(devices.len());

        for device in devices.iter() {
            let descriptor = match device.device_descriptor() {
                Ok(d) => d,
                Err(e) => {
                    warn!(
                        "Failed to read device descriptor: bus={}, addr={}: {}",
                        device.bus_number(),
                        device.address(),
                        e
                    );
                    continue;
                }
            };

            found.push(DiscoveredDevice {
                identity: DeviceIdentity::new(descriptor.vendor_id(), descriptor.product_id()),
                serial_index: descriptor.serial_number_string_index().unwrap_or(0),
                bus_number: device.bus_number(),
                address: device.address(),
                device,
            });
        }

        debug!("Enumerated {} devices", found.len());
        Ok(found)
    }

    fn open(&self, device: &Device<Context>) -> Result<RusbHandle, UsbError> {
        let handle = device.open().map_err(map_rusb_error)?;
        debug!(
            "Opened device bus={}, addr={}",
            device.bus_number(),
            device.address()
        );
        Ok(RusbHandle { handle })
    }
}

/// Open rusb device handle
///
/// Dropping the handle closes the device.
pub struct RusbHandle {
    handle: DeviceHandle<Context>,
}

impl SensorIo for RusbHandle {
    fn detach_kernel_driver(&mut self, interface: u8) -> Result<(), UsbError> {
        self.handle
            .detach_kernel_driver(interface)
            .map_err(map_rusb_error)
    }

    fn set_configuration(&mut self, configuration: u8) -> Result<(), UsbError> {
        self.handle
            .set_active_configuration(configuration)
            .map_err(map_rusb_error)
    }

    fn claim_interface(&mut self, interface: u8) -> Result<(), UsbError> {
        self.handle
            .claim_interface(interface)
            .map_err(map_rusb_error)
    }

    fn release_interface(&mut self, interface: u8) -> Result<(), UsbError> {
        self.handle
            .release_interface(interface)
            .map_err(map_rusb_error)
    }

    fn write_control(
        &mut self,
        setup: ControlSetup,
        data: &[u8],
        timeout: Duration,
    ) -> Result<usize, UsbError> {
        self.handle
            .write_control(
                setup.request_type,
                setup.request,
                setup.value,
                setup.index,
                data,
                timeout,
            )
            .map_err(map_rusb_error)
    }

    fn read_control(
        &mut self,
        setup: ControlSetup,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, UsbError> {
        self.handle
            .read_control(
                setup.request_type,
                setup.request,
                setup.value,
                setup.index,
                buf,
                timeout,
            )
            .map_err(map_rusb_error)
    }

    fn read_interrupt(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, UsbError> {
        self.handle
            .read_interrupt(endpoint, buf, timeout)
            .map_err(map_rusb_error)
    }
}

/// Map rusb::Error to protocol::UsbError
///
/// libusb reports "no kernel driver attached" as `NotFound`, which the
/// session manager treats as success when detaching.
pub fn map_rusb_error(err: rusb::Error) -> UsbError {
    match err {
        rusb::Error::Timeout => UsbError::Timeout,
        rusb::Error::Pipe => UsbError::Pipe,
        rusb::Error::NoDevice => UsbError::NoDevice,
        rusb::Error::NotFound => UsbError::NotFound,
        rusb::Error::Busy => UsbError::Busy,
        rusb::Error::Overflow => UsbError::Overflow,
        rusb::Error::Io => UsbError::Io,
        rusb::Error::InvalidParam => UsbError::InvalidParam,
        rusb::Error::Access => UsbError::Access,
        rusb::Error::NotSupported => UsbError::NotSupported,
        _ => UsbError::Other {
            message: err.to_string(),
        },
    }
}
