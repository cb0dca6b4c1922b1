//! Test utilities for temper
//!
//! Provides a scripted USB bus for exercising the session manager and the
//! protocol engine without hardware.
//!
//! # Example
//!
//! ```
//! use common::test_utils::{MockBus, MockEvent, MockSensor};
//! use common::{SensorBus, SensorIo};
//!
//! let sensor = MockSensor::variant1(4).with_interrupt_read(vec![0, 0, 0x00, 0xc8, 0, 0, 0, 0]);
//! let bus = MockBus::new(vec![sensor.clone()]);
//!
//! let found = bus.enumerate().unwrap();
//! assert_eq!(found[0].serial_index, 4);
//!
//! let mut handle = bus.open(&found[0].device).unwrap();
//! handle.claim_interface(0).unwrap();
//! assert_eq!(sensor.events(), vec![MockEvent::ClaimInterface(0)]);
//! ```

use crate::usb_types::{DiscoveredDevice, SensorBus, SensorIo};
use protocol::{ControlSetup, DeviceIdentity, DeviceVariant, UsbError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Default test timeout (5 seconds)
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A call observed by a mock handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    DetachKernelDriver(u8),
    SetConfiguration(u8),
    ClaimInterface(u8),
    ReleaseInterface(u8),
    ControlWrite { setup: ControlSetup, data: Vec<u8> },
    ControlRead { setup: ControlSetup, length: usize },
    InterruptRead { endpoint: u8, length: usize },
    Closed,
}

#[derive(Debug, Default)]
struct MockState {
    events: Vec<MockEvent>,
    open_count: usize,
    open_error: Option<UsbError>,
    detach_errors: HashMap<u8, UsbError>,
    configuration_error: Option<UsbError>,
    claim_errors: HashMap<u8, UsbError>,
    control_write_error: Option<UsbError>,
    control_reads: VecDeque<Result<Vec<u8>, UsbError>>,
    interrupt_reads: VecDeque<Result<Vec<u8>, UsbError>>,
}

/// Scripted sensor
///
/// Clones share state, so a test keeps one clone to inspect the event log
/// after handing another to a [`MockBus`]. Reads are served from FIFO
/// queues; an exhausted queue answers with `UsbError::Timeout`, like a
/// device that never responds.
#[derive(Debug, Clone)]
pub struct MockSensor {
    identity: DeviceIdentity,
    serial_index: u8,
    state: Arc<Mutex<MockState>>,
}

impl MockSensor {
    pub fn new(vendor_id: u16, product_id: u16, serial_index: u8) -> Self {
        Self {
            identity: DeviceIdentity::new(vendor_id, product_id),
            serial_index,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Sensor answering with the variant 0 identity
    pub fn variant0(serial_index: u8) -> Self {
        let identity = DeviceVariant::Variant0.identity();
        Self::new(identity.vendor_id, identity.product_id, serial_index)
    }

    /// Sensor answering with the variant 1 identity
    pub fn variant1(serial_index: u8) -> Self {
        let identity = DeviceVariant::Variant1.identity();
        Self::new(identity.vendor_id, identity.product_id, serial_index)
    }

    pub fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    /// Queue a control read response
    pub fn with_control_read(self, data: Vec<u8>) -> Self {
        self.lock().control_reads.push_back(Ok(data));
        self
    }

    /// Queue a failing control read
    pub fn with_control_read_error(self, error: UsbError) -> Self {
        self.lock().control_reads.push_back(Err(error));
        self
    }

    /// Queue an interrupt read response
    pub fn with_interrupt_read(self, data: Vec<u8>) -> Self {
        self.lock().interrupt_reads.push_back(Ok(data));
        self
    }

    /// Queue a failing interrupt read
    pub fn with_interrupt_read_error(self, error: UsbError) -> Self {
        self.lock().interrupt_reads.push_back(Err(error));
        self
    }

    /// Make every open attempt fail
    pub fn with_open_error(self, error: UsbError) -> Self {
        self.lock().open_error = Some(error);
        self
    }

    /// Make kernel driver detach on `interface` fail
    pub fn with_detach_error(self, interface: u8, error: UsbError) -> Self {
        self.lock().detach_errors.insert(interface, error);
        self
    }

    /// Make set_configuration fail
    pub fn with_configuration_error(self, error: UsbError) -> Self {
        self.lock().configuration_error = Some(error);
        self
    }

    /// Make claiming `interface` fail
    pub fn with_claim_error(self, interface: u8, error: UsbError) -> Self {
        self.lock().claim_errors.insert(interface, error);
        self
    }

    /// Make every control write fail
    pub fn with_control_write_error(self, error: UsbError) -> Self {
        self.lock().control_write_error = Some(error);
        self
    }

    /// Every call made through handles opened on this sensor
    pub fn events(&self) -> Vec<MockEvent> {
        self.lock().events.clone()
    }

    /// Payloads of every control write, in order
    pub fn written_commands(&self) -> Vec<Vec<u8>> {
        self.lock()
            .events
            .iter()
            .filter_map(|event| match event {
                MockEvent::ControlWrite { data, .. } => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of successful opens
    pub fn open_count(&self) -> usize {
        self.lock().open_count
    }

    /// Whether the last opened handle has been dropped
    pub fn is_closed(&self) -> bool {
        self.lock().events.last() == Some(&MockEvent::Closed)
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Bus that enumerates a fixed list of mock sensors
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    sensors: Vec<MockSensor>,
}

impl MockBus {
    pub fn new(sensors: Vec<MockSensor>) -> Self {
        Self { sensors }
    }
}

impl SensorBus for MockBus {
    type Device = MockSensor;
    type Handle = MockHandle;

    fn enumerate(&self) -> Result<Vec<DiscoveredDevice<MockSensor>>, UsbError> {
        Ok(self
            .sensors
            .iter()
            .enumerate()
            .map(|(i, sensor)| DiscoveredDevice {
                identity: sensor.identity,
                serial_index: sensor.serial_index,
                bus_number: 1,
                address: (i + 1) as u8,
                device: sensor.clone(),
            })
            .collect())
    }

    fn open(&self, device: &MockSensor) -> Result<MockHandle, UsbError> {
        let mut state = device.lock();
        if let Some(error) = state.open_error.clone() {
            return Err(error);
        }
        state.open_count += 1;
        drop(state);

        Ok(MockHandle {
            sensor: device.clone(),
        })
    }
}

/// Open handle on a [`MockSensor`]
#[derive(Debug)]
pub struct MockHandle {
    sensor: MockSensor,
}

impl SensorIo for MockHandle {
    fn detach_kernel_driver(&mut self, interface: u8) -> Result<(), UsbError> {
        let mut state = self.sensor.lock();
        state.events.push(MockEvent::DetachKernelDriver(interface));
        match state.detach_errors.get(&interface) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn set_configuration(&mut self, configuration: u8) -> Result<(), UsbError> {
        let mut state = self.sensor.lock();
        state.events.push(MockEvent::SetConfiguration(configuration));
        match state.configuration_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn claim_interface(&mut self, interface: u8) -> Result<(), UsbError> {
        let mut state = self.sensor.lock();
        state.events.push(MockEvent::ClaimInterface(interface));
        match state.claim_errors.get(&interface) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn release_interface(&mut self, interface: u8) -> Result<(), UsbError> {
        self.sensor
            .lock()
            .events
            .push(MockEvent::ReleaseInterface(interface));
        Ok(())
    }

    fn write_control(
        &mut self,
        setup: ControlSetup,
        data: &[u8],
        _timeout: Duration,
    ) -> Result<usize, UsbError> {
        let mut state = self.sensor.lock();
        state.events.push(MockEvent::ControlWrite {
            setup,
            data: data.to_vec(),
        });
        match state.control_write_error.clone() {
            Some(error) => Err(error),
            None => Ok(data.len()),
        }
    }

    fn read_control(
        &mut self,
        setup: ControlSetup,
        buf: &mut [u8],
        _timeout: Duration,
    ) -> Result<usize, UsbError> {
        let mut state = self.sensor.lock();
        state.events.push(MockEvent::ControlRead {
            setup,
            length: buf.len(),
        });
        let response = state
            .control_reads
            .pop_front()
            .unwrap_or(Err(UsbError::Timeout))?;
        Ok(copy_response(&response, buf))
    }

    fn read_interrupt(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        _timeout: Duration,
    ) -> Result<usize, UsbError> {
        let mut state = self.sensor.lock();
        state.events.push(MockEvent::InterruptRead {
            endpoint,
            length: buf.len(),
        });
        let response = state
            .interrupt_reads
            .pop_front()
            .unwrap_or(Err(UsbError::Timeout))?;
        Ok(copy_response(&response, buf))
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.sensor.lock().events.push(MockEvent::Closed);
    }
}

fn copy_response(response: &[u8], buf: &mut [u8]) -> usize {
    let len = response.len().min(buf.len());
    buf[..len].copy_from_slice(&response[..len]);
    len
}
