//! Protocol engine
//!
//! Each sensor family has its own open handshake and read sequence. Both
//! are stateless between calls; all protocol state lives in the device.

mod variant0;
mod variant1;

pub use variant0::Variant0Protocol;
pub use variant1::Variant1Protocol;

use crate::report::to_reading;
use crate::usb::transfers::CommandChannel;
use common::SensorIo;
use protocol::{DeviceVariant, ProtocolError, RawSample};
use std::time::Duration;

/// Handshake and read behaviour of one sensor family
pub trait SensorProtocol: Sync {
    /// Variant this implementation drives
    fn variant(&self) -> DeviceVariant;

    /// Run the fixed command sequence issued once after open
    fn initialize(&self, channel: &mut CommandChannel<'_>) -> Result<(), ProtocolError>;

    /// Read one raw temperature code
    fn read_sample(&self, channel: &mut CommandChannel<'_>) -> Result<RawSample, ProtocolError>;
}

/// Protocol implementation for a classified variant
pub fn protocol_for(variant: DeviceVariant) -> &'static dyn SensorProtocol {
    match variant {
        DeviceVariant::Variant0 => &Variant0Protocol,
        DeviceVariant::Variant1 => &Variant1Protocol,
    }
}

/// Read the current temperature in degrees Celsius
pub fn get_temperature(
    io: &mut dyn SensorIo,
    variant: DeviceVariant,
    timeout: Duration,
) -> Result<f32, ProtocolError> {
    let mut channel = CommandChannel::new(io, timeout);
    let sample = protocol_for(variant).read_sample(&mut channel)?;
    Ok(to_reading(sample))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::SensorBus;
    use common::test_utils::{DEFAULT_TEST_TIMEOUT, MockBus, MockSensor};
    use protocol::UsbError;

    #[test]
    fn test_protocol_for_matches_variant() {
        for variant in [DeviceVariant::Variant0, DeviceVariant::Variant1] {
            assert_eq!(protocol_for(variant).variant(), variant);
        }
    }

    #[test]
    fn test_get_temperature_dispatches_variant0() {
        let sensor = MockSensor::variant0(0).with_control_read(vec![0x01, 0x90]);
        let mut handle = MockBus::new(vec![sensor.clone()]).open(&sensor).unwrap();

        let celsius =
            get_temperature(&mut handle, DeviceVariant::Variant0, DEFAULT_TEST_TIMEOUT).unwrap();
        assert_eq!(celsius, 400.0 * (125.0 / 32000.0));
    }

    #[test]
    fn test_get_temperature_dispatches_variant1() {
        let sensor = MockSensor::variant1(0).with_interrupt_read(vec![0, 0, 0x00, 0xc8, 0, 0, 0, 0]);
        let mut handle = MockBus::new(vec![sensor.clone()]).open(&sensor).unwrap();

        let celsius =
            get_temperature(&mut handle, DeviceVariant::Variant1, DEFAULT_TEST_TIMEOUT).unwrap();
        assert_eq!(celsius, 0.78125);
    }

    #[test]
    fn test_get_temperature_surfaces_errors() {
        let sensor = MockSensor::variant1(0).with_interrupt_read_error(UsbError::NoDevice);
        let mut handle = MockBus::new(vec![sensor.clone()]).open(&sensor).unwrap();

        assert_eq!(
            get_temperature(&mut handle, DeviceVariant::Variant1, DEFAULT_TEST_TIMEOUT),
            Err(ProtocolError::InterruptReadFailed(UsbError::NoDevice))
        );
    }
}
