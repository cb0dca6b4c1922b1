//! Variant 1 (0c45:7401)
//!
//! Commands go out as SET_REPORT control writes; responses arrive as 8-byte
//! reports on interrupt endpoint 0x82, temperature at offsets 2 and 3.

use super::SensorProtocol;
use crate::usb::transfers::CommandChannel;
use protocol::{
    Command, DeviceVariant, INI1, INI2, ProtocolError, RawSample, TEMPERATURE, decode_variant1,
};
use tracing::warn;

pub struct Variant1Protocol;

impl Variant1Protocol {
    /// Send a handshake command followed by `reads` discarded reports
    fn exchange(channel: &mut CommandChannel<'_>, command: &Command, reads: usize) {
        if let Err(e) = channel.send_command(command) {
            warn!("Variant 1 handshake: {}", e);
        }
        for _ in 0..reads {
            if let Err(e) = channel.read_report() {
                warn!("Variant 1 handshake ({}): {}", command.name, e);
            }
        }
    }
}

impl SensorProtocol for Variant1Protocol {
    fn variant(&self) -> DeviceVariant {
        DeviceVariant::Variant1
    }

    /// Fails fast only when the "ini" write fails
    fn initialize(&self, channel: &mut CommandChannel<'_>) -> Result<(), ProtocolError> {
        channel.send_ini()?;

        Self::exchange(channel, &TEMPERATURE, 1);
        Self::exchange(channel, &INI1, 1);
        Self::exchange(channel, &INI2, 2);
        Ok(())
    }

    fn read_sample(&self, channel: &mut CommandChannel<'_>) -> Result<RawSample, ProtocolError> {
        channel.send_command(&TEMPERATURE)?;
        let report = channel.read_report()?;
        decode_variant1(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::SensorBus;
    use common::test_utils::{DEFAULT_TEST_TIMEOUT, MockBus, MockEvent, MockHandle, MockSensor};
    use protocol::{COMMAND_SETUP, INI_PAYLOAD, INI_SETUP, INTERRUPT_ENDPOINT, UsbError};

    fn open(sensor: &MockSensor) -> MockHandle {
        MockBus::new(vec![sensor.clone()]).open(sensor).unwrap()
    }

    fn write(command: &Command) -> MockEvent {
        MockEvent::ControlWrite {
            setup: COMMAND_SETUP,
            data: command.bytes.to_vec(),
        }
    }

    fn report() -> MockEvent {
        MockEvent::InterruptRead {
            endpoint: INTERRUPT_ENDPOINT,
            length: 8,
        }
    }

    #[test]
    fn test_initialize_sequence() {
        let sensor = (0..4).fold(MockSensor::variant1(0), |s, _| s.with_interrupt_read(vec![0; 8]));
        let mut handle = open(&sensor);
        let mut channel = CommandChannel::new(&mut handle, DEFAULT_TEST_TIMEOUT);

        Variant1Protocol.initialize(&mut channel).unwrap();
        assert_eq!(
            sensor.events(),
            vec![
                MockEvent::ControlWrite {
                    setup: INI_SETUP,
                    data: INI_PAYLOAD.to_vec()
                },
                write(&TEMPERATURE),
                report(),
                write(&INI1),
                report(),
                write(&INI2),
                report(),
                report(),
            ]
        );
    }

    #[test]
    fn test_initialize_fails_fast_on_ini() {
        let sensor = MockSensor::variant1(0).with_control_write_error(UsbError::Io);
        let mut handle = open(&sensor);
        let mut channel = CommandChannel::new(&mut handle, DEFAULT_TEST_TIMEOUT);

        assert_eq!(
            Variant1Protocol.initialize(&mut channel),
            Err(ProtocolError::ControlWriteFailed {
                command: "ini",
                source: UsbError::Io
            })
        );
        assert_eq!(sensor.events().len(), 1);
    }

    #[test]
    fn test_initialize_tolerates_bad_reports() {
        // Short report, timeout, then the queue runs dry
        let sensor = MockSensor::variant1(0)
            .with_interrupt_read(vec![0; 3])
            .with_interrupt_read_error(UsbError::Timeout);
        let mut handle = open(&sensor);
        let mut channel = CommandChannel::new(&mut handle, DEFAULT_TEST_TIMEOUT);

        assert!(Variant1Protocol.initialize(&mut channel).is_ok());
        assert_eq!(sensor.events().len(), 8);
    }

    #[test]
    fn test_read_sample() {
        let sensor = MockSensor::variant1(0).with_interrupt_read(vec![0x80, 0x02, 0x00, 0xc8, 0, 0, 0, 0]);
        let mut handle = open(&sensor);
        let mut channel = CommandChannel::new(&mut handle, DEFAULT_TEST_TIMEOUT);

        assert_eq!(Variant1Protocol.read_sample(&mut channel), Ok(RawSample(200)));
        assert_eq!(sensor.events(), vec![write(&TEMPERATURE), report()]);
    }

    #[test]
    fn test_read_short_report() {
        let sensor = MockSensor::variant1(0).with_interrupt_read(vec![0, 0, 0x00, 0xc8, 0, 0]);
        let mut handle = open(&sensor);
        let mut channel = CommandChannel::new(&mut handle, DEFAULT_TEST_TIMEOUT);

        assert_eq!(
            Variant1Protocol.read_sample(&mut channel),
            Err(ProtocolError::ShortRead {
                expected: 8,
                actual: 6
            })
        );
    }

    #[test]
    fn test_read_fails_on_command_write() {
        let sensor = MockSensor::variant1(0)
            .with_control_write_error(UsbError::Pipe)
            .with_interrupt_read(vec![0; 8]);
        let mut handle = open(&sensor);
        let mut channel = CommandChannel::new(&mut handle, DEFAULT_TEST_TIMEOUT);

        assert!(matches!(
            Variant1Protocol.read_sample(&mut channel),
            Err(ProtocolError::ControlWriteFailed {
                command: "temperature",
                ..
            })
        ));
    }
}
