//! End-to-end tests for a measurement batch
//!
//! Drives the whole driver against the scripted mock bus:
//! - Mixed sensor families in one batch
//! - Output ordering by slot
//! - Read-failure policies
//! - Session capacity

use common::test_utils::{MockBus, MockEvent, MockSensor};
use protocol::UsbError;
use sensor::{CAPACITY, ReadFailurePolicy, TemperConfig, run_batch};

/// Variant0 sensor scripted for a handshake and one reading
fn variant0_sensor(location: u8, sample: [u8; 2]) -> MockSensor {
    MockSensor::variant0(location)
        .with_control_read(vec![0; 256])
        .with_control_read(sample.to_vec())
}

/// Variant1 sensor scripted for a handshake and one reading
fn variant1_sensor(location: u8, sample: [u8; 2]) -> MockSensor {
    (0..4)
        .fold(MockSensor::variant1(location), |sensor, _| {
            sensor.with_interrupt_read(vec![0; 8])
        })
        .with_interrupt_read(vec![0, 0, sample[0], sample[1], 0, 0, 0, 0])
}

fn parse_lines(out: Vec<u8>) -> Vec<(f64, u8)> {
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| {
            let (value, location) = line.split_once(',').unwrap();
            (value.parse().unwrap(), location.parse().unwrap())
        })
        .collect()
}

mod mixed_batch {
    use super::*;

    #[test]
    fn test_both_families_reported() {
        let first = variant0_sensor(3, [0x01, 0x90]);
        let second = variant1_sensor(7, [0x00, 0xc8]);
        let bus = MockBus::new(vec![first.clone(), second.clone()]);
        let mut out = Vec::new();

        let summary = run_batch(&bus, &TemperConfig::default(), &mut out).unwrap();
        assert_eq!(summary.lines_written, 2);

        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().nth(1), Some("-0.046328,7"));

        let lines = parse_lines(out);
        assert_eq!(lines.len(), 2);
        assert!((lines[0].0 - 0.757344).abs() < 1e-5, "{}", lines[0].0);
        assert_eq!(lines[0].1, 3);
        assert!((lines[1].0 - -0.046328).abs() < 1e-5, "{}", lines[1].0);
        assert_eq!(lines[1].1, 7);

        assert!(first.is_closed());
        assert!(second.is_closed());
    }

    #[test]
    fn test_handshake_then_read_then_close() {
        let first = variant1_sensor(1, [0x14, 0x00]);
        let second = variant1_sensor(2, [0x14, 0x00]);
        let bus = MockBus::new(vec![first.clone(), second.clone()]);

        run_batch(&bus, &TemperConfig::default(), &mut Vec::new()).unwrap();

        // Handshake is ini + three commands; the read is one more command
        assert_eq!(first.written_commands().len(), 5);
        assert_eq!(second.written_commands().len(), 5);

        // Closing is the last thing that happens to a sensor
        let first_events = first.events();
        let closed = first_events
            .iter()
            .position(|e| *e == MockEvent::Closed)
            .unwrap();
        assert_eq!(closed, first_events.len() - 1);
    }

    #[test]
    fn test_unsupported_devices_are_ignored() {
        let hub = MockSensor::new(0x1d6b, 0x0002, 0);
        let sensor = variant1_sensor(5, [0x14, 0x00]);
        let bus = MockBus::new(vec![hub.clone(), sensor]);
        let mut out = Vec::new();

        run_batch(&bus, &TemperConfig::default(), &mut out).unwrap();
        assert_eq!(parse_lines(out).len(), 1);
        assert!(hub.events().is_empty());
    }
}

mod ordering {
    use super::*;

    #[test]
    fn test_lines_follow_enumeration_order() {
        let bus = MockBus::new(vec![
            variant1_sensor(9, [0x14, 0x00]),
            variant0_sensor(2, [0x14, 0x00]),
            variant1_sensor(4, [0x14, 0x00]),
        ]);
        let mut out = Vec::new();

        run_batch(&bus, &TemperConfig::default(), &mut out).unwrap();
        let locations: Vec<u8> = parse_lines(out).into_iter().map(|(_, l)| l).collect();
        assert_eq!(locations, vec![9, 2, 4]);
    }

    #[test]
    fn test_duplicate_locations_are_kept() {
        let bus = MockBus::new(vec![
            variant1_sensor(1, [0x14, 0x00]),
            variant1_sensor(1, [0x0a, 0x00]),
        ]);
        let mut out = Vec::new();

        run_batch(&bus, &TemperConfig::default(), &mut out).unwrap();
        let lines = parse_lines(out);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].0 > lines[1].0);
    }
}

mod failures {
    use super::*;

    #[test]
    fn test_skip_policy_omits_failed_sensor() {
        let bus = MockBus::new(vec![
            variant1_sensor(1, [0x14, 0x00]),
            MockSensor::variant1(2).with_interrupt_read_error(UsbError::Timeout),
            variant0_sensor(3, [0x14, 0x00]),
        ]);
        let mut out = Vec::new();

        let summary = run_batch(&bus, &TemperConfig::default(), &mut out).unwrap();
        assert_eq!(summary.read_failures, 1);

        let locations: Vec<u8> = parse_lines(out).into_iter().map(|(_, l)| l).collect();
        assert_eq!(locations, vec![1, 3]);
    }

    #[test]
    fn test_fail_policy_returns_error() {
        let bus = MockBus::new(vec![
            MockSensor::variant0(1).with_control_read_error(UsbError::Pipe),
            variant0_sensor(2, [0x14, 0x00]),
        ]);
        let mut config = TemperConfig::default();
        config.output.on_read_error = ReadFailurePolicy::Fail;
        let mut out = Vec::new();

        let err = run_batch(&bus, &config, &mut out).unwrap_err();
        assert!(matches!(err, common::Error::ReadFailures { failed: 1 }));
        assert_eq!(parse_lines(out).len(), 1);
    }

    #[test]
    fn test_unopenable_sensor_is_not_a_read_failure() {
        let mut config = TemperConfig::default();
        config.output.on_read_error = ReadFailurePolicy::Fail;
        let bus = MockBus::new(vec![
            MockSensor::variant1(1).with_open_error(UsbError::Access),
            variant1_sensor(2, [0x14, 0x00]),
        ]);
        let mut out = Vec::new();

        let summary = run_batch(&bus, &config, &mut out).unwrap();
        assert_eq!(summary.open_failures, 1);
        assert_eq!(summary.read_failures, 0);
        assert_eq!(parse_lines(out).len(), 1);
    }
}

mod capacity {
    use super::*;

    #[test]
    fn test_at_most_capacity_lines() {
        let sensors: Vec<MockSensor> = (0..12)
            .map(|location| variant1_sensor(location, [0x14, 0x00]))
            .collect();
        let bus = MockBus::new(sensors.clone());
        let mut out = Vec::new();

        let summary = run_batch(&bus, &TemperConfig::default(), &mut out).unwrap();
        assert_eq!(summary.overflow, 2);
        assert_eq!(summary.lines_written, CAPACITY);

        let locations: Vec<u8> = parse_lines(out).into_iter().map(|(_, l)| l).collect();
        assert_eq!(locations, (0..10).collect::<Vec<u8>>());
        assert!(sensors[11].events().is_empty());
    }
}

mod calibration {
    use super::*;

    #[test]
    fn test_configured_calibration_and_precision() {
        let bus = MockBus::new(vec![variant1_sensor(6, [0x14, 0x00])]);
        let mut config = TemperConfig::default();
        config.calibration.scale = 1.0;
        config.calibration.offset = 0.5;
        config.output.precision = 2;
        let mut out = Vec::new();

        run_batch(&bus, &config, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "20.50,6\n");
    }
}
