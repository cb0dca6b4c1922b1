//! One-shot measurement batch
//!
//! Opens every sensor, runs each handshake, reads each temperature, closes
//! the sensor and writes one CSV line per reading in slot order. The output
//! is flushed once at the end.

use crate::config::{ReadFailurePolicy, TemperConfig};
use crate::usb::{LocationTag, SessionManager, Slot};
use common::{Error, Result, SensorBus};
use protocol::ProtocolError;
use std::io::Write;
use tracing::{debug, error, warn};

/// Outcome of one sensor in the batch
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub location: LocationTag,
    /// Uncalibrated temperature in °C, or why there is none
    pub celsius: std::result::Result<f32, ProtocolError>,
}

/// Summary of a completed batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    /// Lines written to the output
    pub lines_written: usize,
    /// Sensors that opened but did not report a temperature
    pub read_failures: usize,
    /// Sensors that could not be opened
    pub open_failures: usize,
    /// Sensors ignored because the session was full
    pub overflow: usize,
}

/// Open, initialize, read and close every sensor, in slot order
pub fn collect_readings<B: SensorBus>(
    bus: &B,
    config: &TemperConfig,
) -> Result<(Vec<SensorReading>, BatchSummary)> {
    let timeout = config.usb.timeout();
    let manager = SessionManager::new(bus);
    let mut session = manager.open_all()?;

    let mut summary = BatchSummary {
        overflow: session.overflow,
        ..Default::default()
    };

    // All handshakes run before the first read
    let mut handshakes = Vec::with_capacity(session.slots.len());
    for sensor in session.slots.open_sensors_mut() {
        let result = sensor.initialize(timeout);
        if let Err(e) = &result {
            warn!(
                "Sensor at location {} failed its {} handshake: {}",
                sensor.location(),
                sensor.variant(),
                e
            );
        }
        handshakes.push(result);
    }

    let mut handshakes = handshakes.into_iter();
    let mut readings = Vec::with_capacity(session.slots.len());
    for slot in session.slots {
        match slot {
            Slot::Open(mut sensor) => {
                let celsius = match handshakes.next() {
                    Some(Err(e)) => Err(e),
                    _ => sensor.read_temperature(timeout),
                };
                debug!(
                    "Sensor {} at location {}: {:?}",
                    sensor.identity(),
                    sensor.location(),
                    celsius
                );
                readings.push(SensorReading {
                    location: sensor.location(),
                    celsius,
                });
                manager.close(sensor);
            }
            Slot::Empty { .. } => summary.open_failures += 1,
        }
    }

    Ok((readings, summary))
}

/// Write calibrated CSV lines for every successful reading and flush once
pub fn write_report<W: Write>(
    out: &mut W,
    readings: &[SensorReading],
    config: &TemperConfig,
    summary: &mut BatchSummary,
) -> Result<()> {
    for reading in readings {
        match reading.celsius {
            Ok(celsius) => {
                let line = config.calibration.to_calibrated_line(
                    celsius,
                    reading.location,
                    config.output.precision,
                );
                out.write_all(line.as_bytes())?;
                summary.lines_written += 1;
            }
            Err(ref e) => {
                warn!("No temperature from sensor at location {}: {}", reading.location, e);
                summary.read_failures += 1;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Run a full batch against `bus`, writing CSV to `out`
pub fn run_batch<B: SensorBus, W: Write>(
    bus: &B,
    config: &TemperConfig,
    out: &mut W,
) -> Result<BatchSummary> {
    let (readings, mut summary) = collect_readings(bus, config)?;
    write_report(out, &readings, config, &mut summary)?;

    if summary.read_failures > 0 && config.output.on_read_error == ReadFailurePolicy::Fail {
        error!("{} sensor(s) failed to report", summary.read_failures);
        return Err(Error::ReadFailures {
            failed: summary.read_failures,
        });
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::test_utils::{MockBus, MockSensor};
    use protocol::UsbError;

    #[test]
    fn test_empty_bus_writes_nothing() {
        let bus = MockBus::default();
        let mut out = Vec::new();

        let summary = run_batch(&bus, &TemperConfig::default(), &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(summary, BatchSummary::default());
    }

    #[test]
    fn test_failed_handshake_skips_read() {
        let sensor = MockSensor::variant1(4).with_control_write_error(UsbError::Io);
        let bus = MockBus::new(vec![sensor.clone()]);

        let (readings, _) = collect_readings(&bus, &TemperConfig::default()).unwrap();
        assert_eq!(readings.len(), 1);
        assert!(matches!(
            readings[0].celsius,
            Err(ProtocolError::ControlWriteFailed { command: "ini", .. })
        ));
        // Only the ini write went out, then the sensor was closed
        assert_eq!(sensor.written_commands().len(), 1);
        assert!(sensor.is_closed());
    }

    #[test]
    fn test_fail_policy_still_writes_good_lines() {
        let good = MockSensor::variant1(1)
            .with_interrupt_read(vec![0; 8])
            .with_interrupt_read(vec![0; 8])
            .with_interrupt_read(vec![0; 8])
            .with_interrupt_read(vec![0; 8])
            .with_interrupt_read(vec![0, 0, 0x14, 0x00, 0, 0, 0, 0]);
        let bad = MockSensor::variant0(2);
        let bus = MockBus::new(vec![good, bad]);

        let mut config = TemperConfig::default();
        config.output.on_read_error = ReadFailurePolicy::Fail;
        let mut out = Vec::new();

        let result = run_batch(&bus, &config, &mut out);
        assert!(matches!(result, Err(Error::ReadFailures { failed: 1 })));

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.ends_with(",1\n"));
    }

    #[test]
    fn test_skip_policy_counts_failures() {
        let bad = MockSensor::variant0(2);
        let missing = MockSensor::variant0(3).with_open_error(UsbError::Access);
        let bus = MockBus::new(vec![bad, missing]);
        let mut out = Vec::new();

        let summary = run_batch(&bus, &TemperConfig::default(), &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(summary.read_failures, 1);
        assert_eq!(summary.open_failures, 1);
        assert_eq!(summary.lines_written, 0);
    }
}
