//! TEMPer sensor driver
//!
//! Discovers the two supported USB temperature-sensor families, opens them,
//! runs each family's handshake and read sequence and turns the raw codes
//! into calibrated CSV lines.
//!
//! ```no_run
//! use sensor::{RusbBus, TemperConfig, run_batch};
//!
//! # fn main() -> common::Result<()> {
//! let bus = RusbBus::new(false)?;
//! let stdout = std::io::stdout();
//! run_batch(&bus, &TemperConfig::default(), &mut stdout.lock())?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod engine;
pub mod report;
pub mod usb;

pub use batch::{BatchSummary, SensorReading, collect_readings, run_batch, write_report};
pub use config::{ReadFailurePolicy, TemperConfig};
pub use engine::{SensorProtocol, get_temperature, protocol_for};
pub use report::{Calibration, to_calibrated_line, to_reading};
pub use usb::{CAPACITY, RusbBus, SessionManager};
