//! Common utilities for temper
//!
//! This crate provides functionality shared by the sensor driver and its
//! tests: the crate-boundary error type, logging setup, the USB capability
//! traits the driver is written against, and a scripted mock bus.

pub mod error;
pub mod logging;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod usb_types;

pub use error::{Error, Result};
pub use logging::setup_logging;
pub use usb_types::{DiscoveredDevice, SensorBus, SensorIo};
