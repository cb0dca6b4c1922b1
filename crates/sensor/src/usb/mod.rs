//! USB subsystem
//!
//! Device access, session management and sensor transfers.
//!
//! This module implements the USB side of the driver:
//! - rusb-backed enumeration and device handles
//! - Session management (open, detach, configure, claim, close)
//! - Bounded, ordered sensor slots
//! - Command and report transfers shared by both sensor families
//!
//! Everything here is blocking and single-threaded; each transfer is
//! bounded by the configured timeout.

pub mod device;
pub mod session;
pub mod slots;
pub mod transfers;

// Re-export public types
pub use device::{RusbBus, RusbHandle, map_rusb_error};
pub use session::{OpenedSession, SensorListing, SessionManager};
pub use slots::{CAPACITY, DeviceSlots, LocationTag, OpenSensor, SessionFault, Slot, SlotError};
pub use transfers::CommandChannel;
