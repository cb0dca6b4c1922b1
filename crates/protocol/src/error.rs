//! Protocol error types

use thiserror::Error;

/// USB transport errors
///
/// A stable, comparable mirror of the host stack's error codes. Adapters map
/// their native errors into this enum so the protocol layer never depends on
/// a particular USB library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsbError {
    /// Transfer timed out
    #[error("timeout")]
    Timeout,
    /// Endpoint stalled
    #[error("pipe error")]
    Pipe,
    /// Device disconnected
    #[error("no such device")]
    NoDevice,
    /// Entity not found (also: no kernel driver attached)
    #[error("not found")]
    NotFound,
    /// Resource busy (interface claimed by someone else)
    #[error("resource busy")]
    Busy,
    /// Device sent more data than requested
    #[error("overflow")]
    Overflow,
    /// Input/output error
    #[error("I/O error")]
    Io,
    /// Invalid parameter
    #[error("invalid parameter")]
    InvalidParam,
    /// Insufficient permissions
    #[error("access denied")]
    Access,
    /// Operation not supported on this platform
    #[error("not supported")]
    NotSupported,
    /// Anything else
    #[error("{message}")]
    Other { message: String },
}

/// Sensor protocol errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Device identity is not in the supported table
    #[error("Unsupported device {vendor_id:04x}:{product_id:04x}")]
    Unsupported { vendor_id: u16, product_id: u16 },

    /// A control write reported an error
    #[error("Control write failed ({command}): {source}")]
    ControlWriteFailed {
        command: &'static str,
        #[source]
        source: UsbError,
    },

    /// The "get data" control read reported an error
    #[error("Control read failed: {0}")]
    ControlReadFailed(#[source] UsbError),

    /// An interrupt read reported an error
    #[error("Interrupt read failed: {0}")]
    InterruptReadFailed(#[source] UsbError),

    /// A read returned fewer bytes than the protocol requires
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },
}

/// Type alias for protocol results
pub type Result<T> = std::result::Result<T, ProtocolError>;
