//! Raw sample decoding
//!
//! Each variant places the temperature code at its own offset. Both store
//! the high byte first. The offsets differ between firmware families and are
//! kept separate on purpose; unifying them changes behaviour on hardware.

use crate::commands::REPORT_LEN;
use crate::error::{ProtocolError, Result};
use crate::types::RawSample;
use byteorder::{BigEndian, ByteOrder};
use std::fmt::Write as _;

/// Offset of the high byte in the variant 0 data block
pub const VARIANT0_SAMPLE_OFFSET: usize = 0;
/// Offset of the high byte in the variant 1 interrupt report
pub const VARIANT1_SAMPLE_OFFSET: usize = 2;

/// Minimum data block length for a variant 0 sample
pub const VARIANT0_MIN_LEN: usize = VARIANT0_SAMPLE_OFFSET + 2;

/// Decode a variant 0 "get data" block
///
/// `data` is the portion of the buffer the device actually returned.
pub fn decode_variant0(data: &[u8]) -> Result<RawSample> {
    if data.len() < VARIANT0_MIN_LEN {
        return Err(ProtocolError::ShortRead {
            expected: VARIANT0_MIN_LEN,
            actual: data.len(),
        });
    }

    Ok(RawSample(BigEndian::read_u16(
        &data[VARIANT0_SAMPLE_OFFSET..VARIANT0_SAMPLE_OFFSET + 2],
    )))
}

/// Decode a variant 1 interrupt report
///
/// The report must be exactly [`REPORT_LEN`] bytes.
pub fn decode_variant1(report: &[u8]) -> Result<RawSample> {
    if report.len() != REPORT_LEN {
        return Err(ProtocolError::ShortRead {
            expected: REPORT_LEN,
            actual: report.len(),
        });
    }

    Ok(RawSample(BigEndian::read_u16(
        &report[VARIANT1_SAMPLE_OFFSET..VARIANT1_SAMPLE_OFFSET + 2],
    )))
}

/// Format bytes as space separated hex, 16 per line
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(if i % 16 == 0 { '\n' } else { ' ' });
        }
        let _ = write!(out, "{:02x}", byte);
    }
    out
}
