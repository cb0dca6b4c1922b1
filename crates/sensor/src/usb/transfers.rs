//! Sensor transfer helpers
//!
//! Thin wrappers over [`SensorIo`] that issue the sensor's command writes,
//! data block reads and interrupt reads with the configured timeout, map
//! transport failures to protocol errors, and dump every byte at debug
//! level.

use common::SensorIo;
use protocol::{
    COMMAND_SETUP, Command, DATA_BLOCK_LEN, GET_DATA_SETUP, INI_PAYLOAD, INI_SETUP,
    INTERRUPT_ENDPOINT, ProtocolError, REPORT_LEN, hex_dump,
};
use std::time::Duration;
use tracing::debug;

/// Transfer channel to one open sensor
pub struct CommandChannel<'a> {
    io: &'a mut dyn SensorIo,
    timeout: Duration,
}

impl<'a> CommandChannel<'a> {
    pub fn new(io: &'a mut dyn SensorIo, timeout: Duration) -> Self {
        Self { io, timeout }
    }

    /// Send an 8-byte command with SET_REPORT
    pub fn send_command(&mut self, command: &Command) -> Result<(), ProtocolError> {
        self.io
            .write_control(COMMAND_SETUP, &command.bytes, self.timeout)
            .map_err(|source| ProtocolError::ControlWriteFailed {
                command: command.name,
                source,
            })?;

        debug!("{:<11} -> {}", command.name, hex_dump(&command.bytes));
        Ok(())
    }

    /// Send the two-byte "ini" message
    pub fn send_ini(&mut self) -> Result<(), ProtocolError> {
        self.io
            .write_control(INI_SETUP, &INI_PAYLOAD, self.timeout)
            .map_err(|source| ProtocolError::ControlWriteFailed {
                command: "ini",
                source,
            })?;

        debug!("{:<11} -> {}", "ini", hex_dump(&INI_PAYLOAD));
        Ok(())
    }

    /// Fetch the data block, returning the bytes actually transferred
    pub fn get_data(&mut self) -> Result<Vec<u8>, ProtocolError> {
        let mut buffer = vec![0u8; DATA_BLOCK_LEN];
        let len = self
            .io
            .read_control(GET_DATA_SETUP, &mut buffer, self.timeout)
            .map_err(ProtocolError::ControlReadFailed)?;
        buffer.truncate(len);

        debug!("get data <- ({} bytes)\n{}", len, hex_dump(&buffer));
        Ok(buffer)
    }

    /// Read one interrupt report; anything but exactly 8 bytes is a short read
    pub fn read_report(&mut self) -> Result<[u8; REPORT_LEN], ProtocolError> {
        let mut report = [0u8; REPORT_LEN];
        let len = self
            .io
            .read_interrupt(INTERRUPT_ENDPOINT, &mut report, self.timeout)
            .map_err(ProtocolError::InterruptReadFailed)?;

        if len != REPORT_LEN {
            return Err(ProtocolError::ShortRead {
                expected: REPORT_LEN,
                actual: len,
            });
        }

        debug!("interrupt   <- {}", hex_dump(&report));
        Ok(report)
    }
}
