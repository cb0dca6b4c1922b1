//! Variant 0 (1130:660c)
//!
//! Commands go out as SET_REPORT control writes; the temperature comes back
//! in the first two bytes of a class "get data" control read.

use super::SensorProtocol;
use crate::usb::transfers::CommandChannel;
use protocol::{
    CMD0, CMD1, CMD2, CMD3, CMD4, DeviceVariant, ProtocolError, RawSample, VARIANT0_POLL_COUNT,
    decode_variant0,
};
use tracing::{debug, warn};

pub struct Variant0Protocol;

impl SensorProtocol for Variant0Protocol {
    fn variant(&self) -> DeviceVariant {
        DeviceVariant::Variant0
    }

    /// Every step is attempted; failures are logged and never abort
    fn initialize(&self, channel: &mut CommandChannel<'_>) -> Result<(), ProtocolError> {
        for command in [&CMD1, &CMD3, &CMD2] {
            if let Err(e) = channel.send_command(command) {
                warn!("Variant 0 handshake: {}", e);
            }
        }

        // Drains the identification block the device queues after cmd2
        match channel.get_data() {
            Ok(block) => debug!("Variant 0 handshake drained {} bytes", block.len()),
            Err(e) => warn!("Variant 0 handshake: {}", e),
        }

        Ok(())
    }

    fn read_sample(&self, channel: &mut CommandChannel<'_>) -> Result<RawSample, ProtocolError> {
        channel.send_command(&CMD1)?;
        channel.send_command(&CMD4)?;
        for _ in 0..VARIANT0_POLL_COUNT {
            channel.send_command(&CMD0)?;
        }
        channel.send_command(&CMD2)?;

        let block = channel.get_data()?;
        decode_variant0(&block)
    }
}
