//! The TRANSMIT-BINARY built-in handler (RFC 856).

use crate::codec::{AsciiCodec, BinaryCodec};
use crate::negotiation::{NegotiationContext, OptionHandler};
use crate::option::TelnetOption;

/// Installs a binary or ASCII codec on the read/write path in response to
/// TRANSMIT-BINARY negotiation. Carries no state of its own; every decision
/// follows directly from the option's current `them`/`us` values.
#[derive(Debug, Default)]
pub struct TransmitBinaryHandler;

impl OptionHandler for TransmitBinaryHandler {
    fn option_code(&self) -> u8 {
        TelnetOption::TransmitBinary.as_byte()
    }

    fn subnegotiation(&mut self, _ctx: &mut dyn NegotiationContext, _payload: &[u8]) {
        // TRANSMIT-BINARY carries no subnegotiation.
    }

    fn update(
        &mut self,
        ctx: &mut dyn NegotiationContext,
        code: u8,
        they_changed: bool,
        them: bool,
        we_changed: bool,
        us: bool,
    ) {
        if code != self.option_code() {
            return;
        }
        if they_changed {
            if them {
                ctx.set_read_codec(Box::new(BinaryCodec));
            } else {
                ctx.set_read_codec(Box::new(AsciiCodec));
            }
        }
        if we_changed {
            if us {
                ctx.set_write_codec(Box::new(BinaryCodec));
            } else {
                ctx.set_write_codec(Box::new(AsciiCodec));
            }
        }
    }
}
