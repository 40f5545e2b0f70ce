//! The SUPPRESS-GO-AHEAD built-in handler (RFC 858).

use crate::negotiation::{NegotiationContext, OptionHandler};
use crate::option::TelnetOption;

/// Mirrors our half of SUPPRESS-GO-AHEAD onto the connection's
/// `suppress_go_ahead` flag so the writer knows whether to emit `IAC GA`
/// after data writes.
#[derive(Debug, Default)]
pub struct SuppressGoAheadHandler;

impl OptionHandler for SuppressGoAheadHandler {
    fn option_code(&self) -> u8 {
        TelnetOption::SuppressGoAhead.as_byte()
    }

    fn subnegotiation(&mut self, _ctx: &mut dyn NegotiationContext, _payload: &[u8]) {
        // SUPPRESS-GO-AHEAD carries no subnegotiation.
    }

    fn update(
        &mut self,
        ctx: &mut dyn NegotiationContext,
        code: u8,
        _they_changed: bool,
        _them: bool,
        we_changed: bool,
        us: bool,
    ) {
        if code != self.option_code() || !we_changed {
            return;
        }
        ctx.set_suppress_go_ahead(us);
    }
}
