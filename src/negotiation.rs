//! Dispatches decoded frames to the Q-method state machine and fans out
//! change notifications to registered option handlers.

use std::cell::{RefCell, RefMut};
use std::collections::HashMap;
use std::io;
use std::rc::Rc;

use crate::codec::Codec;
use crate::logger::Logger;
use crate::qstate::{OptionEntry, QState};

/// Mapping from option byte to its negotiation state. Every code yields an
/// entry on first access so negotiation always has something to key on, even
/// for options this core has no built-in handler for.
#[derive(Debug, Default)]
pub struct OptionMap {
    entries: HashMap<u8, OptionEntry>,
}

impl OptionMap {
    pub fn new() -> OptionMap {
        OptionMap::default()
    }

    pub fn entry(&mut self, opt: u8) -> &mut OptionEntry {
        self.entries.entry(opt).or_insert_with(OptionEntry::new)
    }

    pub fn get(&self, opt: u8) -> OptionEntry {
        self.entries.get(&opt).copied().unwrap_or_default()
    }
}

/// The operations an [`OptionHandler`] needs from its owning connection:
/// sending replies, querying option state, swapping the active codec, and
/// toggling go-ahead suppression. Kept as a trait object seam so handlers
/// don't need to be generic over the connection's transport type.
pub trait NegotiationContext {
    fn send_option_cmd(&mut self, cmd: u8, opt: u8) -> io::Result<()>;
    fn send_subneg(&mut self, opt: u8, payload: &[u8]) -> io::Result<()>;
    fn is_enabled_them(&self, opt: u8) -> bool;
    fn is_enabled_us(&self, opt: u8) -> bool;
    fn set_read_codec(&mut self, codec: Box<dyn Codec>);
    fn set_write_codec(&mut self, codec: Box<dyn Codec>);
    fn set_suppress_go_ahead(&mut self, value: bool);
    fn logger(&self) -> &dyn Logger;
}

/// A per-option capability: reacts to subnegotiation payloads for its own
/// option code, and observes `them`/`us` state transitions for every option
/// (so e.g. the CHARSET handler can react to TRANSMIT-BINARY changes).
pub trait OptionHandler: Send {
    fn option_code(&self) -> u8;

    fn subnegotiation(&mut self, ctx: &mut dyn NegotiationContext, payload: &[u8]);

    fn update(
        &mut self,
        ctx: &mut dyn NegotiationContext,
        code: u8,
        they_changed: bool,
        them: bool,
        we_changed: bool,
        us: bool,
    );
}

/// Owns the option table and the handler list, and drives both from decoded
/// frames.
///
/// The table lives behind an `Rc<RefCell<_>>` rather than a plain field:
/// handlers reach it through a [`NegotiationContext`] built from the
/// connection's own fields, independently of whatever currently borrows this
/// engine, so a shared, interior-mutable handle is what lets both sides see
/// the same state without fighting the borrow checker over one shared
/// transport.
pub struct NegotiationEngine {
    options: Rc<RefCell<OptionMap>>,
    handlers: Vec<Box<dyn OptionHandler>>,
}

impl Default for NegotiationEngine {
    fn default() -> NegotiationEngine {
        NegotiationEngine::new()
    }
}

impl NegotiationEngine {
    pub fn new() -> NegotiationEngine {
        NegotiationEngine {
            options: Rc::new(RefCell::new(OptionMap::new())),
            handlers: Vec::new(),
        }
    }

    pub fn register_handler(&mut self, handler: Box<dyn OptionHandler>) {
        self.handlers.push(handler);
    }

    /// A cloned handle to the option table, for building a
    /// [`NegotiationContext`] implementation that can answer
    /// `is_enabled_them`/`is_enabled_us` without borrowing this engine.
    pub fn options_handle(&self) -> Rc<RefCell<OptionMap>> {
        self.options.clone()
    }

    pub fn options_mut(&self) -> RefMut<'_, OptionMap> {
        self.options.borrow_mut()
    }

    pub fn option_state(&self, opt: u8) -> OptionEntry {
        self.options.borrow().get(opt)
    }

    /// Processes `IAC <cmd> <opt>`: drives the Q-method transition, sends any
    /// reply the table demands, then notifies every handler of the new state.
    pub fn dispatch_command(
        &mut self,
        ctx: &mut dyn NegotiationContext,
        cmd: u8,
        opt: u8,
    ) -> io::Result<()> {
        let (reply, they_changed, them_enabled, we_changed, us_enabled) = {
            let mut options = self.options.borrow_mut();
            let entry = options.entry(opt);
            let them0 = entry.them;
            let us0 = entry.us;
            let reply = entry.receive(cmd);
            let them1 = entry.them;
            let us1 = entry.us;
            (
                reply,
                them0 != them1,
                them1 == QState::Yes,
                us0 != us1,
                us1 == QState::Yes,
            )
        };

        if let Some(reply_byte) = reply {
            ctx.send_option_cmd(reply_byte, opt)?;
        }

        for handler in &mut self.handlers {
            handler.update(ctx, opt, they_changed, them_enabled, we_changed, us_enabled);
        }

        Ok(())
    }

    /// Processes `IAC SB <opt> <payload> IAC SE`: routes to the handler
    /// registered for `opt`, if any, otherwise logs and drops it.
    pub fn dispatch_subneg(&mut self, ctx: &mut dyn NegotiationContext, opt: u8, payload: &[u8]) {
        if let Some(handler) = self.handlers.iter_mut().find(|h| h.option_code() == opt) {
            handler.subnegotiation(ctx, payload);
        } else {
            ctx.logger().log(
                crate::logger::Level::Debug,
                "negotiation",
                &format!(
                    "no handler registered for option {} subnegotiation ({} bytes), dropping",
                    opt,
                    payload.len()
                ),
            );
        }
    }
}
