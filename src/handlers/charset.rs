//! The CHARSET built-in handler (RFC 2066). TTABLE (§2.3) is declined.

use crate::codec::CharsetRegistry;
use crate::command::CharsetCommand;
use crate::logger::Level;
use crate::negotiation::{NegotiationContext, OptionHandler};
use crate::option::TelnetOption;

const TTABLE_PREFIX: &[u8] = b"[TTABLE]";

/// Negotiates a text encoding for the connection, keeping its own selected
/// encoding in step with the TRANSMIT-BINARY half-options (CHARSET only has
/// meaning once BINARY provides a transport that can carry the encoded
/// bytes).
pub struct CharsetHandler {
    registry: Box<dyn CharsetRegistry>,
    enc_name: Option<String>,
}

impl CharsetHandler {
    pub fn new(registry: Box<dyn CharsetRegistry>) -> CharsetHandler {
        CharsetHandler {
            registry,
            enc_name: None,
        }
    }

    fn charset_code(&self) -> u8 {
        TelnetOption::Charset.as_byte()
    }

    fn binary_code(&self) -> u8 {
        TelnetOption::TransmitBinary.as_byte()
    }

    fn reject(&self, ctx: &mut dyn NegotiationContext) {
        let _ = ctx.send_subneg(self.charset_code(), &[CharsetCommand::Rejected.as_byte()]);
    }

    fn handle_request(&mut self, ctx: &mut dyn NegotiationContext, rest: &[u8]) {
        if !ctx.is_enabled_us(self.charset_code()) {
            self.reject(ctx);
            return;
        }

        let rest: &[u8] = if rest.len() > 10 && rest.starts_with(TTABLE_PREFIX) {
            &rest[TTABLE_PREFIX.len() + 1..]
        } else {
            rest
        };

        if rest.len() < 2 {
            self.reject(ctx);
            return;
        }

        let sep = rest[0];
        let candidates: Vec<&[u8]> = rest[1..].split(|&b| b == sep).collect();
        let selected = candidates.iter().find_map(|name| {
            std::str::from_utf8(name)
                .ok()
                .filter(|n| self.registry.lookup(n).is_some())
        });

        let name = match selected {
            Some(name) => name.to_string(),
            None => {
                self.reject(ctx);
                return;
            }
        };

        let mut payload = vec![CharsetCommand::Accepted.as_byte()];
        payload.extend_from_slice(name.as_bytes());
        if ctx.send_subneg(self.charset_code(), &payload).is_err() {
            return;
        }
        self.enc_name = Some(name);
        self.apply_current_binary_state(ctx);
    }

    fn handle_accepted(&mut self, ctx: &mut dyn NegotiationContext, rest: &[u8]) {
        let name = match std::str::from_utf8(rest) {
            Ok(name) if self.registry.lookup(name).is_some() => name.to_string(),
            _ => return,
        };
        self.enc_name = Some(name);
        self.apply_current_binary_state(ctx);
    }

    /// Re-evaluates the BINARY-gated encoding install using the option
    /// table's current state, the same transition [`Self::update`] applies
    /// when it observes a BINARY change directly.
    fn apply_current_binary_state(&mut self, ctx: &mut dyn NegotiationContext) {
        let them = ctx.is_enabled_them(self.binary_code());
        let us = ctx.is_enabled_us(self.binary_code());
        self.update(ctx, self.binary_code(), false, them, false, us);
    }
}

impl OptionHandler for CharsetHandler {
    fn option_code(&self) -> u8 {
        self.charset_code()
    }

    fn subnegotiation(&mut self, ctx: &mut dyn NegotiationContext, payload: &[u8]) {
        if payload.is_empty() {
            ctx.logger()
                .log(Level::Debug, "charset", "empty subnegotiation payload");
            return;
        }

        let cmd = CharsetCommand::parse(payload[0]);
        let rest = &payload[1..];

        match cmd {
            CharsetCommand::Request => self.handle_request(ctx, rest),
            CharsetCommand::Accepted => self.handle_accepted(ctx, rest),
            CharsetCommand::Rejected => {
                ctx.logger()
                    .log(Level::Warn, "charset", "peer rejected our charset request");
            }
            CharsetCommand::TtableIs => {
                let _ = ctx.send_subneg(
                    self.charset_code(),
                    &[CharsetCommand::TtableRejected.as_byte()],
                );
            }
            _ => {
                ctx.logger().log(
                    Level::Debug,
                    "charset",
                    &format!("ignoring charset subcommand {}", payload[0]),
                );
            }
        }
    }

    fn update(
        &mut self,
        ctx: &mut dyn NegotiationContext,
        code: u8,
        _they_changed: bool,
        them: bool,
        _we_changed: bool,
        us: bool,
    ) {
        if code != self.binary_code() {
            return;
        }
        if !ctx.is_enabled_us(self.charset_code()) {
            return;
        }
        let Some(name) = self.enc_name.clone() else {
            return;
        };
        if them && us {
            if let Some(codec) = self.registry.lookup(&name) {
                ctx.set_read_codec(codec);
            }
            if let Some(codec) = self.registry.lookup(&name) {
                ctx.set_write_codec(codec);
            }
        } else {
            if let Some(codec) = self.registry.lookup("US-ASCII") {
                ctx.set_read_codec(codec);
            }
            if let Some(codec) = self.registry.lookup("US-ASCII") {
                ctx.set_write_codec(codec);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Codec, DefaultCharsetRegistry};
    use crate::logger::{Logger, NullLogger};
    use std::cell::RefCell;
    use std::io;

    #[derive(Default)]
    struct FakeCtx {
        enabled_us: std::collections::HashSet<u8>,
        enabled_them: std::collections::HashSet<u8>,
        sent_subneg: RefCell<Vec<(u8, Vec<u8>)>>,
        read_codec_name: Option<String>,
        write_codec_name: Option<String>,
        logger: NullLogger,
    }

    impl NegotiationContext for FakeCtx {
        fn send_option_cmd(&mut self, _cmd: u8, _opt: u8) -> io::Result<()> {
            Ok(())
        }
        fn send_subneg(&mut self, opt: u8, payload: &[u8]) -> io::Result<()> {
            self.sent_subneg.borrow_mut().push((opt, payload.to_vec()));
            Ok(())
        }
        fn is_enabled_them(&self, opt: u8) -> bool {
            self.enabled_them.contains(&opt)
        }
        fn is_enabled_us(&self, opt: u8) -> bool {
            self.enabled_us.contains(&opt)
        }
        fn set_read_codec(&mut self, codec: Box<dyn Codec>) {
            self.read_codec_name = Some(codec.name().to_string());
        }
        fn set_write_codec(&mut self, codec: Box<dyn Codec>) {
            self.write_codec_name = Some(codec.name().to_string());
        }
        fn set_suppress_go_ahead(&mut self, _value: bool) {}
        fn logger(&self) -> &dyn Logger {
            &self.logger
        }
    }

    fn handler() -> CharsetHandler {
        CharsetHandler::new(Box::new(DefaultCharsetRegistry))
    }

    #[test]
    fn request_rejected_when_charset_not_enabled_for_us() {
        let mut h = handler();
        let mut ctx = FakeCtx::default();
        h.subnegotiation(&mut ctx, &[CharsetCommand::Request.as_byte(), b';', b'U']);
        assert_eq!(
            *ctx.sent_subneg.borrow(),
            vec![(42, vec![CharsetCommand::Rejected.as_byte()])]
        );
    }

    #[test]
    fn request_accepts_first_resolvable_name() {
        let mut h = handler();
        let mut ctx = FakeCtx::default();
        ctx.enabled_us.insert(TelnetOption::Charset.as_byte());
        ctx.enabled_them
            .insert(TelnetOption::TransmitBinary.as_byte());
        ctx.enabled_us
            .insert(TelnetOption::TransmitBinary.as_byte());

        let mut payload = vec![CharsetCommand::Request.as_byte(), b';'];
        payload.extend_from_slice(b"UTF-8");
        h.subnegotiation(&mut ctx, &payload);

        let mut expected_payload = vec![CharsetCommand::Accepted.as_byte()];
        expected_payload.extend_from_slice(b"UTF-8");
        assert_eq!(*ctx.sent_subneg.borrow(), vec![(42, expected_payload)]);
        assert_eq!(ctx.read_codec_name.as_deref(), Some("UTF-8"));
        assert_eq!(ctx.write_codec_name.as_deref(), Some("UTF-8"));
    }

    #[test]
    fn request_with_ttable_prefix_strips_it_and_accepts() {
        let mut h = handler();
        let mut ctx = FakeCtx::default();
        ctx.enabled_us.insert(TelnetOption::Charset.as_byte());

        let mut payload = vec![CharsetCommand::Request.as_byte()];
        payload.extend_from_slice(TTABLE_PREFIX);
        payload.push(0x01); // version byte
        payload.push(b';');
        payload.extend_from_slice(b"UTF-8");
        h.subnegotiation(&mut ctx, &payload);

        let mut expected_payload = vec![CharsetCommand::Accepted.as_byte()];
        expected_payload.extend_from_slice(b"UTF-8");
        assert_eq!(*ctx.sent_subneg.borrow(), vec![(42, expected_payload)]);
    }

    #[test]
    fn request_with_ttable_exactly_at_boundary_is_rejected() {
        // len(rest) == 10 after the cmd byte: "[TTABLE]" (8) + sep (1) + 1 name byte = 10.
        let mut h = handler();
        let mut ctx = FakeCtx::default();
        ctx.enabled_us.insert(TelnetOption::Charset.as_byte());

        let mut rest = TTABLE_PREFIX.to_vec();
        rest.push(b';');
        rest.push(b'U');
        assert_eq!(rest.len(), 10);

        let mut payload = vec![CharsetCommand::Request.as_byte()];
        payload.extend_from_slice(&rest);
        h.subnegotiation(&mut ctx, &payload);

        assert_eq!(
            *ctx.sent_subneg.borrow(),
            vec![(42, vec![CharsetCommand::Rejected.as_byte()])]
        );
    }

    #[test]
    fn request_with_no_resolvable_name_is_rejected() {
        let mut h = handler();
        let mut ctx = FakeCtx::default();
        ctx.enabled_us.insert(TelnetOption::Charset.as_byte());
        let mut payload = vec![CharsetCommand::Request.as_byte(), b';'];
        payload.extend_from_slice(b"KOI8-R");
        h.subnegotiation(&mut ctx, &payload);
        assert_eq!(
            *ctx.sent_subneg.borrow(),
            vec![(42, vec![CharsetCommand::Rejected.as_byte()])]
        );
    }

    #[test]
    fn ttable_is_replies_with_ttable_rejected() {
        let mut h = handler();
        let mut ctx = FakeCtx::default();
        h.subnegotiation(&mut ctx, &[CharsetCommand::TtableIs.as_byte(), 0x01]);
        assert_eq!(
            *ctx.sent_subneg.borrow(),
            vec![(42, vec![CharsetCommand::TtableRejected.as_byte()])]
        );
    }
}
