//! A TELNET (RFC 854) protocol codec and RFC 1143 option-negotiation engine.
//!
//! This crate decodes and encodes the wire-level framing (`IAC` escaping,
//! `\r\n`/`\r\0` newline handling, `GA` swallowing) and drives the Q-method
//! state machine for option negotiation, with built-in handlers for
//! `TRANSMIT-BINARY`, `SUPPRESS-GO-AHEAD`, and `CHARSET` (RFC 2066). It does
//! not implement a terminal, a line editor, or any option's application-level
//! behavior beyond those three; host applications register additional
//! [`negotiation::OptionHandler`]s for anything else (`NAWS`, `TERMINAL-TYPE`,
//! ...).
//!
//! [`Connection`] is the entry point: it owns a transport, the frame codec,
//! the negotiation engine, and a pluggable text encoding, and exposes a plain
//! `read`/`write` pair that looks like any other duplex stream to a caller
//! while handling protocol bytes transparently underneath.

pub mod codec;
pub mod command;
pub mod connection;
pub mod dial;
pub mod error;
pub mod frame;
pub mod handlers;
pub mod logger;
pub mod negotiation;
pub mod option;
pub mod qstate;
pub mod reader;
pub mod writer;

pub use codec::{AsciiCodec, BinaryCodec, Codec, CharsetRegistry, DefaultCharsetRegistry, Utf8Codec};
pub use connection::{Connection, ConnectionBuilder};
pub use dial::{connect, connect_with};
pub use error::TelnetError;
pub use frame::Frame;
pub use logger::{Level, Logger, NullLogger, TracingLogger};
pub use negotiation::{NegotiationContext, NegotiationEngine, OptionHandler, OptionMap};
pub use option::TelnetOption;
pub use qstate::{OptionEntry, QState};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{DO, WILL};
    use std::io::{self, Cursor, Read, Write};

    struct MockStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl MockStream {
        fn new(input: Vec<u8>) -> MockStream {
            MockStream {
                input: Cursor::new(input),
                output: Vec::new(),
            }
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// End-to-end: a peer offer we have no permission for gets naively
    /// rejected, and no data byte is ever disturbed by the commands
    /// surrounding it.
    #[test]
    fn unsolicited_do_is_rejected_without_disturbing_surrounding_data() {
        let mut script = vec![b'h', b'i'];
        script.extend_from_slice(&[0xFF, DO, 0x05]);
        script.extend_from_slice(b"!!");
        let mut conn = Connection::new(MockStream::new(script));

        let mut buf = [0u8; 16];
        let n = conn.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hi!!");
        assert_eq!(conn.get_ref().output, vec![0xFF, command::WONT, 0x05]);
    }

    /// A literal `IAC` byte survives a write/read round trip: doubled going
    /// out, collapsed back to one coming in.
    #[test]
    fn write_then_read_round_trips_a_literal_iac_byte() {
        let mut writer_conn = Connection::new(MockStream::new(vec![]));
        writer_conn.set_suppress_go_ahead(true);
        writer_conn.write(&[0x68, 0xFF, 0x69]).unwrap();
        let wire = writer_conn.get_ref().output.clone();
        assert_eq!(wire, vec![0x68, 0xFF, 0xFF, 0x69]);

        let mut reader_conn = Connection::new(MockStream::new(wire));
        let mut buf = [0u8; 16];
        let n = reader_conn.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x68, 0xFF, 0x69]);
    }

    /// A Q-method `WantYes:Opposite` transition: we ask to enable, change
    /// our mind before the peer answers, then the peer's stale `WILL`
    /// arrives and must be immediately disabled rather than accepted.
    #[test]
    fn want_yes_opposite_disables_immediately_on_stale_will() {
        let mut conn = Connection::new(MockStream::new(vec![]));
        let opt = TelnetOption::Echo.as_byte();

        conn.enable_them(opt).unwrap();
        conn.disable_them(opt).unwrap();
        // `disable_them` while still awaiting the peer's answer to the first
        // `DO` doesn't send anything yet; it just flips the pending request
        // to `WantYes:Opposite` so the eventual reply is rejected instead.
        assert_eq!(conn.get_ref().output, vec![0xFF, DO, opt]);

        conn.get_mut().input = Cursor::new(vec![0xFF, WILL, opt]);
        conn.read(&mut [0u8; 16]).unwrap();

        assert!(!conn.is_enabled_them(opt));
        assert_eq!(
            conn.get_ref().output,
            vec![0xFF, DO, opt, 0xFF, command::DONT, opt]
        );
    }

    /// CHARSET's TTABLE variant is declined rather than silently ignored.
    #[test]
    fn charset_request_with_ttable_prefix_is_still_accepted() {
        let mut conn = ConnectionBuilder::new().offer_charset().build(MockStream::new(vec![]));

        // The peer's `DO CHARSET` alone brings `us` to `Yes`, since
        // `offer_charset` granted `allow_us` for this option.
        let mut script = vec![0xFF, DO, TelnetOption::Charset.as_byte()];
        let mut subneg = vec![0xFF, 0xFA, TelnetOption::Charset.as_byte()];
        subneg.push(1);
        subneg.extend_from_slice(b"[TTABLE]");
        subneg.push(0x01);
        subneg.push(b';');
        subneg.extend_from_slice(b"UTF-8");
        subneg.extend_from_slice(&[0xFF, 0xF0]);
        script.extend_from_slice(&subneg);
        conn.get_mut().input = Cursor::new(script);

        conn.read(&mut [0u8; 64]).unwrap();
        conn.read(&mut [0u8; 64]).unwrap();

        let out = &conn.get_ref().output;
        assert!(out
            .windows(2)
            .any(|w| w == [TelnetOption::Charset.as_byte(), 2]));
    }
}
