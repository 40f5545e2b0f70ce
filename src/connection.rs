//! The connection object tying the frame codec, the Q-method negotiation
//! engine, and the pluggable text encoding together over one transport.

use std::cell::RefCell;
use std::io;
use std::io::{Read, Write};
use std::rc::Rc;

use crate::codec::{AsciiCodec, CharsetRegistry, Codec, DefaultCharsetRegistry};
use crate::command::{DO, DONT, WILL, WONT};
use crate::error::TelnetError;
use crate::frame::Frame;
use crate::handlers::{CharsetHandler, SuppressGoAheadHandler, TransmitBinaryHandler};
use crate::logger::{Logger, TracingLogger};
use crate::negotiation::{NegotiationContext, NegotiationEngine, OptionHandler, OptionMap};
use crate::option::TelnetOption;
use crate::reader::FrameReader;
use crate::writer::FrameWriter;

const DEFAULT_BUF_SIZE: usize = 4096;

/// The [`NegotiationContext`] implementation handed to handlers while a
/// frame is being processed. Borrows exactly the `Connection` fields it
/// needs, disjointly from the `negotiation` engine that drives it, so that a
/// handler's reply write can reach the same transport the frame came from.
struct ConnCtx<'a, S> {
    stream: &'a mut S,
    frame_writer: &'a mut FrameWriter,
    options: Rc<RefCell<OptionMap>>,
    read_codec: &'a mut Box<dyn Codec>,
    write_codec: &'a mut Box<dyn Codec>,
    suppress_go_ahead: &'a mut bool,
    logger: &'a dyn Logger,
    /// Data bytes decoded off the wire since the last codec swap, still
    /// waiting on whatever codec turns out to be current when the chunk
    /// finishes draining.
    raw_segment: &'a mut Vec<u8>,
    /// Data already run through the codec that was active when it arrived,
    /// ahead of whatever's left in `raw_segment`.
    decoded_accum: &'a mut Vec<u8>,
}

impl<'a, S: Write> NegotiationContext for ConnCtx<'a, S> {
    fn send_option_cmd(&mut self, cmd: u8, opt: u8) -> io::Result<()> {
        self.frame_writer.send_option_cmd(self.stream, cmd, opt)
    }

    fn send_subneg(&mut self, opt: u8, payload: &[u8]) -> io::Result<()> {
        self.frame_writer.send_subneg(self.stream, opt, payload)
    }

    fn is_enabled_them(&self, opt: u8) -> bool {
        self.options.borrow().get(opt).enabled_for_them()
    }

    fn is_enabled_us(&self, opt: u8) -> bool {
        self.options.borrow().get(opt).enabled_for_us()
    }

    fn set_read_codec(&mut self, codec: Box<dyn Codec>) {
        // Bytes already sitting in `raw_segment` arrived under the codec
        // this call is about to replace; run them through it now so a swap
        // mid-chunk never reinterprets pre-swap bytes under the new codec.
        if !self.raw_segment.is_empty() {
            let flushed = self.read_codec.decode(self.raw_segment);
            self.decoded_accum.extend_from_slice(&flushed);
            self.raw_segment.clear();
        }
        *self.read_codec = codec;
    }

    fn set_write_codec(&mut self, codec: Box<dyn Codec>) {
        *self.write_codec = codec;
    }

    fn set_suppress_go_ahead(&mut self, value: bool) {
        *self.suppress_go_ahead = value;
    }

    fn logger(&self) -> &dyn Logger {
        self.logger
    }
}

/// A TELNET connection over any duplex byte transport.
///
/// Wraps `S` with the IAC/newline frame codec, the RFC 1143 negotiation
/// engine, and a pair of swappable [`Codec`]s for the user-facing text
/// encoding. `TRANSMIT-BINARY`, `SUPPRESS-GO-AHEAD`, and `CHARSET` handlers
/// are registered automatically; additional handlers can be added with
/// [`Connection::register_handler`].
///
/// Not `Sync`: reads and writes mutate shared state (the option table, the
/// active codecs) and must not be driven concurrently from more than one
/// thread.
pub struct Connection<S> {
    stream: S,
    frame_reader: FrameReader,
    frame_writer: FrameWriter,
    negotiation: NegotiationEngine,
    read_codec: Box<dyn Codec>,
    write_codec: Box<dyn Codec>,
    suppress_go_ahead: bool,
    logger: Box<dyn Logger>,
    buf_size: usize,
    /// Decoded bytes not yet delivered to a caller. A codec's `decode` can
    /// expand its input (e.g. replacing one high byte with a multi-byte
    /// replacement character), so one `read` of the transport can yield more
    /// user-facing bytes than the caller's buffer can hold in one call.
    pending: Vec<u8>,
    pending_pos: usize,
}

impl<S: Read + Write> Connection<S> {
    /// Wraps `stream` with default settings: ASCII encoding on both paths,
    /// go-ahead not suppressed, every option at `No/No` with permissions
    /// denied, and the three built-in handlers registered.
    pub fn new(stream: S) -> Connection<S> {
        ConnectionBuilder::new().build(stream)
    }

    /// Reads and decodes up to `buf.len()` bytes of data, driving any
    /// protocol frames found along the way to completion (Q-method
    /// transitions, handler notifications, and any reply writes they
    /// trigger) before returning. Returns the number of user-facing bytes
    /// written to `buf`. `0` means either the peer closed the connection or
    /// the chunk just read carried nothing but protocol frames (a command,
    /// a swallowed `GA`, a subnegotiation) and produced no data bytes;
    /// callers that need to distinguish the two should watch for the
    /// underlying transport reaching true EOF on a later call instead.
    pub fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending_pos < self.pending.len() {
            return Ok(self.drain_pending(buf));
        }

        let mut scratch = vec![0u8; self.buf_size.max(1)];
        let n = self.stream.read(&mut scratch)?;
        if n == 0 {
            return Ok(0);
        }

        let options = self.negotiation.options_handle();
        let stream = &mut self.stream;
        let frame_writer = &mut self.frame_writer;
        let read_codec = &mut self.read_codec;
        let write_codec = &mut self.write_codec;
        let suppress_go_ahead = &mut self.suppress_go_ahead;
        let logger: &dyn Logger = self.logger.as_ref();
        let negotiation = &mut self.negotiation;

        // Decoded one byte at a time (not as one batch) so a codec swap
        // triggered mid-chunk by a handler can flush everything produced so
        // far through the codec that was actually active when it arrived,
        // rather than the codec left active once the whole chunk is done.
        let mut raw_segment: Vec<u8> = Vec::new();
        let mut decoded_accum: Vec<u8> = Vec::new();
        let mut out_byte = [0u8; 1];

        for &byte in &scratch[..n] {
            let written = self.frame_reader.decode(&[byte], &mut out_byte, |frame| {
                let mut ctx = ConnCtx {
                    stream,
                    frame_writer,
                    options: options.clone(),
                    read_codec,
                    write_codec,
                    suppress_go_ahead,
                    logger,
                    raw_segment: &mut raw_segment,
                    decoded_accum: &mut decoded_accum,
                };
                match frame {
                    Frame::GoAhead => Ok(()),
                    Frame::OptionCmd { cmd, opt } => negotiation.dispatch_command(&mut ctx, cmd, opt),
                    Frame::Subneg { opt, payload } => {
                        negotiation.dispatch_subneg(&mut ctx, opt, &payload);
                        Ok(())
                    }
                }
            })?;
            if written > 0 {
                raw_segment.push(out_byte[0]);
            }
        }

        if !raw_segment.is_empty() {
            let flushed = read_codec.decode(&raw_segment);
            decoded_accum.extend_from_slice(&flushed);
        }

        self.pending = decoded_accum;
        self.pending_pos = 0;
        Ok(self.drain_pending(buf))
    }

    fn drain_pending(&mut self, buf: &mut [u8]) -> usize {
        let available = &self.pending[self.pending_pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pending_pos += n;
        if self.pending_pos >= self.pending.len() {
            self.pending.clear();
            self.pending_pos = 0;
        }
        n
    }

    /// Encodes and writes `buf` as data, escaping `IAC` and expanding
    /// newlines. If `SUPPRESS-GO-AHEAD` has not been negotiated on our half,
    /// follows the write with `IAC GA`, matching the legacy half-duplex
    /// turn-marker convention.
    pub fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let encoded = self.write_codec.encode(buf);
        let n = self.frame_writer.write(&mut self.stream, &encoded)?;
        if !self.suppress_go_ahead {
            self.frame_writer.send_go_ahead(&mut self.stream)?;
        }
        // `n` counts encoded bytes consumed, which for every codec here is
        // `encoded.len()`; report the caller's own byte count instead.
        let _ = n;
        Ok(buf.len())
    }

    /// Writes `bytes` to the transport unescaped and unencoded, bypassing
    /// both the frame writer and the active codec. Intended for sending
    /// pre-framed protocol bytes a caller has assembled itself.
    pub fn send_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes)
    }

    /// Requests that the peer start performing `opt` (sends `DO` if the
    /// local state machine calls for it).
    pub fn enable_them(&mut self, opt: u8) -> io::Result<()> {
        let send = self.negotiation.options_mut().entry(opt).enable_them();
        if send {
            self.frame_writer
                .send_option_cmd(&mut self.stream, DO, opt)?;
        }
        Ok(())
    }

    /// Requests that the peer stop performing `opt` (sends `DONT` if the
    /// local state machine calls for it).
    pub fn disable_them(&mut self, opt: u8) -> io::Result<()> {
        let send = self.negotiation.options_mut().entry(opt).disable_them();
        if send {
            self.frame_writer
                .send_option_cmd(&mut self.stream, DONT, opt)?;
        }
        Ok(())
    }

    /// Offers to start performing `opt` ourselves (sends `WILL` if the local
    /// state machine calls for it).
    pub fn enable_us(&mut self, opt: u8) -> io::Result<()> {
        let send = self.negotiation.options_mut().entry(opt).enable_us();
        if send {
            self.frame_writer
                .send_option_cmd(&mut self.stream, WILL, opt)?;
        }
        Ok(())
    }

    /// Withdraws our performance of `opt` (sends `WONT` if the local state
    /// machine calls for it).
    pub fn disable_us(&mut self, opt: u8) -> io::Result<()> {
        let send = self.negotiation.options_mut().entry(opt).disable_us();
        if send {
            self.frame_writer
                .send_option_cmd(&mut self.stream, WONT, opt)?;
        }
        Ok(())
    }

    pub fn is_enabled_them(&self, opt: u8) -> bool {
        self.negotiation.option_state(opt).enabled_for_them()
    }

    pub fn is_enabled_us(&self, opt: u8) -> bool {
        self.negotiation.option_state(opt).enabled_for_us()
    }

    /// Installs `codec` on the read path. Fails with
    /// [`TelnetError::CharsetNotEnabled`] unless CHARSET is currently
    /// enabled for us.
    pub fn set_read_encoding(&mut self, codec: Box<dyn Codec>) -> Result<(), TelnetError> {
        self.require_charset_enabled()?;
        self.read_codec = codec;
        Ok(())
    }

    /// Installs `codec` on the write path. Fails with
    /// [`TelnetError::CharsetNotEnabled`] unless CHARSET is currently
    /// enabled for us.
    pub fn set_write_encoding(&mut self, codec: Box<dyn Codec>) -> Result<(), TelnetError> {
        self.require_charset_enabled()?;
        self.write_codec = codec;
        Ok(())
    }

    /// Installs `codec` on both the read and write paths.
    pub fn set_encoding(&mut self, codec: Box<dyn Codec>) -> Result<(), TelnetError> {
        self.require_charset_enabled()?;
        self.read_codec = codec.clone_box();
        self.write_codec = codec;
        Ok(())
    }

    fn require_charset_enabled(&self) -> Result<(), TelnetError> {
        if self.is_enabled_us(TelnetOption::Charset.as_byte()) {
            Ok(())
        } else {
            Err(TelnetError::CharsetNotEnabled)
        }
    }

    pub fn register_handler(&mut self, handler: Box<dyn OptionHandler>) {
        self.negotiation.register_handler(handler);
    }

    pub fn set_suppress_go_ahead(&mut self, value: bool) {
        self.suppress_go_ahead = value;
    }

    pub fn suppress_go_ahead(&self) -> bool {
        self.suppress_go_ahead
    }

    pub fn set_logger(&mut self, logger: Box<dyn Logger>) {
        self.logger = logger;
    }

    pub fn buf_size(&self) -> usize {
        self.buf_size
    }

    /// Borrows the underlying transport, e.g. to set socket options.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

/// Collects the choices that must be made before the first `read`/`write`:
/// buffer size, initial permissions per option, and the starting codec.
pub struct ConnectionBuilder {
    buf_size: usize,
    allow_them: Vec<u8>,
    allow_us: Vec<u8>,
    charset_allow_us: bool,
    initial_codec: Option<Box<dyn Codec>>,
    logger: Option<Box<dyn Logger>>,
}

impl Default for ConnectionBuilder {
    fn default() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }
}

impl ConnectionBuilder {
    pub fn new() -> ConnectionBuilder {
        ConnectionBuilder {
            buf_size: DEFAULT_BUF_SIZE,
            allow_them: Vec::new(),
            allow_us: Vec::new(),
            charset_allow_us: false,
            initial_codec: None,
            logger: None,
        }
    }

    pub fn buf_size(mut self, size: usize) -> ConnectionBuilder {
        self.buf_size = size;
        self
    }

    /// Permits the peer to enable `opt` on their half without us rejecting
    /// it (sets `allow_them`).
    pub fn allow_them(mut self, opt: u8) -> ConnectionBuilder {
        self.allow_them.push(opt);
        self
    }

    /// Permits the peer to request `opt` on our half without us rejecting
    /// it (sets `allow_us`).
    pub fn allow_us(mut self, opt: u8) -> ConnectionBuilder {
        self.allow_us.push(opt);
        self
    }

    /// Offers CHARSET to the peer (sets CHARSET's `allow_us`, which is
    /// otherwise left `false`).
    pub fn offer_charset(mut self) -> ConnectionBuilder {
        self.charset_allow_us = true;
        self
    }

    pub fn initial_codec(mut self, codec: Box<dyn Codec>) -> ConnectionBuilder {
        self.initial_codec = Some(codec);
        self
    }

    pub fn logger(mut self, logger: Box<dyn Logger>) -> ConnectionBuilder {
        self.logger = Some(logger);
        self
    }

    pub fn build<S: Read + Write>(self, stream: S) -> Connection<S> {
        let mut negotiation = NegotiationEngine::new();
        negotiation.register_handler(Box::new(TransmitBinaryHandler));
        negotiation.register_handler(Box::new(SuppressGoAheadHandler));
        let registry: Box<dyn CharsetRegistry> = Box::new(DefaultCharsetRegistry);
        negotiation.register_handler(Box::new(CharsetHandler::new(registry)));

        for opt in &self.allow_them {
            negotiation.options_mut().entry(*opt).allow_them = true;
        }
        for opt in &self.allow_us {
            negotiation.options_mut().entry(*opt).allow_us = true;
        }
        negotiation
            .options_mut()
            .entry(TelnetOption::Charset.as_byte())
            .allow_us = self.charset_allow_us;

        let read_codec: Box<dyn Codec> = self
            .initial_codec
            .as_ref()
            .map(|c| c.clone_box())
            .unwrap_or_else(|| Box::new(AsciiCodec));
        let write_codec: Box<dyn Codec> = self.initial_codec.unwrap_or_else(|| Box::new(AsciiCodec));

        Connection {
            stream,
            frame_reader: FrameReader::new(),
            frame_writer: FrameWriter::new(),
            negotiation,
            read_codec,
            write_codec,
            suppress_go_ahead: false,
            logger: self.logger.unwrap_or_else(|| Box::new(TracingLogger)),
            buf_size: self.buf_size,
            pending: Vec::new(),
            pending_pos: 0,
        }
    }
}
