//! The push-style TELNET byte encoder.

use std::io;
use std::io::Write;

use crate::command::{GA, IAC, SE};

/// Encodes outbound data bytes into a TELNET-safe byte stream: escapes literal
/// `IAC` bytes, expands bare `\n` into `\r\n` and bare `\r` into `\r\0`, and
/// offers raw passthrough for already-framed command/subnegotiation bytes.
///
/// Carries no state of its own; every method takes the sink to write to, so a
/// single [`FrameWriter`] can be shared by code that also needs to hand the
/// same transport to a reader (see [`crate::connection::Connection`]).
///
/// Each call batches its escaped output into a single call to the sink
/// rather than writing byte by byte.
#[derive(Debug, Default)]
pub struct FrameWriter;

impl FrameWriter {
    pub fn new() -> FrameWriter {
        FrameWriter
    }

    /// Escapes and writes `buf` as ordinary data, returning the number of
    /// input bytes consumed (not the number of bytes placed on the wire).
    pub fn write<W: Write>(&mut self, sink: &mut W, buf: &[u8]) -> io::Result<usize> {
        let mut out = Vec::with_capacity(buf.len());
        for &b in buf {
            match b {
                b'\n' => out.extend_from_slice(b"\r\n"),
                b'\r' => out.extend_from_slice(&[b'\r', 0x00]),
                IAC => out.extend_from_slice(&[IAC, IAC]),
                other => out.push(other),
            }
        }
        sink.write_all(&out)?;
        Ok(buf.len())
    }

    /// Sends `IAC GA`.
    pub fn send_go_ahead<W: Write>(&mut self, sink: &mut W) -> io::Result<()> {
        sink.write_all(&[IAC, GA])
    }

    /// Sends `IAC <cmd> <opt>`, e.g. `IAC DO <opt>`.
    pub fn send_option_cmd<W: Write>(&mut self, sink: &mut W, cmd: u8, opt: u8) -> io::Result<()> {
        sink.write_all(&[IAC, cmd, opt])
    }

    /// Sends `IAC SB <opt> <payload, with IAC doubled> IAC SE`.
    pub fn send_subneg<W: Write>(
        &mut self,
        sink: &mut W,
        opt: u8,
        payload: &[u8],
    ) -> io::Result<()> {
        let mut out = Vec::with_capacity(payload.len() + 5);
        out.push(IAC);
        out.push(crate::command::SB);
        out.push(opt);
        for &b in payload {
            if b == IAC {
                out.push(IAC);
            }
            out.push(b);
        }
        out.push(IAC);
        out.push(SE);
        sink.write_all(&out)
    }

    pub fn flush<W: Write>(&mut self, sink: &mut W) -> io::Result<()> {
        sink.flush()
    }
}
