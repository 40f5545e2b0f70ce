//! The byte-by-byte TELNET decode state machine.
//!
//! [`FrameReader`] is a pure state machine: `decode` consumes an input slice
//! and produces data bytes plus a side-channel of [`Frame`]s, diverted
//! through a callback. It never produces more output bytes than it
//! consumes, so callers can always size their output buffer to at least the
//! input length. State persists across calls so a frame split across two
//! chunks still decodes correctly. The convenience [`FrameReader::read`]
//! method additionally owns the chunk-pulling step for standalone use over a
//! single-direction [`std::io::Read`].

use std::io;
use std::io::Read;

use crate::command::{DO, DONT, GA, IAC, SB, SE, WILL, WONT};
use crate::frame::Frame;

#[derive(Debug)]
enum State {
    Byte,
    Cr,
    Command,
    OptionArg(u8),
    SubnegOption,
    SubnegRead(u8, Vec<u8>),
    SubnegIac(u8, Vec<u8>),
}

/// Decodes a TELNET byte stream, stripping framing and diverting embedded
/// protocol frames to a callback.
pub struct FrameReader {
    state: State,
}

impl Default for FrameReader {
    fn default() -> FrameReader {
        FrameReader::new()
    }
}

impl FrameReader {
    pub fn new() -> FrameReader {
        FrameReader { state: State::Byte }
    }

    /// Decodes `input` fully, writing data bytes to `out` and diverting
    /// frames to `on_frame`. Returns the number of bytes written to `out`.
    ///
    /// `out` must be at least `input.len()` long: decoding never expands
    /// (every transition consumes one input byte and emits at most one
    /// output byte).
    ///
    /// If `on_frame` returns an error, decoding stops immediately; bytes
    /// already written to `out` remain valid and are reflected in the
    /// returned count.
    pub fn decode(
        &mut self,
        input: &[u8],
        out: &mut [u8],
        mut on_frame: impl FnMut(Frame) -> io::Result<()>,
    ) -> io::Result<usize> {
        let mut written = 0;
        for &byte in input {
            if let Some(b) = self.step(byte, &mut on_frame)? {
                out[written] = b;
                written += 1;
            }
        }
        Ok(written)
    }

    /// Convenience wrapper for standalone use over a single [`Read`]: pulls
    /// one chunk sized to `buf.len()` and decodes it. Not used by
    /// [`crate::connection::Connection`], which shares one transport between
    /// its reader and writer and so calls [`Self::decode`] directly.
    pub fn read<R: Read>(
        &mut self,
        source: &mut R,
        buf: &mut [u8],
        on_frame: impl FnMut(Frame) -> io::Result<()>,
    ) -> io::Result<usize> {
        let mut scratch = vec![0u8; buf.len().max(1)];
        let n = source.read(&mut scratch)?;
        self.decode(&scratch[..n], buf, on_frame)
    }

    fn step(
        &mut self,
        byte: u8,
        on_frame: &mut impl FnMut(Frame) -> io::Result<()>,
    ) -> io::Result<Option<u8>> {
        let state = std::mem::replace(&mut self.state, State::Byte);

        match state {
            State::Byte => match byte {
                IAC => {
                    self.state = State::Command;
                    Ok(None)
                }
                b'\r' => {
                    self.state = State::Cr;
                    Ok(None)
                }
                other => {
                    self.state = State::Byte;
                    Ok(Some(other))
                }
            },
            State::Cr => match byte {
                0x00 => {
                    self.state = State::Byte;
                    Ok(Some(b'\r'))
                }
                b'\r' => {
                    self.state = State::Byte;
                    Ok(None)
                }
                other => {
                    self.state = State::Byte;
                    Ok(Some(other))
                }
            },
            State::Command => match byte {
                IAC => {
                    self.state = State::Byte;
                    Ok(Some(IAC))
                }
                DO | DONT | WILL | WONT => {
                    self.state = State::OptionArg(byte);
                    Ok(None)
                }
                GA => {
                    self.state = State::Byte;
                    on_frame(Frame::GoAhead)?;
                    Ok(None)
                }
                SB => {
                    self.state = State::SubnegOption;
                    Ok(None)
                }
                _ => {
                    // Unrecognized IAC <cmd>: silently discarded.
                    self.state = State::Byte;
                    Ok(None)
                }
            },
            State::OptionArg(cmd) => {
                self.state = State::Byte;
                on_frame(Frame::OptionCmd { cmd, opt: byte })?;
                Ok(None)
            }
            State::SubnegOption => {
                // The byte immediately after SB is the option code, captured
                // unconditionally so option 0 (TRANSMIT-BINARY) isn't mistaken
                // for "not seen yet".
                self.state = State::SubnegRead(byte, Vec::new());
                Ok(None)
            }
            State::SubnegRead(opt, mut acc) => {
                match byte {
                    IAC => {
                        self.state = State::SubnegIac(opt, acc);
                    }
                    other => {
                        acc.push(other);
                        self.state = State::SubnegRead(opt, acc);
                    }
                }
                Ok(None)
            }
            State::SubnegIac(opt, mut acc) => match byte {
                IAC => {
                    acc.push(IAC);
                    self.state = State::SubnegRead(opt, acc);
                    Ok(None)
                }
                SE => {
                    self.state = State::Byte;
                    if !acc.is_empty() {
                        on_frame(Frame::Subneg { opt, payload: acc })?;
                    }
                    Ok(None)
                }
                _ => {
                    // Malformed: IAC followed by neither IAC nor SE inside a
                    // subnegotiation. End the subnegotiation without
                    // corrupting subsequent parsing.
                    self.state = State::Byte;
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(input: &[u8]) -> (Vec<u8>, Vec<Frame>) {
        let mut reader = FrameReader::new();
        let mut out = vec![0u8; input.len()];
        let mut frames = Vec::new();
        let n = reader
            .decode(input, &mut out, |f| {
                frames.push(f);
                Ok(())
            })
            .unwrap();
        out.truncate(n);
        (out, frames)
    }

    #[test]
    fn ga_swallow() {
        let (data, frames) = decode_all(&[0x68, 0xFF, 0xF9, 0x69]);
        assert_eq!(data, b"hi");
        assert_eq!(frames, vec![Frame::GoAhead]);
    }

    #[test]
    fn escaped_iac_in_data() {
        let (data, frames) = decode_all(&[0x40, 0x5a, 0xff, 0xff, 0x31, 0x34]);
        assert_eq!(data, vec![0x40, 0x5a, 0xff, 0x31, 0x34]);
        assert!(frames.is_empty());
    }

    #[test]
    fn option_command_frame() {
        let (data, frames) = decode_all(&[0xFF, 0xFD, 0x01]);
        assert!(data.is_empty());
        assert_eq!(
            frames,
            vec![Frame::OptionCmd {
                cmd: 0xFD,
                opt: 0x01
            }]
        );
    }

    #[test]
    fn cr_lf_collapses_to_cr() {
        let (data, _) = decode_all(b"a\r\nb");
        assert_eq!(data, b"a\rb");
    }

    #[test]
    fn bare_cr_followed_by_other_drops_cr() {
        let (data, _) = decode_all(b"a\rb");
        assert_eq!(data, b"ab");
    }

    #[test]
    fn double_cr_collapses() {
        let (data, _) = decode_all(b"a\r\rb");
        assert_eq!(data, b"ab");
    }

    #[test]
    fn subnegotiation_unescapes_doubled_iac() {
        let input = [0xFF, 0xFA, 0x2A, 0x01, 0xFF, 0xFF, 0x02, 0xFF, 0xF0];
        let (data, frames) = decode_all(&input);
        assert!(data.is_empty());
        assert_eq!(
            frames,
            vec![Frame::Subneg {
                opt: 0x2A,
                payload: vec![0x01, 0xFF, 0x02],
            }]
        );
    }

    #[test]
    fn subnegotiation_with_option_code_zero_keeps_its_first_payload_byte() {
        // TRANSMIT-BINARY is option 0; its code must not be confused with the
        // "not captured yet" case, or the first payload byte gets eaten.
        let input = [0xFF, 0xFA, 0x00, 0x01, 0x02, 0xFF, 0xF0];
        let (data, frames) = decode_all(&input);
        assert!(data.is_empty());
        assert_eq!(
            frames,
            vec![Frame::Subneg {
                opt: 0x00,
                payload: vec![0x01, 0x02],
            }]
        );
    }

    #[test]
    fn empty_subnegotiation_emits_no_frame() {
        let (data, frames) = decode_all(&[0xFF, 0xFA, 0x2A, 0xFF, 0xF0]);
        assert!(data.is_empty());
        assert!(frames.is_empty());
    }

    #[test]
    fn malformed_iac_inside_subneg_ends_it_without_corrupting_later_parse() {
        let input = [0xFF, 0xFA, 0x2A, 0x01, 0xFF, 0x41, b'o', b'k'];
        let (data, frames) = decode_all(&input);
        assert_eq!(data, b"ok");
        assert!(frames.is_empty());
    }

    #[test]
    fn survives_arbitrary_chunking() {
        // Drive the state machine one byte at a time to confirm a frame split
        // across many small reads still decodes correctly.
        let mut reader = FrameReader::new();
        let mut data = Vec::new();
        let mut frames = Vec::new();
        for &byte in &[0x68u8, 0xFF, 0xFD, 0x01, 0x69] {
            let mut out = [0u8; 1];
            let n = reader
                .decode(&[byte], &mut out, |f| {
                    frames.push(f);
                    Ok(())
                })
                .unwrap();
            data.extend_from_slice(&out[..n]);
        }
        assert_eq!(data, b"hi");
        assert_eq!(
            frames,
            vec![Frame::OptionCmd {
                cmd: 0xFD,
                opt: 0x01
            }]
        );
    }

    #[test]
    fn read_convenience_pulls_from_a_reader() {
        use std::io::Cursor;
        let mut reader = FrameReader::new();
        let mut source = Cursor::new(vec![0x68u8, 0xFF, 0xF9, 0x69]);
        let mut buf = [0u8; 16];
        let mut frames = Vec::new();
        let n = reader
            .read(&mut source, &mut buf, |f| {
                frames.push(f);
                Ok(())
            })
            .unwrap();
        assert_eq!(&buf[..n], b"hi");
        assert_eq!(frames, vec![Frame::GoAhead]);
    }
}
