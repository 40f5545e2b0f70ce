//! The pluggable text-encoding seam installed around the frame codec.
//!
//! `Connection::read`/`write` always deal in UTF-8 bytes on the user-facing
//! side. A `Codec` bridges that to whatever the wire is actually carrying:
//! `decode` turns wire bytes into UTF-8 bytes for the reader; `encode` turns
//! UTF-8 bytes from the caller into wire bytes for the writer.

/// A byte-oriented text transform installed on the read or write path.
pub trait Codec: Send {
    fn name(&self) -> &str;
    fn decode(&mut self, wire: &[u8]) -> Vec<u8>;
    fn encode(&mut self, user: &[u8]) -> Vec<u8>;

    /// Produces a fresh, independent instance of this codec. `Connection`
    /// uses this to install the same encoding on both the read and write
    /// path from one caller-supplied instance, since `Box<dyn Codec>` can't
    /// derive `Clone` on its own.
    fn clone_box(&self) -> Box<dyn Codec>;
}

/// The identity transform: no restriction on the channel's byte values.
#[derive(Debug, Default, Clone)]
pub struct BinaryCodec;

impl Codec for BinaryCodec {
    fn name(&self) -> &str {
        "BINARY"
    }

    fn decode(&mut self, wire: &[u8]) -> Vec<u8> {
        wire.to_vec()
    }

    fn encode(&mut self, user: &[u8]) -> Vec<u8> {
        user.to_vec()
    }

    fn clone_box(&self) -> Box<dyn Codec> {
        Box::new(BinaryCodec)
    }
}

/// 7-bit-clean: bytes with the high bit set are not valid on the wire, so
/// the decoder replaces each with the Unicode replacement character.
#[derive(Debug, Default, Clone)]
pub struct AsciiCodec;

const REPLACEMENT_CHAR: &[u8] = "\u{FFFD}".as_bytes();

impl Codec for AsciiCodec {
    fn name(&self) -> &str {
        "US-ASCII"
    }

    fn decode(&mut self, wire: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(wire.len());
        for &b in wire {
            if b < 0x80 {
                out.push(b);
            } else {
                out.extend_from_slice(REPLACEMENT_CHAR);
            }
        }
        out
    }

    fn encode(&mut self, user: &[u8]) -> Vec<u8> {
        user.to_vec()
    }

    fn clone_box(&self) -> Box<dyn Codec> {
        Box::new(AsciiCodec)
    }
}

/// The wire already carries UTF-8; no transform needed in either direction.
#[derive(Debug, Default, Clone)]
pub struct Utf8Codec;

impl Codec for Utf8Codec {
    fn name(&self) -> &str {
        "UTF-8"
    }

    fn decode(&mut self, wire: &[u8]) -> Vec<u8> {
        wire.to_vec()
    }

    fn encode(&mut self, user: &[u8]) -> Vec<u8> {
        user.to_vec()
    }

    fn clone_box(&self) -> Box<dyn Codec> {
        Box::new(Utf8Codec)
    }
}

/// Resolves an IANA charset name to a [`Codec`]. This core's default
/// registry recognizes only `"UTF-8"` and `"US-ASCII"`, matching the
/// upstream protocol's own built-in charset support; a host application can
/// supply a richer registry backed by a full IANA charset crate.
pub trait CharsetRegistry: Send {
    fn lookup(&self, name: &str) -> Option<Box<dyn Codec>>;
}

#[derive(Debug, Default)]
pub struct DefaultCharsetRegistry;

impl CharsetRegistry for DefaultCharsetRegistry {
    fn lookup(&self, name: &str) -> Option<Box<dyn Codec>> {
        match name {
            "UTF-8" => Some(Box::new(Utf8Codec)),
            "US-ASCII" => Some(Box::new(AsciiCodec)),
            _ => None,
        }
    }
}
