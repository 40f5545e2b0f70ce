//! Application-facing precondition failures, distinct from transport I/O errors.
//!
//! Transport and decode failures always surface as [`std::io::Error`] from
//! `read`/`write`. `TelnetError` is reserved for synchronous misuse of the API
//! itself — asking for something the peer hasn't agreed to yet.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelnetError {
    /// An encoding change was requested but the CHARSET option is not
    /// currently enabled on our half.
    #[error("charset option is not enabled for us")]
    CharsetNotEnabled,

    /// An encoding name was requested that this connection's charset
    /// registry does not recognize.
    #[error("unknown charset: {0}")]
    UnknownCharset(String),
}
