//! TCP convenience constructor. Everything else in this crate works over any
//! `Read + Write` transport; this is the one seam that reaches for a concrete
//! one.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};

use crate::connection::{Connection, ConnectionBuilder};

/// Dials `addr` and wraps the resulting `TcpStream` in a [`Connection`] with
/// the given read buffer size and otherwise-default settings.
pub fn connect<A: ToSocketAddrs>(addr: A, buf_size: usize) -> io::Result<Connection<TcpStream>> {
    let stream = TcpStream::connect(addr)?;
    Ok(ConnectionBuilder::new().buf_size(buf_size).build(stream))
}

/// Dials `addr` with a caller-supplied [`ConnectionBuilder`], e.g. to set
/// initial option permissions before the first byte is read.
pub fn connect_with(addr: impl ToSocketAddrs, builder: ConnectionBuilder) -> io::Result<Connection<TcpStream>> {
    let stream = TcpStream::connect(addr)?;
    Ok(builder.build(stream))
}
