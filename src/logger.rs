//! The injectable logging seam.
//!
//! The core never decides how trace records are rendered or where they go.
//! It holds a `Logger`, defaulting to one that forwards into `tracing`'s
//! dispatch so a host application wires up `tracing-subscriber` exactly once
//! for the whole process. Nothing in the negotiation or codec logic is gated
//! on whether a logger is attached.

/// Severity of a logged record, mirroring the levels a host application's
/// tracing subscriber would filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

/// A sink for formatted trace records emitted by the negotiation core.
pub trait Logger: Send {
    fn log(&self, level: Level, target: &str, message: &str);
}

/// Discards every record. Useful when embedding the core in a context that
/// wants silence regardless of the process's global tracing configuration.
#[derive(Debug, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _target: &str, _message: &str) {}
}

/// The default logger: forwards records into the `tracing` crate.
#[derive(Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, target: &str, message: &str) {
        match level {
            Level::Error => tracing::error!(target: "telnet", %target, "{}", message),
            Level::Warn => tracing::warn!(target: "telnet", %target, "{}", message),
            Level::Info => tracing::info!(target: "telnet", %target, "{}", message),
            Level::Debug => tracing::debug!(target: "telnet", %target, "{}", message),
        }
    }
}
