//! The RFC 1143 Q-method option negotiation state machine.

use crate::command::{DO, DONT, WILL, WONT};

/// One half-option's negotiation state.
///
/// Six states, matching RFC 1143 exactly. `No`/`Yes` are the settled states;
/// the `Want*` states track a negotiation in flight, with `Opposite` recording
/// that we changed our mind while waiting for the peer's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QState {
    No,
    Yes,
    WantNoEmpty,
    WantNoOpposite,
    WantYesEmpty,
    WantYesOpposite,
}

impl Default for QState {
    fn default() -> QState {
        QState::No
    }
}

/// A single option's negotiation state and permissions, keyed externally by
/// option code in [`crate::negotiation::OptionMap`].
///
/// `them` tracks whether the peer performs the option; `us` tracks whether we
/// do. `allow_them`/`allow_us` gate only the *response to an unsolicited
/// request* — they never block a locally initiated `enable_them`/`enable_us`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionEntry {
    pub them: QState,
    pub us: QState,
    pub allow_them: bool,
    pub allow_us: bool,
}

impl OptionEntry {
    pub fn new() -> OptionEntry {
        OptionEntry::default()
    }

    pub fn enabled_for_them(&self) -> bool {
        self.them == QState::Yes
    }

    pub fn enabled_for_us(&self) -> bool {
        self.us == QState::Yes
    }

    /// Local request that the peer start performing the option (sends `DO`).
    /// Returns `true` if a `DO` should be sent to the wire.
    pub fn enable_them(&mut self) -> bool {
        enable(&mut self.them)
    }

    /// Local request that we start performing the option (sends `WILL`).
    /// Returns `true` if a `WILL` should be sent to the wire.
    pub fn enable_us(&mut self) -> bool {
        enable(&mut self.us)
    }

    /// Local request that the peer stop performing the option (sends `DONT`).
    /// Returns `true` if a `DONT` should be sent to the wire.
    pub fn disable_them(&mut self) -> bool {
        disable(&mut self.them)
    }

    /// Local request that we stop performing the option (sends `WONT`).
    /// Returns `true` if a `WONT` should be sent to the wire.
    pub fn disable_us(&mut self) -> bool {
        disable(&mut self.us)
    }

    /// Process a received `DO`/`DONT`/`WILL`/`WONT` for this option.
    /// Returns the reply byte (`WILL`/`WONT`/`DO`/`DONT`) to send, if any.
    pub fn receive(&mut self, verb_byte: u8) -> Option<u8> {
        match verb_byte {
            DO => receive_enable_request(&mut self.us, self.allow_us, WILL, WONT),
            DONT => receive_disable_demand(&mut self.us, WILL, WONT),
            WILL => receive_enable_request(&mut self.them, self.allow_them, DO, DONT),
            WONT => receive_disable_demand(&mut self.them, DO, DONT),
            _ => None,
        }
    }
}

fn enable(state: &mut QState) -> bool {
    match *state {
        QState::No => {
            *state = QState::WantYesEmpty;
            true
        }
        QState::Yes => false,
        QState::WantNoEmpty => {
            *state = QState::WantNoOpposite;
            false
        }
        QState::WantNoOpposite => false,
        QState::WantYesEmpty => false,
        QState::WantYesOpposite => {
            *state = QState::WantYesEmpty;
            false
        }
    }
}

fn disable(state: &mut QState) -> bool {
    match *state {
        QState::No => false,
        QState::Yes => {
            *state = QState::WantNoEmpty;
            true
        }
        QState::WantNoEmpty => false,
        QState::WantNoOpposite => {
            *state = QState::WantNoEmpty;
            false
        }
        QState::WantYesEmpty => {
            *state = QState::WantYesOpposite;
            false
        }
        QState::WantYesOpposite => false,
    }
}

fn receive_enable_request(
    state: &mut QState,
    allowed: bool,
    accept: u8,
    reject: u8,
) -> Option<u8> {
    match *state {
        QState::No => {
            if allowed {
                *state = QState::Yes;
                Some(accept)
            } else {
                Some(reject)
            }
        }
        QState::Yes => None,
        QState::WantNoEmpty => {
            *state = QState::No;
            None
        }
        QState::WantNoOpposite => {
            *state = QState::Yes;
            None
        }
        QState::WantYesEmpty => {
            *state = QState::Yes;
            None
        }
        QState::WantYesOpposite => {
            *state = QState::WantNoEmpty;
            Some(reject)
        }
    }
}

fn receive_disable_demand(state: &mut QState, accept: u8, reject: u8) -> Option<u8> {
    match *state {
        QState::No => None,
        QState::Yes => {
            *state = QState::No;
            Some(reject)
        }
        QState::WantNoEmpty => {
            *state = QState::No;
            None
        }
        QState::WantNoOpposite => {
            *state = QState::WantYesEmpty;
            Some(accept)
        }
        QState::WantYesEmpty => {
            *state = QState::No;
            None
        }
        QState::WantYesOpposite => {
            *state = QState::No;
            None
        }
    }
}
