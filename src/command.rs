//! Telnet command bytes ([RFC 854](https://www.rfc-editor.org/rfc/rfc854)) and the
//! RFC 2066 CHARSET subcommand bytes.

pub const IAC: u8 = 0xFF;
pub const DONT: u8 = 0xFE;
pub const DO: u8 = 0xFD;
pub const WONT: u8 = 0xFC;
pub const WILL: u8 = 0xFB;
pub const SB: u8 = 0xFA;
pub const GA: u8 = 0xF9;
pub const EL: u8 = 0xF8;
pub const EC: u8 = 0xF7;
pub const AYT: u8 = 0xF6;
pub const AO: u8 = 0xF5;
pub const IP: u8 = 0xF4;
pub const BRK: u8 = 0xF3;
pub const DM: u8 = 0xF2;
pub const NOP: u8 = 0xF1;
pub const SE: u8 = 0xF0;
pub const EOR: u8 = 0xEF;

/// A decoded TELNET command byte.
///
/// `Command` is mostly useful for formatting raw command bytes (`NOP`, `AYT`, ...)
/// that don't carry an option argument; `DO`/`DONT`/`WILL`/`WONT` and `SB` are
/// handled structurally by [`crate::frame::Frame`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Nop,
    DataMark,
    Break,
    InterruptProcess,
    AbortOutput,
    AreYouThere,
    EraseChar,
    EraseLine,
    GoAhead,
    EndOfRecord,
    Unknown(u8),
}

impl Command {
    pub fn parse(byte: u8) -> Command {
        match byte {
            NOP => Command::Nop,
            DM => Command::DataMark,
            BRK => Command::Break,
            IP => Command::InterruptProcess,
            AO => Command::AbortOutput,
            AYT => Command::AreYouThere,
            EC => Command::EraseChar,
            EL => Command::EraseLine,
            GA => Command::GoAhead,
            EOR => Command::EndOfRecord,
            byte => Command::Unknown(byte),
        }
    }

    pub fn as_byte(&self) -> u8 {
        match *self {
            Command::Nop => NOP,
            Command::DataMark => DM,
            Command::Break => BRK,
            Command::InterruptProcess => IP,
            Command::AbortOutput => AO,
            Command::AreYouThere => AYT,
            Command::EraseChar => EC,
            Command::EraseLine => EL,
            Command::GoAhead => GA,
            Command::EndOfRecord => EOR,
            Command::Unknown(byte) => byte,
        }
    }
}

/// `DO`/`DONT`/`WILL`/`WONT` — the four negotiation verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Will,
    Wont,
    Do,
    Dont,
}

impl Verb {
    pub fn parse(byte: u8) -> Option<Verb> {
        match byte {
            WILL => Some(Verb::Will),
            WONT => Some(Verb::Wont),
            DO => Some(Verb::Do),
            DONT => Some(Verb::Dont),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> u8 {
        match *self {
            Verb::Will => WILL,
            Verb::Wont => WONT,
            Verb::Do => DO,
            Verb::Dont => DONT,
        }
    }
}

/// RFC 2066 CHARSET subcommand bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharsetCommand {
    Request,
    Accepted,
    Rejected,
    TtableIs,
    TtableRejected,
    TtableAck,
    TtableNak,
    Unknown(u8),
}

impl CharsetCommand {
    pub const REQUEST: u8 = 1;
    pub const ACCEPTED: u8 = 2;
    pub const REJECTED: u8 = 3;
    pub const TTABLE_IS: u8 = 4;
    pub const TTABLE_REJECTED: u8 = 5;
    pub const TTABLE_ACK: u8 = 6;
    pub const TTABLE_NAK: u8 = 7;

    pub fn parse(byte: u8) -> CharsetCommand {
        match byte {
            Self::REQUEST => CharsetCommand::Request,
            Self::ACCEPTED => CharsetCommand::Accepted,
            Self::REJECTED => CharsetCommand::Rejected,
            Self::TTABLE_IS => CharsetCommand::TtableIs,
            Self::TTABLE_REJECTED => CharsetCommand::TtableRejected,
            Self::TTABLE_ACK => CharsetCommand::TtableAck,
            Self::TTABLE_NAK => CharsetCommand::TtableNak,
            byte => CharsetCommand::Unknown(byte),
        }
    }

    pub fn as_byte(&self) -> u8 {
        match *self {
            CharsetCommand::Request => Self::REQUEST,
            CharsetCommand::Accepted => Self::ACCEPTED,
            CharsetCommand::Rejected => Self::REJECTED,
            CharsetCommand::TtableIs => Self::TTABLE_IS,
            CharsetCommand::TtableRejected => Self::TTABLE_REJECTED,
            CharsetCommand::TtableAck => Self::TTABLE_ACK,
            CharsetCommand::TtableNak => Self::TTABLE_NAK,
            CharsetCommand::Unknown(byte) => byte,
        }
    }
}
