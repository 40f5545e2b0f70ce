// A macro to reduce the code duplication in the definition of TelnetOption.
macro_rules! telnet_options {
    ($($(#[doc = $attrs:literal])* $byte:literal => $name:ident),+ $(,)?) => {
        /// Telnet options recognized by this core.
        ///
        /// Any other option byte round-trips through [`TelnetOption::Unknown`] so that
        /// negotiation still has something to key the option table on, even for options
        /// this core has no built-in handler for.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum TelnetOption {
            $($(#[doc = $attrs])* $name,)+
            Unknown(u8),
        }

        impl TelnetOption {
            pub fn parse(byte: u8) -> TelnetOption {
                match byte {
                    $($byte => TelnetOption::$name,)+
                    byte => TelnetOption::Unknown(byte),
                }
            }

            pub fn as_byte(&self) -> u8 {
                match *self {
                    $(TelnetOption::$name => $byte,)+
                    TelnetOption::Unknown(byte) => byte,
                }
            }
        }
    }
}

telnet_options!(
    /// Removes the 7-bit-clean restriction on the channel.
    ///
    /// From [RFC 856](https://www.rfc-editor.org/rfc/rfc856.html)
    0 => TransmitBinary,
    /// The receiving party echoes back data characters it receives.
    ///
    /// From [RFC 857](https://www.rfc-editor.org/rfc/rfc857.html)
    1 => Echo,
    /// Suppresses transmission of `IAC GA` after data writes.
    ///
    /// From [RFC 858](https://www.rfc-editor.org/rfc/rfc858.html)
    3 => SuppressGoAhead,
    /// Negotiates a terminal type string.
    ///
    /// From [RFC 1091](https://www.rfc-editor.org/rfc/rfc1091.html)
    24 => TerminalType,
    /// Marks records within the data stream.
    ///
    /// From [RFC 885](https://www.rfc-editor.org/rfc/rfc885.html)
    25 => EndOfRecord,
    /// Negotiates About Window Size: communicates terminal dimensions.
    ///
    /// From [RFC 1073](https://www.rfc-editor.org/rfc/rfc1073.html)
    31 => Naws,
    /// Negotiates a text encoding for the connection.
    ///
    /// From [RFC 2066](https://www.rfc-editor.org/rfc/rfc2066.html)
    42 => Charset,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_known_options() {
        for &(byte, opt) in &[
            (0u8, TelnetOption::TransmitBinary),
            (1, TelnetOption::Echo),
            (3, TelnetOption::SuppressGoAhead),
            (24, TelnetOption::TerminalType),
            (25, TelnetOption::EndOfRecord),
            (31, TelnetOption::Naws),
            (42, TelnetOption::Charset),
        ] {
            assert_eq!(TelnetOption::parse(byte), opt);
            assert_eq!(opt.as_byte(), byte);
        }
    }

    #[test]
    fn unknown_option_round_trips_its_byte() {
        let opt = TelnetOption::parse(200);
        assert_eq!(opt, TelnetOption::Unknown(200));
        assert_eq!(opt.as_byte(), 200);
    }
}
