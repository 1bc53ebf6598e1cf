use std::fmt;

use crate::FrameError;

/// Frame opcode, the low nibble of the first header byte.
///
/// `Unknown` stands for any of the reserved values (0x3-0x7, 0xB-0xF). The parser tags such
/// frames instead of rejecting them; the raw value is not kept. `Unknown` has no wire
/// representation and can't be encoded.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Opcode {
    #[default]
    Cont = 0x0,
    Text = 0x1,
    Bin = 0x2,
    Close = 0x8,
    Ping = 0x9,
    Pong = 0xA,
    // outside the 4-bit range on purpose
    Unknown = 0x10,
}

impl Opcode {
    /// Decodes the low 4 bits of `byte`. Never fails.
    #[must_use]
    pub fn from_bits(byte: u8) -> Self {
        match byte & 0x0F {
            0x0 => Self::Cont,
            0x1 => Self::Text,
            0x2 => Self::Bin,
            0x8 => Self::Close,
            0x9 => Self::Ping,
            0xA => Self::Pong,
            _ => Self::Unknown,
        }
    }

    /// Close, Ping and Pong.
    #[must_use]
    pub fn is_control(self) -> bool { matches!(self, Self::Close | Self::Ping | Self::Pong) }

    #[must_use]
    pub fn is_data(self) -> bool { matches!(self, Self::Cont | Self::Text | Self::Bin) }
}

impl TryFrom<u8> for Opcode {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match Self::from_bits(value) {
            Self::Unknown => Err(FrameError::InvalidOpcode(value)),
            _ if value > 0x0F => Err(FrameError::InvalidOpcode(value)),
            opcode => Ok(opcode),
        }
    }
}

impl TryFrom<Opcode> for u8 {
    type Error = FrameError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        match value {
            Opcode::Unknown => Err(FrameError::UnknownOpcode),
            opcode => Ok(opcode as u8),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cont => "CONTINUATION",
            Self::Text => "TEXT",
            Self::Bin => "BINARY",
            Self::Close => "CLOSE",
            Self::Ping => "PING",
            Self::Pong => "PONG",
            Self::Unknown => "UNKNOWN",
        })
    }
}
