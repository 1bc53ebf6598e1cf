use thiserror::Error;

use crate::{MAX_CONTROL_PAYLOAD, frames::Opcode};

pub type Result<T> = std::result::Result<T, FrameError>;

/// Errors raised while building frames. Parsing never fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Close, Ping and Pong payloads are limited to 125 bytes.
    #[error("payload too large for control frame: {opcode} with {len} bytes (max {max})", max = MAX_CONTROL_PAYLOAD)]
    ControlPayloadTooLarge { opcode: Opcode, len: usize },
    /// `Opcode::Unknown` has no wire value.
    #[error("unknown opcode cannot be encoded")]
    UnknownOpcode,
    /// A raw byte that is not one of the six defined opcodes.
    #[error("invalid opcode (byte={0:#04x})")]
    InvalidOpcode(u8),
}
