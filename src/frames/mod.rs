mod decode;
mod encode;
mod frame;
mod opcode;

pub use decode::FrameParser;
pub use encode::FrameFactory;
pub use frame::{Frame, OwnedFrame};
pub use opcode::Opcode;
