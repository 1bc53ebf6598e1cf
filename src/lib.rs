//! WebSocket framing (RFC 6455 section 5) without a socket.
//!
//! [`FrameFactory`] turns payloads into wire bytes and [`FrameParser`] turns wire bytes,
//! arriving in chunks of any size, back into [`Frame`]s. Both reuse one internal buffer across
//! frames and hand out borrowed views into it, so a view lives until the next call on the same
//! instance. Reading, writing, handshakes, fragment reassembly and close codes are left to the
//! caller.
//!
//! ```
//! use wust_frame::{FrameFactory, FrameParser, Opcode};
//!
//! let mut factory = FrameFactory::new();
//! let mut parser = FrameParser::new();
//!
//! let wire = factory.text(true, true, b"Hello World");
//! let frame = parser.update(wire).unwrap();
//!
//! assert_eq!(frame.opcode, Opcode::Text);
//! assert!(frame.is_masked());
//! assert_eq!(frame.unmask(), &b"Hello World"[..]);
//! ```
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

mod buffer;
mod error;
mod frames;
mod protocol;

pub use buffer::{FrameBuffer, FrameBufferWriter};
pub use error::{FrameError, Result};
pub use frames::{Frame, FrameFactory, FrameParser, Opcode, OwnedFrame};
pub use protocol::{MaskKeyGenerator, XorShift128Plus, mask};

/// Initial size of the factory's and the parser's buffers.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;
/// Largest payload a Close, Ping or Pong frame may carry.
pub const MAX_CONTROL_PAYLOAD: usize = 125;
/// Masking keys generated per cache refill.
pub const MASK_KEY_CACHE_ENTRIES: usize = 8;
