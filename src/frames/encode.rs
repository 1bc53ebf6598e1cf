use super::{Frame, Opcode};
use crate::{
    DEFAULT_BUFFER_CAPACITY, FrameBuffer, FrameError, MAX_CONTROL_PAYLOAD, Result,
    protocol::MaskKeyGenerator,
};

/// Serializes frames into an internal buffer that is reused from one frame to the next.
///
/// Every method returns a view of the encoded frame that borrows the factory, so it has to be
/// sent (or copied) before the next frame is built.
#[derive(Debug)]
pub struct FrameFactory {
    buf: FrameBuffer,
    keys: MaskKeyGenerator,
}

impl FrameFactory {
    /// Factory with the default buffer size and an entropy-seeded key generator.
    #[must_use]
    pub fn new() -> Self { Self::with_capacity(DEFAULT_BUFFER_CAPACITY) }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: FrameBuffer::with_capacity(capacity),
            keys: MaskKeyGenerator::new(),
        }
    }

    /// Factory whose masking keys are fully determined by the seed.
    #[must_use]
    pub fn with_seed(capacity: usize, seed0: u64, seed1: u64) -> Self {
        Self {
            buf: FrameBuffer::with_capacity(capacity),
            keys: MaskKeyGenerator::from_seed(seed0, seed1),
        }
    }

    /// Throws away the cached masking keys and generates a new batch.
    pub fn refill_mask_keys(&mut self) { self.keys.refill(); }

    /// Builds one frame. When `mask` is set a fresh masking key is drawn and the payload is
    /// masked with it.
    ///
    /// Fails only for [`Opcode::Unknown`]. Control frame limits are not checked here, see
    /// [`ping`](Self::ping), [`pong`](Self::pong) and [`close`](Self::close).
    pub fn construct(&mut self, fin: bool, opcode: Opcode, mask: bool, payload: &[u8]) -> Result<&[u8]> {
        if opcode == Opcode::Unknown {
            tracing::warn!("refusing to encode unknown opcode");
            return Err(FrameError::UnknownOpcode);
        }
        Ok(self.emit(fin, opcode, mask, payload))
    }

    /// Encodes a frame exactly as given. The payload is taken as wire bytes: if the frame
    /// carries a masking key its payload must already be masked, as it is for a frame fresh
    /// out of a [`FrameParser`](super::FrameParser). Nothing is masked here.
    pub fn encode(&mut self, frame: &Frame<'_>) -> Result<&[u8]> {
        if frame.opcode == Opcode::Unknown {
            tracing::warn!("refusing to encode unknown opcode");
            return Err(FrameError::UnknownOpcode);
        }
        frame.write_to(&mut self.buf);
        Ok(self.encoded(frame))
    }

    pub fn text(&mut self, fin: bool, mask: bool, payload: &[u8]) -> &[u8] {
        self.emit(fin, Opcode::Text, mask, payload)
    }

    pub fn binary(&mut self, fin: bool, mask: bool, payload: &[u8]) -> &[u8] {
        self.emit(fin, Opcode::Bin, mask, payload)
    }

    pub fn ping(&mut self, mask: bool, payload: &[u8]) -> Result<&[u8]> {
        self.control(Opcode::Ping, mask, payload)
    }

    pub fn pong(&mut self, mask: bool, payload: &[u8]) -> Result<&[u8]> {
        self.control(Opcode::Pong, mask, payload)
    }

    /// Close frame with a raw payload. The status code layout is up to the caller.
    pub fn close(&mut self, mask: bool, payload: &[u8]) -> Result<&[u8]> {
        self.control(Opcode::Close, mask, payload)
    }

    // control frames are never fragmented and carry at most 125 bytes
    fn control(&mut self, opcode: Opcode, mask: bool, payload: &[u8]) -> Result<&[u8]> {
        if payload.len() > MAX_CONTROL_PAYLOAD {
            tracing::warn!(%opcode, len = payload.len(), "control frame payload too large");
            return Err(FrameError::ControlPayloadTooLarge {
                opcode,
                len: payload.len(),
            });
        }
        Ok(self.emit(true, opcode, mask, payload))
    }

    fn emit(&mut self, fin: bool, opcode: Opcode, mask: bool, payload: &[u8]) -> &[u8] {
        let masking_key = mask.then(|| self.keys.next_key());
        let frame = Frame::new(fin, opcode, masking_key, payload);
        frame.write_masked_to(&mut self.buf);
        self.encoded(&frame)
    }

    fn encoded(&self, frame: &Frame<'_>) -> &[u8] {
        tracing::debug!(
            opcode = %frame.opcode,
            fin = frame.fin,
            masked = frame.is_masked(),
            payload_len = frame.payload.len(),
            wire_len = self.buf.len(),
            "frame encoded"
        );
        self.buf.view()
    }
}

impl Default for FrameFactory {
    fn default() -> Self { Self::new() }
}
