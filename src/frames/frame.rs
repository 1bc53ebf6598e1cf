use bytes::{BufMut, Bytes, BytesMut};

use super::Opcode;
use crate::{FrameBuffer, protocol::mask};

/// A single WebSocket frame.
///
/// `payload` is always in wire form: when `masking_key` is set it holds the masked bytes. It
/// borrows from whoever produced the frame, usually the [`FrameParser`](super::FrameParser)'s
/// buffer. Use [`unmask`](Self::unmask) to recover the plain bytes, or
/// [`into_owned`](Self::into_owned) to keep the frame past the parser's next update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub fin: bool,
    pub opcode: Opcode,
    /// Present iff the MASK bit is set.
    pub masking_key: Option<[u8; 4]>,
    pub payload: &'a [u8],
}

impl<'a> Frame<'a> {
    #[must_use]
    pub fn new(fin: bool, opcode: Opcode, masking_key: Option<[u8; 4]>, payload: &'a [u8]) -> Self {
        Self {
            fin,
            opcode,
            masking_key,
            payload,
        }
    }

    #[must_use]
    pub fn is_masked(&self) -> bool { self.masking_key.is_some() }

    /// Copies the payload out, removing the mask if there is one.
    #[must_use]
    pub fn unmask(&self) -> Bytes {
        let mut payload = BytesMut::from(self.payload);
        if let Some(key) = self.masking_key {
            mask(&mut payload, key);
        }
        payload.freeze()
    }

    /// Copies the payload (still masked, if it was) into an owned frame.
    #[must_use]
    pub fn into_owned(self) -> OwnedFrame {
        OwnedFrame {
            fin: self.fin,
            opcode: self.opcode,
            masking_key: self.masking_key,
            payload: Bytes::copy_from_slice(self.payload),
        }
    }

    /// Size of the frame on the wire.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        let len = self.payload.len();
        let ext = match len {
            0..=125 => 0,
            126..=0xFFFF => 2,
            _ => 8,
        };
        let key = if self.is_masked() { 4 } else { 0 };
        2 + ext + key + len
    }

    // Serializes into `buf`, replacing its contents. The payload is taken as wire bytes and
    // copied unchanged, so a parsed masked frame re-encodes to the bytes it came from.
    // The opcode must not be `Unknown`; callers check that first.
    pub(crate) fn write_to(&self, buf: &mut FrameBuffer) {
        self.write_head(buf).copy_from_slice(self.payload);
    }

    // Like `write_to`, but the payload is plain and gets masked with the key on the way in.
    pub(crate) fn write_masked_to(&self, buf: &mut FrameBuffer) {
        let payload = self.write_head(buf);
        payload.copy_from_slice(self.payload);
        if let Some(key) = self.masking_key {
            mask(payload, key);
        }
    }

    // Writes the header and returns the window the payload goes into.
    fn write_head<'b>(&self, buf: &'b mut FrameBuffer) -> &'b mut [u8] {
        debug_assert_ne!(self.opcode, Opcode::Unknown);

        buf.reset();
        buf.grow_to_fit(self.encoded_len());

        // 0   | 1 2 3 | 4 5 6 7
        // Fin | Rsv   | Opcode
        buf.push((u8::from(self.fin) << 7) | (self.opcode as u8 & 0x0F));

        // 0    | 1 2 3 4 5 6 7
        // Mask | Payload len
        let mask_bit = if self.is_masked() { 0x80 } else { 0 };
        let len = self.payload.len();
        #[allow(clippy::cast_possible_truncation)]
        match len {
            0..=125 => buf.push(mask_bit | len as u8),
            126..=0xFFFF => {
                let mut head = buf.reserve(3);
                head.put_u8(mask_bit | 126);
                head.put_u16(len as u16);
            }
            _ => {
                let mut head = buf.reserve(9);
                head.put_u8(mask_bit | 127);
                head.put_u64(len as u64);
            }
        }

        if let Some(key) = self.masking_key {
            buf.reserve(4).copy_from_slice(&key);
        }
        buf.reserve(len)
    }
}

/// A [`Frame`] that owns its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedFrame {
    pub fin: bool,
    pub opcode: Opcode,
    pub masking_key: Option<[u8; 4]>,
    pub payload: Bytes,
}

impl OwnedFrame {
    #[must_use]
    pub fn as_frame(&self) -> Frame<'_> {
        Frame::new(self.fin, self.opcode, self.masking_key, &self.payload)
    }

    #[must_use]
    pub fn is_masked(&self) -> bool { self.masking_key.is_some() }

    #[must_use]
    pub fn unmask(&self) -> Bytes { self.as_frame().unmask() }
}

impl From<Frame<'_>> for OwnedFrame {
    fn from(frame: Frame<'_>) -> Self { frame.into_owned() }
}
