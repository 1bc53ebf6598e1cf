use super::{Frame, Opcode};
use crate::{DEFAULT_BUFFER_CAPACITY, FrameBuffer, FrameBufferWriter};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ParseStage {
    FinBit,
    Opcode,
    MaskBit,
    PayloadLen,
    ExtendedPayloadLen16,
    ExtendedPayloadLen64,
    MaskingKey,
    PayloadData,
    Done,
}

#[derive(Debug, Default)]
struct FrameHeader {
    fin: bool,
    opcode: Opcode,
    mask: bool,
    masking_key: [u8; 4],
    payload_start: usize,
}

/// Incremental frame parser.
///
/// Bytes are fed with [`update`](Self::update) as they arrive, in chunks of any size. Each
/// call advances the parse as far as the buffered bytes allow and returns a frame on the
/// call that completes one. Bytes past the end of that frame are kept for the next call, so
/// a chunk holding several frames yields them one per call:
///
/// ```
/// use wust_frame::{FrameParser, Opcode};
///
/// let mut parser = FrameParser::new();
/// assert!(parser.update(b"\x81\x02H").is_none());
///
/// let frame = parser.update(b"i\x89\x00").unwrap();
/// assert_eq!(frame.opcode, Opcode::Text);
/// assert_eq!(frame.payload, b"Hi");
///
/// let frame = parser.poll().unwrap();
/// assert_eq!(frame.opcode, Opcode::Ping);
/// assert!(frame.payload.is_empty());
/// ```
///
/// The parser never fails and never limits the declared payload length. A peer announcing a
/// huge frame just makes it wait (and buffer) forever; bounding that is up to the caller.
#[derive(Debug)]
pub struct FrameParser {
    buf: FrameBuffer,
    pos: usize,
    stage: ParseStage,
    header: FrameHeader,
    payload_len: u64,
}

impl FrameParser {
    #[must_use]
    pub fn new() -> Self { Self::with_capacity(DEFAULT_BUFFER_CAPACITY) }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: FrameBuffer::with_capacity(capacity),
            pos: 0,
            stage: ParseStage::FinBit,
            header: FrameHeader::default(),
            payload_len: 0,
        }
    }

    /// Appends `chunk` and parses as far as possible.
    ///
    /// An empty chunk adds nothing but still runs a parse pass. If the previous call returned
    /// a frame, that frame's bytes are dropped first.
    pub fn update(&mut self, chunk: &[u8]) -> Option<Frame<'_>> {
        if self.is_done() {
            self.reset();
        }
        if !chunk.is_empty() {
            self.buf.append(chunk);
        }
        self.parse()
    }

    /// Parses bytes that are already buffered, e.g. written through
    /// [`frame_buffer`](Self::frame_buffer), or left over after the previous frame.
    pub fn poll(&mut self) -> Option<Frame<'_>> { self.update(&[]) }

    /// Raw access to the accumulation buffer, to read from a socket straight into it:
    ///
    /// ```
    /// # use std::io::Read;
    /// # let mut socket: &[u8] = b"\x82\x01\xff";
    /// # let mut parser = wust_frame::FrameParser::new();
    /// let mut buf = parser.frame_buffer();
    /// buf.grow_by(1024);
    /// let n = socket.read(buf.spare_mut())?;
    /// buf.commit(n);
    ///
    /// let frame = parser.poll().unwrap();
    /// assert_eq!(frame.payload, &[0xff]);
    /// # Ok::<(), std::io::Error>(())
    /// ```
    ///
    /// The handle only appends; use [`clear`](Self::clear) to drop buffered bytes.
    pub fn frame_buffer(&mut self) -> FrameBufferWriter<'_> {
        FrameBufferWriter::new(&mut self.buf)
    }

    /// Drops all buffered bytes and any frame in progress.
    pub fn clear(&mut self) {
        self.buf.reset();
        self.pos = 0;
        self.start_frame();
    }

    /// The last update completed a frame.
    #[must_use]
    pub fn is_done(&self) -> bool { self.stage == ParseStage::Done }

    /// Buffered bytes not yet consumed by a frame.
    #[must_use]
    pub fn buffered(&self) -> usize { self.remaining() }

    fn reset(&mut self) {
        let leftover = self.remaining();
        if leftover > 0 {
            self.buf.compact(self.pos);
            tracing::trace!(leftover, "carried over bytes past frame boundary");
        } else {
            self.buf.reset();
        }
        self.pos = 0;
        self.start_frame();
    }

    fn start_frame(&mut self) {
        self.header = FrameHeader::default();
        self.payload_len = 0;
        self.stage = ParseStage::FinBit;
    }

    fn parse(&mut self) -> Option<Frame<'_>> {
        tracing::trace!(
            stage = ?self.stage,
            remaining = self.remaining(),
            "parser"
        );
        // every stage moves strictly forward, so each runs at most once per pass
        loop {
            let next_stage = match self.stage {
                ParseStage::FinBit => self.parse_fin_bit(),
                ParseStage::Opcode => self.parse_opcode(),
                ParseStage::MaskBit => self.parse_mask_bit(),
                ParseStage::PayloadLen => self.parse_payload_len(),
                ParseStage::ExtendedPayloadLen16 => self.parse_extended_len_16(),
                ParseStage::ExtendedPayloadLen64 => self.parse_extended_len_64(),
                ParseStage::MaskingKey => self.parse_masking_key(),
                ParseStage::PayloadData => self.parse_payload(),
                ParseStage::Done => break,
            };
            let Some(next_stage) = next_stage else {
                break;
            };
            tracing::trace!(
                from = ?self.stage,
                to = ?next_stage,
                "stage transition"
            );
            self.stage = next_stage;
        }

        if !self.is_done() {
            return None;
        }
        let frame = self.frame();
        tracing::debug!(
            opcode = %frame.opcode,
            fin = frame.fin,
            masked = frame.is_masked(),
            payload_len = frame.payload.len(),
            "frame decoded"
        );
        Some(frame)
    }

    // 0   | 1 2 3 | 4 5 6 7
    // Fin | Rsv   | Opcode
    fn parse_fin_bit(&mut self) -> Option<ParseStage> {
        self.header.fin = self.peek()? & 0x80 != 0;
        Some(ParseStage::Opcode)
    }

    fn parse_opcode(&mut self) -> Option<ParseStage> {
        let [b] = self.take()?;
        self.header.opcode = Opcode::from_bits(b);
        if self.header.opcode == Opcode::Unknown {
            tracing::trace!(opcode = b & 0x0F, "unknown opcode");
        }
        Some(ParseStage::MaskBit)
    }

    // 0    | 1 2 3 4 5 6 7
    // Mask | Payload len
    fn parse_mask_bit(&mut self) -> Option<ParseStage> {
        self.header.mask = self.peek()? & 0x80 != 0;
        Some(ParseStage::PayloadLen)
    }

    fn parse_payload_len(&mut self) -> Option<ParseStage> {
        let [b] = self.take()?;
        Some(match b & 0x7F {
            126 => ParseStage::ExtendedPayloadLen16,
            127 => ParseStage::ExtendedPayloadLen64,
            len => {
                self.payload_len = len.into();
                self.after_len()
            }
        })
    }

    fn parse_extended_len_16(&mut self) -> Option<ParseStage> {
        self.payload_len = u16::from_be_bytes(self.take()?).into();
        Some(self.after_len())
    }

    // the reserved top bit is taken as part of the length
    fn parse_extended_len_64(&mut self) -> Option<ParseStage> {
        self.payload_len = u64::from_be_bytes(self.take()?);
        Some(self.after_len())
    }

    fn after_len(&self) -> ParseStage {
        if self.header.mask {
            ParseStage::MaskingKey
        } else {
            ParseStage::PayloadData
        }
    }

    fn parse_masking_key(&mut self) -> Option<ParseStage> {
        self.header.masking_key = self.take()?;
        Some(ParseStage::PayloadData)
    }

    fn parse_payload(&mut self) -> Option<ParseStage> {
        // a length beyond the address space can never be buffered
        let len = usize::try_from(self.payload_len).ok()?;
        if self.remaining() < len {
            return None;
        }
        self.header.payload_start = self.pos;
        self.pos += len;
        Some(ParseStage::Done)
    }

    fn frame(&self) -> Frame<'_> {
        let start = self.header.payload_start;
        Frame {
            fin: self.header.fin,
            opcode: self.header.opcode,
            masking_key: self.header.mask.then_some(self.header.masking_key),
            payload: &self.buf.view()[start..self.pos],
        }
    }

    fn remaining(&self) -> usize { self.buf.len().saturating_sub(self.pos) }

    fn peek(&self) -> Option<u8> { self.buf.view().get(self.pos).copied() }

    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes: [u8; N] = self.buf.view().get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }
}

impl Default for FrameParser {
    fn default() -> Self { Self::new() }
}
