//! Device wire format
//!
//! Every render is sent as one or more chunks, each written to the device
//! with a single write:
//!
//! ```text
//! offset  size  field
//! 0       1     MAGIC (0xA5)
//! 1       1     flags: DIFF | HUFFMAN | LAST
//! 2       4     payload offset (u32 LE), position of the first payload byte
//! 6       4     symbol count (u32 LE), payload bytes carried by this chunk
//! --- HUFFMAN set
//! 10      1     histogram length H
//! 11      H     code length histogram, lengths 0..H
//! 11+H    256   symbols sorted by code length
//! 267+H   ..    packed codeword bitstream
//! --- HUFFMAN clear
//! 10      n     raw payload bytes
//! ```
//!
//! The payload is either the full frame (all channels concatenated in
//! channel order, r,g,b per LED) or, with DIFF, one `address, value` pair
//! per changed byte. The receiver joins payload pieces by offset and
//! applies them when it sees LAST.

use crate::config::AddressWidth;
use crate::error::{Error, Result};
use crate::huffman::{CanonicalCode, CanonicalDecoder, DICT_SIZE, SortedSymbols};

pub const MAGIC: u8 = 0xA5;
pub const HEADER_LEN: usize = 10;

/// Payload is address/value pairs
pub const FLAG_DIFF: u8 = 1 << 0;
/// Body is a Huffman-coded bitstream preceded by the code tables
pub const FLAG_HUFFMAN: u8 = 1 << 1;
/// Final chunk of a render
pub const FLAG_LAST: u8 = 1 << 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub flags: u8,
    pub payload_offset: u32,
    pub symbol_count: u32,
}

impl ChunkHeader {
    pub const fn is_diff(&self) -> bool {
        self.flags & FLAG_DIFF != 0
    }

    pub const fn is_huffman(&self) -> bool {
        self.flags & FLAG_HUFFMAN != 0
    }

    pub const fn is_last(&self) -> bool {
        self.flags & FLAG_LAST != 0
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0; HEADER_LEN];
        bytes[0] = MAGIC;
        bytes[1] = self.flags;
        bytes[2..6].copy_from_slice(&self.payload_offset.to_le_bytes());
        bytes[6..10].copy_from_slice(&self.symbol_count.to_le_bytes());
        bytes
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }

    /// Parse a header, returning it with the chunk body
    pub fn parse(chunk: &[u8]) -> Result<(Self, &[u8])> {
        let Some((header, body)) = chunk.split_at_checked(HEADER_LEN) else {
            return Err(Error::Decode("chunk shorter than its header"));
        };
        if header[0] != MAGIC {
            return Err(Error::Decode("bad chunk magic"));
        }
        let field = |at: usize| u32::from_le_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]]);
        Ok((
            Self {
                flags: header[1],
                payload_offset: field(2),
                symbol_count: field(6),
            },
            body,
        ))
    }
}

/// Bytes the code tables take in a compressed chunk
pub fn code_tables_len(code: &CanonicalCode) -> usize {
    1 + code.histogram().len() + DICT_SIZE
}

/// Append the histogram and sorted symbols of `code`
#[allow(clippy::cast_possible_truncation)]
pub fn write_code_tables(code: &CanonicalCode, out: &mut Vec<u8>) {
    // at most MAX_CODE_LEN + 1 entries
    out.push(code.histogram().len() as u8);
    out.extend_from_slice(code.histogram());
    out.extend_from_slice(code.sorted_symbols());
}

/// One chunk decoded from the start of a byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedChunk {
    pub header: ChunkHeader,
    pub payload: Vec<u8>,
    /// Bytes the chunk occupied in the stream
    pub len: usize,
}

/// Decode the chunk at the start of `stream`
///
/// Compressed chunks carry no byte length; their end is found by decoding
/// `symbol_count` symbols.
pub fn decode_chunk(stream: &[u8]) -> Result<DecodedChunk> {
    let (header, body) = ChunkHeader::parse(stream)?;
    let count = header.symbol_count as usize;

    if !header.is_huffman() {
        let payload = body
            .get(..count)
            .ok_or(Error::Decode("raw chunk shorter than its symbol count"))?;
        return Ok(DecodedChunk {
            header,
            payload: payload.to_vec(),
            len: HEADER_LEN + count,
        });
    }

    let (&histogram_len, rest) = body
        .split_first()
        .ok_or(Error::Decode("missing histogram length"))?;
    let (histogram, rest) = rest
        .split_at_checked(histogram_len as usize)
        .ok_or(Error::Decode("truncated histogram"))?;
    let (symbols, bitstream) = rest
        .split_at_checked(DICT_SIZE)
        .ok_or(Error::Decode("truncated symbol table"))?;
    let mut sorted_symbols: SortedSymbols = [0; DICT_SIZE];
    sorted_symbols.copy_from_slice(symbols);

    let decoder = CanonicalDecoder::new(histogram, &sorted_symbols)?;
    let mut payload = Vec::with_capacity(count);
    let bits = decoder.decode(bitstream, count, &mut payload)?;
    Ok(DecodedChunk {
        header,
        payload,
        len: HEADER_LEN + 1 + histogram.len() + DICT_SIZE + bits.div_ceil(8),
    })
}

/// Receiver-side model of the downstream controller's framebuffer
///
/// Feed it every chunk in order; a frame is latched on the LAST chunk.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    frame: Vec<u8>,
    pending: Vec<u8>,
    address_width: AddressWidth,
    frames: usize,
}

impl FrameAssembler {
    pub fn new(frame_len: usize, address_width: AddressWidth) -> Self {
        Self {
            frame: vec![0; frame_len],
            pending: Vec::new(),
            address_width,
            frames: 0,
        }
    }

    /// Latched framebuffer
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Number of frames latched so far
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Apply one chunk; returns true when it latched a frame
    pub fn push(&mut self, chunk: &[u8]) -> Result<bool> {
        let decoded = decode_chunk(chunk)?;
        self.apply(&decoded)
    }

    /// Apply every chunk in a device byte stream, returning the frames latched
    pub fn push_stream(&mut self, mut stream: &[u8]) -> Result<usize> {
        let mut latched = 0;
        while !stream.is_empty() {
            let decoded = decode_chunk(stream)?;
            if self.apply(&decoded)? {
                latched += 1;
            }
            stream = &stream[decoded.len..];
        }
        Ok(latched)
    }

    fn apply(&mut self, chunk: &DecodedChunk) -> Result<bool> {
        let header = chunk.header;
        if header.payload_offset as usize != self.pending.len() {
            self.pending.clear();
            return Err(Error::Decode("payload offset out of sequence"));
        }
        self.pending.extend_from_slice(&chunk.payload);
        if !header.is_last() {
            return Ok(false);
        }

        let payload = core::mem::take(&mut self.pending);
        if header.is_diff() {
            self.apply_diff(&payload)?;
        } else if payload.len() == self.frame.len() {
            self.frame.copy_from_slice(&payload);
        } else {
            return Err(Error::Decode("full frame payload has the wrong length"));
        }
        self.frames += 1;
        Ok(true)
    }

    fn apply_diff(&mut self, payload: &[u8]) -> Result<()> {
        let pair_len = self.address_width.bytes() + 1;
        if payload.len() % pair_len != 0 {
            return Err(Error::Decode("diff payload is not a whole number of pairs"));
        }
        for pair in payload.chunks_exact(pair_len) {
            let address = self
                .address_width
                .read(pair)
                .ok_or(Error::Decode("truncated diff address"))?;
            let slot = self
                .frame
                .get_mut(address)
                .ok_or(Error::Decode("diff address outside the frame"))?;
            *slot = pair[pair_len - 1];
        }
        Ok(())
    }
}
