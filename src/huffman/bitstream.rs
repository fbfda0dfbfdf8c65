//! Bit packing and canonical decoding
//!
//! Codewords are written MSB first. Inside each output byte bits fill from
//! bit 0 upward, so bit `i` of the stream is `out[i / 8] >> (i % 8) & 1`.

use super::{CodeTable, DICT_SIZE, MAX_CODE_LEN, SortedSymbols};
use crate::error::{Error, Result};

/// Outcome of one [`encode_with_len`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Encoded {
    /// Input symbols consumed
    pub symbols: usize,
    /// Bits written to the output buffer
    pub bits: usize,
}

impl Encoded {
    /// Output bytes holding the written bits
    pub const fn bytes(&self) -> usize {
        self.bits.div_ceil(8)
    }
}

/// Pack `data[start..]` into `out`, returning the number of symbols encoded
///
/// See [`encode_with_len`].
pub fn encode(table: &CodeTable, data: &[u8], start: usize, out: &mut [u8], capacity_bits: usize) -> usize {
    encode_with_len(table, data, start, out, capacity_bits).symbols
}

/// Pack as many symbols of `data[start..]` as fit into `capacity_bits`
///
/// A symbol whose codeword would cross the capacity is not written, and
/// encoding stops there. Calling again with `start` advanced by the returned
/// symbol count continues the stream in a fresh buffer. The capacity is
/// further limited to `out.len() * 8`. Trailing bits of the last byte are
/// zero. An empty (fallback) table encodes nothing.
pub fn encode_with_len(
    table: &CodeTable,
    data: &[u8],
    start: usize,
    out: &mut [u8],
    capacity_bits: usize,
) -> Encoded {
    let capacity_bits = capacity_bits.min(out.len() * 8);
    let Some(input) = data.get(start..) else {
        return Encoded::default();
    };
    if table.is_empty() {
        return Encoded::default();
    }

    let codes = table.codes();
    let mut acc: u128 = 0;
    let mut pending = 0u32;
    let mut written = 0usize;
    let mut bits = 0usize;
    let mut symbols = 0usize;

    for &symbol in input {
        let code = codes[symbol as usize];
        let len = code.len as usize;
        if bits + len > capacity_bits {
            break;
        }
        acc |= u128::from(code.reversed) << pending;
        pending += u32::from(code.len);
        bits += len;
        symbols += 1;

        while pending >= 8 {
            #[allow(clippy::cast_possible_truncation)]
            let byte = acc as u8;
            out[written] = byte;
            written += 1;
            acc >>= 8;
            pending -= 8;
        }
    }
    if pending > 0 {
        #[allow(clippy::cast_possible_truncation)]
        let byte = acc as u8;
        out[written] = byte;
    }

    Encoded { symbols, bits }
}

/// Receiver-side decoder rebuilt from a length histogram and sorted symbols
///
/// No codewords are needed: within one length, codes are consecutive
/// integers starting at that length's first code.
#[derive(Debug, Clone)]
pub struct CanonicalDecoder {
    /// First code of each length
    first_code: [u64; MAX_CODE_LEN + 1],
    /// Number of codes of each length
    count: [u64; MAX_CODE_LEN + 1],
    /// Index in `sorted_symbols` of each length's first symbol
    first_index: [usize; MAX_CODE_LEN + 1],
    sorted_symbols: SortedSymbols,
    max_len: usize,
}

impl CanonicalDecoder {
    pub fn new(histogram: &[u8], sorted_symbols: &SortedSymbols) -> Result<Self> {
        if histogram.first().is_some_and(|&zero_len| zero_len != 0) {
            return Err(Error::Decode("fallback histogram carries no code"));
        }
        if histogram.len() > MAX_CODE_LEN + 1 {
            return Err(Error::Decode("code length histogram too long"));
        }
        let total: usize = histogram.iter().map(|&count| count as usize).sum();
        if total != DICT_SIZE {
            return Err(Error::Decode("code length histogram does not cover the dictionary"));
        }

        let mut first_code = [0; MAX_CODE_LEN + 1];
        let mut count = [0; MAX_CODE_LEN + 1];
        let mut first_index = [0; MAX_CODE_LEN + 1];

        let mut code: u64 = 0;
        let mut index = 0;
        for (len, &symbols) in histogram.iter().enumerate() {
            if len > 0 {
                code <<= 1;
            }
            first_code[len] = code;
            count[len] = u64::from(symbols);
            first_index[len] = index;
            code = code.wrapping_add(u64::from(symbols));
            index += symbols as usize;
        }

        Ok(Self {
            first_code,
            count,
            first_index,
            sorted_symbols: *sorted_symbols,
            max_len: histogram.len().saturating_sub(1),
        })
    }

    /// Decode `symbol_count` symbols from `bits`, appending them to `out`
    ///
    /// Returns the number of bits consumed.
    pub fn decode(&self, bits: &[u8], symbol_count: usize, out: &mut Vec<u8>) -> Result<usize> {
        let mut position = 0usize;
        out.reserve(symbol_count);

        for _ in 0..symbol_count {
            let mut code: u64 = 0;
            let mut len = 0;
            loop {
                let byte = bits
                    .get(position / 8)
                    .ok_or(Error::Decode("bitstream ended mid-symbol"))?;
                let bit = (byte >> (position % 8)) & 1;
                position += 1;
                code = (code << 1) | u64::from(bit);
                len += 1;
                if len > self.max_len {
                    return Err(Error::Decode("no codeword matches the bitstream"));
                }
                let delta = code.wrapping_sub(self.first_code[len]);
                if code >= self.first_code[len] && delta < self.count[len] {
                    #[allow(clippy::cast_possible_truncation)]
                    let index = self.first_index[len] + delta as usize;
                    out.push(self.sorted_symbols[index]);
                    break;
                }
            }
        }
        Ok(position)
    }
}
