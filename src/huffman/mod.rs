//! Canonical Huffman coding over byte symbols
//!
//! The dictionary always holds all 256 byte values, including symbols that
//! never occur in the analysed data, so any later frame can be encoded with
//! an existing code. Only the length histogram and the length-sorted symbol
//! list travel on the wire; the receiver rebuilds the codewords from them.
//!
//! See <https://en.wikipedia.org/wiki/Canonical_Huffman_code>.

mod bitstream;
mod canonical;
mod lengths;

pub use bitstream::{CanonicalDecoder, Encoded, encode, encode_with_len};
pub use canonical::{CanonicalCode, assign_canonical};
pub use lengths::{Frequencies, accumulate_frequencies, compute_lengths, count_frequencies, lengths_from_frequencies};

/// Number of symbols in the dictionary (one per byte value)
pub const DICT_SIZE: usize = 256;

/// Longest codeword the encoder can hold
///
/// Longer codes take the overflow fallback just like crowded length buckets.
pub const MAX_CODE_LEN: usize = 64;

/// Code length of every symbol, indexed by symbol
pub type CodeLengths = [u8; DICT_SIZE];

/// Count of symbols per code length, indexed by length
///
/// Trimmed after the longest used length; never longer than the dictionary.
pub type LengthHistogram = heapless::Vec<u8, DICT_SIZE>;

/// Symbols ordered by ascending code length, ties by ascending value
pub type SortedSymbols = [u8; DICT_SIZE];

/// One symbol's codeword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Codeword {
    /// Code value; its `len` low bits, MSB first, are the transmitted bits
    pub bits: u64,
    pub len: u8,
    /// `bits` mirrored over `len`, for LSB-first packing
    reversed: u64,
}

impl Codeword {
    pub(crate) const fn new(bits: u64, len: u8) -> Self {
        let reversed = if len == 0 {
            0
        } else {
            bits.reverse_bits() >> (64 - len as u32)
        };
        Self {
            bits,
            len,
            reversed,
        }
    }

    /// True if `self` is a prefix of `other` (or equal to it)
    pub const fn is_prefix_of(&self, other: &Self) -> bool {
        if self.len > other.len {
            return false;
        }
        let shift = (other.len - self.len) as u32;
        if shift >= u64::BITS {
            return true;
        }
        (other.bits >> shift) == self.bits
    }
}

/// Symbol to codeword mapping
///
/// Holds one entry per dictionary symbol, or nothing at all when the
/// overflow fallback is active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Codeword>,
}

impl CodeTable {
    pub(crate) fn from_codes(codes: Vec<Codeword>) -> Self {
        Self { codes }
    }

    pub(crate) const fn empty() -> Self {
        Self { codes: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    #[inline]
    pub fn get(&self, symbol: u8) -> Option<Codeword> {
        self.codes.get(symbol as usize).copied()
    }

    pub fn codes(&self) -> &[Codeword] {
        &self.codes
    }

    /// Total number of bits `data` would take with this table
    ///
    /// Returns `None` if the table is empty.
    pub fn encoded_bits(&self, data: &[u8]) -> Option<u64> {
        if self.is_empty() {
            return None;
        }
        Some(
            data.iter()
                .map(|&symbol| u64::from(self.codes[symbol as usize].len))
                .sum(),
        )
    }
}
