//! Controller configuration

use crate::color::BYTES_PER_LED;
use crate::error::{Error, Result};
use crate::gamma::GammaCorrector;
use crate::huffman::{DICT_SIZE, MAX_CODE_LEN};
use crate::wire::HEADER_LEN;

/// Default upper bound for one device write
pub const DEFAULT_MAX_CHUNK_LEN: usize = 4096;

/// Smallest chunk that still fits the code tables and one longest codeword
pub const MIN_MAX_CHUNK_LEN: usize = HEADER_LEN + 1 + (MAX_CODE_LEN + 1) + DICT_SIZE + MAX_CODE_LEN / 8;

/// When the shared code is rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Only on explicit `refresh_code` calls (plus once lazily if no code exists)
    #[default]
    Manual,
    /// Before every render
    EveryFrame,
    /// Before every n-th render
    EveryNFrames(u32),
}

/// Which statistics a code refresh is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeStatistics {
    /// Byte counts of the frame being refreshed only
    #[default]
    CurrentFrame,
    /// Byte counts summed over every refresh since the last reset
    Accumulated,
}

/// Width of the address field in front of each changed byte
///
/// Addresses are byte positions in the concatenated frame, little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressWidth {
    #[default]
    U16,
    U24,
    U32,
}

impl AddressWidth {
    pub const fn bytes(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U24 => 3,
            Self::U32 => 4,
        }
    }

    /// Number of distinct positions the field can address
    pub const fn capacity(self) -> u64 {
        1 << (8 * self.bytes())
    }

    /// Append `address` little-endian
    #[allow(clippy::cast_possible_truncation)]
    pub fn write(self, address: usize, out: &mut Vec<u8>) {
        let bytes = (address as u32).to_le_bytes();
        out.extend_from_slice(&bytes[..self.bytes()]);
    }

    pub fn read(self, bytes: &[u8]) -> Option<usize> {
        let field = bytes.get(..self.bytes())?;
        let mut le = [0u8; 4];
        le[..field.len()].copy_from_slice(field);
        Some(u32::from_le_bytes(le) as usize)
    }
}

/// Configuration for the controller
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub channels: usize,
    pub leds_per_channel: usize,
    /// Gamma tables applied to transmitted bytes, `None` to send raw colors
    pub gamma: Option<GammaCorrector>,
    /// Send only bytes that changed since the last successful render
    pub data_reduction: bool,
    /// Compress the payload with the shared canonical Huffman code
    pub huffman: bool,
    pub refresh: RefreshPolicy,
    pub statistics: CodeStatistics,
    pub address_width: AddressWidth,
    /// Upper bound for one chunk written to the device
    pub max_chunk_len: usize,
}

impl ControllerConfig {
    pub fn new(channels: usize, leds_per_channel: usize) -> Self {
        Self {
            channels,
            leds_per_channel,
            gamma: None,
            data_reduction: false,
            huffman: false,
            refresh: RefreshPolicy::default(),
            statistics: CodeStatistics::default(),
            address_width: AddressWidth::default(),
            max_chunk_len: DEFAULT_MAX_CHUNK_LEN,
        }
    }

    /// Bytes in one full frame across all channels
    pub const fn frame_len(&self) -> usize {
        self.channels * self.leds_per_channel * BYTES_PER_LED
    }

    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 || self.leds_per_channel == 0 {
            return Err(Error::InvalidConfig("layout needs at least one channel and one LED"));
        }
        if self.frame_len() as u64 > self.address_width.capacity() {
            return Err(Error::InvalidConfig("frame does not fit the diff address width"));
        }
        let max_payload = self.frame_len().checked_mul(1 + self.address_width.bytes());
        if max_payload.is_none_or(|len| len > u32::MAX as usize) {
            return Err(Error::InvalidConfig("frame does not fit the chunk header"));
        }
        if self.max_chunk_len < MIN_MAX_CHUNK_LEN {
            return Err(Error::InvalidConfig("max_chunk_len too small for compressed chunks"));
        }
        if self.refresh == RefreshPolicy::EveryNFrames(0) {
            return Err(Error::InvalidConfig("refresh interval must be at least one frame"));
        }
        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new(1, 1)
    }
}
