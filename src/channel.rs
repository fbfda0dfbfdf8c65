//! LED channel buffers
//!
//! A channel is one physical strip output of the downstream controller. It
//! keeps the logical colors being drawn and a snapshot of the bytes that
//! were last transmitted successfully.

use crate::color::{BYTES_PER_LED, Rgb};

#[derive(Debug, Clone)]
pub struct Channel {
    current: Vec<Rgb>,
    /// Transmitted (gamma mapped) bytes of the last successful render
    snapshot: Vec<u8>,
}

impl Channel {
    /// Create a channel with `leds` black LEDs
    pub fn new(leds: usize) -> Self {
        Self {
            current: vec![Rgb::default(); leds],
            snapshot: vec![0; leds * BYTES_PER_LED],
        }
    }

    /// Number of LEDs
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Number of frame bytes
    pub fn byte_len(&self) -> usize {
        self.snapshot.len()
    }

    #[inline]
    pub fn set(&mut self, offset: usize, color: Rgb) {
        self.current[offset] = color;
    }

    pub fn get(&self, offset: usize) -> Option<Rgb> {
        self.current.get(offset).copied()
    }

    pub fn fill(&mut self, color: Rgb) {
        self.current.fill(color);
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.current
    }

    /// Append the current colors as r,g,b bytes
    pub fn write_bytes(&self, out: &mut Vec<u8>) {
        out.reserve(self.byte_len());
        for color in &self.current {
            out.extend_from_slice(&[color.r, color.g, color.b]);
        }
    }

    pub fn snapshot(&self) -> &[u8] {
        &self.snapshot
    }

    /// Record `transmitted` as the state the downstream controller holds
    pub(crate) fn commit(&mut self, transmitted: &[u8]) {
        self.snapshot.copy_from_slice(transmitted);
    }
}
