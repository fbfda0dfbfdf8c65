//! Gamma correction lookup tables
//!
//! Stored colors stay logical; only the transmitted bytes go through the
//! tables. Each color component has its own 256-entry table.

use core::iter;

use crate::color::{BYTES_PER_LED, Rgb};

type Lut = [u8; 256];

/// Per-channel lookup table mapping stored color bytes to transmitted bytes
#[derive(Clone, PartialEq, Eq)]
pub struct GammaCorrector {
    tables: [Lut; BYTES_PER_LED],
}

impl GammaCorrector {
    /// WS2812 curve, identical for all three components
    ///
    /// Uses the table built into `smart-leds`.
    pub fn ws2812() -> Self {
        let mut lut = [0; 256];
        for (value, slot) in (0..=u8::MAX).zip(lut.iter_mut()) {
            let gray = Rgb::new(value, value, value);
            *slot = smart_leds::gamma(iter::once(gray)).next().map_or(value, |c| c.r);
        }
        Self {
            tables: [lut; BYTES_PER_LED],
        }
    }

    /// Power curve `out = 255 * (in / 255) ^ exponent` on every component
    pub fn with_exponent(exponent: f32) -> Self {
        Self::with_channel_exponents(exponent, exponent, exponent)
    }

    pub fn with_channel_exponents(r: f32, g: f32, b: f32) -> Self {
        Self {
            tables: [power_lut(r), power_lut(g), power_lut(b)],
        }
    }

    /// Pass-through tables
    pub fn identity() -> Self {
        let mut lut = [0; 256];
        for (value, slot) in (0..=u8::MAX).zip(lut.iter_mut()) {
            *slot = value;
        }
        Self {
            tables: [lut; BYTES_PER_LED],
        }
    }

    /// Map one frame byte; `position` is the byte index in an r,g,b stream
    #[inline]
    pub fn map(&self, position: usize, value: u8) -> u8 {
        self.tables[position % BYTES_PER_LED][value as usize]
    }

    pub fn apply(&self, color: Rgb) -> Rgb {
        Rgb {
            r: self.tables[0][color.r as usize],
            g: self.tables[1][color.g as usize],
            b: self.tables[2][color.b as usize],
        }
    }

    /// Map a whole r,g,b byte stream in place
    pub fn apply_bytes(&self, bytes: &mut [u8]) {
        for led in bytes.chunks_mut(BYTES_PER_LED) {
            for (byte, table) in led.iter_mut().zip(&self.tables) {
                *byte = table[*byte as usize];
            }
        }
    }
}

impl Default for GammaCorrector {
    fn default() -> Self {
        Self::ws2812()
    }
}

impl core::fmt::Debug for GammaCorrector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GammaCorrector")
            .field("mid_gray", &[self.tables[0][128], self.tables[1][128], self.tables[2][128]])
            .finish()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn power_lut(exponent: f32) -> Lut {
    let mut lut = [0; 256];
    for (value, slot) in (0..=u8::MAX).zip(lut.iter_mut()) {
        let normalized = f32::from(value) / 255.0;
        let scaled = libm::powf(normalized, exponent) * 255.0 + 0.5;
        *slot = scaled.clamp(0.0, 255.0) as u8;
    }
    lut
}
