//! Pixel addressing for serpentine-wired LED matrices
//!
//! A matrix is one strip snaking across rows without a return wire: even rows
//! run left-to-right, odd rows run right-to-left. A [`MatrixView`] maps
//! `(x, y)` inside such a matrix onto a channel and an LED offset within that
//! channel. A [`Surface`] chains several views into one continuous drawing
//! area, e.g. text scrolling across panels of different heights.

use crate::error::{Error, Result};

/// Channel-relative location of one LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelAddress {
    pub channel: usize,
    /// LED index within the channel
    pub offset: usize,
}

/// Rectangular addressing window bound to one channel
///
/// `offset` is counted in LEDs, so several views can share a channel at
/// disjoint offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixView {
    pub channel: usize,
    pub offset: usize,
    pub x_size: usize,
    pub y_size: usize,
}

impl MatrixView {
    pub const fn new(channel: usize, offset: usize, x_size: usize, y_size: usize) -> Self {
        Self {
            channel,
            offset,
            x_size,
            y_size,
        }
    }

    /// Number of LEDs covered by the view
    pub const fn capacity(&self) -> usize {
        self.x_size * self.y_size
    }

    /// First LED offset past the end of the view
    pub const fn end(&self) -> usize {
        self.offset + self.capacity()
    }

    /// Serpentine offset of `(x, y)` relative to the view base
    ///
    /// Coordinates must be inside the view; clipping is the caller's job.
    #[inline]
    pub const fn offset_within(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.x_size && y < self.y_size);
        let column = if y % 2 == 0 { x } else { self.x_size - 1 - x };
        y * self.x_size + column
    }

    /// Resolve `(x, y)` to a channel and absolute LED offset
    #[inline]
    pub const fn address(&self, x: usize, y: usize) -> PixelAddress {
        PixelAddress {
            channel: self.channel,
            offset: self.offset + self.offset_within(x, y),
        }
    }
}

/// Position on a [`Surface`]: a view index and a row inside that view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceCursor {
    pub view: usize,
    pub line: usize,
}

/// Views drawn as one continuous surface in a fixed cyclic order
#[derive(Debug, Clone)]
pub struct Surface {
    views: Vec<MatrixView>,
}

impl Surface {
    pub fn new(views: Vec<MatrixView>) -> Result<Self> {
        if views.is_empty() {
            return Err(Error::InvalidConfig("surface needs at least one view"));
        }
        if views.iter().any(|view| view.x_size == 0 || view.y_size == 0) {
            return Err(Error::InvalidConfig("surface views must not be empty"));
        }
        Ok(Self { views })
    }

    pub fn views(&self) -> &[MatrixView] {
        &self.views
    }

    /// Total number of rows across all views
    pub fn lines(&self) -> usize {
        self.views.iter().map(|view| view.y_size).sum()
    }

    /// Step the cursor one row forward
    ///
    /// Wraps to row 0 of the next view once the current view is exhausted, and
    /// from the last view back to the first.
    pub fn advance(&self, cursor: &mut SurfaceCursor) {
        cursor.line += 1;
        if cursor.line >= self.views[cursor.view].y_size {
            cursor.line = 0;
            cursor.view = (cursor.view + 1) % self.views.len();
        }
    }

    /// Cursor `steps` rows after `cursor`
    pub fn advanced(&self, mut cursor: SurfaceCursor, steps: usize) -> SurfaceCursor {
        for _ in 0..steps % self.lines() {
            self.advance(&mut cursor);
        }
        cursor
    }

    /// Resolve column `x` of the row under `cursor`
    #[inline]
    pub fn address(&self, cursor: SurfaceCursor, x: usize) -> PixelAddress {
        self.views[cursor.view].address(x, cursor.line)
    }

    /// Width of the row under `cursor`
    pub fn width_at(&self, cursor: SurfaceCursor) -> usize {
        self.views[cursor.view].x_size
    }
}
