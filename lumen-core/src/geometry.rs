//! Panel geometry and addressing
//!
//! The logical canvas is a window into the controller's frame memory. The
//! panel glass only covers part of that memory, so every logical coordinate
//! is shifted by a fixed per-unit origin offset before it is sent.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Controller frame memory columns in native (portrait) orientation
pub const CONTROLLER_COLS: u16 = 240;

/// Controller frame memory rows in native (portrait) orientation
pub const CONTROLLER_ROWS: u16 = 320;

/// Memory access control (MADCTL) value
///
/// Bit 7 mirrors rows, bit 6 mirrors columns, bit 5 exchanges rows and
/// columns, bit 3 selects BGR order. The right value is a per-unit
/// constant; units of the same model have shipped needing different ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Orientation(pub u8);

impl Orientation {
    pub const PORTRAIT: Self = Self(0x00);
    pub const LANDSCAPE: Self = Self(0x60);
    pub const PORTRAIT_FLIPPED: Self = Self(0xC0);
    pub const LANDSCAPE_FLIPPED: Self = Self(0xA0);

    /// Row/column exchange bit
    const MV: u8 = 0x20;

    /// Raw MADCTL byte
    pub const fn madctl(self) -> u8 {
        self.0
    }

    /// Whether logical x runs along controller rows
    pub const fn swaps_axes(self) -> bool {
        self.0 & Self::MV != 0
    }

    /// Addressable (columns, rows) of the controller in this orientation
    pub const fn controller_extent(self) -> (u16, u16) {
        if self.swaps_axes() {
            (CONTROLLER_ROWS, CONTROLLER_COLS)
        } else {
            (CONTROLLER_COLS, CONTROLLER_ROWS)
        }
    }
}

/// Axis-aligned rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Number of pixels covered
    pub const fn area(&self) -> u32 {
        self.w as u32 * self.h as u32
    }

    /// Exclusive right edge
    pub const fn right(&self) -> u32 {
        self.x as u32 + self.w as u32
    }

    /// Exclusive bottom edge
    pub const fn bottom(&self) -> u32 {
        self.y as u32 + self.h as u32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x as i32
            && y >= self.y as i32
            && (x as i64) < self.right() as i64
            && (y as i64) < self.bottom() as i64
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn encloses(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Clip a signed rectangle against this one
    ///
    /// Returns `None` when nothing of it is visible.
    pub fn clip(&self, x: i32, y: i32, w: i32, h: i32) -> Option<Rect> {
        self.clip_wide(x as i64, y as i64, w as i64, h as i64)
    }

    /// [`Rect::clip`] for extents that do not fit in `i32`
    pub fn clip_wide(&self, x: i64, y: i64, w: i64, h: i64) -> Option<Rect> {
        if w <= 0 || h <= 0 {
            return None;
        }
        let x0 = x.max(self.x as i64);
        let y0 = y.max(self.y as i64);
        let x1 = x.saturating_add(w).min(self.right() as i64);
        let y1 = y.saturating_add(h).min(self.bottom() as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Rect::new(x0 as u16, y0 as u16, (x1 - x0) as u16, (y1 - y0) as u16))
    }

    /// Intersection of two rectangles
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        self.clip(other.x as i32, other.y as i32, other.w as i32, other.h as i32)
    }
}

/// Window latched in the controller for the next pixel stream
pub type Window = Rect;

/// Controller address ranges for a window (inclusive ends)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address {
    pub columns: (u16, u16),
    pub rows: (u16, u16),
}

impl Address {
    /// CASET parameter bytes
    pub fn column_args(&self) -> [u8; 4] {
        range_args(self.columns)
    }

    /// RASET parameter bytes
    pub fn row_args(&self) -> [u8; 4] {
        range_args(self.rows)
    }
}

fn range_args((start, end): (u16, u16)) -> [u8; 4] {
    let [s0, s1] = start.to_be_bytes();
    let [e0, e1] = end.to_be_bytes();
    [s0, s1, e0, e1]
}

/// Logical canvas: size, orientation and origin offset of the glass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Canvas {
    /// Visible width in pixels
    pub width: u16,
    /// Visible height in pixels
    pub height: u16,
    /// Controller column of logical x = 0
    pub x_offset: u16,
    /// Controller row of logical y = 0
    pub y_offset: u16,
    /// MADCTL orientation value
    #[cfg_attr(feature = "serde", serde(default))]
    pub orientation: Orientation,
}

impl Canvas {
    pub const fn new(width: u16, height: u16, x_offset: u16, y_offset: u16) -> Self {
        Self {
            width,
            height,
            x_offset,
            y_offset,
            orientation: Orientation::PORTRAIT,
        }
    }

    /// Full canvas rectangle
    pub const fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Total pixel count
    pub const fn pixel_count(&self) -> u32 {
        self.width as u32 * self.height as u32
    }

    /// Check that the canvas fits in controller memory
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroSize);
        }
        let (cols, rows) = self.orientation.controller_extent();
        if self.x_offset as u32 + self.width as u32 > cols as u32
            || self.y_offset as u32 + self.height as u32 > rows as u32
        {
            return Err(ConfigError::ExceedsController);
        }
        Ok(())
    }

    /// Check a window against the canvas
    pub fn check_window(&self, window: &Window) -> Result<(), ConfigError> {
        if window.is_empty() {
            return Err(ConfigError::ZeroSize);
        }
        if !self.bounds().encloses(window) {
            return Err(ConfigError::OutOfBounds);
        }
        Ok(())
    }

    /// Controller address ranges for a window
    ///
    /// The window must already have passed [`Canvas::check_window`].
    pub fn address(&self, window: &Window) -> Address {
        let col = self.x_offset + window.x;
        let row = self.y_offset + window.y;
        Address {
            columns: (col, col + window.w - 1),
            rows: (row, row + window.h - 1),
        }
    }
}
