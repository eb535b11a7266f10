//! Pixel encoder
//!
//! Converts channel-separated colors into the 16-bit 5-6-5 wire format used
//! by the controller. Everything here is pure and never fails: out-of-range
//! channels are clamped.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Order of the two bytes of a packed pixel on the wire
///
/// The controller natively expects the high byte first. Some units ship with
/// the panel wired or configured for swapped bytes; this is a per-unit
/// constant found during bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ByteOrder {
    /// High byte first
    #[default]
    BigEndian,
    /// Low byte first
    LittleEndian,
}

/// Packed 5-6-5 color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb565(pub u16);

impl Rgb565 {
    /// Create from 8-bit channels, truncating to 5/6/5 bits
    pub const fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        Self((((r as u16) >> 3) << 11) | (((g as u16) >> 2) << 5) | ((b as u16) >> 3))
    }

    /// Create from channels already scaled to 5/6/5 bits
    ///
    /// Excess high bits are masked off.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self((((r & 0x1F) as u16) << 11) | (((g & 0x3F) as u16) << 5) | ((b & 0x1F) as u16))
    }

    /// Create from arbitrary integer channels, clamping each to 0..=255
    pub fn from_rgb_clamped(r: i32, g: i32, b: i32) -> Self {
        let clamp = |c: i32| c.clamp(0, 255) as u8;
        Self::from_rgb888(clamp(r), clamp(g), clamp(b))
    }

    /// Create from hue (degrees), saturation and value (percent)
    ///
    /// Hue wraps at 360; saturation and value are clamped to 100.
    pub fn from_hsv(hue: u16, saturation: u8, value: u8) -> Self {
        let h = (hue % 360) as u32;
        let s = saturation.min(100) as u32;
        let v = value.min(100) as u32;

        let v255 = v * 255 / 100;
        let c = v * s * 255 / 10_000;
        let x = c * (60 - (h % 120).abs_diff(60)) / 60;
        let m = v255 - c;

        let (r, g, b) = match h / 60 {
            0 => (c, x, 0),
            1 => (x, c, 0),
            2 => (0, c, x),
            3 => (0, x, c),
            4 => (x, 0, c),
            _ => (c, 0, x),
        };

        Self::from_rgb888((r + m) as u8, (g + m) as u8, (b + m) as u8)
    }

    /// Raw packed value
    pub const fn into_inner(self) -> u16 {
        self.0
    }

    /// 5-bit red channel
    pub const fn r(self) -> u8 {
        (self.0 >> 11) as u8 & 0x1F
    }

    /// 6-bit green channel
    pub const fn g(self) -> u8 {
        (self.0 >> 5) as u8 & 0x3F
    }

    /// 5-bit blue channel
    pub const fn b(self) -> u8 {
        self.0 as u8 & 0x1F
    }

    /// Expand back to 8-bit channels, replicating high bits into the low ones
    pub const fn to_rgb888(self) -> (u8, u8, u8) {
        let (r, g, b) = (self.r(), self.g(), self.b());
        ((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
    }

    /// Encode as two wire bytes
    #[inline]
    pub const fn encode(self, order: ByteOrder) -> [u8; 2] {
        match order {
            ByteOrder::BigEndian => self.0.to_be_bytes(),
            ByteOrder::LittleEndian => self.0.to_le_bytes(),
        }
    }

    /// Decode two wire bytes
    #[inline]
    pub const fn decode(bytes: [u8; 2], order: ByteOrder) -> Self {
        match order {
            ByteOrder::BigEndian => Self(u16::from_be_bytes(bytes)),
            ByteOrder::LittleEndian => Self(u16::from_le_bytes(bytes)),
        }
    }

    /// Fill `out` with repeated encodings of this color
    ///
    /// Returns the number of whole pixels written; a trailing odd byte is
    /// left untouched.
    pub fn encode_span(self, order: ByteOrder, out: &mut [u8]) -> usize {
        let bytes = self.encode(order);
        let mut count = 0;
        for px in out.chunks_exact_mut(2) {
            px.copy_from_slice(&bytes);
            count += 1;
        }
        count
    }
}

impl From<u16> for Rgb565 {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Rgb565> for u16 {
    fn from(color: Rgb565) -> Self {
        color.0
    }
}

/// Swap each pixel's bytes in place, converting between byte orders
pub fn swap_pixel_bytes(bytes: &mut [u8]) {
    for px in bytes.chunks_exact_mut(2) {
        px.swap(0, 1);
    }
}

/// Shared named colors
pub mod palette {
    use super::Rgb565;

    pub const BLACK: Rgb565 = Rgb565(0x0000);
    pub const WHITE: Rgb565 = Rgb565(0xFFFF);
    pub const RED: Rgb565 = Rgb565(0xF800);
    pub const GREEN: Rgb565 = Rgb565(0x07E0);
    pub const BLUE: Rgb565 = Rgb565(0x001F);
    pub const YELLOW: Rgb565 = Rgb565(0xFFE0);
    pub const CYAN: Rgb565 = Rgb565(0x07FF);
    pub const MAGENTA: Rgb565 = Rgb565(0xF81F);
    pub const PALE_GREEN: Rgb565 = Rgb565(0x87E0);
    pub const ORANGE: Rgb565 = Rgb565(0xFD20);
    pub const PURPLE: Rgb565 = Rgb565(0x8010);
    pub const GRAY: Rgb565 = Rgb565(0x8410);
    pub const DARK_GRAY: Rgb565 = Rgb565(0x4208);
    pub const DARK_BLUE: Rgb565 = Rgb565(0x2104);
    pub const NAVY: Rgb565 = Rgb565(0x1082);
    pub const DARK_GREEN: Rgb565 = Rgb565(0x0320);
    pub const DARK_RED: Rgb565 = Rgb565(0x6000);
}
