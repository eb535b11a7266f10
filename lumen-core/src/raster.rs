//! Primitive rasterizer
//!
//! Shape, glyph and bitmap drawing over a [`Surface`]. Coordinates are
//! signed so shapes may start off-canvas; everything is clipped against
//! [`Surface::bounds`] before the backend sees it, and clipping is never an
//! error.
//!
//! ```text
//! draw_* ──clip──▶ Surface::fill_rect / Surface::blit
//!                        │
//!            ┌───────────┴───────────┐
//!            ▼                       ▼
//!        Panel (direct)       FrameStore (buffered)
//! ```

use crate::color::{ByteOrder, Rgb565};
use crate::error::Malformed;
use crate::font::{self, GLYPH_H, GLYPH_W, PITCH};
use crate::geometry::Rect;

/// Pixel sink for the rasterizer
///
/// Both methods receive rectangles already clipped to `bounds()` and never
/// empty.
pub trait Surface {
    type Error;

    /// Drawable area in canvas coordinates
    fn bounds(&self) -> Rect;

    /// Paint `area` with one color
    fn fill_rect(&mut self, area: Rect, color: Rgb565) -> Result<(), Self::Error>;

    /// Paint `area` row-major, asking `pixel` for each canvas coordinate
    fn blit(
        &mut self,
        area: Rect,
        pixel: &mut dyn FnMut(u16, u16) -> Rgb565,
    ) -> Result<(), Self::Error>;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    type Error = S::Error;

    fn bounds(&self) -> Rect {
        (**self).bounds()
    }

    fn fill_rect(&mut self, area: Rect, color: Rgb565) -> Result<(), Self::Error> {
        (**self).fill_rect(area, color)
    }

    fn blit(
        &mut self,
        area: Rect,
        pixel: &mut dyn FnMut(u16, u16) -> Rgb565,
    ) -> Result<(), Self::Error> {
        (**self).blit(area, pixel)
    }
}

fn fill_clipped<S: Surface + ?Sized>(
    s: &mut S,
    x: i64,
    y: i64,
    w: i64,
    h: i64,
    color: Rgb565,
) -> Result<(), S::Error> {
    match s.bounds().clip_wide(x, y, w, h) {
        Some(area) => s.fill_rect(area, color),
        None => Ok(()),
    }
}

/// Whether the inclusive box (x0, y0)..=(x1, y1) misses `bounds` entirely
fn misses(bounds: Rect, x0: i64, y0: i64, x1: i64, y1: i64) -> bool {
    x1 < bounds.x as i64
        || y1 < bounds.y as i64
        || x0 >= bounds.right() as i64
        || y0 >= bounds.bottom() as i64
}

pub fn draw_pixel<S: Surface + ?Sized>(
    s: &mut S,
    x: i32,
    y: i32,
    color: Rgb565,
) -> Result<(), S::Error> {
    fill_clipped(s, x as i64, y as i64, 1, 1, color)
}

pub fn draw_hline<S: Surface + ?Sized>(
    s: &mut S,
    x: i32,
    y: i32,
    w: i32,
    color: Rgb565,
) -> Result<(), S::Error> {
    fill_clipped(s, x as i64, y as i64, w as i64, 1, color)
}

pub fn draw_vline<S: Surface + ?Sized>(
    s: &mut S,
    x: i32,
    y: i32,
    h: i32,
    color: Rgb565,
) -> Result<(), S::Error> {
    fill_clipped(s, x as i64, y as i64, 1, h as i64, color)
}

/// Line between two inclusive endpoints (Bresenham)
///
/// Axis-aligned lines become a single span. Other lines stop stepping once
/// they have left the surface; a monotone path cannot come back.
pub fn draw_line<S: Surface + ?Sized>(
    s: &mut S,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Rgb565,
) -> Result<(), S::Error> {
    let (lx, hx) = (x0.min(x1) as i64, x0.max(x1) as i64);
    let (ly, hy) = (y0.min(y1) as i64, y0.max(y1) as i64);
    if y0 == y1 {
        return fill_clipped(s, lx, ly, hx - lx + 1, 1, color);
    }
    if x0 == x1 {
        return fill_clipped(s, lx, ly, 1, hy - ly + 1, color);
    }
    let bounds = s.bounds();
    if misses(bounds, lx, ly, hx, hy) {
        return Ok(());
    }

    let dx = (x1 as i64 - x0 as i64).abs();
    let dy = -(y1 as i64 - y0 as i64).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    let mut entered = false;

    loop {
        if bounds.contains(x, y) {
            entered = true;
            fill_clipped(s, x as i64, y as i64, 1, 1, color)?;
        } else if entered {
            break;
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    Ok(())
}

/// Rectangle outline
pub fn draw_rect<S: Surface + ?Sized>(
    s: &mut S,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: Rgb565,
) -> Result<(), S::Error> {
    if w <= 0 || h <= 0 {
        return Ok(());
    }
    let right = x.saturating_add(w - 1);
    let bottom = y.saturating_add(h - 1);
    draw_line(s, x, y, right, y, color)?;
    draw_line(s, x, bottom, right, bottom, color)?;
    draw_line(s, x, y, x, bottom, color)?;
    draw_line(s, right, y, right, bottom, color)
}

/// Solid rectangle
pub fn fill_rect<S: Surface + ?Sized>(
    s: &mut S,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: Rgb565,
) -> Result<(), S::Error> {
    fill_clipped(s, x as i64, y as i64, w as i64, h as i64, color)
}

/// Circle outline (midpoint algorithm)
pub fn draw_circle<S: Surface + ?Sized>(
    s: &mut S,
    cx: i32,
    cy: i32,
    r: i32,
    color: Rgb565,
) -> Result<(), S::Error> {
    if r < 0 {
        return Ok(());
    }
    let (cx, cy, r) = (cx as i64, cy as i64, r as i64);
    if misses(s.bounds(), cx - r, cy - r, cx + r, cy + r) {
        return Ok(());
    }
    let (mut x, mut y, mut err) = (r, 0i64, 1 - r);
    while x >= y {
        for (px, py) in [
            (cx + x, cy + y),
            (cx + y, cy + x),
            (cx - y, cy + x),
            (cx - x, cy + y),
            (cx - x, cy - y),
            (cx - y, cy - x),
            (cx + y, cy - x),
            (cx + x, cy - y),
        ] {
            fill_clipped(s, px, py, 1, 1, color)?;
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
    Ok(())
}

/// Solid circle, one span per visible row
pub fn fill_circle<S: Surface + ?Sized>(
    s: &mut S,
    cx: i32,
    cy: i32,
    r: i32,
    color: Rgb565,
) -> Result<(), S::Error> {
    if r < 0 {
        return Ok(());
    }
    let (cx, cy, r) = (cx as i64, cy as i64, r as i64);
    let bounds = s.bounds();
    let first = (-r).max(bounds.y as i64 - cy);
    let last = r.min(bounds.bottom() as i64 - 1 - cy);
    let rr = (r * r) as u64;
    for dy in first..=last {
        let dx = isqrt(rr - dy.unsigned_abs() * dy.unsigned_abs()) as i64;
        fill_clipped(s, cx - dx, cy + dy, 2 * dx + 1, 1, color)?;
    }
    Ok(())
}

fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// Text rendering parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextStyle {
    pub fg: Rgb565,
    /// Paint unlit glyph pixels when set
    pub bg: Option<Rgb565>,
    /// Integer magnification, at least 1
    pub scale: u8,
}

impl TextStyle {
    pub const fn new(fg: Rgb565) -> Self {
        Self {
            fg,
            bg: None,
            scale: 1,
        }
    }

    pub const fn with_bg(mut self, bg: Rgb565) -> Self {
        self.bg = Some(bg);
        self
    }

    pub const fn with_scale(mut self, scale: u8) -> Self {
        self.scale = if scale == 0 { 1 } else { scale };
        self
    }

    fn scale(&self) -> u16 {
        self.scale.max(1) as u16
    }
}

/// Draw one character with its top-left corner at (x, y)
///
/// With a background the whole glyph cell goes out as one blit; without one
/// only lit pixels are painted.
pub fn draw_char<S: Surface + ?Sized>(
    s: &mut S,
    x: i32,
    y: i32,
    ch: char,
    style: &TextStyle,
) -> Result<(), S::Error> {
    let glyph = font::glyph(ch);
    let scale = style.scale();

    if let Some(bg) = style.bg {
        let cell_w = (GLYPH_W * scale) as i32;
        let cell_h = (GLYPH_H * scale) as i32;
        let Some(area) = s.bounds().clip(x, y, cell_w, cell_h) else {
            return Ok(());
        };
        let fg = style.fg;
        return s.blit(area, &mut |px, py| {
            let col = ((px as i32 - x) as u16) / scale;
            let row = ((py as i32 - y) as u16) / scale;
            if font::lit(glyph, col, row) {
                fg
            } else {
                bg
            }
        });
    }

    let step = scale as i64;
    for row in 0..GLYPH_H {
        for col in 0..GLYPH_W {
            if font::lit(glyph, col, row) {
                fill_clipped(
                    s,
                    x as i64 + col as i64 * step,
                    y as i64 + row as i64 * step,
                    step,
                    step,
                    style.fg,
                )?;
            }
        }
    }
    Ok(())
}

/// Draw a string left to right and return the x of the next character cell
pub fn draw_text<S: Surface + ?Sized>(
    s: &mut S,
    x: i32,
    y: i32,
    text: &str,
    style: &TextStyle,
) -> Result<i32, S::Error> {
    let advance = (PITCH * style.scale()) as i32;
    let limit = s.bounds().right() as i32;
    let mut cx = x;
    for ch in text.chars() {
        if cx < limit {
            draw_char(s, cx, y, ch, style)?;
        }
        cx = cx.saturating_add(advance);
    }
    Ok(cx)
}

/// Width in pixels that `draw_text` advances for `text`
pub fn text_width(text: &str, scale: u8) -> u32 {
    text.chars().count() as u32 * PITCH as u32 * scale.max(1) as u32
}

/// Pre-encoded pixel data with validated geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap<'a> {
    width: u16,
    height: u16,
    data: &'a [u8],
    order: ByteOrder,
}

impl<'a> Bitmap<'a> {
    /// Wrap `data`, which must hold exactly `width × height` packed pixels
    pub fn new(
        width: u16,
        height: u16,
        data: &'a [u8],
        order: ByteOrder,
    ) -> Result<Self, Malformed> {
        let expected = width as usize * height as usize * 2;
        if data.len() != expected {
            return Err(Malformed::BitmapSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            order,
        })
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Pixel at bitmap coordinates; black outside
    pub fn pixel(&self, x: u16, y: u16) -> Rgb565 {
        if x >= self.width || y >= self.height {
            return Rgb565::default();
        }
        let i = (y as usize * self.width as usize + x as usize) * 2;
        Rgb565::decode([self.data[i], self.data[i + 1]], self.order)
    }
}

/// Draw a bitmap with its top-left corner at (x, y)
pub fn draw_bitmap<S: Surface + ?Sized>(
    s: &mut S,
    x: i32,
    y: i32,
    bitmap: &Bitmap<'_>,
) -> Result<(), S::Error> {
    draw_bitmap_scaled(s, x, y, bitmap, 1, 1)
}

/// Draw a bitmap magnified by integer factors
pub fn draw_bitmap_scaled<S: Surface + ?Sized>(
    s: &mut S,
    x: i32,
    y: i32,
    bitmap: &Bitmap<'_>,
    scale_x: u8,
    scale_y: u8,
) -> Result<(), S::Error> {
    let (sx, sy) = (scale_x.max(1) as i32, scale_y.max(1) as i32);
    let w = bitmap.width as i32 * sx;
    let h = bitmap.height as i32 * sy;
    let Some(area) = s.bounds().clip(x, y, w, h) else {
        return Ok(());
    };
    s.blit(area, &mut |px, py| {
        let bx = (px as i32 - x) / sx;
        let by = (py as i32 - y) / sy;
        bitmap.pixel(bx as u16, by as u16)
    })
}
