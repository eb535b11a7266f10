//! Frame store
//!
//! A fixed-size block of encoded pixels covering some region of the canvas.
//! Drawing into it touches no bus; [`FrameStore::flush`] then sends the
//! visible part as one window and one bulk transfer. Sized to the whole
//! canvas it is a classic framebuffer; sized to a strip and moved with
//! [`FrameStore::move_to`] it trades bus windows for memory.

use alloc::vec::Vec;
use core::convert::Infallible;

use lumen_hal::DisplayBus;

use crate::color::{swap_pixel_bytes, ByteOrder, Rgb565};
use crate::config::{MemoryBudget, PanelConfig};
use crate::error::{AllocError, Error};
use crate::geometry::Rect;
use crate::panel::Panel;
use crate::planner::TransferPlanner;
use crate::raster::Surface;

/// Off-screen pixel region in wire encoding
#[derive(Debug)]
pub struct FrameStore {
    region: Rect,
    order: ByteOrder,
    buf: Vec<u8>,
}

impl FrameStore {
    /// Allocate a store for `region`, zeroed to black
    pub fn try_new(region: Rect, order: ByteOrder, budget: &MemoryBudget) -> Result<Self, AllocError> {
        let bytes = region.area() as usize * 2;
        let buf = TransferPlanner::new(*budget).alloc(bytes)?;
        debug!(
            "frame store {}x{}: {} bytes",
            region.w,
            region.h,
            bytes
        );
        Ok(Self { region, order, buf })
    }

    /// Store covering the whole canvas
    pub fn full_canvas(config: &PanelConfig) -> Result<Self, AllocError> {
        Self::try_new(config.canvas.bounds(), config.byte_order, &config.budget)
    }

    /// Full-width store of `rows` rows at the top of the canvas
    pub fn strip(config: &PanelConfig, rows: u16) -> Result<Self, AllocError> {
        let rows = rows.min(config.canvas.height);
        Self::try_new(
            Rect::new(0, 0, config.canvas.width, rows),
            config.byte_order,
            &config.budget,
        )
    }

    /// Canvas area currently covered
    pub fn region(&self) -> Rect {
        self.region
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Encoded pixels, row-major
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Reposition without resizing
    pub fn move_to(&mut self, x: u16, y: u16) {
        self.region.x = x;
        self.region.y = y;
    }

    pub fn clear(&mut self, color: Rgb565) {
        color.encode_span(self.order, &mut self.buf);
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if !self.region.contains(x, y) {
            return None;
        }
        let col = (x - self.region.x as i32) as usize;
        let row = (y - self.region.y as i32) as usize;
        Some((row * self.region.w as usize + col) * 2)
    }

    /// Set one pixel; coordinates outside the region are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb565) {
        if let Some(i) = self.offset(x, y) {
            self.buf[i..i + 2].copy_from_slice(&color.encode(self.order));
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb565> {
        self.offset(x, y)
            .map(|i| Rgb565::decode([self.buf[i], self.buf[i + 1]], self.order))
    }

    /// Copy a horizontal run of colors starting at (x, y), clipped
    pub fn blit_span(&mut self, x: i32, y: i32, colors: &[Rgb565]) {
        let Some(span) = self.region.clip(x, y, colors.len() as i32, 1) else {
            return;
        };
        let skip = (span.x as i32 - x) as usize;
        let Some(start) = self.offset(span.x as i32, span.y as i32) else {
            return;
        };
        let out = &mut self.buf[start..start + span.w as usize * 2];
        for (px, color) in out.chunks_exact_mut(2).zip(&colors[skip..]) {
            px.copy_from_slice(&color.encode(self.order));
        }
    }

    /// Paint a horizontal run of one color starting at (x, y), clipped
    pub fn fill_span(&mut self, x: i32, y: i32, len: u16, color: Rgb565) {
        let Some(span) = self.region.clip(x, y, len as i32, 1) else {
            return;
        };
        if let Some(start) = self.offset(span.x as i32, span.y as i32) {
            color.encode_span(self.order, &mut self.buf[start..start + span.w as usize * 2]);
        }
    }

    /// Send the part of the store that lies on the canvas
    ///
    /// One window covers the visible rows. When the store is encoded in a
    /// different byte order than the panel expects the buffer is swapped in
    /// place for the transfer and swapped back afterwards.
    pub fn flush<B: DisplayBus>(&mut self, panel: &mut Panel<B>) -> Result<(), Error<B::Error>> {
        let Some(visible) = panel.canvas().bounds().intersect(&self.region) else {
            return Ok(());
        };

        let swap = self.order != panel.config().byte_order;
        if swap {
            swap_pixel_bytes(&mut self.buf);
        }
        let result = self.send(panel, visible);
        if swap {
            swap_pixel_bytes(&mut self.buf);
        }
        result
    }

    fn send<B: DisplayBus>(&self, panel: &mut Panel<B>, visible: Rect) -> Result<(), Error<B::Error>> {
        panel.set_window(visible.x, visible.y, visible.w, visible.h)?;

        let stride = self.region.w as usize * 2;
        let first_row = (visible.y - self.region.y) as usize;
        if visible.w == self.region.w {
            let start = first_row * stride;
            return panel.write_pixels(&self.buf[start..start + visible.h as usize * stride]);
        }

        let col = (visible.x - self.region.x) as usize * 2;
        let width = visible.w as usize * 2;
        for row in first_row..first_row + visible.h as usize {
            let start = row * stride + col;
            panel.write_pixels(&self.buf[start..start + width])?;
        }
        Ok(())
    }
}

impl Surface for FrameStore {
    type Error = Infallible;

    fn bounds(&self) -> Rect {
        self.region
    }

    fn fill_rect(&mut self, area: Rect, color: Rgb565) -> Result<(), Infallible> {
        for y in area.y..area.y + area.h {
            self.fill_span(area.x as i32, y as i32, area.w, color);
        }
        Ok(())
    }

    fn blit(
        &mut self,
        area: Rect,
        pixel: &mut dyn FnMut(u16, u16) -> Rgb565,
    ) -> Result<(), Infallible> {
        for y in area.y..area.y + area.h {
            for x in area.x..area.x + area.w {
                self.set_pixel(x as i32, y as i32, pixel(x, y));
            }
        }
        Ok(())
    }
}

#[cfg(feature = "embedded-graphics")]
mod graphics {
    use embedded_graphics_core::draw_target::DrawTarget;
    use embedded_graphics_core::geometry::{Dimensions, Point, Size};
    use embedded_graphics_core::pixelcolor::raw::{RawData, RawU16};
    use embedded_graphics_core::pixelcolor::Rgb565 as EgRgb565;
    use embedded_graphics_core::primitives::Rectangle;
    use embedded_graphics_core::Pixel;

    use super::FrameStore;
    use crate::color::Rgb565;
    use crate::raster::Surface;

    fn convert(color: EgRgb565) -> Rgb565 {
        Rgb565(RawU16::from(color).into_inner())
    }

    impl Dimensions for FrameStore {
        fn bounding_box(&self) -> Rectangle {
            let r = self.region();
            Rectangle::new(
                Point::new(r.x as i32, r.y as i32),
                Size::new(r.w as u32, r.h as u32),
            )
        }
    }

    impl DrawTarget for FrameStore {
        type Color = EgRgb565;
        type Error = core::convert::Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(p, color) in pixels {
                self.set_pixel(p.x, p.y, convert(color));
            }
            Ok(())
        }

        fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
            let clipped = self.region().clip(
                area.top_left.x,
                area.top_left.y,
                area.size.width.min(i32::MAX as u32) as i32,
                area.size.height.min(i32::MAX as u32) as i32,
            );
            match clipped {
                Some(rect) => Surface::fill_rect(self, rect, convert(color)),
                None => Ok(()),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::color::{palette, ByteOrder};
        use crate::config::MemoryBudget;
        use crate::geometry::Rect;

        fn store() -> FrameStore {
            FrameStore::try_new(Rect::new(10, 10, 4, 4), ByteOrder::BigEndian, &MemoryBudget::default())
                .unwrap()
        }

        #[test]
        fn test_draw_target_clips_to_region() {
            let mut s = store();
            assert_eq!(
                s.bounding_box(),
                Rectangle::new(Point::new(10, 10), Size::new(4, 4))
            );

            let red = EgRgb565::new(31, 0, 0);
            s.draw_iter([
                Pixel(Point::new(10, 10), red),
                Pixel(Point::new(9, 10), red),
                Pixel(Point::new(-5, 100), red),
            ])
            .unwrap();
            assert_eq!(s.pixel(10, 10), Some(palette::RED));
            assert_eq!(s.pixel(11, 10), Some(palette::BLACK));

            // Hangs off the top and right of the region
            let green = EgRgb565::new(0, 63, 0);
            s.fill_solid(&Rectangle::new(Point::new(12, 8), Size::new(10, 4)), green)
                .unwrap();
            assert_eq!(s.pixel(12, 10), Some(palette::GREEN));
            assert_eq!(s.pixel(13, 11), Some(palette::GREEN));
            assert_eq!(s.pixel(13, 12), Some(palette::BLACK));
            assert_eq!(s.pixel(11, 11), Some(palette::BLACK));
        }

        #[test]
        fn test_fill_solid_oversized_area() {
            let mut s = store();
            let blue = EgRgb565::new(0, 0, 31);
            s.fill_solid(
                &Rectangle::new(Point::new(-100, -100), Size::new(u32::MAX, u32::MAX)),
                blue,
            )
            .unwrap();
            assert!(s.as_bytes().chunks(2).all(|px| px == [0x00, 0x1F]));

            s.fill_solid(&Rectangle::new(Point::new(0, 0), Size::new(5, 5)), EgRgb565::new(31, 0, 0))
                .unwrap();
            assert!(s.as_bytes().chunks(2).all(|px| px == [0x00, 0x1F]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::palette;
    use crate::raster::{draw_text, fill_rect, TextStyle};
    use crate::testing::RecordingBus;
    use alloc::vec;
    use proptest::prelude::*;

    const SENTINEL: Rgb565 = Rgb565(0xA5A5);

    fn stick() -> Panel<RecordingBus> {
        Panel::new(RecordingBus::new(), PanelConfig::M5STICKC_PLUS).unwrap()
    }

    fn roomy() -> PanelConfig {
        PanelConfig {
            budget: MemoryBudget::new(1024, 96 * 1024),
            ..PanelConfig::M5STICKC_PLUS
        }
    }

    #[test]
    fn test_budget_limits_store_size() {
        let config = PanelConfig::M5STICKC_PLUS;
        assert_eq!(
            FrameStore::full_canvas(&config).err(),
            Some(AllocError { requested: 64_800 })
        );
        let strip = FrameStore::strip(&config, 16).unwrap();
        assert_eq!(strip.region(), Rect::new(0, 0, 135, 16));
        assert_eq!(strip.as_bytes().len(), 135 * 16 * 2);
    }

    #[test]
    fn test_pixels_outside_region_are_ignored() {
        let mut store =
            FrameStore::try_new(Rect::new(10, 10, 4, 4), ByteOrder::BigEndian, &MemoryBudget::default())
                .unwrap();
        store.set_pixel(9, 10, palette::RED);
        store.set_pixel(14, 13, palette::RED);
        assert!(store.as_bytes().iter().all(|&b| b == 0));
        store.set_pixel(13, 13, palette::RED);
        assert_eq!(store.pixel(13, 13), Some(palette::RED));
        assert_eq!(store.pixel(0, 0), None);
    }

    #[test]
    fn test_spans_clip() {
        let mut store =
            FrameStore::try_new(Rect::new(0, 0, 4, 1), ByteOrder::BigEndian, &MemoryBudget::default())
                .unwrap();
        store.blit_span(-2, 0, &[palette::RED, palette::GREEN, palette::BLUE, palette::WHITE]);
        assert_eq!(store.pixel(0, 0), Some(palette::BLUE));
        assert_eq!(store.pixel(1, 0), Some(palette::WHITE));
        assert_eq!(store.pixel(2, 0), Some(palette::BLACK));

        store.fill_span(3, 0, 10, palette::CYAN);
        assert_eq!(store.pixel(3, 0), Some(palette::CYAN));
        assert_eq!(store.pixel(2, 0), Some(palette::BLACK));
    }

    #[test]
    fn test_buffered_and_direct_fill_match() {
        let config = roomy();
        let mut direct = Panel::new(RecordingBus::new(), config).unwrap();
        direct.clear(palette::RED).unwrap();

        let mut buffered = Panel::new(RecordingBus::new(), config).unwrap();
        let mut store = FrameStore::full_canvas(&config).unwrap();
        store.clear(palette::RED);
        store.flush(&mut buffered).unwrap();

        assert_eq!(direct.bus().ops, buffered.bus().ops);
    }

    #[test]
    fn test_flush_converts_byte_order() {
        let mut panel = stick();
        let mut store =
            FrameStore::try_new(Rect::new(0, 0, 2, 1), ByteOrder::LittleEndian, &MemoryBudget::default())
                .unwrap();
        store.clear(palette::RED);
        store.flush(&mut panel).unwrap();
        assert_eq!(panel.bus().data(), vec![0xF8, 0x00, 0xF8, 0x00]);
        // Store contents are untouched
        assert_eq!(store.as_bytes(), &[0x00, 0xF8, 0x00, 0xF8]);
    }

    #[test]
    fn test_flush_clips_to_canvas() {
        let mut panel = stick();
        let mut store =
            FrameStore::try_new(Rect::new(0, 0, 4, 4), ByteOrder::BigEndian, &MemoryBudget::default())
                .unwrap();
        store.clear(palette::WHITE);
        store.move_to(133, 238);
        store.set_pixel(133, 238, palette::RED);
        store.flush(&mut panel).unwrap();

        assert_eq!(panel.bus().rects(52, 40), vec![Rect::new(133, 238, 2, 2)]);
        assert_eq!(
            panel.bus().data(),
            vec![0xF8, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        assert!(panel.is_idle());

        store.move_to(200, 0);
        store.flush(&mut panel).unwrap();
        assert_eq!(panel.bus().windows().len(), 1);
    }

    #[test]
    fn test_render_strips_covers_canvas() {
        let config = PanelConfig::M5STICKC_PLUS;
        let mut panel = Panel::new(RecordingBus::new(), config).unwrap();
        let mut store = FrameStore::strip(&config, 50).unwrap();

        panel
            .render_strips(&mut store, palette::NAVY, |s| {
                fill_rect(s, 0, 100, 135, 2, palette::YELLOW)?;
                draw_text(s, 2, 2, "HI", &TextStyle::new(palette::WHITE)).map(|_| ())
            })
            .unwrap();

        let rects = panel.bus().rects(52, 40);
        assert_eq!(
            rects,
            vec![
                Rect::new(0, 0, 135, 50),
                Rect::new(0, 50, 135, 50),
                Rect::new(0, 100, 135, 50),
                Rect::new(0, 150, 135, 50),
                Rect::new(0, 200, 135, 40),
            ]
        );
        let data = panel.bus().data();
        assert_eq!(data.len(), 135 * 240 * 2);
        // Row 100 sits at the top of the third strip
        let at = |x: usize, y: usize| &data[(y * 135 + x) * 2..(y * 135 + x) * 2 + 2];
        assert_eq!(at(0, 100), &[0xFF, 0xE0]);
        assert_eq!(at(0, 99), &[0x10, 0x82]);
        assert!(panel.is_idle());
    }

    proptest! {
        #[test]
        fn prop_shapes_never_escape_canvas(
            x in -300i32..300, y in -300i32..300, w in -10i32..400, h in -10i32..400
        ) {
            let config = roomy();
            let mut store = FrameStore::full_canvas(&config).unwrap();
            store.clear(SENTINEL);
            // Larger than the canvas, so flushing must clip it
            let mut wide = FrameStore::try_new(
                Rect::new(0, 0, 160, 260),
                ByteOrder::BigEndian,
                &config.budget,
            ).unwrap();
            wide.clear(SENTINEL);

            let mut panel = Panel::new(RecordingBus::new(), config).unwrap();
            fill_rect(&mut panel, x, y, w, h, palette::RED).unwrap();
            for rect in panel.bus().rects(52, 40) {
                prop_assert!(config.canvas.bounds().encloses(&rect));
            }

            fill_rect(&mut wide, x, y, w, h, palette::RED).unwrap();
            let mut out = Panel::new(RecordingBus::new(), config).unwrap();
            wide.flush(&mut out).unwrap();
            let windows = out.bus().rects(52, 40);
            prop_assert_eq!(windows, vec![config.canvas.bounds()]);
            prop_assert_eq!(out.bus().data().len(), 135 * 240 * 2);

            fill_rect(&mut store, x, y, w, h, palette::RED).unwrap();
            for py in 0..240i32 {
                for px in 0..135i32 {
                    let inside = px >= x && py >= y
                        && (px as i64) < x as i64 + w as i64
                        && (py as i64) < y as i64 + h as i64;
                    let expected = if inside { palette::RED } else { SENTINEL };
                    prop_assert_eq!(store.pixel(px, py), Some(expected));
                }
            }
        }
    }
}
