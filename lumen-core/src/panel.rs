//! Display panel
//!
//! Owns the bus and tracks the one window latched in the controller.
//! Addressing is done through [`Canvas::address`], so every rectangle sent
//! to the controller already includes the unit's origin offset.
//!
//! The panel enforces the window contract: after `set_window(x, y, w, h)`
//! exactly `w × h` pixels are expected. Writing more is rejected before any
//! bytes go out. Latching a new window early is allowed so callers can
//! recover from a failed transfer, but it is logged.

use embedded_hal::delay::DelayNs;
use lumen_hal::DisplayBus;

use crate::color::Rgb565;
use crate::config::PanelConfig;
use crate::error::{ConfigError, Error, Malformed};
use crate::framestore::FrameStore;
use crate::geometry::{Canvas, Rect, Window};
use crate::planner::TransferPlanner;
use crate::raster::Surface;

/// Controller command opcodes
pub mod cmd {
    pub const SWRESET: u8 = 0x01;
    pub const SLPIN: u8 = 0x10;
    pub const SLPOUT: u8 = 0x11;
    pub const NORON: u8 = 0x13;
    pub const INVOFF: u8 = 0x20;
    pub const INVON: u8 = 0x21;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const RASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const COLMOD: u8 = 0x3A;

    /// COLMOD argument for 16 bits per pixel
    pub const COLMOD_16BIT: u8 = 0x05;
}

/// Settle times in milliseconds
mod settle {
    pub const RESET_MS: u32 = 150;
    pub const SLEEP_MS: u32 = 120;
    pub const DISPLAY_ON_MS: u32 = 10;
}

/// Display panel on a two-channel bus
pub struct Panel<B> {
    bus: B,
    config: PanelConfig,
    planner: TransferPlanner,
    window: Option<Window>,
    remaining: u32,
}

impl<B: DisplayBus> Panel<B> {
    /// Take ownership of the bus after validating the configuration
    ///
    /// No bytes are sent; call [`Panel::init`] before drawing.
    pub fn new(bus: B, config: PanelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            bus,
            config,
            planner: TransferPlanner::new(config.budget),
            window: None,
            remaining: 0,
        })
    }

    /// Reset and configure the controller, then turn the display on
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<B::Error>> {
        let canvas = self.config.canvas;
        info!(
            "panel init: {}x{} at ({}, {}), madctl {=u8:#x}",
            canvas.width,
            canvas.height,
            canvas.x_offset,
            canvas.y_offset,
            canvas.orientation.madctl()
        );

        self.command(cmd::SWRESET, &[])?;
        delay.delay_ms(settle::RESET_MS);
        self.command(cmd::SLPOUT, &[])?;
        delay.delay_ms(settle::SLEEP_MS);
        self.command(cmd::MADCTL, &[canvas.orientation.madctl()])?;
        self.command(cmd::COLMOD, &[cmd::COLMOD_16BIT])?;
        self.set_inverted(self.config.inverted)?;
        self.command(cmd::NORON, &[])?;
        self.command(cmd::DISPON, &[])?;
        delay.delay_ms(settle::DISPLAY_ON_MS);

        self.window = None;
        self.remaining = 0;
        Ok(())
    }

    fn command(&mut self, cmd: u8, args: &[u8]) -> Result<(), Error<B::Error>> {
        self.bus.command(cmd, args).map_err(Error::Bus)
    }

    /// Latch a window for the next `w × h` pixels
    pub fn set_window(&mut self, x: u16, y: u16, w: u16, h: u16) -> Result<(), Error<B::Error>> {
        let window = Rect::new(x, y, w, h);
        self.config.canvas.check_window(&window)?;

        if self.remaining > 0 {
            warn!(
                "window replaced with {} pixels outstanding",
                self.remaining
            );
        }

        let addr = self.config.canvas.address(&window);
        trace!(
            "window cols {}..={} rows {}..={}",
            addr.columns.0,
            addr.columns.1,
            addr.rows.0,
            addr.rows.1
        );

        // Forget the old window first: a failure below leaves none latched
        self.window = None;
        self.remaining = 0;
        self.command(cmd::CASET, &addr.column_args())?;
        self.command(cmd::RASET, &addr.row_args())?;
        self.command(cmd::RAMWR, &[])?;

        self.window = Some(window);
        self.remaining = window.area();
        Ok(())
    }

    /// Send wire-order pixel bytes into the latched window
    pub fn write_pixels(&mut self, bytes: &[u8]) -> Result<(), Error<B::Error>> {
        if bytes.len() % 2 != 0 {
            return Err(Malformed::OddLength { len: bytes.len() }.into());
        }
        let attempted = (bytes.len() / 2) as u32;
        if attempted > self.remaining {
            return Err(Error::WindowOverrun {
                remaining: self.remaining,
                attempted,
            });
        }
        if attempted == 0 {
            return Ok(());
        }

        if let Err(e) = self.bus.data(bytes) {
            self.window = None;
            self.remaining = 0;
            return Err(Error::Bus(e));
        }
        self.remaining -= attempted;
        if self.remaining == 0 {
            self.window = None;
        }
        Ok(())
    }

    /// Turn the panel output on or off (frame memory is kept)
    pub fn set_display_on(&mut self, on: bool) -> Result<(), Error<B::Error>> {
        self.command(if on { cmd::DISPON } else { cmd::DISPOFF }, &[])
    }

    /// Enter or leave sleep mode
    pub fn set_sleep(&mut self, sleep: bool, delay: &mut impl DelayNs) -> Result<(), Error<B::Error>> {
        self.command(if sleep { cmd::SLPIN } else { cmd::SLPOUT }, &[])?;
        delay.delay_ms(settle::SLEEP_MS);
        Ok(())
    }

    /// Enable or disable controller color inversion
    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), Error<B::Error>> {
        self.config.inverted = inverted;
        self.command(if inverted { cmd::INVON } else { cmd::INVOFF }, &[])
    }

    /// Fill the whole canvas with one color
    pub fn clear(&mut self, color: Rgb565) -> Result<(), Error<B::Error>> {
        let bounds = self.config.canvas.bounds();
        self.fill_rect(bounds, color)
    }

    /// Render the whole canvas through a frame store smaller than it
    ///
    /// The store is moved over the canvas in row-major tiles. For each tile
    /// it is cleared to `background`, handed to `draw`, then flushed. A store
    /// as wide as the canvas gives horizontal strips; one as large as the
    /// canvas gives a single full-frame flush.
    pub fn render_strips(
        &mut self,
        store: &mut FrameStore,
        background: Rgb565,
        mut draw: impl FnMut(&mut FrameStore) -> Result<(), core::convert::Infallible>,
    ) -> Result<(), Error<B::Error>> {
        let region = store.region();
        if region.is_empty() {
            return Err(ConfigError::ZeroSize.into());
        }
        let canvas = self.config.canvas;
        let mut y = 0;
        while y < canvas.height {
            let mut x = 0;
            while x < canvas.width {
                store.move_to(x, y);
                store.clear(background);
                if let Err(never) = draw(store) {
                    match never {}
                }
                store.flush(self)?;
                x = x.saturating_add(region.w);
            }
            y = y.saturating_add(region.h);
        }
        Ok(())
    }

    /// Pixels still expected by the latched window
    pub fn remaining_pixels(&self) -> u32 {
        self.remaining
    }

    /// Whether no window is waiting for pixels
    pub fn is_idle(&self) -> bool {
        self.remaining == 0
    }

    /// Window currently waiting for pixels
    pub fn window(&self) -> Option<Window> {
        self.window
    }

    pub fn canvas(&self) -> &Canvas {
        &self.config.canvas
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn planner(&self) -> &TransferPlanner {
        &self.planner
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: DisplayBus> Surface for Panel<B> {
    type Error = Error<B::Error>;

    fn bounds(&self) -> Rect {
        self.config.canvas.bounds()
    }

    fn fill_rect(&mut self, area: Rect, color: Rgb565) -> Result<(), Self::Error> {
        let job = self
            .planner
            .prepare_fill(color, area.area(), self.config.byte_order)?;
        self.set_window(area.x, area.y, area.w, area.h)?;
        job.run(|chunk| self.write_pixels(chunk))
    }

    fn blit(
        &mut self,
        area: Rect,
        pixel: &mut dyn FnMut(u16, u16) -> Rgb565,
    ) -> Result<(), Self::Error> {
        let mut job = self.planner.prepare_stream(area.area())?;
        self.set_window(area.x, area.y, area.w, area.h)?;
        let colors = (area.y..area.y + area.h)
            .flat_map(move |y| (area.x..area.x + area.w).map(move |x| (x, y)))
            .map(|(x, y)| pixel(x, y));
        let order = self.config.byte_order;
        job.run(order, colors, |chunk| self.write_pixels(chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{palette, ByteOrder};
    use crate::config::MemoryBudget;
    use crate::raster::{draw_bitmap, Bitmap};
    use crate::testing::{Injected, NoDelay, Op, RecordingBus};
    use alloc::vec;
    use proptest::prelude::*;

    fn stick() -> Panel<RecordingBus> {
        Panel::new(RecordingBus::new(), PanelConfig::M5STICKC_PLUS).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_canvas() {
        let mut config = PanelConfig::M5STICKC_PLUS;
        config.canvas.x_offset = 110;
        assert_eq!(
            Panel::new(RecordingBus::new(), config).err(),
            Some(ConfigError::ExceedsController)
        );
    }

    #[test]
    fn test_init_sequence() {
        let mut panel = stick();
        let mut delay = NoDelay::default();
        panel.init(&mut delay).unwrap();

        assert_eq!(
            panel.bus().commands(),
            vec![
                cmd::SWRESET,
                cmd::SLPOUT,
                cmd::MADCTL,
                cmd::COLMOD,
                cmd::INVON,
                cmd::NORON,
                cmd::DISPON
            ]
        );
        assert!(panel
            .bus()
            .ops
            .contains(&Op::Command(cmd::COLMOD, vec![0x05])));
        assert_eq!(delay.total_ns, 280 * 1_000_000);
    }

    #[test]
    fn test_full_canvas_window_and_fill() {
        let mut panel = stick();
        panel.set_window(0, 0, 135, 240).unwrap();
        assert_eq!(
            panel.bus().ops,
            vec![
                Op::Command(cmd::CASET, vec![0x00, 52, 0x00, 186]),
                Op::Command(cmd::RASET, vec![0x00, 40, 0x01, 0x17]),
                Op::Command(cmd::RAMWR, vec![]),
            ]
        );
        assert_eq!(panel.remaining_pixels(), 32_400);

        let mut panel = stick();
        panel.clear(palette::RED).unwrap();
        let data = panel.bus().data();
        assert_eq!(data.len(), 32_400 * 2);
        assert!(data.chunks(2).all(|px| px == [0xF8, 0x00]));
        assert!(panel.is_idle());
    }

    #[test]
    fn test_swapped_byte_order_fill() {
        let mut config = PanelConfig::M5STICKC_PLUS;
        config.byte_order = ByteOrder::LittleEndian;
        let mut panel = Panel::new(RecordingBus::new(), config).unwrap();
        panel.clear(palette::RED).unwrap();
        let data = panel.bus().data();
        assert_eq!(data.len(), 32_400 * 2);
        assert!(data.chunks(2).all(|px| px == [0x00, 0xF8]));
    }

    #[test]
    fn test_invalid_window_sends_nothing() {
        let mut panel = stick();
        assert_eq!(
            panel.set_window(100, 0, 36, 1),
            Err(Error::Configuration(ConfigError::OutOfBounds))
        );
        assert_eq!(
            panel.set_window(0, 0, 0, 10),
            Err(Error::Configuration(ConfigError::ZeroSize))
        );
        assert!(panel.bus().ops.is_empty());
    }

    #[test]
    fn test_overrun_rejected_before_traffic() {
        let mut panel = stick();
        panel.set_window(0, 0, 2, 2).unwrap();
        panel.write_pixels(&[0; 6]).unwrap();
        let before = panel.bus().ops.len();

        assert_eq!(
            panel.write_pixels(&[0; 4]),
            Err(Error::WindowOverrun {
                remaining: 1,
                attempted: 2
            })
        );
        assert_eq!(panel.bus().ops.len(), before);
        assert_eq!(
            panel.write_pixels(&[0; 3]),
            Err(Error::MalformedResource(Malformed::OddLength { len: 3 }))
        );
        assert_eq!(panel.bus().ops.len(), before);
        assert_eq!(panel.remaining_pixels(), 1);
        panel.write_pixels(&[0; 2]).unwrap();
        assert!(panel.is_idle());
        assert_eq!(panel.window(), None);
    }

    #[test]
    fn test_window_replaced_early_resets_count() {
        let mut panel = stick();
        panel.set_window(0, 0, 10, 10).unwrap();
        panel.write_pixels(&[0; 20]).unwrap();
        panel.set_window(5, 5, 2, 1).unwrap();
        assert_eq!(panel.remaining_pixels(), 2);
        assert_eq!(panel.window(), Some(Rect::new(5, 5, 2, 1)));
    }

    #[test]
    fn test_bus_failure_drops_window() {
        let config = PanelConfig {
            budget: MemoryBudget::new(64, 1024),
            ..PanelConfig::M5STICKC_PLUS
        };
        let mut panel = Panel::new(RecordingBus::failing_at(2), config).unwrap();
        assert_eq!(panel.clear(palette::BLUE), Err(Error::Bus(Injected)));
        assert_eq!(panel.bus().data().len(), 2 * 64);
        assert!(panel.is_idle());
        assert!(Error::<Injected>::Bus(Injected).requires_redraw());
    }

    #[test]
    fn test_chunked_fill_matches_single_buffer() {
        let small = PanelConfig {
            budget: MemoryBudget::new(100, 1024),
            ..PanelConfig::M5STICKC_PLUS
        };
        let mut a = Panel::new(RecordingBus::new(), small).unwrap();
        let mut b = stick();
        a.fill_rect(Rect::new(3, 4, 20, 30), palette::ORANGE).unwrap();
        b.fill_rect(Rect::new(3, 4, 20, 30), palette::ORANGE).unwrap();
        assert_eq!(a.bus().ops, b.bus().ops);
    }

    #[test]
    fn test_bitmap_blit_is_one_window() {
        let data = [0xF8, 0x00, 0x07, 0xE0, 0x00, 0x1F, 0xFF, 0xFF];
        let bmp = Bitmap::new(2, 2, &data, ByteOrder::BigEndian).unwrap();
        let mut panel = stick();
        draw_bitmap(&mut panel, 133, 238, &bmp).unwrap();
        assert_eq!(panel.bus().rects(52, 40), vec![Rect::new(133, 238, 2, 2)]);
        assert_eq!(panel.bus().data(), data.to_vec());

        // Partially visible: only the top-left pixel survives
        let mut panel = stick();
        draw_bitmap(&mut panel, 134, 239, &bmp).unwrap();
        assert_eq!(panel.bus().rects(52, 40), vec![Rect::new(134, 239, 1, 1)]);
        assert_eq!(panel.bus().data(), vec![0xF8, 0x00]);
    }

    #[test]
    fn test_display_power_commands() {
        let mut panel = stick();
        let mut delay = NoDelay::default();
        panel.set_display_on(false).unwrap();
        panel.set_sleep(true, &mut delay).unwrap();
        panel.set_sleep(false, &mut delay).unwrap();
        panel.set_inverted(false).unwrap();
        assert_eq!(
            panel.bus().commands(),
            vec![cmd::DISPOFF, cmd::SLPIN, cmd::SLPOUT, cmd::INVOFF]
        );
        assert!(!panel.config().inverted);
    }

    proptest! {
        #[test]
        fn prop_exact_writes_leave_panel_idle(
            x in 0u16..135, y in 0u16..240, w_seed: u16, h_seed: u16, split in 1usize..64
        ) {
            let w = 1 + w_seed % (135 - x);
            let h = 1 + h_seed % (240 - y);
            let mut panel = stick();
            panel.set_window(x, y, w, h).unwrap();
            let total = w as usize * h as usize * 2;
            let bytes = vec![0xAB; total];
            for chunk in bytes.chunks(split * 2) {
                panel.write_pixels(chunk).unwrap();
            }
            prop_assert!(panel.is_idle());
            prop_assert_eq!(panel.bus().data().len(), total);
        }
    }
}
