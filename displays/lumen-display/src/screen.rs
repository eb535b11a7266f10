//! Status screen
//!
//! Fixed portrait layout for a session monitor, drawn top to bottom:
//!
//! ```text
//! ┌───────────────────────┐
//! │ header (title)        │  0..20
//! │      [ HH:MM ]        │  25..40
//! │ SESSION: 00H00M00S    │  48..60
//! │ STATUS: CODING        │  68..80
//! │ COST: $0.00           │  90
//! │ TOKENS: 0             │  110
//! │ SESSION LIMIT:        │  130
//! │ [=====-----]  50%     │  142..148
//! │ ALERTS: NONE          │  155..167
//! │                       │
//! │ footer (button hints) │  height-35..height
//! └───────────────────────┘
//! ```

use core::fmt::Write;

use lumen_core::color::{palette, Rgb565};
use lumen_core::raster::{self, Surface, TextStyle};

use crate::status::{self, SessionStatus};

/// Five-hour usage window
pub const DEFAULT_SESSION_LIMIT_SECS: u32 = 5 * 3600;

mod layout {
    pub const MARGIN: i32 = 2;
    pub const TEXT_X: i32 = 5;
    pub const HEADER_H: i32 = 20;
    pub const CLOCK_Y: i32 = 25;
    pub const CLOCK_W: i32 = 85;
    pub const CLOCK_H: i32 = 15;
    pub const SESSION_Y: i32 = 48;
    pub const STATUS_Y: i32 = 68;
    pub const BAR_H: i32 = 12;
    pub const COST_Y: i32 = 90;
    pub const TOKENS_Y: i32 = 110;
    pub const PROGRESS_LABEL_Y: i32 = 130;
    pub const PROGRESS_Y: i32 = 142;
    pub const PROGRESS_H: i32 = 6;
    /// Room right of the progress bar for the percentage
    pub const PROGRESS_TAIL: i32 = 35;
    /// Progress above this turns the bar yellow
    pub const PROGRESS_WARN: u8 = 75;
    pub const ALERT_Y: i32 = 155;
    pub const FOOTER_H: i32 = 35;
}

use layout::*;

/// Session monitor screen with dirty tracking
#[derive(Debug, Clone)]
pub struct StatusScreen {
    width: u16,
    height: u16,
    title: &'static str,
    session_limit_secs: u32,
    status: SessionStatus,
    dirty: bool,
}

impl StatusScreen {
    /// Screen for a canvas of `width × height`
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            title: "LUMEN SESSION",
            session_limit_secs: DEFAULT_SESSION_LIMIT_SECS,
            status: SessionStatus::default(),
            dirty: true,
        }
    }

    pub fn with_title(mut self, title: &'static str) -> Self {
        self.title = title;
        self
    }

    /// Session length the progress bar is measured against
    pub fn with_session_limit(mut self, secs: u32) -> Self {
        self.session_limit_secs = secs;
        self
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Replace the shown status
    ///
    /// Returns true if the screen needs redrawing.
    pub fn update(&mut self, status: SessionStatus) -> bool {
        if status != self.status {
            self.status = status;
            self.dirty = true;
        }
        self.dirty
    }

    /// Clear pending alerts, returning whether there were any
    pub fn acknowledge_alerts(&mut self) -> bool {
        if !self.status.has_alert() {
            return false;
        }
        self.status.acknowledge();
        self.dirty = true;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark screen as clean (after rendering)
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Mark screen as dirty (needs redraw)
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Draw the whole screen
    ///
    /// Paints every pixel, so it works both on a cleared frame store and
    /// directly on the panel.
    pub fn render<S: Surface + ?Sized>(&self, s: &mut S) -> Result<(), S::Error> {
        let w = self.width as i32;
        let h = self.height as i32;
        let inner = w - 2 * MARGIN;
        let st = &self.status;

        raster::fill_rect(s, 0, 0, w, h, palette::BLACK)?;

        // Header
        raster::fill_rect(s, 0, 0, w, HEADER_H, palette::BLUE)?;
        let title = TextStyle::new(palette::WHITE).with_bg(palette::BLUE);
        raster::draw_text(s, centered(w, self.title), 6, self.title, &title)?;

        // Clock
        let clock = status::format_clock(st.clock);
        raster::fill_rect(s, (w - CLOCK_W) / 2, CLOCK_Y, CLOCK_W, CLOCK_H, palette::DARK_BLUE)?;
        let style = TextStyle::new(palette::CYAN).with_bg(palette::DARK_BLUE);
        raster::draw_text(s, centered(w, &clock), CLOCK_Y + 4, &clock, &style)?;

        // Session time
        self.labelled_bar(s, SESSION_Y, inner, palette::NAVY, &status::format_session(st.elapsed_secs))?;

        // Activity
        let (bg, text) = if st.active {
            (palette::DARK_GREEN, "STATUS: CODING")
        } else {
            (palette::DARK_GRAY, "STATUS: IDLE")
        };
        self.labelled_bar(s, STATUS_Y, inner, bg, text)?;

        // Usage
        let cost = status::format_cost(st.cost_cents);
        raster::draw_text(s, TEXT_X, COST_Y, &cost, &TextStyle::new(palette::YELLOW))?;
        let tokens = status::format_tokens(st.tokens);
        raster::draw_text(s, TEXT_X, TOKENS_Y, &tokens, &TextStyle::new(palette::MAGENTA))?;

        // Session limit progress
        let pct = st.progress_percent(self.session_limit_secs);
        let white = TextStyle::new(palette::WHITE);
        raster::draw_text(s, TEXT_X, PROGRESS_LABEL_Y, "SESSION LIMIT:", &white)?;
        let bar_w = (w - TEXT_X - PROGRESS_TAIL).max(0);
        raster::fill_rect(s, TEXT_X, PROGRESS_Y, bar_w, PROGRESS_H, palette::DARK_BLUE)?;
        let fill = if pct > PROGRESS_WARN {
            palette::YELLOW
        } else {
            palette::GREEN
        };
        raster::fill_rect(s, TEXT_X, PROGRESS_Y, bar_w * pct as i32 / 100, PROGRESS_H, fill)?;
        let mut label = status::Line::new();
        let _ = write!(label, "{}%", pct);
        raster::draw_text(s, TEXT_X + bar_w + 5, PROGRESS_Y - 2, &label, &white)?;

        // Alerts
        let alert_bg = if st.has_alert() {
            palette::DARK_RED
        } else {
            palette::DARK_GREEN
        };
        self.labelled_bar(s, ALERT_Y, inner, alert_bg, &status::format_alerts(st.alerts))?;

        // Footer
        let footer_y = h - FOOTER_H;
        raster::fill_rect(s, 0, footer_y, w, FOOTER_H, palette::DARK_GRAY)?;
        let hint = TextStyle::new(palette::WHITE).with_bg(palette::DARK_GRAY);
        raster::draw_text(s, TEXT_X, footer_y + 7, "PRESS B: REFRESH", &hint)?;
        let action = if st.has_alert() {
            "PRESS A: ACKNOWLEDGE"
        } else {
            "PRESS A: WAKE DISPLAY"
        };
        let hint = TextStyle::new(palette::CYAN).with_bg(palette::DARK_GRAY);
        raster::draw_text(s, TEXT_X, footer_y + 22, action, &hint)?;
        Ok(())
    }

    /// Draw the start-up screen
    pub fn render_splash<S: Surface + ?Sized>(&self, s: &mut S, version: &str) -> Result<(), S::Error> {
        let w = self.width as i32;
        raster::fill_rect(s, 0, 0, w, self.height as i32, palette::BLACK)?;
        raster::fill_rect(s, 10, 40, w - 20, 15, palette::BLUE)?;
        let title = TextStyle::new(palette::WHITE).with_bg(palette::BLUE);
        raster::draw_text(s, centered(w, self.title), 44, self.title, &title)?;

        let lines: [(&str, i32, Rgb565); 3] = [
            ("SESSION MONITOR", 70, palette::GREEN),
            (version, 90, palette::YELLOW),
            ("STARTING...", 140, palette::WHITE),
        ];
        for (text, y, color) in lines {
            raster::draw_text(s, centered(w, text), y, text, &TextStyle::new(color))?;
        }
        Ok(())
    }

    /// Full-width bar with one line of white text
    fn labelled_bar<S: Surface + ?Sized>(
        &self,
        s: &mut S,
        y: i32,
        width: i32,
        bg: Rgb565,
        text: &str,
    ) -> Result<(), S::Error> {
        raster::fill_rect(s, MARGIN, y, width, BAR_H, bg)?;
        let style = TextStyle::new(palette::WHITE).with_bg(bg);
        raster::draw_text(s, TEXT_X, y + 2, text, &style)?;
        Ok(())
    }
}

/// X that centers `text` on a canvas `width` wide
fn centered(width: i32, text: &str) -> i32 {
    ((width - raster::text_width(text, 1) as i32) / 2).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Clock;
    use lumen_core::{ByteOrder, FrameStore, MemoryBudget, Rect};

    const W: u16 = 135;
    const H: u16 = 240;

    fn roomy() -> MemoryBudget {
        MemoryBudget::new(1024, 96 * 1024)
    }

    fn full_store() -> FrameStore {
        FrameStore::try_new(Rect::new(0, 0, W, H), ByteOrder::BigEndian, &roomy()).unwrap()
    }

    fn sample() -> SessionStatus {
        SessionStatus {
            elapsed_secs: DEFAULT_SESSION_LIMIT_SECS / 2,
            cost_cents: 291,
            tokens: 12_345,
            active: true,
            alerts: 0,
            clock: Some(Clock {
                hours: 9,
                minutes: 41,
            }),
        }
    }

    fn any_in(store: &FrameStore, area: Rect, color: Rgb565) -> bool {
        (area.y..area.y + area.h).any(|y| {
            (area.x..area.x + area.w).any(|x| store.pixel(x as i32, y as i32) == Some(color))
        })
    }

    #[test]
    fn test_layout_colors() {
        let mut screen = StatusScreen::new(W, H);
        screen.update(sample());
        let mut store = full_store();
        screen.render(&mut store).unwrap();

        let at = |x: i32, y: i32| store.pixel(x, y);
        assert_eq!(at(0, 0), Some(palette::BLUE));
        assert_eq!(at(134, 19), Some(palette::BLUE));
        assert_eq!(at(26, 26), Some(palette::DARK_BLUE));
        assert_eq!(at(3, 49), Some(palette::NAVY));
        assert_eq!(at(3, 69), Some(palette::DARK_GREEN));
        assert_eq!(at(1, 69), Some(palette::BLACK));

        // 50% of a 95 px bar
        assert_eq!(at(5, 142), Some(palette::GREEN));
        assert_eq!(at(51, 147), Some(palette::GREEN));
        assert_eq!(at(52, 142), Some(palette::DARK_BLUE));
        assert_eq!(at(99, 147), Some(palette::DARK_BLUE));
        assert_eq!(at(100, 142), Some(palette::BLACK));

        assert_eq!(at(3, 156), Some(palette::DARK_GREEN));
        assert_eq!(at(0, 205), Some(palette::DARK_GRAY));
        assert_eq!(at(134, 239), Some(palette::DARK_GRAY));
        assert_eq!(at(67, 190), Some(palette::BLACK));

        assert!(any_in(&store, Rect::new(5, 90, 80, 7), palette::YELLOW));
        assert!(any_in(&store, Rect::new(5, 110, 100, 7), palette::MAGENTA));
        assert!(any_in(&store, Rect::new(25, 25, 85, 15), palette::CYAN));
    }

    #[test]
    fn test_alerts_and_idle_change_bars() {
        let mut screen = StatusScreen::new(W, H);
        screen.update(SessionStatus {
            active: false,
            alerts: 2,
            elapsed_secs: DEFAULT_SESSION_LIMIT_SECS,
            ..sample()
        });
        let mut store = full_store();
        screen.render(&mut store).unwrap();

        assert_eq!(store.pixel(3, 69), Some(palette::DARK_GRAY));
        assert_eq!(store.pixel(3, 156), Some(palette::DARK_RED));
        // Full bar past the warning threshold
        assert_eq!(store.pixel(99, 142), Some(palette::YELLOW));

        assert!(screen.acknowledge_alerts());
        assert!(!screen.acknowledge_alerts());
        screen.render(&mut store).unwrap();
        assert_eq!(store.pixel(3, 156), Some(palette::DARK_GREEN));
    }

    #[test]
    fn test_strips_match_full_frame() {
        let mut screen = StatusScreen::new(W, H);
        screen.update(SessionStatus {
            alerts: 1,
            ..sample()
        });
        let mut full = full_store();
        screen.render(&mut full).unwrap();

        let mut strip =
            FrameStore::try_new(Rect::new(0, 0, W, 40), ByteOrder::BigEndian, &roomy()).unwrap();
        for top in (0..H).step_by(40) {
            strip.move_to(0, top);
            strip.clear(palette::WHITE);
            screen.render(&mut strip).unwrap();
            for y in top..top + 40 {
                for x in 0..W {
                    let (x, y) = (x as i32, y as i32);
                    assert_eq!(strip.pixel(x, y), full.pixel(x, y), "({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn test_dirty_tracking() {
        let mut screen = StatusScreen::new(W, H);
        assert!(screen.is_dirty());
        screen.mark_clean();
        assert!(!screen.update(SessionStatus::default()));
        assert!(screen.update(sample()));
        screen.mark_clean();
        assert!(!screen.update(sample()));
        screen.mark_dirty();
        assert!(screen.is_dirty());
    }

    #[test]
    fn test_splash_and_narrow_canvas() {
        let screen = StatusScreen::new(W, H).with_title("DEMO");
        let mut store = full_store();
        screen.render_splash(&mut store, "V0.1.0").unwrap();
        assert_eq!(store.pixel(10, 40), Some(palette::BLUE));
        assert_eq!(store.pixel(9, 40), Some(palette::BLACK));
        assert!(any_in(&store, Rect::new(0, 70, W, 7), palette::GREEN));

        // Layout clips on a canvas narrower than the progress tail
        let tiny = StatusScreen::new(30, 60);
        let mut store =
            FrameStore::try_new(Rect::new(0, 0, 30, 60), ByteOrder::BigEndian, &roomy()).unwrap();
        tiny.render(&mut store).unwrap();
        assert_eq!(store.pixel(0, 0), Some(palette::BLUE));
        assert_eq!(store.pixel(0, 59), Some(palette::DARK_GRAY));
    }
}
