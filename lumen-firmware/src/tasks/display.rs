//! Display task
//!
//! Sole owner of the panel, its backlight and the frame strip. Redraws the
//! status screen whenever it changes, and puts the display to sleep after a
//! period without button presses.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;

use lumen_core::{palette, FrameStore, Panel};
use lumen_display::{SessionStatus, StatusScreen};
use lumen_drivers::{PinBacklight, SpiDisplayBus};
use lumen_hal::Backlight;

use crate::channels::{Button, BUTTON, TICK};

/// SPI device driving the panel (chip select handled per transaction)
pub type DisplaySpi = ExclusiveDevice<Spi<'static, SPI0, Blocking>, Output<'static>, Delay>;

/// Panel on SPI0 with its D/C pin
pub type DisplayPanel = Panel<SpiDisplayBus<DisplaySpi, Output<'static>>>;

pub type DisplayBacklight = PinBacklight<Output<'static>>;

/// Seconds without a button press before the display sleeps
const DISPLAY_TIMEOUT_SECS: u32 = 60;

#[embassy_executor::task]
pub async fn display_task(
    mut panel: DisplayPanel,
    mut backlight: DisplayBacklight,
    mut strip: FrameStore,
    mut screen: StatusScreen,
) {
    info!("Display task started");

    let mut awake = true;
    let mut now = 0u32;
    let mut last_input = 0u32;

    loop {
        match select(TICK.wait(), BUTTON.wait()).await {
            Either::First(secs) => {
                now = secs;
                if awake && now.saturating_sub(last_input) >= DISPLAY_TIMEOUT_SECS {
                    info!("No input for {}s, display off", DISPLAY_TIMEOUT_SECS);
                    set_awake(&mut panel, &mut backlight, false);
                    awake = false;
                }
            }
            Either::Second(button) => {
                last_input = now;
                match button {
                    Button::A if !awake => {
                        info!("Display woken");
                        set_awake(&mut panel, &mut backlight, true);
                        awake = true;
                        screen.mark_dirty();
                    }
                    Button::A => {
                        if screen.acknowledge_alerts() {
                            info!("Alerts acknowledged");
                        }
                    }
                    Button::B => screen.mark_dirty(),
                }
            }
        }

        let status = SessionStatus {
            elapsed_secs: now,
            active: now.saturating_sub(last_input) < DISPLAY_TIMEOUT_SECS,
            ..*screen.status()
        };
        if awake && screen.update(status) {
            match panel.render_strips(&mut strip, palette::BLACK, |s| screen.render(s)) {
                Ok(()) => {
                    screen.mark_clean();
                    trace!("Display updated");
                }
                // The next redraw latches a fresh window, so just retry then
                Err(e) => warn!("Render failed: {}", Debug2Format(&e)),
            }
        }
    }
}

/// Switch panel output and backlight together
fn set_awake(panel: &mut DisplayPanel, backlight: &mut DisplayBacklight, on: bool) {
    if let Err(e) = panel.set_display_on(on) {
        warn!("Display power command failed: {}", Debug2Format(&e));
    }
    backlight.set_backlight(on).ok();
}
