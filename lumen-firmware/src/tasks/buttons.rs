//! Button input
//!
//! The buttons pull to ground when pressed. One task instance runs per
//! button.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Timer};

use crate::channels::{Button, BUTTON};

/// Contact bounce settle time
const DEBOUNCE_MS: u64 = 20;

/// Minimum gap between presses
const RELEASE_MS: u64 = 50;

#[embassy_executor::task(pool_size = 2)]
pub async fn button_task(mut pin: Input<'static>, button: Button) {
    info!("Button {} task started", button);

    loop {
        pin.wait_for_falling_edge().await;

        // Debounce
        Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;

        if pin.is_low() {
            debug!("Button {} pressed", button);
            BUTTON.signal(button);

            pin.wait_for_high().await;
            // Debounce after release
            Timer::after(Duration::from_millis(RELEASE_MS)).await;
        }
    }
}
