//! Tick task for the session clock
//!
//! Publishes elapsed whole seconds; the display task uses them for the
//! session timer and the display timeout.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use crate::channels::TICK;

/// Tick task - signals elapsed seconds once per second
#[embassy_executor::task]
pub async fn tick_task() {
    info!("Tick task started");

    let mut ticker = Ticker::every(Duration::from_secs(1));
    let start = Instant::now();

    loop {
        ticker.next().await;
        TICK.signal(start.elapsed().as_secs() as u32);
    }
}
