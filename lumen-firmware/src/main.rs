//! Lumen - Session Monitor Firmware
//!
//! Firmware for RP2040 boards carrying a 135×240 ST7789 panel (Pico
//! Display-class). Shows a session status screen rendered strip by strip
//! through the Lumen engine, so the whole frame never has to fit in RAM.

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::spi::{self, Spi};
use embassy_time::{Delay, Timer};
use embedded_alloc::LlffHeap as Heap;
use embedded_hal_bus::spi::ExclusiveDevice;
use {defmt_rtt as _, panic_probe as _};

use lumen_core::{
    palette, ByteOrder, Canvas, FrameStore, MemoryBudget, Orientation, Panel, PanelConfig,
};
use lumen_display::StatusScreen;
use lumen_drivers::{PinBacklight, SpiDisplayBus};
use lumen_hal::Backlight;

use crate::channels::Button;

mod channels;
mod tasks;

// Heap allocator for transfer buffers and the frame strip
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 32KB
const HEAP_SIZE: usize = 32 * 1024;

// Panel calibration, generated from panel.toml by build.rs
include!(concat!(env!("OUT_DIR"), "/panel_config.rs"));

/// Rows per frame strip (135 × 40 × 2 = 10.8 KB)
const STRIP_ROWS: u16 = 40;

/// How long the splash screen stays up
const SPLASH_SECS: u64 = 2;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Lumen firmware starting...");

    // Initialize heap allocator
    init_heap();

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Setup SPI0 for the panel
    // Pin assignment is board-specific (Pico Display: SCK=GPIO18, MOSI=GPIO19, CS=GPIO17, DC=GPIO16)
    let mut spi_config = spi::Config::default();
    spi_config.frequency = PANEL.bus_hz;
    let spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let dc = Output::new(p.PIN_16, Level::Low);
    let device = match ExclusiveDevice::new(spi, cs, Delay) {
        Ok(device) => device,
        Err(never) => match never {},
    };

    let mut panel = unwrap!(Panel::new(SpiDisplayBus::new(device, dc), PANEL));
    if let Err(e) = panel.init(&mut Delay) {
        error!("Panel init failed: {}", Debug2Format(&e));
    }
    info!(
        "Panel {}x{} at ({}, {}), {} Hz",
        PANEL.canvas.width,
        PANEL.canvas.height,
        PANEL.canvas.x_offset,
        PANEL.canvas.y_offset,
        PANEL.bus_hz
    );

    // Backlight is switched directly (Pico Display: GPIO20)
    let mut backlight = PinBacklight::new_active_high(Output::new(p.PIN_20, Level::Low));

    let mut strip = unwrap!(FrameStore::strip(&PANEL, STRIP_ROWS));
    let screen = StatusScreen::new(PANEL.canvas.width, PANEL.canvas.height);

    // Splash is drawn before the backlight comes on
    let version = concat!("V", env!("CARGO_PKG_VERSION"));
    if let Err(e) =
        panel.render_strips(&mut strip, palette::BLACK, |s| screen.render_splash(s, version))
    {
        warn!("Splash failed: {}", Debug2Format(&e));
    }
    backlight.set_backlight(true).ok();
    Timer::after_secs(SPLASH_SECS).await;

    // Buttons pull to ground (Pico Display: A=GPIO12, B=GPIO13)
    let button_a = Input::new(p.PIN_12, Pull::Up);
    let button_b = Input::new(p.PIN_13, Pull::Up);

    // Spawn tasks
    spawner.spawn(tasks::tick_task()).unwrap();
    spawner.spawn(tasks::button_task(button_a, Button::A)).unwrap();
    spawner.spawn(tasks::button_task(button_b, Button::B)).unwrap();
    spawner
        .spawn(tasks::display_task(panel, backlight, strip, screen))
        .unwrap();

    info!("All tasks spawned");
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}
