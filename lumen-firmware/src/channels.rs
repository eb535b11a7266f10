//! Inter-task communication
//!
//! Defines the static signals used between Embassy tasks. Only the display
//! task touches the panel; the others just wake it.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Front-panel buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Wake the display, or acknowledge alerts when awake
    A,
    /// Force a redraw
    B,
}

/// Button press (debounced)
pub static BUTTON: Signal<CriticalSectionRawMutex, Button> = Signal::new();

/// Whole seconds since boot, published once per second
pub static TICK: Signal<CriticalSectionRawMutex, u32> = Signal::new();
