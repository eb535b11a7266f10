//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals.

pub mod buttons;
pub mod display;
pub mod tick;

pub use buttons::button_task;
pub use display::display_task;
pub use tick::tick_task;
