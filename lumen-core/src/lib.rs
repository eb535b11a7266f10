//! Board-agnostic rendering and streaming engine for small color displays
//!
//! This crate drives an ST7789-class controller (16-bit 5-6-5 pixels) over
//! a [`DisplayBus`](lumen_hal::DisplayBus) from a microcontroller with a
//! few tens of kilobytes of heap:
//!
//! - Pixel encoding and byte order ([`color`])
//! - Canvas geometry and origin-offset addressing ([`geometry`], [`panel`])
//! - Bounded-memory transfer planning ([`planner`])
//! - Full, strip or tile frame stores ([`framestore`])
//! - Shape, text and bitmap rasterization ([`raster`], [`font`])
//! - Scanline streaming of pre-encoded images ([`stream`])
//! - Per-unit configuration ([`config`])
//!
//! # Data flow
//!
//! ```text
//! draw call ──▶ raster (clip) ──▶ Surface
//!                                   │
//!                ┌──────────────────┴──────────────────┐
//!                ▼                                     ▼
//!         Panel (direct)                      FrameStore (buffered)
//!     planner: exact or chunked                 flush: one window
//!                │                                     │
//!                └──────────────┬──────────────────────┘
//!                               ▼
//!              CASET / RASET / RAMWR + pixel bytes ──▶ bus
//! ```
//!
//! Nothing here allocates more than the configured
//! [`MemoryBudget`](config::MemoryBudget) allows, and allocation always
//! happens before a window is latched.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

pub mod color;
pub mod config;
pub mod error;
pub mod font;
pub mod framestore;
pub mod geometry;
pub mod panel;
pub mod planner;
pub mod raster;
pub mod stream;

#[cfg(test)]
mod testing;

pub use color::{palette, ByteOrder, Rgb565};
pub use config::{MemoryBudget, PanelConfig};
pub use error::{AllocError, ConfigError, Error, Malformed};
pub use framestore::FrameStore;
pub use geometry::{Canvas, Orientation, Rect, Window};
pub use panel::Panel;
pub use planner::{Transfer, TransferPlanner};
pub use raster::{Bitmap, Surface, TextStyle};
pub use stream::{ImageStream, StreamCursor, StreamState};
