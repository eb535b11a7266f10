//! Lumen Hardware Abstraction Layer
//!
//! This crate defines the seams between the display engine and the board:
//! the two-channel display bus and the sources of pre-encoded pixel data.
//! Chip-specific crates implement them; `lumen-core` only depends on the
//! traits, so the whole engine can be exercised on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (lumen-firmware, etc.)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-core (engine)                    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-drivers (SPI + D/C, AXP192)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`bus::DisplayBus`] - Command/data channels of a display controller
//! - [`resource::ResourceReader`] - Sequential pixel resource (file, flash, slice)
//! - [`backlight::Backlight`] - Backlight switch (GPIO or PMIC)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod backlight;
pub mod bus;
pub mod resource;

// Re-export key traits at crate root for convenience
pub use backlight::Backlight;
pub use bus::DisplayBus;
pub use resource::{ResourceReader, SliceResource};

#[cfg(feature = "embedded-io")]
pub use resource::IoResource;
