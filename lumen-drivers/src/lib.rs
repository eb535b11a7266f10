//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in lumen-hal on top of `embedded-hal` 1.0:
//!
//! - SPI display bus with a data/command select pin
//! - Hardware reset pulse for the display controller
//! - Backlight through a GPIO or the AXP192 power management IC

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod axp192;
pub mod backlight;
pub mod spi_bus;

pub use axp192::Axp192;
pub use backlight::PinBacklight;
pub use spi_bus::{hard_reset, BusError, SpiDisplayBus};
