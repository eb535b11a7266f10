//! Status screens for the Lumen display engine
//!
//! This crate provides:
//! - `SessionStatus`, the structured data a session monitor reports
//! - `StatusScreen`, a fixed portrait layout that renders it with the
//!   `lumen-core` rasterizer
//! - Text formatting helpers backed by `heapless` strings
//!
//! # Architecture
//!
//! Layouts only talk to a [`Surface`](lumen_core::Surface), so the same
//! screen can be drawn straight to the panel, into a full frame store, or
//! strip by strip through `Panel::render_strips`. Every strip sees the whole
//! layout and the store clips what falls outside it.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod screen;
pub mod status;

// Re-export key types
pub use screen::StatusScreen;
pub use status::{Clock, SessionStatus};
