//! Per-unit panel configuration
//!
//! Offset, orientation, byte order and bus speed are empirical constants
//! found once during bring-up of a given board. They are never probed at
//! runtime: a unit is described by one `PanelConfig`, usually one of the
//! presets below or a TOML file shipped with the firmware.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::ByteOrder;
use crate::error::ConfigError;
use crate::geometry::{Canvas, Orientation};

/// Default chunk threshold in bytes
pub const DEFAULT_CHUNK_BYTES: usize = 1024;

/// Default ceiling for any single allocation made by the engine
pub const DEFAULT_MAX_ALLOC_BYTES: usize = 16 * 1024;

/// Memory the engine may use for transient transfer buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MemoryBudget {
    /// Operations above this many bytes are sent by replaying one chunk
    pub chunk_bytes: usize,
    /// Largest single allocation the engine will attempt
    pub max_alloc_bytes: usize,
}

impl MemoryBudget {
    pub const fn new(chunk_bytes: usize, max_alloc_bytes: usize) -> Self {
        Self {
            chunk_bytes,
            max_alloc_bytes,
        }
    }

    /// Both limits must hold at least one pixel and the chunk must fit the ceiling
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_bytes < 2 || self.max_alloc_bytes < self.chunk_bytes {
            return Err(ConfigError::InvalidBudget);
        }
        Ok(())
    }
}

impl Default for MemoryBudget {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_BYTES, DEFAULT_MAX_ALLOC_BYTES)
    }
}

/// Complete description of one display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelConfig {
    /// Visible canvas and its placement in controller memory
    pub canvas: Canvas,
    /// Byte order of pixels on the wire
    #[cfg_attr(feature = "serde", serde(default))]
    pub byte_order: ByteOrder,
    /// Byte order of pre-encoded image resources
    #[cfg_attr(feature = "serde", serde(default))]
    pub resource_order: ByteOrder,
    /// Enable controller color inversion (IPS panels usually need it)
    #[cfg_attr(feature = "serde", serde(default))]
    pub inverted: bool,
    /// SPI clock in Hz
    pub bus_hz: u32,
    /// Transient buffer limits
    #[cfg_attr(feature = "serde", serde(default))]
    pub budget: MemoryBudget,
}

impl PanelConfig {
    /// M5StickC Plus: 135×240 ST7789V2 at column 52, row 40
    ///
    /// Stored images are little-endian, as produced by the desktop converter.
    pub const M5STICKC_PLUS: Self = Self {
        canvas: Canvas::new(135, 240, 52, 40),
        byte_order: ByteOrder::BigEndian,
        resource_order: ByteOrder::LittleEndian,
        inverted: true,
        bus_hz: 20_000_000,
        budget: MemoryBudget::new(DEFAULT_CHUNK_BYTES, DEFAULT_MAX_ALLOC_BYTES),
    };

    /// Pico Display pack: the same 135×240 glass on an RP2040
    pub const PICO_DISPLAY: Self = Self {
        canvas: Canvas::new(135, 240, 52, 40),
        byte_order: ByteOrder::BigEndian,
        resource_order: ByteOrder::BigEndian,
        inverted: true,
        bus_hz: 62_500_000,
        budget: MemoryBudget::new(2048, DEFAULT_MAX_ALLOC_BYTES),
    };

    /// Check the canvas against the controller and the memory budget
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.canvas.validate()?;
        self.budget.validate()
    }

    /// Same configuration with a different orientation and offset
    pub fn with_orientation(mut self, orientation: Orientation, x_offset: u16, y_offset: u16) -> Self {
        self.canvas.orientation = orientation;
        self.canvas.x_offset = x_offset;
        self.canvas.y_offset = y_offset;
        self
    }

    /// Parse and validate a configuration from TOML
    ///
    /// ```toml
    /// bus_hz = 20000000
    /// byte_order = "big-endian"
    /// resource_order = "little-endian"
    /// inverted = true
    ///
    /// [canvas]
    /// width = 135
    /// height = 240
    /// x_offset = 52
    /// y_offset = 40
    /// orientation = 0x00
    ///
    /// [budget]
    /// chunk_bytes = 1024
    /// max_alloc_bytes = 16384
    /// ```
    #[cfg(feature = "toml")]
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }
}
