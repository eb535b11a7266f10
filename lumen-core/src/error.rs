//! Engine error types
//!
//! Every failure is reported before the bus is touched where possible.
//! Once a window has been latched the controller cannot be rolled back, so
//! errors raised mid-transfer leave the affected region visually undefined
//! until the caller redraws it.

/// Geometry or configuration rejected before any bus traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Rectangle or canvas with zero width or height
    ZeroSize,
    /// Rectangle extends past the canvas
    OutOfBounds,
    /// Canvas plus origin offset exceeds the controller's address range
    ExceedsController,
    /// Memory budget cannot hold a single pixel
    InvalidBudget,
    /// Configuration text could not be parsed
    Parse,
}

/// Pre-encoded pixel data does not match its declared geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Malformed {
    /// Resource size differs from width × height × 2 (checked up front)
    LengthMismatch { expected: usize, actual: usize },
    /// Resource ended mid-stream; only `rows_complete` rows were sent
    Truncated { rows_complete: u16 },
    /// In-memory bitmap length differs from width × height × 2
    BitmapSize { expected: usize, actual: usize },
    /// Wire bytes that split a pixel
    OddLength { len: usize },
}

/// A chunk, scanline or frame store allocation could not be satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AllocError {
    /// Bytes requested
    pub requested: usize,
}

/// Engine error, generic over the bus error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Geometry outside canvas bounds or invalid configuration
    Configuration(ConfigError),
    /// Allocation failed; the operation was aborted before addressing
    ResourceExhausted { requested: usize },
    /// Streamed or blitted pixel data has the wrong size
    MalformedResource(Malformed),
    /// The resource reader failed; rows before it were already sent
    ResourceRead { rows_complete: u16 },
    /// More pixels written than the latched window has room for
    WindowOverrun { remaining: u32, attempted: u32 },
    /// Error from the underlying bus
    Bus(E),
}

impl<E> Error<E> {
    /// Whether the display contents may now be inconsistent
    ///
    /// Callers should force a full clear and redraw when this is true.
    pub fn requires_redraw(&self) -> bool {
        match self {
            Error::Configuration(_)
            | Error::ResourceExhausted { .. }
            | Error::WindowOverrun { .. } => false,
            Error::MalformedResource(Malformed::LengthMismatch { .. })
            | Error::MalformedResource(Malformed::BitmapSize { .. })
            | Error::MalformedResource(Malformed::OddLength { .. }) => false,
            _ => true,
        }
    }
}

impl<E> From<ConfigError> for Error<E> {
    fn from(e: ConfigError) -> Self {
        Error::Configuration(e)
    }
}

impl<E> From<AllocError> for Error<E> {
    fn from(e: AllocError) -> Self {
        Error::ResourceExhausted {
            requested: e.requested,
        }
    }
}

impl<E> From<Malformed> for Error<E> {
    fn from(e: Malformed) -> Self {
        Error::MalformedResource(e)
    }
}
