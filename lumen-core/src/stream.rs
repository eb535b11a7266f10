//! Streaming file reader
//!
//! Forwards a pre-encoded image from a [`ResourceReader`] to the panel one
//! scanline at a time, so only a single row is ever held in memory. Each
//! row gets its own one-pixel-high window; a short read therefore never
//! leaves a half-written window behind.

use lumen_hal::{DisplayBus, ResourceReader};

use crate::color::swap_pixel_bytes;
use crate::error::{Error, Malformed};
use crate::fmt::Dbg;
use crate::geometry::Rect;
use crate::panel::Panel;

/// Progress of an [`ImageStream`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamState {
    #[default]
    Idle,
    /// Transferring the given row
    Streaming { row: u16 },
    Done,
    Failed,
}

/// Position within the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamCursor {
    /// Bytes consumed from the resource
    pub byte_offset: usize,
    /// Rows fully sent
    pub row: u16,
}

/// Scanline streamer for pre-encoded images
#[derive(Debug, Default)]
pub struct ImageStream {
    state: StreamState,
    cursor: StreamCursor,
}

impl ImageStream {
    pub const fn new() -> Self {
        Self {
            state: StreamState::Idle,
            cursor: StreamCursor {
                byte_offset: 0,
                row: 0,
            },
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn cursor(&self) -> StreamCursor {
        self.cursor
    }

    /// Stream a `w × h` image from `resource` to (x, y)
    ///
    /// The resource holds raw pixels, row-major, in the panel's configured
    /// resource byte order. A resource that reports its size must hold
    /// exactly `w × h × 2` bytes or nothing is sent. One that does not is
    /// streamed until it runs short, stopping after the last complete row.
    pub fn stream<B, R>(
        &mut self,
        panel: &mut Panel<B>,
        resource: &mut R,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
    ) -> Result<(), Error<B::Error>>
    where
        B: DisplayBus,
        R: ResourceReader,
        R::Error: core::fmt::Debug,
    {
        self.state = StreamState::Idle;
        self.cursor = StreamCursor::default();

        let result = self.run(panel, resource, Rect::new(x, y, w, h));
        self.state = match result {
            Ok(()) => StreamState::Done,
            Err(_) => StreamState::Failed,
        };
        result
    }

    fn run<B, R>(
        &mut self,
        panel: &mut Panel<B>,
        resource: &mut R,
        area: Rect,
    ) -> Result<(), Error<B::Error>>
    where
        B: DisplayBus,
        R: ResourceReader,
        R::Error: core::fmt::Debug,
    {
        panel.canvas().check_window(&area)?;

        let row_bytes = area.w as usize * 2;
        let expected = row_bytes * area.h as usize;
        if let Some(actual) = resource.size() {
            if actual != expected {
                warn!("resource is {} bytes, expected {}", actual, expected);
                return Err(Malformed::LengthMismatch { expected, actual }.into());
            }
        }

        let mut line = panel.planner().alloc(row_bytes)?;
        let swap = panel.config().resource_order != panel.config().byte_order;
        debug!(
            "streaming {}x{} at ({}, {}), swap {}",
            area.w,
            area.h,
            area.x,
            area.y,
            swap
        );

        for row in 0..area.h {
            self.state = StreamState::Streaming { row };
            let n = match resource.read_full(&mut line) {
                Ok(n) => n,
                Err(e) => {
                    warn!("resource read failed after {} rows: {}", row, Dbg(&e));
                    return Err(Error::ResourceRead { rows_complete: row });
                }
            };
            self.cursor.byte_offset += n;
            if n < row_bytes {
                warn!("resource ended after {} complete rows", row);
                return Err(Malformed::Truncated { rows_complete: row }.into());
            }

            if swap {
                swap_pixel_bytes(&mut line);
            }
            panel.set_window(area.x, area.y + row, area.w, 1)?;
            panel.write_pixels(&line)?;
            self.cursor.row = row + 1;
        }
        Ok(())
    }
}
