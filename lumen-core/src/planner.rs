//! Transfer planner
//!
//! Decides how pixel data for one window reaches the bus. Small operations
//! get one exact-size buffer. Anything larger than the chunk threshold gets
//! one chunk-sized buffer that is refilled or replayed until the window is
//! complete, so peak transient memory is independent of operation size.
//!
//! Buffers are always allocated before the caller latches a window: an
//! allocation failure aborts the operation with nothing sent.

use alloc::vec::Vec;

use crate::color::{ByteOrder, Rgb565};
use crate::config::MemoryBudget;
use crate::error::{AllocError, Error};

/// How a run of pixels will be transferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transfer {
    /// One buffer holding every pixel
    Exact { pixels: u32 },
    /// `repeats` full chunks followed by a `remainder`-pixel prefix
    Chunked {
        chunk_pixels: u32,
        repeats: u32,
        remainder: u32,
    },
}

impl Transfer {
    /// Size of the single buffer this transfer needs
    pub fn buffer_bytes(&self) -> usize {
        match *self {
            Transfer::Exact { pixels } => pixels as usize * 2,
            Transfer::Chunked { chunk_pixels, .. } => chunk_pixels as usize * 2,
        }
    }

    /// Total pixels covered
    pub fn pixels(&self) -> u32 {
        match *self {
            Transfer::Exact { pixels } => pixels,
            Transfer::Chunked {
                chunk_pixels,
                repeats,
                remainder,
            } => chunk_pixels * repeats + remainder,
        }
    }
}

/// Chooses and prepares transfers within a memory budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPlanner {
    budget: MemoryBudget,
}

impl TransferPlanner {
    pub const fn new(budget: MemoryBudget) -> Self {
        Self { budget }
    }

    pub const fn budget(&self) -> MemoryBudget {
        self.budget
    }

    /// Pixels per chunk
    pub const fn chunk_pixels(&self) -> u32 {
        (self.budget.chunk_bytes / 2) as u32
    }

    /// Plan a transfer of `pixels` pixels
    pub fn plan(&self, pixels: u32) -> Transfer {
        let chunk_pixels = self.chunk_pixels().max(1);
        if pixels as usize * 2 > self.budget.chunk_bytes {
            Transfer::Chunked {
                chunk_pixels,
                repeats: pixels / chunk_pixels,
                remainder: pixels % chunk_pixels,
            }
        } else {
            Transfer::Exact { pixels }
        }
    }

    /// Allocate a zeroed buffer within the budget
    ///
    /// Never aborts on exhaustion: both the budget ceiling and a failed
    /// reservation are reported as [`AllocError`].
    pub fn alloc(&self, bytes: usize) -> Result<Vec<u8>, AllocError> {
        let err = AllocError { requested: bytes };
        if bytes > self.budget.max_alloc_bytes {
            warn!("allocation of {} bytes exceeds budget", bytes);
            return Err(err);
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(bytes).map_err(|_| {
            warn!("allocation of {} bytes failed", bytes);
            err
        })?;
        buf.resize(bytes, 0);
        Ok(buf)
    }

    /// Prepare a solid-color transfer
    pub fn prepare_fill(
        &self,
        color: Rgb565,
        pixels: u32,
        order: ByteOrder,
    ) -> Result<FillJob, AllocError> {
        let plan = self.plan(pixels);
        let mut buf = self.alloc(plan.buffer_bytes())?;
        color.encode_span(order, &mut buf);
        trace!("fill plan: {} pixels, buffer {} bytes", pixels, buf.len());
        Ok(FillJob { plan, buf })
    }

    /// Prepare a per-pixel transfer
    pub fn prepare_stream(&self, pixels: u32) -> Result<StreamJob, AllocError> {
        let plan = self.plan(pixels);
        let buf = self.alloc(plan.buffer_bytes())?;
        Ok(StreamJob { plan, buf })
    }

    /// Allocate and send `pixels` copies of `color`
    pub fn fill<E>(
        &self,
        color: Rgb565,
        pixels: u32,
        order: ByteOrder,
        sink: impl FnMut(&[u8]) -> Result<(), E>,
    ) -> Result<(), Error<E>> {
        let job = self.prepare_fill(color, pixels, order)?;
        job.run(sink).map_err(Error::Bus)
    }

    /// Allocate and send `pixels` per-pixel colors
    pub fn stream<E>(
        &self,
        pixels: u32,
        order: ByteOrder,
        source: impl IntoIterator<Item = Rgb565>,
        sink: impl FnMut(&[u8]) -> Result<(), E>,
    ) -> Result<(), Error<E>> {
        let mut job = self.prepare_stream(pixels)?;
        job.run(order, source, sink).map_err(Error::Bus)
    }
}

/// A solid-color transfer with its buffer already allocated
#[derive(Debug)]
pub struct FillJob {
    plan: Transfer,
    buf: Vec<u8>,
}

impl FillJob {
    pub fn plan(&self) -> Transfer {
        self.plan
    }

    /// Replay the encoded buffer into `sink` until every pixel is sent
    pub fn run<E>(&self, mut sink: impl FnMut(&[u8]) -> Result<(), E>) -> Result<(), E> {
        match self.plan {
            Transfer::Exact { pixels } => {
                if pixels > 0 {
                    sink(&self.buf)?;
                }
            }
            Transfer::Chunked {
                repeats, remainder, ..
            } => {
                for _ in 0..repeats {
                    sink(&self.buf)?;
                }
                if remainder > 0 {
                    sink(&self.buf[..remainder as usize * 2])?;
                }
            }
        }
        Ok(())
    }
}

/// A per-pixel transfer with its buffer already allocated
#[derive(Debug)]
pub struct StreamJob {
    plan: Transfer,
    buf: Vec<u8>,
}

impl StreamJob {
    pub fn plan(&self) -> Transfer {
        self.plan
    }

    /// Encode exactly the planned number of pixels from `colors` into `sink`
    ///
    /// If `colors` runs dry early the rest of the window is padded with the
    /// default color so the window is always completed.
    pub fn run<E>(
        &mut self,
        order: ByteOrder,
        colors: impl IntoIterator<Item = Rgb565>,
        mut sink: impl FnMut(&[u8]) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut colors = colors.into_iter();
        let mut left = self.plan.pixels() as usize;
        while left > 0 {
            let n = left.min(self.buf.len() / 2);
            for px in self.buf[..n * 2].chunks_exact_mut(2) {
                px.copy_from_slice(&colors.next().unwrap_or_default().encode(order));
            }
            sink(&self.buf[..n * 2])?;
            left -= n;
        }
        Ok(())
    }
}
