//! Host-side bus double

use alloc::vec::Vec;

use lumen_hal::DisplayBus;

use crate::geometry::Rect;

/// One recorded bus transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Command(u8, Vec<u8>),
    /// Consecutive data writes are merged into one entry
    Data(Vec<u8>),
}

/// Records every transaction in order
#[derive(Debug, Default)]
pub struct RecordingBus {
    pub ops: Vec<Op>,
    /// Fail the n-th data write (0-based) when set
    pub fail_data_at: Option<usize>,
    data_writes: usize,
}

/// Error injected by [`RecordingBus::fail_data_at`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Injected;

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_data_at: Some(n),
            ..Self::default()
        }
    }

    /// Command bytes only, in order
    pub fn commands(&self) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Command(c, _) => Some(*c),
                Op::Data(_) => None,
            })
            .collect()
    }

    /// All pixel bytes concatenated
    pub fn data(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for op in &self.ops {
            if let Op::Data(d) = op {
                out.extend_from_slice(d);
            }
        }
        out
    }

    /// Decoded (CASET, RASET) windows, in order
    pub fn windows(&self) -> Vec<((u16, u16), (u16, u16))> {
        let mut out = Vec::new();
        let mut cols = None;
        for op in &self.ops {
            match op {
                Op::Command(0x2A, a) => cols = Some(pair(a)),
                Op::Command(0x2B, a) => {
                    if let Some(c) = cols.take() {
                        out.push((c, pair(a)));
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Windows converted back to canvas rectangles given the origin offset
    pub fn rects(&self, x_offset: u16, y_offset: u16) -> Vec<Rect> {
        self.windows()
            .into_iter()
            .map(|((c0, c1), (r0, r1))| {
                Rect::new(c0 - x_offset, r0 - y_offset, c1 - c0 + 1, r1 - r0 + 1)
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

fn pair(a: &[u8]) -> (u16, u16) {
    (
        u16::from_be_bytes([a[0], a[1]]),
        u16::from_be_bytes([a[2], a[3]]),
    )
}

impl DisplayBus for RecordingBus {
    type Error = Injected;

    fn command(&mut self, cmd: u8, args: &[u8]) -> Result<(), Injected> {
        self.ops.push(Op::Command(cmd, args.to_vec()));
        Ok(())
    }

    fn data(&mut self, bytes: &[u8]) -> Result<(), Injected> {
        let n = self.data_writes;
        self.data_writes += 1;
        if self.fail_data_at == Some(n) {
            return Err(Injected);
        }
        if let Some(Op::Data(prev)) = self.ops.last_mut() {
            prev.extend_from_slice(bytes);
        } else {
            self.ops.push(Op::Data(bytes.to_vec()));
        }
        Ok(())
    }
}

/// Delay provider that only counts requested time
#[derive(Debug, Default)]
pub struct NoDelay {
    pub total_ns: u64,
}

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}
