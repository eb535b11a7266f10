//! Pixel resource abstractions
//!
//! A resource is an external, sequential source of pre-encoded pixels:
//! a file on a filesystem, a region of external flash, or a byte slice
//! linked into the firmware. Resources are read front to back exactly once.

/// Sequential reader over a pre-encoded pixel resource
pub trait ResourceReader {
    /// Error type for read operations
    type Error;

    /// Total size in bytes, if known before reading
    ///
    /// Sized resources are validated up front; size-less ones (pipes,
    /// sockets) can only be validated as they are consumed.
    fn size(&self) -> Option<usize>;

    /// Read up to `buf.len()` bytes
    ///
    /// Returns the number of bytes read. `Ok(0)` means end of resource.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Fill `buf` as far as the resource allows
    ///
    /// Returns the number of bytes read, which is less than `buf.len()`
    /// only when the resource ended.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..])? {
                0 => break,
                n => filled += n,
            }
        }
        Ok(filled)
    }
}

/// Resource backed by an in-memory byte slice
#[derive(Debug, Clone)]
pub struct SliceResource<'a> {
    data: &'a [u8],
    pos: usize,
    sized: bool,
}

impl<'a> SliceResource<'a> {
    /// Create a resource whose size is reported up front
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            sized: true,
        }
    }

    /// Create a resource that hides its size, like a stream
    pub const fn without_size(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            sized: false,
        }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl ResourceReader for SliceResource<'_> {
    type Error = core::convert::Infallible;

    fn size(&self) -> Option<usize> {
        self.sized.then_some(self.data.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = &self.data[self.pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }
}

/// Resource backed by any [`embedded_io::Read`] implementation
///
/// The size is supplied by the caller (e.g. from a directory entry), since
/// `embedded-io` readers carry no length.
#[cfg(feature = "embedded-io")]
pub struct IoResource<R> {
    inner: R,
    size: Option<usize>,
}

#[cfg(feature = "embedded-io")]
impl<R: embedded_io::Read> IoResource<R> {
    /// Wrap a reader with an optional known size
    pub fn new(inner: R, size: Option<usize>) -> Self {
        Self { inner, size }
    }

    /// Unwrap the underlying reader
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(feature = "embedded-io")]
impl<R: embedded_io::Read> ResourceReader for IoResource<R> {
    type Error = R::Error;

    fn size(&self) -> Option<usize> {
        self.size
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.inner.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_resource_reports_size() {
        let data = [1u8, 2, 3, 4];
        assert_eq!(SliceResource::new(&data).size(), Some(4));
        assert_eq!(SliceResource::without_size(&data).size(), None);
    }

    #[test]
    fn test_read_full_stops_at_end() {
        let data = [1u8, 2, 3];
        let mut res = SliceResource::new(&data);
        let mut buf = [0u8; 2];

        assert_eq!(res.read_full(&mut buf), Ok(2));
        assert_eq!(buf, [1, 2]);
        assert_eq!(res.read_full(&mut buf), Ok(1));
        assert_eq!(buf[0], 3);
        assert_eq!(res.read_full(&mut buf), Ok(0));
        assert_eq!(res.position(), 3);
    }

    /// Reader that hands out one byte per call
    struct Trickle<'a>(&'a [u8]);

    impl ResourceReader for Trickle<'_> {
        type Error = ();

        fn size(&self) -> Option<usize> {
            None
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            match (self.0.split_first(), buf.first_mut()) {
                (Some((&b, rest)), Some(slot)) => {
                    *slot = b;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn test_read_full_loops_over_short_reads() {
        let mut res = Trickle(&[9, 8, 7, 6]);
        let mut buf = [0u8; 3];
        assert_eq!(res.read_full(&mut buf), Ok(3));
        assert_eq!(buf, [9, 8, 7]);
    }

    #[cfg(feature = "embedded-io")]
    #[test]
    fn test_io_resource_over_byte_reader() {
        let data = [0xF8u8, 0x00, 0x07, 0xE0, 0x1F];
        let mut res = IoResource::new(&data[..], Some(data.len()));
        assert_eq!(res.size(), Some(5));

        let mut buf = [0u8; 4];
        assert_eq!(res.read_full(&mut buf), Ok(4));
        assert_eq!(buf, [0xF8, 0x00, 0x07, 0xE0]);
        assert_eq!(res.read_full(&mut buf), Ok(1));
        assert_eq!(res.read_full(&mut buf), Ok(0));
        assert!(res.into_inner().is_empty());

        assert_eq!(IoResource::new(&data[..], None).size(), None);
    }
}
