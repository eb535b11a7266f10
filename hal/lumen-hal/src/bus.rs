//! Display bus abstraction
//!
//! Display controllers in the MIPI DCS family expose two logical channels
//! over the same serial lines, selected by a mode (D/C) line:
//! - the command channel carries one opcode byte,
//! - the data channel carries parameters and pixel bytes.

/// Two-channel display bus
///
/// Every call blocks until the bus has accepted all bytes. Implementations
/// own the mode line and chip select; callers never interleave partial
/// commands.
pub trait DisplayBus {
    /// Error type for bus operations
    type Error;

    /// Send a command byte followed by its parameter bytes
    ///
    /// `args` may be empty for parameterless commands.
    fn command(&mut self, cmd: u8, args: &[u8]) -> Result<(), Self::Error>;

    /// Send raw bytes on the data channel
    fn data(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl<T: DisplayBus + ?Sized> DisplayBus for &mut T {
    type Error = T::Error;

    fn command(&mut self, cmd: u8, args: &[u8]) -> Result<(), Self::Error> {
        T::command(self, cmd, args)
    }

    fn data(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        T::data(self, bytes)
    }
}
