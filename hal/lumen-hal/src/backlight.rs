//! Backlight control
//!
//! Some boards drive the backlight from a GPIO, others through a power
//! management IC. The firmware only needs to switch it on and off.

/// Switchable display backlight
pub trait Backlight {
    /// Error type for backlight operations
    type Error;

    /// Turn the backlight on or off
    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error>;
}

impl<T: Backlight + ?Sized> Backlight for &mut T {
    type Error = T::Error;

    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error> {
        T::set_backlight(self, on)
    }
}
