//! GPIO backlight
//!
//! Backlight switched directly by a pin (or through a transistor).

use embedded_hal::digital::OutputPin;
use lumen_hal::Backlight;

/// Backlight on a GPIO pin
///
/// The pin can be configured as active-high (default) or active-low.
pub struct PinBacklight<P> {
    pin: P,
    /// If true, backlight ON = pin LOW
    inverted: bool,
    on: bool,
}

impl<P: OutputPin> PinBacklight<P> {
    pub fn new(pin: P, inverted: bool) -> Self {
        Self {
            pin,
            inverted,
            on: false,
        }
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl<P: OutputPin> Backlight for PinBacklight<P> {
    type Error = P::Error;

    fn set_backlight(&mut self, on: bool) -> Result<(), P::Error> {
        if on != self.inverted {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.on = on;
        Ok(())
    }
}
