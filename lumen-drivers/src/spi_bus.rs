//! SPI display bus
//!
//! Four-wire SPI: the chip select belongs to the [`SpiDevice`], and a
//! separate D/C pin picks the channel (low = command, high = data).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use lumen_hal::DisplayBus;

/// SPI display bus errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError<S, P> {
    /// SPI transfer failed
    Spi(S),
    /// D/C pin could not be driven
    Pin(P),
}

/// Display bus over an SPI device and a D/C pin
pub struct SpiDisplayBus<SPI, DC> {
    spi: SPI,
    dc: DC,
}

impl<SPI, DC> SpiDisplayBus<SPI, DC>
where
    SPI: SpiDevice,
    DC: OutputPin,
{
    pub fn new(spi: SPI, dc: DC) -> Self {
        Self { spi, dc }
    }

    /// Give back the SPI device and D/C pin
    pub fn release(self) -> (SPI, DC) {
        (self.spi, self.dc)
    }
}

impl<SPI, DC> DisplayBus for SpiDisplayBus<SPI, DC>
where
    SPI: SpiDevice,
    DC: OutputPin,
{
    type Error = BusError<SPI::Error, DC::Error>;

    fn command(&mut self, cmd: u8, args: &[u8]) -> Result<(), Self::Error> {
        self.dc.set_low().map_err(BusError::Pin)?;
        self.spi.write(&[cmd]).map_err(BusError::Spi)?;
        self.data(args)
    }

    fn data(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.dc.set_high().map_err(BusError::Pin)?;
        self.spi.write(bytes).map_err(BusError::Spi)
    }
}

/// Pulse the controller's reset line
///
/// Holds reset low for 20 ms, then waits 150 ms for the controller to come
/// out of reset.
pub fn hard_reset<P: OutputPin>(rst: &mut P, delay: &mut impl DelayNs) -> Result<(), P::Error> {
    rst.set_high()?;
    delay.delay_ms(1);
    rst.set_low()?;
    delay.delay_ms(20);
    rst.set_high()?;
    delay.delay_ms(150);
    Ok(())
}
