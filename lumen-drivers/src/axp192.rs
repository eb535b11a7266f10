//! AXP192 power management IC
//!
//! On M5StickC-class boards the display rails and backlight hang off the
//! AXP192, so the panel stays dark until these registers are written.

use embedded_hal::i2c::I2c;
use lumen_hal::Backlight;

/// Fixed I²C address
pub const ADDRESS: u8 = 0x34;

mod reg {
    /// DC-DC and LDO output enables
    pub const POWER_OUTPUT: u8 = 0x12;
    /// GPIO2 output level
    pub const GPIO_LEVEL: u8 = 0x95;
    /// GPIO function select
    pub const GPIO_FUNCTION: u8 = 0x96;
}

mod val {
    pub const ALL_RAILS: u8 = 0xFF;
    pub const GPIO2_OUTPUT: u8 = 0x84;
    pub const BACKLIGHT_ON: u8 = 0x02;
    pub const BACKLIGHT_OFF: u8 = 0x00;
}

/// AXP192 driver
pub struct Axp192<I2C> {
    i2c: I2C,
    backlight: bool,
}

impl<I2C: I2c> Axp192<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            backlight: false,
        }
    }

    /// Enable the display rails and switch the backlight on
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        self.write(reg::POWER_OUTPUT, val::ALL_RAILS)?;
        self.write(reg::GPIO_FUNCTION, val::GPIO2_OUTPUT)?;
        self.set_backlight(true)
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(ADDRESS, &[register, value])
    }

    /// Last backlight state written
    pub fn backlight_on(&self) -> bool {
        self.backlight
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> Backlight for Axp192<I2C> {
    type Error = I2C::Error;

    fn set_backlight(&mut self, on: bool) -> Result<(), I2C::Error> {
        let level = if on {
            val::BACKLIGHT_ON
        } else {
            val::BACKLIGHT_OFF
        };
        self.write(reg::GPIO_LEVEL, level)?;
        self.backlight = on;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Nak;

    impl embedded_hal::i2c::Error for Nak {
        fn kind(&self) -> ErrorKind {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        }
    }

    /// Mock I²C bus recording (address, bytes) writes
    #[derive(Default)]
    struct MockI2c {
        writes: Vec<(u8, Vec<u8>)>,
        absent: bool,
    }

    impl ErrorType for MockI2c {
        type Error = Nak;
    }

    impl I2c for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Nak> {
            if self.absent {
                return Err(Nak);
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_init_enables_rails_and_backlight() {
        let mut pmic = Axp192::new(MockI2c::default());
        pmic.init().unwrap();
        assert!(pmic.backlight_on());
        assert_eq!(
            pmic.release().writes,
            vec![
                (0x34, vec![0x12, 0xFF]),
                (0x34, vec![0x96, 0x84]),
                (0x34, vec![0x95, 0x02]),
            ]
        );
    }

    #[test]
    fn test_backlight_off() {
        let mut pmic = Axp192::new(MockI2c::default());
        pmic.set_backlight(false).unwrap();
        assert!(!pmic.backlight_on());
        assert_eq!(pmic.release().writes, vec![(0x34, vec![0x95, 0x00])]);
    }

    #[test]
    fn test_missing_chip_keeps_state() {
        let mut pmic = Axp192::new(MockI2c {
            absent: true,
            ..Default::default()
        });
        assert_eq!(pmic.init(), Err(Nak));
        assert!(!pmic.backlight_on());
    }
}
