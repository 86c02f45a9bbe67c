//! `I2cBus` adapter for embedded-hal 1.0 I2C masters

use embedded_hal::i2c::I2c;
use wxstation_hal::I2cBus;

/// Blocking I2C master wrapping an embedded-hal implementation
///
/// Typically an `embassy_rp::i2c::I2c<'_, I2C0, Blocking>`. The command
/// queue calls it from interrupt context, so it must be a blocking
/// driver.
pub struct HalI2c<I> {
    i2c: I,
}

impl<I: I2c> HalI2c<I> {
    /// Wrap an I2C master
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Release the wrapped master
    pub fn into_inner(self) -> I {
        self.i2c
    }
}

impl<I: I2c> I2cBus for HalI2c<I> {
    type Error = I::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(address, data)
    }

    fn write_read(&mut self, address: u8, data: &[u8], buf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(address, data, buf)
    }
}
