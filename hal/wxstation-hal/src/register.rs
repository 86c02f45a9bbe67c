//! 16-bit word register access
//!
//! Radio and audio chips commonly expose their configuration as a bank of
//! 16-bit registers behind an I2C address. [`RegisterBus`] is the narrow
//! interface the command queue needs; [`I2cRegisterBus`] implements it on
//! top of any blocking [`I2cBus`] master.
//!
//! Wire format (big-endian word):
//! - read:  write `[reg]`, repeated start, read `[hi, lo]`
//! - write: write `[reg, hi, lo]`

/// Highest valid 7-bit I2C device address
pub const MAX_I2C_ADDRESS: u8 = 0x7F;

/// Blocking I2C master, as far as word registers need one
///
/// The command queue drives it from interrupt context, so both calls must
/// complete the whole transaction before returning.
pub trait I2cBus {
    /// Error type for bus transactions
    type Error;

    /// Write `data` to the device at 7-bit `address`
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Write `data`, then read into `buf` after a repeated start
    fn write_read(&mut self, address: u8, data: &[u8], buf: &mut [u8])
        -> Result<(), Self::Error>;
}

/// Word-register device access
pub trait RegisterBus {
    /// Error type for register transactions
    type Error;

    /// Read the 16-bit value of register `reg`
    fn read_register(&mut self, reg: u8) -> Result<u16, Self::Error>;

    /// Write a 16-bit value to register `reg`
    fn write_register(&mut self, reg: u8, value: u16) -> Result<(), Self::Error>;
}

/// Errors from [`I2cRegisterBus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cRegisterError<E> {
    /// Device address does not fit in 7 bits
    AddressOutOfRange(u8),
    /// Underlying bus transaction failed
    Bus(E),
}

/// Register bus for a single device on an I2C bus
pub struct I2cRegisterBus<B> {
    bus: B,
    address: u8,
}

impl<B: I2cBus> I2cRegisterBus<B> {
    /// Bind a device address on the given bus
    ///
    /// # Arguments
    /// - `bus`: I2C master
    /// - `address`: 7-bit device address
    pub fn new(bus: B, address: u8) -> Result<Self, I2cRegisterError<B::Error>> {
        if address > MAX_I2C_ADDRESS {
            return Err(I2cRegisterError::AddressOutOfRange(address));
        }
        Ok(Self { bus, address })
    }

    /// Get the bound 7-bit device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Get access to the underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Release the underlying bus
    pub fn into_inner(self) -> B {
        self.bus
    }
}

impl<B: I2cBus> RegisterBus for I2cRegisterBus<B> {
    type Error = I2cRegisterError<B::Error>;

    fn read_register(&mut self, reg: u8) -> Result<u16, Self::Error> {
        let mut buf = [0u8; 2];
        self.bus
            .write_read(self.address, &[reg], &mut buf)
            .map_err(I2cRegisterError::Bus)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn write_register(&mut self, reg: u8, value: u16) -> Result<(), Self::Error> {
        let [hi, lo] = value.to_be_bytes();
        self.bus
            .write(self.address, &[reg, hi, lo])
            .map_err(I2cRegisterError::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock I2C bus holding one device's register file
    struct MockI2c {
        registers: [u16; 256],
        last_address: Option<u8>,
        last_read: Option<(usize, usize)>,
        fail: bool,
    }

    impl MockI2c {
        fn new() -> Self {
            Self {
                registers: [0; 256],
                last_address: None,
                last_read: None,
                fail: false,
            }
        }
    }

    impl I2cBus for MockI2c {
        type Error = ();

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.last_address = Some(address);
            if let [reg, hi, lo] = *data {
                self.registers[reg as usize] = u16::from_be_bytes([hi, lo]);
            }
            Ok(())
        }

        fn write_read(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.last_address = Some(address);
            self.last_read = Some((write.len(), read.len()));
            let value = self.registers[write[0] as usize];
            read.copy_from_slice(&value.to_be_bytes());
            Ok(())
        }
    }

    #[test]
    fn test_write_is_big_endian() {
        let mut regs = I2cRegisterBus::new(MockI2c::new(), 0x71).unwrap();
        regs.write_register(0x30, 0x1234).unwrap();

        assert_eq!(regs.bus().registers[0x30], 0x1234);
        assert_eq!(regs.bus().last_address, Some(0x71));
    }

    #[test]
    fn test_read_back() {
        let mut mock = MockI2c::new();
        mock.registers[0x1F] = 0xBEEF;
        let mut regs = I2cRegisterBus::new(mock, 0x2E).unwrap();

        assert_eq!(regs.read_register(0x1F), Ok(0xBEEF));
    }

    #[test]
    fn test_read_is_one_combined_transaction() {
        let mut regs = I2cRegisterBus::new(MockI2c::new(), 0x71).unwrap();
        regs.read_register(0x30).unwrap();

        // Register index out, one big-endian word back
        assert_eq!(regs.bus().last_read, Some((1, 2)));
        assert_eq!(regs.bus().last_address, Some(0x71));
    }

    #[test]
    fn test_address_out_of_range() {
        let result = I2cRegisterBus::new(MockI2c::new(), 0x80);
        assert!(matches!(result, Err(I2cRegisterError::AddressOutOfRange(0x80))));
    }

    #[test]
    fn test_bus_error_propagates() {
        let mut mock = MockI2c::new();
        mock.fail = true;
        let mut regs = I2cRegisterBus::new(mock, 0x71).unwrap();

        assert_eq!(regs.read_register(0x00), Err(I2cRegisterError::Bus(())));
        assert_eq!(regs.write_register(0x00, 1), Err(I2cRegisterError::Bus(())));
    }
}
