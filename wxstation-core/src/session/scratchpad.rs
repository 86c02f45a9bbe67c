//! Fixed-length device scratchpad buffer

use heapless::Vec;

use crate::onewire::check_crc8;

/// DS18B20 scratchpad length
pub const DS18B20_SCRATCHPAD_LEN: usize = 9;

/// Byte buffer filled one received byte at a time
///
/// Contents are only meaningful once [`is_full`](Self::is_full).
#[derive(Debug, Clone, Default)]
pub struct Scratchpad<const N: usize = DS18B20_SCRATCHPAD_LEN> {
    bytes: Vec<u8, N>,
}

impl<const N: usize> Scratchpad<N> {
    /// Create an empty scratchpad
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Forget all received bytes
    pub fn reset(&mut self) {
        self.bytes.clear();
    }

    /// Append a received byte
    ///
    /// Returns `true` when this byte completed the buffer. Bytes arriving
    /// after that are ignored.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.bytes.push(byte).is_err() {
            return false;
        }
        self.is_full()
    }

    /// Number of bytes received
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if no byte has been received
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check if all `N` bytes have been received
    pub fn is_full(&self) -> bool {
        self.bytes.len() == N
    }

    /// Received bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Check the trailing CRC-8 byte of a full scratchpad
    pub fn crc_valid(&self) -> bool {
        self.is_full() && check_crc8(&self.bytes)
    }

    /// Raw signed temperature from bytes 0 (low) and 1 (high)
    pub fn raw_temperature(&self) -> Option<i16> {
        match self.bytes.as_slice() {
            [lo, hi, ..] => Some(i16::from_le_bytes([*lo, *hi])),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POWER_ON: [u8; 9] = [0x50, 0x05, 0x4B, 0x46, 0x7F, 0xFF, 0x0C, 0x10, 0x1C];

    #[test]
    fn test_fill() {
        let mut pad: Scratchpad = Scratchpad::new();
        for (i, byte) in POWER_ON.iter().enumerate() {
            assert_eq!(pad.push(*byte), i == 8);
        }
        assert!(pad.is_full());
        assert!(pad.crc_valid());
        assert_eq!(pad.raw_temperature(), Some(0x0550));
    }

    #[test]
    fn test_extra_bytes_ignored() {
        let mut pad: Scratchpad<2> = Scratchpad::new();
        pad.push(1);
        pad.push(2);
        assert!(!pad.push(3));
        assert_eq!(pad.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_negative_temperature() {
        let mut pad: Scratchpad = Scratchpad::new();
        pad.push(0x5E);
        pad.push(0xFF);
        assert_eq!(pad.raw_temperature(), Some(-162));
        assert!(!pad.crc_valid());
    }

    #[test]
    fn test_reset() {
        let mut pad: Scratchpad = Scratchpad::new();
        pad.push(0xAA);
        pad.reset();
        assert!(pad.is_empty());
        assert_eq!(pad.raw_temperature(), None);
    }
}
