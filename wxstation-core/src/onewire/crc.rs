//! Dallas/Maxim CRC-8
//!
//! Polynomial x^8 + x^5 + x^4 + 1, processed LSB first (reflected 0x8C),
//! initial value 0. Running the CRC over data followed by its CRC byte
//! yields 0.

const POLY: u8 = 0x8C;

/// Fold one byte into a running CRC
pub const fn crc8_update(crc: u8, byte: u8) -> u8 {
    let mut crc = crc ^ byte;
    let mut i = 0;
    while i < 8 {
        crc = if crc & 0x01 != 0 {
            (crc >> 1) ^ POLY
        } else {
            crc >> 1
        };
        i += 1;
    }
    crc
}

/// CRC-8 of a byte slice
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0, |crc, &byte| crc8_update(crc, byte))
}

/// Check a buffer whose last byte is the CRC of the bytes before it
pub fn check_crc8(data_with_crc: &[u8]) -> bool {
    !data_with_crc.is_empty() && crc8(data_with_crc) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rom_code_example() {
        // Family 0x02, serial 0x0000_0001_B81C
        let rom = [0x02, 0x1C, 0xB8, 0x01, 0x00, 0x00, 0x00];
        assert_eq!(crc8(&rom), 0xA2);
    }

    #[test]
    fn test_power_on_scratchpad() {
        let scratchpad = [0x50, 0x05, 0x4B, 0x46, 0x7F, 0xFF, 0x0C, 0x10, 0x1C];
        assert!(check_crc8(&scratchpad));
    }

    #[test]
    fn test_corruption_detected() {
        let mut scratchpad = [0x50, 0x05, 0x4B, 0x46, 0x7F, 0xFF, 0x0C, 0x10, 0x1C];
        scratchpad[0] ^= 0x01;
        assert!(!check_crc8(&scratchpad));
    }

    #[test]
    fn test_empty() {
        assert_eq!(crc8(&[]), 0);
        assert!(!check_crc8(&[]));
    }
}
