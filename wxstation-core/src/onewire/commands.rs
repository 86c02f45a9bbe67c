//! One-Wire ROM and function command bytes

/// Read the 64-bit ROM code of the only device on the bus
pub const READ_ROM: u8 = 0x33;
/// Address one device by ROM code
pub const MATCH_ROM: u8 = 0x55;
/// Address every device on the bus
pub const SKIP_ROM: u8 = 0xCC;
/// Enumerate ROM codes
pub const SEARCH_ROM: u8 = 0xF0;
/// Enumerate devices with an alarm condition
pub const ALARM_SEARCH: u8 = 0xEC;

/// Start a temperature conversion
pub const CONVERT_T: u8 = 0x44;
/// Write TH, TL and configuration
pub const WRITE_SCRATCHPAD: u8 = 0x4E;
/// Read the scratchpad, byte 0 first
pub const READ_SCRATCHPAD: u8 = 0xBE;
/// Copy TH, TL and configuration to EEPROM
pub const COPY_SCRATCHPAD: u8 = 0x48;
/// Reload TH, TL and configuration from EEPROM
pub const RECALL_E2: u8 = 0xB8;
/// Ask whether any device is parasite powered
pub const READ_POWER_SUPPLY: u8 = 0xB4;
