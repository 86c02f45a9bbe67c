//! Device and station configuration types
//!
//! Defaults reproduce the stock DS18B20 and RDA1846 bring-up used by the
//! station firmware.

use heapless::String;

use super::timing::{CommandQueueConfig, OneWireTiming, SchedulerConfig};
use crate::onewire::commands;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum station label length
pub const MAX_LABEL_LEN: usize = 16;

/// One-Wire function command bytes for a device family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceCommands {
    /// Address all devices on the bus
    pub skip_rom: u8,
    /// Start a temperature conversion
    pub convert: u8,
    /// Read the scratchpad
    pub read_scratchpad: u8,
    /// Write TH, TL and configuration bytes
    pub write_scratchpad: u8,
}

impl Default for DeviceCommands {
    fn default() -> Self {
        Self {
            skip_rom: commands::SKIP_ROM,
            convert: commands::CONVERT_T,
            read_scratchpad: commands::READ_SCRATCHPAD,
            write_scratchpad: commands::WRITE_SCRATCHPAD,
        }
    }
}

/// Thermometer conversion resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Resolution {
    /// 0.5 °C
    Bits9,
    /// 0.25 °C
    Bits10,
    /// 0.125 °C
    Bits11,
    /// 0.0625 °C
    #[default]
    Bits12,
}

impl Resolution {
    /// Worst-case conversion time (ms)
    pub const fn conversion_time_ms(self) -> u32 {
        match self {
            Self::Bits9 => 94,
            Self::Bits10 => 188,
            Self::Bits11 => 375,
            Self::Bits12 => 750,
        }
    }

    /// Configuration register value (R1:R0 in bits 6:5)
    pub const fn config_byte(self) -> u8 {
        let bits = match self {
            Self::Bits9 => 0b00,
            Self::Bits10 => 0b01,
            Self::Bits11 => 0b10,
            Self::Bits12 => 0b11,
        };
        (bits << 5) | 0x1F
    }

    /// Mask clearing the raw temperature bits undefined at this resolution
    pub const fn raw_mask(self) -> i16 {
        match self {
            Self::Bits9 => !0b111,
            Self::Bits10 => !0b11,
            Self::Bits11 => !0b1,
            Self::Bits12 => !0,
        }
    }
}

/// Thermometer session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThermometerConfig {
    /// Function command bytes
    pub commands: DeviceCommands,
    /// Conversion resolution
    pub resolution: Resolution,
    /// Reject scratchpads whose CRC-8 does not match
    pub verify_crc: bool,
    /// Confirm the bus is released before each reset
    pub check_bus_idle: bool,
    /// Poll budget of the bus-idle check (1 ms per poll)
    pub bus_idle_polls: u16,
    /// High alarm trigger register (°C)
    pub alarm_high_c: i8,
    /// Low alarm trigger register (°C)
    pub alarm_low_c: i8,
}

impl Default for ThermometerConfig {
    fn default() -> Self {
        Self {
            commands: DeviceCommands::default(),
            resolution: Resolution::Bits12,
            verify_crc: true,
            check_bus_idle: false,
            bus_idle_polls: 10,
            alarm_high_c: 75,
            alarm_low_c: -10,
        }
    }
}

impl ThermometerConfig {
    /// Time to wait between starting a conversion and reading it (ms)
    pub const fn conversion_time_ms(&self) -> u32 {
        self.resolution.conversion_time_ms()
    }
}

/// Radio transceiver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RadioConfig {
    /// 7-bit I2C address of the transceiver
    pub i2c_address: u8,
    /// I2C clock for register programming (Hz)
    pub bus_frequency_hz: u32,
    /// Frequency set after initialization (kHz)
    pub frequency_khz: u32,
    /// Enable squelch after initialization
    pub squelch: bool,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            i2c_address: 0x71,
            bus_frequency_hz: 100_000,
            frequency_khz: 144_930,
            squelch: false,
        }
    }
}

/// Complete station configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationConfig {
    /// Station label reported in logs
    pub label: String<MAX_LABEL_LEN>,
    /// One-Wire bus timing
    pub onewire: OneWireTiming,
    /// Bus scheduler settings
    pub scheduler: SchedulerConfig,
    /// Register command queue settings
    pub command_queue: CommandQueueConfig,
    /// Thermometer settings
    pub thermometer: ThermometerConfig,
    /// Radio settings
    pub radio: RadioConfig,
    /// Interval between temperature measurements (s)
    pub measurement_interval_s: u32,
    /// Heartbeat LED toggle period (ms)
    pub heartbeat_ms: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        let mut label = String::new();
        let _ = label.push_str("wxstation");
        Self {
            label,
            onewire: OneWireTiming::default(),
            scheduler: SchedulerConfig::default(),
            command_queue: CommandQueueConfig::default(),
            thermometer: ThermometerConfig::default(),
            radio: RadioConfig::default(),
            measurement_interval_s: 60,
            heartbeat_ms: 500,
        }
    }
}
