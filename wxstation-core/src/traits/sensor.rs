//! Temperature sensor traits

use crate::session::SessionFault;

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// No device answered the reset pulse
    NoDevice,
    /// Bus line held low
    BusStuckLow,
    /// Scratchpad failed its CRC check
    CrcMismatch,
    /// No measurement has completed yet
    NotReady,
}

impl From<SessionFault> for SensorError {
    fn from(fault: SessionFault) -> Self {
        match fault {
            SessionFault::NoDevice => SensorError::NoDevice,
            SessionFault::BusStuckLow => SensorError::BusStuckLow,
            SessionFault::CrcMismatch => SensorError::CrcMismatch,
        }
    }
}

/// Trait for temperature sensors
///
/// Bus sensors measure asynchronously; these methods report the most
/// recent completed measurement.
pub trait TemperatureSensor {
    /// Latest temperature with 0.1°C resolution
    ///
    /// For example, 20.6°C is returned as 206.
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError>;

    /// Latest temperature in whole degrees Celsius
    fn read_celsius(&mut self) -> Result<i16, SensorError> {
        self.read_celsius_x10().map(|t| t / 10)
    }

    /// Check if the latest reading is valid
    fn is_valid(&mut self) -> bool {
        self.read_celsius_x10().is_ok()
    }
}
