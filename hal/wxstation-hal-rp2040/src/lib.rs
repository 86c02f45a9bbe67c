//! RP2040-specific HAL for the wxstation firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `wxstation-hal` traits:
//!
//! - [`FlexBusLine`]: open-drain bus line on a `Flex` GPIO
//! - [`AlarmTimer`]: one-shot microsecond countdown on a TIMER alarm
//! - [`HalI2c`]: `I2cBus` over any embedded-hal 1.0 I2C master
//!
//! TIMER alarm 0 belongs to the embassy time driver; bus schedulers use
//! alarms 1 to 3.

#![no_std]

pub mod alarm;
pub mod bus_line;
pub mod i2c;

pub use alarm::{AlarmTimer, TimerAlarm};
pub use bus_line::FlexBusLine;
pub use i2c::HalI2c;

// Re-export shared traits from wxstation-hal for convenience
pub use wxstation_hal::{BusLine, I2cBus, OneShotTimer};
