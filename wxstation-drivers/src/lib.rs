//! Bus device drivers
//!
//! This crate provides device sessions built on the schedulers in
//! wxstation-core:
//!
//! - DS18B20 One-Wire thermometer
//! - RDA1846 radio transceiver (queued I2C register programming)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod ds18b20;
pub mod rda1846;

pub use ds18b20::{Ds18b20, Ds18b20Token, Reading};
pub use rda1846::{ClockMode, RadioEvent, RadioMode, RadioStage, Rda1846};
