//! wxstation Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs. The bus schedulers in `wxstation-core` are written
//! purely against these traits, so their timing behavior can be verified on
//! the host with recording fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (wxstation-firmware)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  wxstation-core / wxstation-drivers     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  wxstation-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ wxstation-hal-│
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::BusLine`] - Open-drain single-wire bus line
//! - [`timer::OneShotTimer`] - Interrupt-raising one-shot countdown
//! - [`register::I2cBus`] - Blocking I2C master
//! - [`register::RegisterBus`] - 16-bit word register access

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod register;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use gpio::BusLine;
pub use register::{I2cBus, I2cRegisterBus, I2cRegisterError, RegisterBus};
pub use timer::OneShotTimer;
