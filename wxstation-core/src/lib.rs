//! Board-agnostic core logic for the weather station firmware
//!
//! This crate contains all bus logic that does not depend on specific
//! hardware implementations:
//!
//! - Timed action scheduler driven by a one-shot timer interrupt
//! - One-Wire protocol encoder and CRC-8
//! - Queued register command programming
//! - Device session state machine and scratchpad buffer
//! - Sensor traits
//! - Configuration type definitions
//! - Logging macros
//!
//! # Interrupt model
//!
//! ```text
//! task ──enqueue──► Scheduler / CommandQueue ◄──on_timer_expiry── timer ISR
//!                                                   │
//!                                                   ▼
//!                                     Completion / CommandEvent ──► session
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod fmt;

pub mod command;
pub mod config;
pub mod onewire;
pub mod scheduler;
pub mod session;
pub mod traits;
