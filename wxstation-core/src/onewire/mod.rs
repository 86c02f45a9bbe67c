//! One-Wire bus protocol
//!
//! Encodes reset, bit and byte primitives as timed actions for the
//! [`Scheduler`](crate::scheduler::Scheduler), plus the protocol's CRC-8
//! and command bytes.

pub mod commands;
pub mod crc;
pub mod encoder;

pub use crc::{check_crc8, crc8, crc8_update};
pub use encoder::{
    Encoder, READ_BIT_ACTIONS, READ_BYTE_ACTIONS, RESET_ACTIONS, WAIT_ACTIONS,
    WRITE_BIT_ACTIONS, WRITE_BYTE_ACTIONS,
};
