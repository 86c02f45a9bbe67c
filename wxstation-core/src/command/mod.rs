//! Register command queue

pub mod queue;

pub use queue::{Command, CommandEvent, CommandQueue, UNMASKED};
