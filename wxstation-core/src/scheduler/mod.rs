//! Timed action scheduler
//!
//! Bounded FIFO of bus actions serviced one per timer expiry.

pub mod action;
pub mod executor;

pub use action::{ActionKind, ActionSink, Completion, TimedAction};
pub use executor::Scheduler;
