//! Device sessions
//!
//! Multi-step device interactions composed from One-Wire primitives.

pub mod events;
pub mod machine;
pub mod scratchpad;

pub use events::SessionEvent;
pub use machine::{SessionError, SessionFault, SessionState};
pub use scratchpad::{Scratchpad, DS18B20_SCRATCHPAD_LEN};
