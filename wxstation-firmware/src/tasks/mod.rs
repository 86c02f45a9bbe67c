//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod heartbeat;
pub mod measure;

pub use heartbeat::heartbeat_task;
pub use measure::{measure_task, MeasureConfig};
