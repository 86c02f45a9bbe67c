//! Configuration types
//!
//! Board-agnostic configuration structures. Every type has a `Default`
//! matching the stock bring-up and optional `serde` derives.

pub mod timing;
pub mod types;

pub use timing::*;
pub use types::*;
