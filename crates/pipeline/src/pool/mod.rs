//! Worker pools and their scheduling loops.
//!
//! Split into focused submodules:
//! - `core`: WorkerPool struct, validation, start-up and accessors
//! - `scheduling`: round-robin and fastest-available scheduler loops

mod core;
mod scheduling;
#[cfg(test)]
mod tests;

pub use self::core::{WorkerPool, WorkerStats};
pub use self::scheduling::select_fastest_available;
