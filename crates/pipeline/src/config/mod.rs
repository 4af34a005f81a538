//! Queue sizing and scheduler tuning for pipelines.
//!
//! Parsed from TOML with `BREWLINE_*` environment variable overrides.

mod loading;
mod types;
mod validation;


pub use types::*;
