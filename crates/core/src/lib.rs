pub mod config;
pub mod error;
pub mod item;

pub use error::*;
pub use item::*;
