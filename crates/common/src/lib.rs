//! Shared types used across the orrery crates.

mod color;
mod types;

pub use color::{Color, ColorError};
pub use types::{NodeHandle, Transform};
