//! Core types and constants for the location core

pub mod constants;
pub mod types;

pub use constants::*;
pub use types::*;
