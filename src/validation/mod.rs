//! Fix validation

pub mod validator;

pub use validator::{assess, validate, RejectReason, Region, ValidationConfig};
