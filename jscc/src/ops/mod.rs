//! Core operations.
//!
//! This module contains the business logic for jscc commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod compile;

pub use check::check;
pub use compile::{CompileRequest, compile};
