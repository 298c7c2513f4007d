//! Core types for jscc.
//!
//! This crate provides the file model shared by the compiler stage and its
//! callers, plus the content fingerprint helpers.

mod file;
mod fingerprint;

// File model
pub use file::{Contents, InputFile, OutputArtifact, relative_path};
// Fingerprinting
pub use fingerprint::{HASH_LEN, content_hash, rev_path};
