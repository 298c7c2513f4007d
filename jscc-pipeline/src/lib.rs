//! Batch compilation stage for an external Closure-style compiler.
//!
//! A [`Stage`] accepts input files one at a time, then compiles the whole
//! batch with a single compiler process and returns the outputs as
//! [`OutputArtifact`](jscc_core::OutputArtifact)s.
//!
//! # Module Organization
//!
//! - [`executor`] - Process seam ([`Executor`], [`SystemExecutor`])
//! - [`phases`] - Marshal, invoke and materialize phases
//!
//! # Example
//!
//! ```ignore
//! use jscc_options::CompilerOptions;
//! use jscc_pipeline::Stage;
//!
//! let options = CompilerOptions::new("app.min.js").with_source_map(true);
//! let compilation = Stage::new(options)?.run(files)?;
//!
//! for diagnostic in &compilation.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! ```

mod accumulator;
mod context;
mod diagnostic;
mod error;
pub mod executor;
mod phase;
pub mod phases;
mod runner;

pub use accumulator::Accumulator;
pub use context::{CompilationContext, Outcome, OutputLayout};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{Error, Result};
pub use executor::{ExecError, Executor, ProcessInvocation, ProcessOutput, SystemExecutor};
pub use phase::Phase;
pub use runner::{Compilation, Preview, Stage};
