//! Pipeline phase trait.

use crate::{CompilationContext, Result};

/// A phase in the compilation pipeline.
///
/// Phases run in order on a shared [`CompilationContext`]:
/// - `MarshalPhase` - writes the flag file and builds the invocation
/// - `InvokePhase` - runs the compiler and classifies its output
/// - `MaterializePhase` - reads the outputs back as artifacts
pub trait Phase {
    /// The name of this phase (used in diagnostics and logs).
    fn name(&self) -> &'static str;

    /// A human-readable description of what this phase does.
    fn description(&self) -> &'static str;

    /// Run this phase on the compilation context.
    ///
    /// # Errors
    ///
    /// Returns an error if the phase fails fatally. Non-fatal issues are
    /// recorded as diagnostics instead.
    fn run(&self, ctx: &mut CompilationContext) -> Result<()>;
}
