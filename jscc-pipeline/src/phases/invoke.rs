//! Invoke phase - runs the compiler once and triages its output.

use crate::{
    CompilationContext, Error, Phase, Result,
    context::Outcome,
    executor::{Executor, ProcessOutput},
};

/// Phase that hands the marshaled invocation to an [`Executor`].
pub struct InvokePhase<'a> {
    executor: &'a dyn Executor,
}

impl<'a> InvokePhase<'a> {
    pub fn new(executor: &'a dyn Executor) -> Self {
        Self { executor }
    }
}

impl Phase for InvokePhase<'_> {
    fn name(&self) -> &'static str {
        "invoke"
    }

    fn description(&self) -> &'static str {
        "Run the compiler and classify its diagnostics"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let Some(invocation) = &ctx.invocation else {
            return Err(Error::compiler("no compiler invocation was marshaled"));
        };

        let output = self.executor.execute(invocation)?;
        if !output.stdout.trim().is_empty() {
            tracing::debug!(stdout = %output.stdout.trim_end(), "compiler stdout");
        }

        let outcome = classify(output, ctx.options.continue_with_warnings)?;
        if let Outcome::Warning(text) = &outcome {
            tracing::warn!("{}", text);
            ctx.add_warning(self.name(), text.clone());
        }
        ctx.outcome = Some(outcome);
        Ok(())
    }
}

/// Decide whether a finished compiler run may proceed.
///
/// A failed exit status is always fatal. Output on stderr is fatal unless
/// `continue_with_warnings` is set, in which case it becomes a warning.
pub fn classify(output: ProcessOutput, continue_with_warnings: bool) -> Result<Outcome> {
    let stderr = output.stderr.trim_end();

    if !output.success() {
        let message = if stderr.is_empty() {
            match output.code {
                Some(code) => format!("compiler exited with status {}", code),
                None => "compiler was terminated by a signal".to_string(),
            }
        } else {
            stderr.to_string()
        };
        return Err(Error::compiler(message));
    }

    if stderr.is_empty() {
        Ok(Outcome::Clean)
    } else if continue_with_warnings {
        Ok(Outcome::Warning(stderr.to_string()))
    } else {
        Err(Error::compiler(stderr))
    }
}
