//! Stage orchestrator.

use jscc_core::{InputFile, OutputArtifact};
use jscc_options::{CompilerOptions, OutputTarget};

use crate::{
    Accumulator, CompilationContext, Error, Phase, Result,
    diagnostic::Diagnostic,
    executor::{Executor, ProcessInvocation, SystemExecutor},
    phases::{InvokePhase, MarshalPhase, MaterializePhase, flag_file_body},
};

/// One compiler run over one batch of files.
///
/// Files are pushed one at a time; [`Stage::finish`] compiles the batch
/// with a single compiler invocation and consumes the stage, so a new
/// stage is built for every run.
///
/// # Example
///
/// ```ignore
/// let mut stage = Stage::new(CompilerOptions::new("app.min.js"))?;
/// stage.push(InputFile::new(cwd, cwd.join("src/app.js"), source))?;
/// let compilation = stage.finish()?;
///
/// for artifact in &compilation.artifacts {
///     artifact.write(&dist)?;
/// }
/// ```
pub struct Stage<E = SystemExecutor> {
    options: CompilerOptions,
    target: OutputTarget,
    executor: E,
    accumulator: Accumulator,
}

/// Everything a finished batch produced.
#[derive(Debug, Default)]
pub struct Compilation {
    /// Artifacts in emission order: compiled output, then its source map.
    pub artifacts: Vec<OutputArtifact>,
    /// Non-fatal diagnostics, including compiler warnings.
    pub diagnostics: Vec<Diagnostic>,
    /// The compiler call, when one was made.
    pub invocation: Option<ProcessInvocation>,
}

impl Compilation {
    pub fn into_artifacts(self) -> Vec<OutputArtifact> {
        self.artifacts
    }
}

/// The marshaled call for a batch, without running it.
#[derive(Debug)]
pub struct Preview {
    pub invocation: ProcessInvocation,
    /// Contents the flag file would have.
    pub flag_file: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Stage<SystemExecutor> {
    /// Create a stage that runs the real compiler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfiguration`] when the options name neither
    /// an output file nor a module output.
    pub fn new(options: CompilerOptions) -> Result<Self> {
        Self::with_executor(options, SystemExecutor)
    }
}

impl<E: Executor> Stage<E> {
    /// Create a stage that runs the compiler through `executor`.
    ///
    /// # Errors
    ///
    /// Fails like [`Stage::new`], and with [`Error::InvalidOptions`] when the
    /// output name would leave the output directory.
    pub fn with_executor(options: CompilerOptions, executor: E) -> Result<Self> {
        let target = options.validate()?;

        Ok(Self {
            options,
            target,
            executor,
            accumulator: Accumulator::new(),
        })
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Number of files accepted so far.
    pub fn len(&self) -> usize {
        self.accumulator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulator.is_empty()
    }

    /// Accept the next input file.
    pub fn push(&mut self, file: InputFile) -> Result<()> {
        self.accumulator.push(file)
    }

    /// Push every file, then finish.
    pub fn run(mut self, files: impl IntoIterator<Item = InputFile>) -> Result<Compilation> {
        for file in files {
            self.push(file)?;
        }
        self.finish()
    }

    /// Compile the batch.
    ///
    /// An empty batch completes immediately without running the compiler.
    pub fn finish(self) -> Result<Compilation> {
        let Stage {
            options,
            target,
            executor,
            accumulator,
        } = self;

        let files = accumulator.finish()?;
        if files.is_empty() {
            tracing::debug!("empty batch, nothing to compile");
            return Ok(Compilation::default());
        }

        let mut ctx = CompilationContext::new(options, target, files)?;
        let phases: Vec<Box<dyn Phase + '_>> = vec![
            Box::new(MarshalPhase),
            Box::new(InvokePhase::new(&executor)),
            Box::new(MaterializePhase),
        ];
        for phase in &phases {
            run_phase(phase.as_ref(), &mut ctx)?;
        }

        Ok(Compilation {
            artifacts: std::mem::take(&mut ctx.artifacts),
            diagnostics: std::mem::take(&mut ctx.diagnostics),
            invocation: ctx.invocation.take(),
        })
    }

    /// Marshal the batch without running the compiler.
    ///
    /// Returns `None` for an empty batch.
    pub fn preview(self) -> Result<Option<Preview>> {
        let files = self.accumulator.finish()?;
        if files.is_empty() {
            return Ok(None);
        }

        let mut ctx = CompilationContext::new(self.options, self.target, files)?;
        run_phase(&MarshalPhase, &mut ctx)?;

        let Some(invocation) = ctx.invocation.take() else {
            return Err(Error::compiler("no compiler invocation was marshaled"));
        };
        Ok(Some(Preview {
            invocation,
            flag_file: flag_file_body(&ctx.files),
            diagnostics: std::mem::take(&mut ctx.diagnostics),
        }))
    }
}

fn run_phase(phase: &dyn Phase, ctx: &mut CompilationContext) -> Result<()> {
    let span = tracing::debug_span!("phase", name = phase.name());
    let _guard = span.enter();

    tracing::debug!(description = phase.description(), "running phase");
    phase.run(ctx)
}
