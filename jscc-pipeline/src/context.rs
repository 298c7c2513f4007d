//! Compilation context passed through pipeline phases.

use std::path::{Path, PathBuf};

use jscc_core::{InputFile, OutputArtifact};
use jscc_options::{CompilerOptions, OutputTarget};
use tempfile::TempDir;

use crate::{
    Error, Result,
    diagnostic::{Diagnostic, Severity},
    executor::ProcessInvocation,
};

/// Where the compiler was told to write its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLayout {
    /// One compiled file and optionally its source map.
    File {
        compiled: PathBuf,
        source_map: Option<PathBuf>,
    },
    /// Module chunks written below `prefix`; each map sits next to its
    /// chunk as `<chunk name>.map`.
    Modules { prefix: String, source_maps: bool },
}

/// Result of running the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    /// The compiler printed diagnostics that were allowed through.
    Warning(String),
}

/// State of one batch as it moves through the phases.
///
/// The context owns the batch's private temporary directory; dropping it
/// removes the flag file and every compiler output, whichever way the
/// batch ended.
#[derive(Debug)]
pub struct CompilationContext {
    pub options: CompilerOptions,
    pub target: OutputTarget,
    /// The batch, in arrival order.
    pub files: Vec<InputFile>,
    /// Flag file path (populated by MarshalPhase).
    pub flag_file: Option<PathBuf>,
    /// Compiler call (populated by MarshalPhase).
    pub invocation: Option<ProcessInvocation>,
    /// Designated output paths (populated by MarshalPhase).
    pub layout: Option<OutputLayout>,
    /// Compiler outcome (populated by InvokePhase).
    pub outcome: Option<Outcome>,
    /// Artifacts in emission order (populated by MaterializePhase).
    pub artifacts: Vec<OutputArtifact>,
    pub diagnostics: Vec<Diagnostic>,
    workdir: TempDir,
}

impl CompilationContext {
    /// Create a context and acquire a fresh temporary directory for it.
    pub fn new(
        options: CompilerOptions,
        target: OutputTarget,
        files: Vec<InputFile>,
    ) -> Result<Self> {
        let workdir = tempfile::Builder::new()
            .prefix("jscc-")
            .tempdir()
            .map_err(|e| Error::workspace("failed to create temporary directory", e))?;

        Ok(Self {
            options,
            target,
            files,
            flag_file: None,
            invocation: None,
            layout: None,
            outcome: None,
            artifacts: Vec::new(),
            diagnostics: Vec::new(),
            workdir,
        })
    }

    /// The batch's private temporary directory.
    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_warning())
            .count()
    }

    pub fn add_warning(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(phase, message));
    }

    pub fn add_info(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::info(phase, message));
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }
}
