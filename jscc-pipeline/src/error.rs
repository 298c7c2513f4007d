use std::{io, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::executor::ExecError;

/// Result type for jscc-pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("missing fileName option")]
    #[diagnostic(
        code(jscc::missing_configuration),
        help(
            "set `fileName`, or declare both `module` and `module_output_path_prefix` in `compilerFlags`"
        )
    )]
    MissingConfiguration,

    #[error("invalid compiler options")]
    #[diagnostic(code(jscc::invalid_options))]
    InvalidOptions {
        #[source]
        source: Box<jscc_options::Error>,
    },

    #[error("streaming not supported for '{path}'")]
    #[diagnostic(
        code(jscc::streaming_unsupported),
        help("buffer file contents before handing them to the compiler")
    )]
    StreamingUnsupported { path: PathBuf },

    #[error("compiler invocation failed: {message}")]
    #[diagnostic(code(jscc::compiler_failed))]
    CompilerInvocationFailed {
        message: String,
        #[source]
        source: Option<ExecError>,
    },

    #[error("failed to read compiler output '{path}'")]
    #[diagnostic(
        code(jscc::artifact_read_failed),
        help("the compiler reported success but did not write this file")
    )]
    ArtifactReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid externs pattern '{pattern}'")]
    #[diagnostic(code(jscc::invalid_glob))]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("{context}")]
    #[diagnostic(code(jscc::workspace))]
    Workspace {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// The compiler printed diagnostics or exited unsuccessfully.
    pub fn compiler(message: impl Into<String>) -> Self {
        Error::CompilerInvocationFailed {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn workspace(context: impl Into<String>, source: io::Error) -> Self {
        Error::Workspace {
            context: context.into(),
            source,
        }
    }
}

impl From<ExecError> for Error {
    fn from(err: ExecError) -> Self {
        Error::CompilerInvocationFailed {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<Box<jscc_options::Error>> for Error {
    fn from(err: Box<jscc_options::Error>) -> Self {
        if matches!(*err, jscc_options::Error::MissingConfiguration) {
            Error::MissingConfiguration
        } else {
            Error::InvalidOptions { source: err }
        }
    }
}
