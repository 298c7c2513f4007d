use std::{
    path::{Component, Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;

use crate::{CompilerFlags, EXTERNS, Error, FlagValue, MODULE_OUTPUT_PATH_PREFIX, Result};

/// Default capture ceiling for compiler output, in KiB.
pub const DEFAULT_MAX_BUFFER: u64 = 1000;

/// Options for one compiler run.
///
/// Config files use the camelCase field names, e.g.
///
/// ```toml
/// fileName = "app.min.js"
/// compilerPath = "vendor/compiler.jar"
/// createSourceMap = true
///
/// [compilerFlags]
/// compilation_level = "ADVANCED"
/// externs = ["externs/*.js"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompilerOptions {
    /// Name of the compiled output file.
    pub file_name: Option<String>,
    /// Path to a compiler jar. Without it `closure-compiler` is run from the PATH.
    pub compiler_path: Option<PathBuf>,
    /// Flags passed to the compiler.
    #[serde(default)]
    pub compiler_flags: CompilerFlags,
    /// Flags placed before everything else, typically JVM options.
    #[serde(default)]
    pub java_flags: Vec<String>,
    /// Capture ceiling for stdout and stderr, in KiB.
    #[serde(default = "default_max_buffer")]
    pub max_buffer: u64,
    /// Keep going when the compiler prints diagnostics.
    #[serde(default)]
    pub continue_with_warnings: bool,
    /// Emit a source map next to the compiled file.
    #[serde(default)]
    pub create_source_map: bool,
    /// Embed a content hash in the output file names.
    #[serde(default)]
    pub fingerprint: bool,
    /// Enable the JVM's tiered compilation when running a jar.
    #[serde(default)]
    pub tiered_compilation: bool,
}

fn default_max_buffer() -> u64 {
    DEFAULT_MAX_BUFFER
}

/// Where the compiler writes its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// A single output file named by `fileName`.
    File(String),
    /// Several chunks written below a path prefix.
    Modules { prefix: String },
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            file_name: None,
            compiler_path: None,
            compiler_flags: CompilerFlags::default(),
            java_flags: Vec::new(),
            max_buffer: DEFAULT_MAX_BUFFER,
            continue_with_warnings: false,
            create_source_map: false,
            fingerprint: false,
            tiered_compilation: false,
        }
    }
}

impl CompilerOptions {
    /// Create options producing a single output file.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            ..Self::default()
        }
    }

    pub fn with_compiler_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.compiler_path = Some(path.into());
        self
    }

    /// Add a compiler flag, replacing any previous value.
    ///
    /// Values given for `externs` are appended as glob patterns, as with
    /// [`with_externs`](Self::with_externs); a switch adds none.
    pub fn with_flag(mut self, name: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        let name = name.into();
        let value = value.into();
        if name == EXTERNS {
            self.compiler_flags
                .add_externs(value.values().into_iter().flatten());
        } else {
            self.compiler_flags.set(name, value);
        }
        self
    }

    pub fn with_externs<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compiler_flags.add_externs(patterns);
        self
    }

    pub fn with_java_flag(mut self, flag: impl Into<String>) -> Self {
        self.java_flags.push(flag.into());
        self
    }

    pub fn with_max_buffer(mut self, kib: u64) -> Self {
        self.max_buffer = kib;
        self
    }

    pub fn with_continue_with_warnings(mut self, enabled: bool) -> Self {
        self.continue_with_warnings = enabled;
        self
    }

    pub fn with_source_map(mut self, enabled: bool) -> Self {
        self.create_source_map = enabled;
        self
    }

    pub fn with_fingerprint(mut self, enabled: bool) -> Self {
        self.fingerprint = enabled;
        self
    }

    pub fn with_tiered_compilation(mut self, enabled: bool) -> Self {
        self.tiered_compilation = enabled;
        self
    }

    /// Capture ceiling in bytes.
    pub fn capture_limit_bytes(&self) -> u64 {
        self.max_buffer.saturating_mul(1024)
    }

    /// Resolve where the compiler output goes.
    ///
    /// Module-output mode wins when both module flags are declared; otherwise
    /// `fileName` is required.
    pub fn output_target(&self) -> Option<OutputTarget> {
        if self.compiler_flags.is_module_mode() {
            let prefix = self.compiler_flags.module_output_prefix().unwrap_or_default();
            return Some(OutputTarget::Modules { prefix });
        }
        self.file_name
            .as_ref()
            .filter(|name| !name.is_empty())
            .map(|name| OutputTarget::File(name.clone()))
    }

    /// Check that an output identity can be derived and stays inside the
    /// output directory.
    pub fn validate(&self) -> Result<OutputTarget> {
        let target = self
            .output_target()
            .ok_or_else(|| Box::new(Error::MissingConfiguration))?;
        match &target {
            OutputTarget::File(name) => check_output_path("fileName", name)?,
            OutputTarget::Modules { prefix } => {
                check_output_path(MODULE_OUTPUT_PATH_PREFIX, prefix)?
            }
        }
        Ok(target)
    }
}

/// Output names must be relative and free of `..`.
fn check_output_path(option: &'static str, value: &str) -> Result<()> {
    let escapes = Path::new(value).components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(Box::new(Error::UnsafeOutputPath {
            option,
            value: value.to_string(),
        }));
    }
    Ok(())
}

impl FromStr for CompilerOptions {
    type Err = Box<Error>;

    /// Parse and validate options from TOML.
    fn from_str(s: &str) -> Result<Self> {
        crate::parse_str(s)
    }
}
