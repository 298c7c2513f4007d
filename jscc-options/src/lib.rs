// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod file;
mod flags;
mod options;

use std::path::Path;

pub use error::{Error, Result};
pub use file::{ConfigFile, Format};
pub use flags::{
    CompilerFlags, EXTERNS, Flag, FlagValue, MODULE, MODULE_OUTPUT_PATH_PREFIX, Scalar,
};
pub use options::{CompilerOptions, DEFAULT_MAX_BUFFER, OutputTarget};

/// Parse a config file from the given path
pub fn parse_file(path: impl AsRef<Path>) -> Result<CompilerOptions> {
    ConfigFile::open(path).map(ConfigFile::into_options)
}

/// Parse TOML options from a string (uses "jscc.toml" as default filename)
pub fn parse_str(content: &str) -> Result<CompilerOptions> {
    parse_str_with_filename(content, "jscc.toml")
}

/// Parse TOML options from a string with a custom filename for error reporting
pub fn parse_str_with_filename(content: &str, filename: &str) -> Result<CompilerOptions> {
    let options: CompilerOptions =
        toml::from_str(content).map_err(|e| Error::parse(e, content, filename))?;

    options.validate()?;
    Ok(options)
}

/// Parse JSON options from a string with a custom filename for error reporting
pub fn parse_json_str_with_filename(content: &str, filename: &str) -> Result<CompilerOptions> {
    let options: CompilerOptions =
        serde_json::from_str(content).map_err(|e| Error::json(e, content, filename))?;

    options.validate()?;
    Ok(options)
}
