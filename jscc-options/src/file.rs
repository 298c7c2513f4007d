use std::path::{Path, PathBuf};

use crate::{CompilerOptions, Error, Result};

/// Serialization format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// Pick the format from a file extension (TOML when there is none).
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            None | Some("toml") => Ok(Format::Toml),
            Some("json") => Ok(Format::Json),
            Some(other) => Err(Box::new(Error::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: other.to_string(),
            })),
        }
    }
}

/// Represents a config file with both raw content and parsed options.
pub struct ConfigFile {
    path: PathBuf,
    content: String,
    format: Format,
    options: CompilerOptions,
}

impl ConfigFile {
    /// Open, parse and validate a config file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let format = Format::from_path(&path)?;
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(Error::Io {
                path: path.clone(),
                source: e,
            })
        })?;
        let filename = path.display().to_string();
        let options = match format {
            Format::Toml => crate::parse_str_with_filename(&content, &filename)?,
            Format::Json => crate::parse_json_str_with_filename(&content, &filename)?,
        };

        Ok(Self {
            path,
            content,
            format,
            options,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the raw content.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Get the parsed options.
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Take the parsed options.
    pub fn into_options(self) -> CompilerOptions {
        self.options
    }
}
