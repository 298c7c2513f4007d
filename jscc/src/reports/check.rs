//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from config validation.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the config file.
    pub config_path: PathBuf,
    /// Output file name or module prefix.
    pub output: String,
    /// How the compiler will be launched.
    pub compiler: String,
    /// Flags as they will be passed, externs unexpanded.
    pub flags: Vec<String>,
    pub source_map: bool,
    pub fingerprint: bool,
    /// Warning messages.
    pub warnings: Vec<String>,
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }
        if !self.warnings.is_empty() {
            out.newline();
        }

        out.preformatted(&format!("✓ {} is valid", self.config_path.display()));
        out.newline();

        out.key_value("Output", &self.output);
        out.key_value("Compiler", &self.compiler);
        out.key_value("Source map", yes_no(self.source_map));
        out.key_value("Fingerprint", yes_no(self.fingerprint));

        if !self.flags.is_empty() {
            out.newline();
            out.section(&format!("Flags ({})", self.flags.len()));
            for flag in &self.flags {
                out.list_item(flag);
            }
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
