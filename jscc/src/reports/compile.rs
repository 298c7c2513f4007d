//! Compile command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from a compile run.
#[derive(Debug)]
pub struct CompileReport {
    /// Number of inputs read, directories included.
    pub input_count: usize,
    /// Warnings from the compiler and from argument marshaling.
    pub warnings: Vec<String>,
    pub result: CompileResult,
}

/// Result of a compile run.
#[derive(Debug)]
pub enum CompileResult {
    /// Artifacts were written to disk.
    Written(WrittenResult),
    /// Dry-run preview.
    Preview(PreviewResult),
    /// Nothing to compile.
    Empty,
}

/// Result when artifacts were written to disk.
#[derive(Debug)]
pub struct WrittenResult {
    pub output_dir: PathBuf,
    pub files: Vec<WrittenFile>,
}

#[derive(Debug)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Result of a dry run.
#[derive(Debug)]
pub struct PreviewResult {
    /// The compiler call as a single line.
    pub command_line: String,
    pub flag_file_name: String,
    pub flag_file: String,
}

impl Report for CompileReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }

        match &self.result {
            CompileResult::Written(written) => self.render_written(out, written),
            CompileResult::Preview(preview) => render_preview(out, preview),
            CompileResult::Empty => out.preformatted("No input files to compile"),
        }
    }
}

impl CompileReport {
    fn render_written(&self, out: &mut dyn Output, written: &WrittenResult) {
        out.preformatted(&format!(
            "Compiled {} file{} into {}",
            self.input_count,
            if self.input_count == 1 { "" } else { "s" },
            written.output_dir.display()
        ));
        out.newline();

        out.section("Written");
        for file in &written.files {
            out.added_item(&format!("{} ({} bytes)", file.path.display(), file.bytes));
        }
    }
}

fn render_preview(out: &mut dyn Output, preview: &PreviewResult) {
    out.key_value("Command", &preview.command_line);
    out.newline();
    out.divider(&preview.flag_file_name);
    out.preformatted(&preview.flag_file);
}
