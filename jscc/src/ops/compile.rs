//! Compile operation - reads inputs, runs one stage, writes artifacts.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use eyre::{Context, Result};
use jscc_core::{Contents, InputFile};
use jscc_options::CompilerOptions;
use jscc_pipeline::{Executor, Stage, phases::FLAG_FILE_NAME};

use crate::reports::{CompileReport, CompileResult, PreviewResult, WrittenFile, WrittenResult};

/// What to compile and where to put it.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// Working directory; also the base of every input.
    pub cwd: PathBuf,
    /// Paths or glob patterns, relative to `cwd` unless absolute.
    pub inputs: Vec<String>,
    pub output: PathBuf,
    pub dry_run: bool,
}

/// Execute the compile operation with the system compiler.
pub fn compile(options: CompilerOptions, request: &CompileRequest) -> Result<CompileReport> {
    let stage = Stage::new(options).wrap_err("Invalid compiler options")?;
    compile_with(stage, request)
}

/// Execute the compile operation on an existing stage.
pub fn compile_with<E: Executor>(mut stage: Stage<E>, request: &CompileRequest) -> Result<CompileReport> {
    let files = read_inputs(&request.cwd, &request.inputs)?;
    let input_count = files.len();
    for file in files {
        stage.push(file)?;
    }

    if request.dry_run {
        let result = match stage.preview()? {
            Some(preview) => CompileResult::Preview(PreviewResult {
                command_line: preview.invocation.command_line(),
                flag_file_name: FLAG_FILE_NAME.to_string(),
                flag_file: preview.flag_file,
            }),
            None => CompileResult::Empty,
        };
        return Ok(CompileReport {
            input_count,
            warnings: Vec::new(),
            result,
        });
    }

    let compilation = stage.finish().wrap_err("Compilation failed")?;
    let warnings = compilation
        .diagnostics
        .iter()
        .filter(|d| d.severity.is_warning())
        .map(|d| d.message.clone())
        .collect();

    if compilation.artifacts.is_empty() {
        return Ok(CompileReport {
            input_count,
            warnings,
            result: CompileResult::Empty,
        });
    }

    let mut files = Vec::new();
    for artifact in &compilation.artifacts {
        let path = artifact.write(&request.output)?;
        files.push(WrittenFile {
            path,
            bytes: artifact.contents.len(),
        });
    }

    Ok(CompileReport {
        input_count,
        warnings,
        result: CompileResult::Written(WrittenResult {
            output_dir: request.output.clone(),
            files,
        }),
    })
}

/// Expand `inputs` in order and read each match.
///
/// Directories become empty files so the stage skips them. A path matched
/// by more than one input is read once, at its first position.
fn read_inputs(cwd: &Path, inputs: &[String]) -> Result<Vec<InputFile>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for input in inputs {
        for path in resolve_input(cwd, input)? {
            if !seen.insert(path.clone()) {
                continue;
            }
            let contents = if path.is_dir() {
                Contents::Null
            } else {
                fs::read(&path)
                    .wrap_err_with(|| format!("Failed to read '{}'", path.display()))?
                    .into()
            };
            files.push(InputFile::new(cwd, path, contents));
        }
    }

    Ok(files)
}

fn resolve_input(cwd: &Path, input: &str) -> Result<Vec<PathBuf>> {
    let path = cwd.join(input);
    if !is_glob(input) {
        return Ok(vec![path]);
    }

    let pattern = path.display().to_string();
    let mut paths = Vec::new();
    for entry in glob::glob(&pattern).wrap_err_with(|| format!("Invalid pattern '{}'", input))? {
        paths.push(entry.wrap_err_with(|| format!("Failed to expand '{}'", input))?);
    }
    if paths.is_empty() {
        tracing::warn!(pattern = input, "input pattern matched no files");
    }
    Ok(paths)
}

fn is_glob(input: &str) -> bool {
    input.contains(['*', '?', '['])
}
