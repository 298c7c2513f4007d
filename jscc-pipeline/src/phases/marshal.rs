//! Marshal phase - turns options and the batch into a compiler call.

use std::path::{Path, PathBuf};

use jscc_core::InputFile;
use jscc_options::{CompilerFlags, Flag, MODULE_OUTPUT_PATH_PREFIX, OutputTarget};

use crate::{
    CompilationContext, Error, Phase, Result,
    context::OutputLayout,
    diagnostic::Diagnostic,
    executor::ProcessInvocation,
};

/// Executable used when a compiler jar is configured.
pub const JAVA: &str = "java";
/// Executable used when no compiler jar is configured.
pub const COMPILER: &str = "closure-compiler";
/// Name of the flag file inside the work dir.
pub const FLAG_FILE_NAME: &str = "flagfile.txt";

const JS_OUTPUT_FILE: &str = "js_output_file";
const CREATE_SOURCE_MAP: &str = "create_source_map";
/// Per-chunk source map path in module-output mode.
pub const MODULE_MAP_PATTERN: &str = "%outname%.map";

/// Phase that writes the flag file and builds the [`ProcessInvocation`].
pub struct MarshalPhase;

impl Phase for MarshalPhase {
    fn name(&self) -> &'static str {
        "marshal"
    }

    fn description(&self) -> &'static str {
        "Write the flag file and build the compiler arguments"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let workdir = ctx.workdir().to_path_buf();
        let flag_file = write_flag_file(&workdir, &ctx.files)?;
        let layout = plan_layout(&ctx.target, &workdir, ctx.options.create_source_map)?;

        let options = &ctx.options;
        let mut args = options.java_flags.clone();

        // The input list goes through --flagfile so a large batch cannot
        // exceed the OS command-line length limit.
        let executable = match &options.compiler_path {
            Some(jar) => {
                args.push("-jar".to_string());
                args.push(tiered_compilation_flag(options.tiered_compilation).to_string());
                args.push(jar.display().to_string());
                JAVA
            }
            None => COMPILER,
        };
        args.push(build_flag("flagfile", Some(&quote(&flag_file))));

        let mut diagnostics = Vec::new();
        args.extend(flags_to_args(
            &options.compiler_flags,
            &layout,
            &mut diagnostics,
        )?);

        // Output always goes to a file; compiled code on stdout could blow
        // through the capture limit.
        match &layout {
            OutputLayout::File {
                compiled,
                source_map,
            } => {
                args.push(build_flag(JS_OUTPUT_FILE, Some(&quote(compiled))));
                if let Some(map) = source_map {
                    args.push(build_flag(CREATE_SOURCE_MAP, Some(&quote(map))));
                }
            }
            OutputLayout::Modules { source_maps, .. } => {
                // The compiler expands %outname% to the chunk's full output
                // path, so each map lands next to its chunk.
                if *source_maps {
                    let pattern = quote(Path::new(MODULE_MAP_PATTERN));
                    args.push(build_flag(CREATE_SOURCE_MAP, Some(&pattern)));
                }
            }
        }

        let invocation = ProcessInvocation {
            executable: executable.to_string(),
            args,
            capture_limit_bytes: options.capture_limit_bytes(),
        };
        tracing::debug!(
            files = ctx.files.len(),
            command = %invocation.command_line(),
            "marshaled compiler invocation"
        );

        ctx.diagnostics.extend(diagnostics);
        ctx.flag_file = Some(flag_file);
        ctx.layout = Some(layout);
        ctx.invocation = Some(invocation);
        Ok(())
    }
}

fn tiered_compilation_flag(enabled: bool) -> &'static str {
    if enabled {
        "-XX:+TieredCompilation"
    } else {
        "-XX:-TieredCompilation"
    }
}

/// Build a `--name` or `--name=value` token.
pub fn build_flag(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("--{}={}", name, value),
        None => format!("--{}", name),
    }
}

fn quote(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

/// Body of the flag file: one `--js` line per input, relative to its cwd.
pub fn flag_file_body(files: &[InputFile]) -> String {
    files
        .iter()
        .map(|file| format!("--js=\"{}\"", file.relative().display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the flag file into `dir`.
pub fn write_flag_file(dir: &Path, files: &[InputFile]) -> Result<PathBuf> {
    let path = dir.join(FLAG_FILE_NAME);
    std::fs::write(&path, flag_file_body(files))
        .map_err(|e| Error::workspace(format!("failed to write '{}'", path.display()), e))?;
    Ok(path)
}

/// Translate compiler flags into argument tokens, in declaration order.
///
/// `externs` patterns are expanded against the filesystem. A caller-set
/// `js_output_file` is dropped in single-file mode and the module output
/// prefix is moved into the work dir in module mode.
pub fn flags_to_args(
    flags: &CompilerFlags,
    layout: &OutputLayout,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<String>> {
    let mut args = Vec::new();

    for (name, flag) in flags.iter() {
        match flag {
            Flag::Externs(patterns) => {
                for pattern in patterns {
                    let matches = expand_glob(pattern)?;
                    if matches.is_empty() {
                        diagnostics.push(Diagnostic::warning(
                            "marshal",
                            format!("externs pattern '{}' matched no files", pattern),
                        ));
                    }
                    for path in matches {
                        args.push(build_flag(name, Some(&path.display().to_string())));
                    }
                }
            }
            Flag::Value(value) => match (name, layout) {
                (JS_OUTPUT_FILE, OutputLayout::File { .. }) => {
                    diagnostics.push(Diagnostic::warning(
                        "marshal",
                        "ignoring compilerFlags.js_output_file; use fileName instead",
                    ));
                }
                (MODULE_OUTPUT_PATH_PREFIX, OutputLayout::Modules { prefix, .. }) => {
                    args.push(build_flag(name, Some(&format!("\"{}\"", prefix))));
                }
                _ => {
                    for value in value.values() {
                        args.push(build_flag(name, value.as_deref()));
                    }
                }
            },
        }
    }

    Ok(args)
}

/// Resolve a glob pattern to matching paths, in the resolver's sorted order.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|source| Error::InvalidGlob {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(err) => {
                tracing::warn!(pattern, error = %err, "skipping unreadable externs match");
            }
        }
    }
    Ok(paths)
}

/// Decide the output paths inside `workdir` and create their directories.
pub fn plan_layout(target: &OutputTarget, workdir: &Path, source_map: bool) -> Result<OutputLayout> {
    match target {
        OutputTarget::File(name) => {
            let name = name.trim_start_matches('/');
            let compiled = workdir.join(name);
            if let Some(parent) = compiled.parent() {
                create_dir(parent)?;
            }
            let source_map = source_map.then(|| workdir.join(format!("{}.map", name)));
            Ok(OutputLayout::File {
                compiled,
                source_map,
            })
        }
        OutputTarget::Modules { prefix } => {
            let relative = prefix.trim_start_matches('/');
            let full = workdir.join(relative);
            let dir = if relative.is_empty() || relative.ends_with('/') {
                full.as_path()
            } else {
                full.parent().unwrap_or(workdir)
            };
            create_dir(dir)?;

            let mut prefix = full.display().to_string();
            if relative.is_empty() && !prefix.ends_with('/') {
                prefix.push('/');
            }
            Ok(OutputLayout::Modules {
                prefix,
                source_maps: source_map,
            })
        }
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| Error::workspace(format!("failed to create '{}'", dir.display()), e))
}
