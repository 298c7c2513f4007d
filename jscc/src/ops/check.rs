//! Check operation - config validation.

use jscc_options::{CompilerOptions, ConfigFile, Flag, OutputTarget};
use jscc_pipeline::phases::{COMPILER, JAVA, build_flag, expand_glob};

use crate::reports::CheckReport;

/// Execute the check operation.
///
/// The config was already validated while loading; this collects a summary
/// and warns about settings that will be ignored or match nothing.
pub fn check(config: &ConfigFile) -> CheckReport {
    let options = config.options();

    let output = match options.output_target() {
        Some(OutputTarget::File(name)) => name,
        Some(OutputTarget::Modules { prefix }) => format!("modules below '{}'", prefix),
        None => String::new(),
    };

    CheckReport {
        config_path: config.path().to_path_buf(),
        output,
        compiler: compiler_description(options),
        flags: flag_lines(options),
        source_map: options.create_source_map,
        fingerprint: options.fingerprint,
        warnings: warnings(options),
    }
}

fn compiler_description(options: &CompilerOptions) -> String {
    match &options.compiler_path {
        Some(jar) => format!("{} -jar {}", JAVA, jar.display()),
        None => COMPILER.to_string(),
    }
}

fn flag_lines(options: &CompilerOptions) -> Vec<String> {
    let mut lines = Vec::new();
    for (name, flag) in options.compiler_flags.iter() {
        match flag {
            Flag::Value(value) => {
                for value in value.values() {
                    lines.push(build_flag(name, value.as_deref()));
                }
            }
            Flag::Externs(patterns) => {
                for pattern in patterns {
                    lines.push(build_flag(name, Some(pattern)));
                }
            }
        }
    }
    lines
}

fn warnings(options: &CompilerOptions) -> Vec<String> {
    let mut warnings = Vec::new();
    let flags = &options.compiler_flags;

    if options.file_name.is_some() && flags.is_module_mode() {
        warnings.push("fileName is ignored when module output is configured".to_string());
    }
    if flags.contains("js_output_file") && !flags.is_module_mode() {
        warnings.push("compilerFlags.js_output_file is ignored; use fileName instead".to_string());
    }

    for (_, flag) in flags.iter() {
        let Flag::Externs(patterns) = flag else {
            continue;
        };
        for pattern in patterns {
            match expand_glob(pattern) {
                Ok(paths) if paths.is_empty() => {
                    warnings.push(format!("externs pattern '{}' matched no files", pattern))
                }
                Ok(_) => {}
                Err(err) => warnings.push(err.to_string()),
            }
        }
    }

    warnings
}
