//! End-to-end runs of the stage against a stubbed compiler.

use std::{
    cell::{Cell, RefCell},
    fs,
    path::{Path, PathBuf},
};

use jscc_core::{Contents, InputFile, content_hash};
use jscc_options::{CompilerOptions, FlagValue};
use jscc_pipeline::{Error, ExecError, ProcessInvocation, ProcessOutput, Severity, Stage};

const COMPILED: &str = "var a=1;";
const SOURCE_MAP: &str = "{\"version\":3,\"mappings\":\"\"}";

fn input(name: &str) -> InputFile {
    InputFile::new("/project", format!("/project/{}", name), "var a = 1;")
}

/// Value of a `--name="value"` token, quotes stripped.
fn arg_value(invocation: &ProcessInvocation, name: &str) -> Option<String> {
    let prefix = format!("--{}=", name);
    invocation
        .args
        .iter()
        .find_map(|arg| arg.strip_prefix(&prefix))
        .map(|value| value.trim_matches('"').to_string())
}

/// Stand-in for the compiler: writes fixed output wherever it was told to.
fn fake_compiler(invocation: &ProcessInvocation) -> Result<ProcessOutput, ExecError> {
    if let Some(output) = arg_value(invocation, "js_output_file") {
        fs::write(output, COMPILED)?;
    }
    if let Some(map) = arg_value(invocation, "create_source_map") {
        fs::write(map, SOURCE_MAP)?;
    }
    Ok(ProcessOutput::clean())
}

fn flag_file_of(invocation: &ProcessInvocation) -> PathBuf {
    PathBuf::from(arg_value(invocation, "flagfile").unwrap())
}

#[test]
fn test_single_file_with_compiler_jar() {
    let options = CompilerOptions::new("foo.js").with_compiler_path("compiler.jar");
    let seen = RefCell::new(None);
    let executor = |inv: &ProcessInvocation| {
        *seen.borrow_mut() = Some(inv.clone());
        fake_compiler(inv)
    };

    let compilation = Stage::with_executor(options, executor)
        .unwrap()
        .run(vec![input("src/foo.js")])
        .unwrap();

    let invocation = seen.into_inner().unwrap();
    assert_eq!(invocation.executable, "java");
    assert_eq!(
        &invocation.args[..3],
        &["-jar", "-XX:-TieredCompilation", "compiler.jar"]
    );
    assert!(invocation.args[3].starts_with("--flagfile="));
    assert!(invocation.args.last().unwrap().starts_with("--js_output_file="));

    assert_eq!(compilation.artifacts.len(), 1);
    assert_eq!(compilation.artifacts[0].contents, COMPILED.as_bytes());
    assert_eq!(compilation.artifacts[0].relative(), PathBuf::from("foo.js"));
    assert!(compilation.diagnostics.is_empty());
}

#[test]
fn test_source_map_follows_compiled_output() {
    let options = CompilerOptions::new("foo.js")
        .with_compiler_path("compiler.jar")
        .with_source_map(true);

    let compilation = Stage::with_executor(options, fake_compiler)
        .unwrap()
        .run(vec![input("src/foo.js")])
        .unwrap();

    let [compiled, map] = compilation.artifacts.as_slice() else {
        panic!("expected two artifacts, got {:?}", compilation.artifacts);
    };
    assert_eq!(compiled.file_name(), Some("foo.js"));
    assert_eq!(map.file_name(), Some("foo.js.map"));
    assert_eq!(map.contents, SOURCE_MAP.as_bytes());
    assert!(
        compiled
            .contents
            .ends_with(b"//# sourceMappingURL=foo.js.map")
    );
}

#[test]
fn test_missing_output_identity_fails_before_spawn() {
    let calls = Cell::new(0);
    let executor = |inv: &ProcessInvocation| {
        calls.set(calls.get() + 1);
        fake_compiler(inv)
    };

    let options = CompilerOptions::default().with_flag("compilation_level", "ADVANCED");
    let err = Stage::with_executor(options, executor).err().unwrap();

    assert!(matches!(err, Error::MissingConfiguration));
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_escaping_output_name_fails_before_spawn() {
    let calls = Cell::new(0);
    let executor = |inv: &ProcessInvocation| {
        calls.set(calls.get() + 1);
        fake_compiler(inv)
    };

    let err = Stage::with_executor(CompilerOptions::new("../escape.js"), &executor)
        .err()
        .unwrap();
    assert!(matches!(err, Error::InvalidOptions { .. }));

    let options = CompilerOptions::default()
        .with_flag("module", "main:1")
        .with_flag("module_output_path_prefix", "../out/");
    let err = Stage::with_executor(options, &executor).err().unwrap();
    assert!(matches!(err, Error::InvalidOptions { .. }));

    assert_eq!(calls.get(), 0);
}

#[test]
fn test_outputs_stay_inside_work_dir() {
    let flag_file = RefCell::new(PathBuf::new());
    let executor = |inv: &ProcessInvocation| {
        *flag_file.borrow_mut() = flag_file_of(inv);
        fake_compiler(inv)
    };
    let options = CompilerOptions::new("js/./app.min.js").with_source_map(true);

    let compilation = Stage::with_executor(options, executor)
        .unwrap()
        .run(vec![input("a.js")])
        .unwrap();

    let work_dir = flag_file.into_inner().parent().unwrap().to_path_buf();
    for artifact in &compilation.artifacts {
        assert!(artifact.path.starts_with(&work_dir));
        assert!(artifact.relative().starts_with("js"));
    }
    assert!(!work_dir.exists());
}

#[test]
fn test_stderr_fails_the_batch() {
    let executor = |inv: &ProcessInvocation| -> Result<ProcessOutput, ExecError> {
        fake_compiler(inv)?;
        Ok(ProcessOutput::with_stderr("input.js:1: ERROR - Parse error"))
    };

    let err = Stage::with_executor(CompilerOptions::new("foo.js"), executor)
        .unwrap()
        .run(vec![input("a.js")])
        .unwrap_err();

    match err {
        Error::CompilerInvocationFailed { message, .. } => {
            assert_eq!(message, "input.js:1: ERROR - Parse error")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_warnings_pass_when_allowed() {
    let executor = |inv: &ProcessInvocation| -> Result<ProcessOutput, ExecError> {
        fake_compiler(inv)?;
        Ok(ProcessOutput::with_stderr("0 error(s), 1 warning(s)\n"))
    };
    let options = CompilerOptions::new("foo.js").with_continue_with_warnings(true);

    let compilation = Stage::with_executor(options, executor)
        .unwrap()
        .run(vec![input("a.js")])
        .unwrap();

    assert_eq!(compilation.artifacts.len(), 1);
    assert_eq!(compilation.diagnostics.len(), 1);
    assert_eq!(compilation.diagnostics[0].severity, Severity::Warning);
    assert_eq!(compilation.diagnostics[0].message, "0 error(s), 1 warning(s)");
}

#[test]
fn test_flag_file_lists_every_input_in_order() {
    let body = RefCell::new(String::new());
    let executor = |inv: &ProcessInvocation| {
        *body.borrow_mut() = fs::read_to_string(flag_file_of(inv))?;
        fake_compiler(inv)
    };

    let files: Vec<_> = (0..5).map(|i| input(&format!("src/m{}.js", i))).collect();
    Stage::with_executor(CompilerOptions::new("foo.js"), executor)
        .unwrap()
        .run(files)
        .unwrap();

    let body = body.into_inner();
    let lines: Vec<_> = body.lines().collect();
    assert_eq!(lines.len(), 5);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(*line, format!("--js=\"src/m{}.js\"", i));
    }
}

#[test]
fn test_null_files_are_skipped() {
    let body = RefCell::new(String::new());
    let executor = |inv: &ProcessInvocation| {
        *body.borrow_mut() = fs::read_to_string(flag_file_of(inv))?;
        fake_compiler(inv)
    };

    let files = vec![
        input("a.js"),
        InputFile::new("/project", "/project/lib", Contents::Null),
        input("b.js"),
    ];
    Stage::with_executor(CompilerOptions::new("foo.js"), executor)
        .unwrap()
        .run(files)
        .unwrap();

    assert_eq!(body.into_inner(), "--js=\"a.js\"\n--js=\"b.js\"");
}

#[test]
fn test_streamed_file_is_rejected() {
    let calls = Cell::new(0);
    let executor = |inv: &ProcessInvocation| {
        calls.set(calls.get() + 1);
        fake_compiler(inv)
    };

    let mut stage = Stage::with_executor(CompilerOptions::new("foo.js"), executor).unwrap();
    stage.push(input("a.js")).unwrap();
    let err = stage
        .push(InputFile::new("/project", "/project/b.js", Contents::Stream))
        .unwrap_err();
    assert!(matches!(err, Error::StreamingUnsupported { .. }));

    assert!(stage.finish().is_err());
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_without_compiler_jar() {
    let seen = RefCell::new(None);
    let executor = |inv: &ProcessInvocation| {
        *seen.borrow_mut() = Some(inv.clone());
        fake_compiler(inv)
    };
    let options = CompilerOptions::new("foo.js")
        .with_source_map(true)
        .with_flag("compilation_level", "SIMPLE");

    Stage::with_executor(options, executor)
        .unwrap()
        .run(vec![input("a.js")])
        .unwrap();

    let invocation = seen.into_inner().unwrap();
    assert_eq!(invocation.executable, "closure-compiler");
    assert!(invocation.args[0].starts_with("--flagfile="));
    assert_eq!(invocation.args[1], "--compilation_level=SIMPLE");
    assert!(invocation.args.iter().any(|a| a.starts_with("--create_source_map=")));
}

#[test]
fn test_java_flags_and_tiered_compilation() {
    let seen = RefCell::new(None);
    let executor = |inv: &ProcessInvocation| {
        *seen.borrow_mut() = Some(inv.clone());
        fake_compiler(inv)
    };
    let options = CompilerOptions::new("foo.js")
        .with_compiler_path("compiler.jar")
        .with_java_flag("-Xmx2g")
        .with_tiered_compilation(true)
        .with_max_buffer(64);

    Stage::with_executor(options, executor)
        .unwrap()
        .run(vec![input("a.js")])
        .unwrap();

    let invocation = seen.into_inner().unwrap();
    assert_eq!(
        &invocation.args[..4],
        &["-Xmx2g", "-jar", "-XX:+TieredCompilation", "compiler.jar"]
    );
    assert_eq!(invocation.capture_limit_bytes, 64 * 1024);
}

#[test]
fn test_fingerprint_is_stable_across_runs() {
    let run = || {
        let options = CompilerOptions::new("foo.js")
            .with_source_map(true)
            .with_fingerprint(true);
        Stage::with_executor(options, fake_compiler)
            .unwrap()
            .run(vec![input("a.js")])
            .unwrap()
            .into_artifacts()
    };

    let first = run();
    let second = run();

    let hash = content_hash(COMPILED.as_bytes());
    assert_eq!(first[0].relative(), PathBuf::from(format!("foo-{}.js", hash)));
    assert_eq!(
        first[1].relative(),
        PathBuf::from(format!("foo.js-{}.map", hash))
    );
    assert_eq!(first[0].relative(), second[0].relative());
    assert_eq!(first[1].relative(), second[1].relative());
    assert!(
        first[0]
            .contents
            .ends_with(format!("//# sourceMappingURL=foo.js-{}.map", hash).as_bytes())
    );
}

#[test]
fn test_nested_output_name() {
    let compilation = Stage::with_executor(CompilerOptions::new("js/app.min.js"), fake_compiler)
        .unwrap()
        .run(vec![input("a.js")])
        .unwrap();

    assert_eq!(
        compilation.artifacts[0].relative(),
        PathBuf::from("js/app.min.js")
    );
}

#[test]
fn test_caller_output_file_is_ignored() {
    let options = CompilerOptions::new("foo.js").with_flag("js_output_file", "/elsewhere.js");

    let compilation = Stage::with_executor(options, fake_compiler)
        .unwrap()
        .run(vec![input("a.js")])
        .unwrap();

    assert_eq!(compilation.artifacts[0].relative(), PathBuf::from("foo.js"));
    assert_eq!(compilation.diagnostics.len(), 1);
    assert!(compilation.diagnostics[0].message.contains("js_output_file"));
}

#[test]
fn test_externs_without_matches_warns() {
    let temp = tempfile::TempDir::new().unwrap();
    let pattern = format!("{}/*.externs.js", temp.path().display());
    let options = CompilerOptions::new("foo.js").with_externs([pattern]);

    let compilation = Stage::with_executor(options, fake_compiler)
        .unwrap()
        .run(vec![input("a.js")])
        .unwrap();

    assert_eq!(compilation.diagnostics.len(), 1);
    assert!(compilation.diagnostics[0].severity.is_warning());
}

/// Module-mode stand-in: one chunk per `--module`. Like the real compiler
/// it expands `%outname%` to the chunk's full output path.
fn fake_module_compiler(invocation: &ProcessInvocation) -> Result<ProcessOutput, ExecError> {
    let prefix = arg_value(invocation, "module_output_path_prefix").unwrap();
    let map_pattern = arg_value(invocation, "create_source_map");

    for arg in &invocation.args {
        let Some(module) = arg.strip_prefix("--module=") else {
            continue;
        };
        let name = module.split(':').next().unwrap();
        let output = format!("{}{}.js", prefix, name);
        fs::write(&output, format!("/* {} */", name))?;
        if let Some(pattern) = &map_pattern {
            fs::write(pattern.replace("%outname%", &output), SOURCE_MAP)?;
        }
    }
    Ok(ProcessOutput::clean())
}

#[test]
fn test_module_output() {
    let options = CompilerOptions::default()
        .with_flag("module", vec!["base:1", "app:1:base"])
        .with_flag("module_output_path_prefix", "out/")
        .with_source_map(true);

    let compilation = Stage::with_executor(options, fake_module_compiler)
        .unwrap()
        .run(vec![input("base.js"), input("app.js")])
        .unwrap();

    let names: Vec<_> = compilation
        .artifacts
        .iter()
        .map(|a| a.relative().display().to_string())
        .collect();
    assert_eq!(
        names,
        vec!["out/app.js", "out/app.js.map", "out/base.js", "out/base.js.map"]
    );
    assert!(
        compilation.artifacts[2]
            .contents
            .starts_with(b"/* base */")
    );
    assert!(
        compilation.artifacts[0]
            .contents
            .ends_with(b"//# sourceMappingURL=app.js.map")
    );
}

#[test]
fn test_module_prefix_is_moved_into_work_dir() {
    let seen = RefCell::new(None);
    let executor = |inv: &ProcessInvocation| {
        *seen.borrow_mut() = Some(inv.clone());
        fake_module_compiler(inv)
    };
    let options = CompilerOptions::default()
        .with_flag("module", "main:1")
        .with_flag("module_output_path_prefix", "build/out/");

    Stage::with_executor(options, executor)
        .unwrap()
        .run(vec![input("main.js")])
        .unwrap();

    let invocation = seen.into_inner().unwrap();
    let prefix = arg_value(&invocation, "module_output_path_prefix").unwrap();
    let flag_file = flag_file_of(&invocation);
    assert!(Path::new(&prefix).starts_with(flag_file.parent().unwrap()));
    assert!(!invocation.args.iter().any(|a| a.starts_with("--js_output_file")));
    assert!(!Path::new(&prefix).exists());
}

#[test]
fn test_list_flag_from_builder() {
    let seen = RefCell::new(None);
    let executor = |inv: &ProcessInvocation| {
        *seen.borrow_mut() = Some(inv.clone());
        fake_compiler(inv)
    };
    let options = CompilerOptions::new("foo.js")
        .with_flag("jscomp_off", vec!["checkVars", "uselessCode"])
        .with_flag("debug", FlagValue::Switch);

    Stage::with_executor(options, executor)
        .unwrap()
        .run(vec![input("a.js")])
        .unwrap();

    let invocation = seen.into_inner().unwrap();
    let flags: Vec<_> = invocation.args[1..4].to_vec();
    assert_eq!(
        flags,
        vec!["--jscomp_off=checkVars", "--jscomp_off=uselessCode", "--debug"]
    );
}

#[test]
fn test_forced_output_follows_caller_flags() {
    let seen = RefCell::new(None);
    let executor = |inv: &ProcessInvocation| -> Result<ProcessOutput, ExecError> {
        *seen.borrow_mut() = Some(inv.clone());
        let output = arg_value(inv, "js_output_file").unwrap();
        fs::write(output, COMPILED)?;
        Ok(ProcessOutput::clean())
    };
    let options = CompilerOptions::new("foo.js").with_flag("create_source_map", "x");

    Stage::with_executor(options, executor)
        .unwrap()
        .run(vec![input("a.js")])
        .unwrap();

    let invocation = seen.into_inner().unwrap();
    assert!(invocation.args[0].starts_with("--flagfile="));
    let caller_flag = invocation
        .args
        .iter()
        .position(|a| a == "--create_source_map=x")
        .unwrap();
    let forced = invocation
        .args
        .iter()
        .position(|a| a.starts_with("--js_output_file="))
        .unwrap();
    assert!(forced > caller_flag);
}
