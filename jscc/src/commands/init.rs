use std::path::PathBuf;

use clap::Args;
use eyre::{Context, Result, bail};

/// Starter config written by `jscc init`.
const STARTER_CONFIG: &str = r#"# Name of the compiled file, relative to the output directory.
fileName = "app.min.js"

# Path to a compiler jar. Without it `closure-compiler` is run from the PATH.
# compilerPath = "vendor/closure-compiler.jar"

# JVM options, placed before `-jar`.
# javaFlags = ["-Xmx1g"]

# Emit `<fileName>.map` and link it from the compiled file.
createSourceMap = true

# Embed a content hash in the output names, e.g. app.min-1a2b3c4d5e.js
fingerprint = false

# Treat compiler diagnostics as warnings instead of failing the build.
continueWithWarnings = false

# Capture limit for compiler stdout and stderr, in KiB.
maxBuffer = 1000

# Passed to the compiler as `--name=value`, in this order. Lists repeat the
# flag once per item and `name = {}` passes a bare `--name`.
[compilerFlags]
compilation_level = "SIMPLE"
warning_level = "DEFAULT"
language_out = "ECMASCRIPT5"
# externs = ["externs/*.js"]
"#;

#[derive(Args)]
pub struct InitCommand {
    /// Where to write the config (defaults to ./jscc.toml)
    #[arg(default_value = "jscc.toml")]
    pub path: PathBuf,

    /// Overwrite an existing config
    #[arg(short, long)]
    pub force: bool,
}

impl InitCommand {
    pub fn run(&self) -> Result<()> {
        if self.path.exists() && !self.force {
            bail!(
                "{} already exists (use --force to overwrite)",
                self.path.display()
            );
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&self.path, STARTER_CONFIG)
            .wrap_err_with(|| format!("Failed to write {}", self.path.display()))?;

        println!("Created {}", self.path.display());
        println!();
        println!("Next steps:");
        println!("  jscc check");
        println!("  jscc compile 'src/**/*.js'");

        Ok(())
    }
}
