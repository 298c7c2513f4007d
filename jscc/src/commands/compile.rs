use std::path::PathBuf;

use clap::Args;
use eyre::{Context, Result};
use jscc_options::ConfigFile;

use super::UnwrapOrExit;
use crate::{
    ops::{self, CompileRequest},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CompileCommand {
    /// Input files or glob patterns, compiled in the order given
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Path to the config file (defaults to ./jscc.toml)
    #[arg(short, long, default_value = "jscc.toml")]
    pub config: PathBuf,

    /// Output directory (defaults to ./dist)
    #[arg(short, long, default_value = "dist")]
    pub output: PathBuf,

    /// Print the compiler invocation and flag file without running it
    #[arg(long)]
    pub dry_run: bool,
}

impl CompileCommand {
    pub fn run(&self) -> Result<()> {
        let options = ConfigFile::open(&self.config)
            .unwrap_or_exit()
            .into_options();
        let cwd = std::env::current_dir().wrap_err("Failed to get current directory")?;

        let request = CompileRequest {
            cwd,
            inputs: self.inputs.clone(),
            output: self.output.clone(),
            dry_run: self.dry_run,
        };
        let report = ops::compile(options, &request)?;

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
