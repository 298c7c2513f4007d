use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use jscc_options::ConfigFile;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    /// Path to the config file (defaults to ./jscc.toml)
    #[arg(short, long, default_value = "jscc.toml")]
    pub config: PathBuf,
}

impl CheckCommand {
    pub fn run(&self) -> Result<()> {
        let config = ConfigFile::open(&self.config).unwrap_or_exit();
        let report = ops::check(&config);

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
