use std::path::PathBuf;

use crate::cli::{Cli, Command};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub log: PathBuf,
    pub config: Option<PathBuf>,
    pub strict: bool,
    pub command: Command,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            log: cli.log,
            config: cli.config,
            strict: cli.strict,
            command: cli.command.unwrap_or_default(),
        }
    }
}
