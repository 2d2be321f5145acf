use std::fmt::Write as _;
use std::path::Path;

use compio::fs;
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::cli::Command;
use crate::config::{ConfigCreationError, QueryConfig};
use crate::filesystem::{Listing, NoMatchError, ResourceTree, Size};
use crate::interpreter::interpret;

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let output = Self::execute(&app_config, colorize_stdout()).await?;
        print!("{output}");
        Ok(())
    }

    /// Replays the log and renders the answer to the requested command.
    pub async fn execute(
        app_config: &RuntimeConfig,
        colorize: bool,
    ) -> Result<String, ApplicationError> {
        let query_config = match &app_config.config {
            Some(path) => QueryConfig::from_path(path).await,
            None => QueryConfig::read_default().await,
        }
        .context(ConfigSnafu)?;

        let contents = read_log(&app_config.log).await?;
        let interpretation = interpret(contents.lines());
        info!(
            "Replayed {} with {} diagnostics",
            app_config.log.display(),
            interpretation.diagnostics().len()
        );

        let diagnostic_count = interpretation.diagnostics().len();
        ensure!(
            !app_config.strict || diagnostic_count == 0,
            StrictModeSnafu {
                count: diagnostic_count
            }
        );

        answer(
            &app_config.command,
            &query_config,
            interpretation.tree(),
            colorize,
        )
    }
}

async fn read_log(path: &Path) -> Result<String, ApplicationError> {
    debug!("Reading session log: {}", path.display());
    let bytes = fs::read(path).await.context(LogReadSnafu {
        file_path: path.display().to_string(),
    })?;
    String::from_utf8(bytes).context(LogEncodingSnafu {
        file_path: path.display().to_string(),
    })
}

fn colorize_stdout() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Command line values take precedence over the config file.
fn answer(
    command: &Command,
    config: &QueryConfig,
    tree: &ResourceTree,
    colorize: bool,
) -> Result<String, ApplicationError> {
    let mut output = String::new();
    match command {
        Command::SumUnder { threshold } => {
            let threshold = threshold.map(Size::new).unwrap_or(config.size_threshold);
            let _ = writeln!(output, "{}", tree.sum_of_sizes_at_most(threshold));
        }
        Command::Free { capacity, required } => {
            let capacity = capacity.map(Size::new).unwrap_or(config.total_capacity);
            let required = required.map(Size::new).unwrap_or(config.required_free);
            let directory = tree
                .smallest_directory_to_free(capacity, required)
                .context(QuerySnafu)?;
            let _ = writeln!(output, "{} {}", directory.path(), directory.size());
        }
        Command::Tree { depth } => {
            let listing = Listing::new(tree, tree.root())
                .max_depth(*depth)
                .colorize(colorize);
            let _ = write!(output, "{listing}");
        }
        Command::Summary => {
            let sum = tree.sum_of_sizes_at_most(config.size_threshold);
            let directory = tree
                .smallest_directory_to_free(config.total_capacity, config.required_free)
                .context(QuerySnafu)?;
            let _ = writeln!(
                output,
                "Directories of at most {}: {sum}",
                config.size_threshold
            );
            let _ = writeln!(
                output,
                "Smallest directory to delete: {} ({})",
                directory.path(),
                directory.size()
            );
        }
    }
    Ok(output)
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ConfigCreationError },
    #[snafu(display("Failed to read the session log: {}", file_path))]
    LogReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("The session log {} is not valid UTF-8", file_path))]
    LogEncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Strict mode: the session log produced {} diagnostics", count))]
    StrictModeError { count: usize },
    #[snafu(display("Query could not be answered"))]
    QueryError { source: NoMatchError },
}
