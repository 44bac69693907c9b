use std::path::{Path, PathBuf};

mod terminal;

use anyhow::Context;
use clap::CommandFactory;
use compliance_matrix::{
    Config, ConfigError, Conversion, RunReport, config::DEFAULT_CONFIG_PATH, resolve_destination,
};
use terminal::Colorize;
use tracing::instrument;

/// Convert a specification document into a compliance matrix.
///
/// Every sentence containing "shall" becomes a numbered row, with blank
/// columns for recording whether the requirement is met.
#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Path of the specification document to read
    #[arg(long, value_name = "PATH")]
    input_file: Option<PathBuf>,

    /// Path to write the compliance matrix to
    ///
    /// Defaults to the input path with its extension replaced. A `.md`
    /// destination produces a Markdown table, anything else produces CSV.
    #[arg(long, value_name = "PATH")]
    output_file: Option<PathBuf>,

    /// Properties file to read settings from
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let config = self.load_config();
        Self::setup_logging(config.as_ref().is_ok_and(Config::debug));
        let config = config?;

        for (key, value) in config.properties() {
            tracing::debug!("{key}={value}");
        }

        let Some(input_file) = &self.input_file else {
            println!("--input-file <document> is required");
            Self::command().print_help()?;
            return Ok(());
        };

        let (destination, report) = self.convert(input_file, &config);
        Self::print_summary(&destination, &report);
        Ok(())
    }

    /// Loads settings from `--config`, or from the default location if it
    /// exists.
    fn load_config(&self) -> anyhow::Result<Config> {
        if let Some(path) = &self.config {
            return Config::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()));
        }

        match Config::load(Path::new(DEFAULT_CONFIG_PATH)) {
            Err(ConfigError::NotFound { .. }) => Ok(Config::default()),
            result => result.context("Failed to load default configuration"),
        }
    }

    #[instrument(skip(config))]
    fn convert(&self, input_file: &Path, config: &Config) -> (PathBuf, RunReport) {
        let destination = resolve_destination(input_file, self.output_file.as_deref(), config);
        tracing::info!(
            "Converting '{}' into '{}'",
            input_file.display(),
            destination.display()
        );
        let report = Conversion::from_config(config).convert(input_file, &destination);
        (destination, report)
    }

    fn print_summary(destination: &Path, report: &RunReport) {
        if report.is_done() {
            let summary = format!(
                "Wrote {} requirements from {} paragraphs to {}",
                report.requirements(),
                report.paragraphs(),
                destination.display()
            );
            println!("{}", summary.success());
            return;
        }

        let summary = format!(
            "Conversion stopped with {} error(s) after {} paragraphs",
            report.errors().len(),
            report.paragraphs()
        );
        println!("{}", summary.error());
        for error in report.errors() {
            println!("  {}", error.to_string().dim());
        }
    }

    fn setup_logging(debug: bool) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = if debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        if let Err(error) = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
        {
            tracing::debug!("Keeping the installed subscriber: {error}");
        }
    }
}
