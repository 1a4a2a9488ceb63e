use anyhow::Context;
use clap::{Parser, ValueEnum};
use colored::*;
use std::path::PathBuf;

use mdtidy_lib::config::{ConfigFile, FormatConfig};
use mdtidy_lib::exit_codes::exit;
use mdtidy_lib::parallel::BatchProcessor;

mod formatter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to format recursively
    root: PathBuf,

    /// Exclude a directory prefix, relative to the root (repeatable; replaces the defaults)
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Report what would change without writing any file
    #[arg(long)]
    dry_run: bool,

    /// List every file with its status and applied rules
    #[arg(short, long)]
    verbose: bool,

    /// Print a unified diff for each changed file
    #[arg(long)]
    diff: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Number of worker threads (default: one per core)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Configuration file path (default: .mdtidy.toml in the root)
    #[arg(long, conflicts_with = "no_config")]
    config: Option<PathBuf>,

    /// Ignore any configuration file
    #[arg(long)]
    no_config: bool,
}

impl Cli {
    fn build_config(&self) -> anyhow::Result<FormatConfig> {
        let mut config = FormatConfig::new(&self.root).with_dry_run(self.dry_run);
        config.verbose = self.verbose;

        if !self.no_config {
            let file =
                ConfigFile::discover(&self.root, self.config.as_deref()).context("Failed to load configuration")?;
            if let Some(file) = file {
                config.apply_file(&file);
            }
        }
        if !self.exclude.is_empty() {
            config.exclude_patterns = self.exclude.clone();
        }
        if self.jobs.is_some() {
            config.jobs = self.jobs;
        }
        Ok(config)
    }
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = cli.build_config()?;
    log::debug!("Effective configuration: {config:?}");

    let report = BatchProcessor::new(&config).run().context("Cannot format directory")?;

    match cli.output {
        OutputFormat::Json => formatter::print_json(&report).context("Failed to serialize report")?,
        OutputFormat::Text => {
            if cli.diff {
                formatter::print_diffs(&report);
            }
            formatter::print_report(&report, cli.verbose, cli.dry_run);
        }
    }
    Ok(report.exit_code())
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match run(&cli) {
        Ok(0) => exit::success(),
        Ok(_) => exit::files_failed(),
        Err(err) => {
            eprintln!("{} {err:#}", "Error:".red().bold());
            exit::tool_error();
        }
    }
}
