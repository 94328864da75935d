//! CLI definition and entrypoint to executable
use crate::{commands, utils::load_chain_config};
use clap::{ArgAction, Args, Parser, Subcommand};
use ethblock_tracing::{
    tracing::{metadata::LevelFilter, Level},
    EthblockTracer, LayerInfo, LogFormat, Tracer,
};
use std::path::PathBuf;
use tracing::debug;

/// Parse CLI options, set up logging and run the chosen command.
pub async fn run() -> eyre::Result<()> {
    let opt = Cli::parse();
    opt.init_tracing()?;

    let config = load_chain_config(opt.chain.as_deref())?;
    debug!(target: "ethblock::cli", ?config, "Loaded chain config");

    match opt.command {
        Commands::Decode(command) => command.execute().await,
        Commands::Check(command) => command.execute(config).await,
        Commands::Config(command) => command.execute(&config).await,
    }
}

/// Commands to be executed
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode a file of RLP encoded blocks and print them as JSON.
    #[command(name = "decode")]
    Decode(commands::decode::Command),
    /// Check a file of RLP encoded blocks against the consensus rules.
    #[command(name = "check")]
    Check(commands::check::Command),
    /// Write the chain config in effect to stdout.
    #[command(name = "config")]
    Config(commands::config::Command),
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Ethereum block decoder and validator", long_about = None)]
struct Cli {
    /// The command to run
    #[clap(subcommand)]
    command: Commands,

    /// The path to a TOML chain config. Missing keys take their mainnet value.
    #[arg(long, value_name = "FILE", global = true)]
    chain: Option<PathBuf>,

    #[clap(flatten)]
    logs: Logs,

    #[clap(flatten)]
    verbosity: Verbosity,
}

impl Cli {
    fn init_tracing(&self) -> eyre::Result<()> {
        let layer = LayerInfo::new(
            self.logs.format,
            self.verbosity.directive().to_string(),
            self.logs.filter.clone(),
            Some(self.logs.color.clone()),
        );
        EthblockTracer::new().with_stderr(layer).init()
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Logging")]
struct Logs {
    /// The format to use for logs written to stderr.
    #[arg(
        long = "log.format",
        value_name = "FORMAT",
        global = true,
        default_value_t = LogFormat::Terminal
    )]
    format: LogFormat,

    /// Additional comma separated filter directives, e.g. `consensus=trace`.
    #[arg(long = "log.filter", value_name = "FILTER", global = true, default_value = "")]
    filter: String,

    /// Sets whether or not the formatter emits ANSI terminal escape codes for colors.
    #[arg(long = "color", value_name = "COLOR", global = true, default_value = "always")]
    color: String,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Display")]
struct Verbosity {
    /// Set the minimum log level.
    ///
    /// -v      Errors
    /// -vv     Warnings
    /// -vvv    Info
    /// -vvvv   Debug
    /// -vvvvv  Traces (warning: very verbose!)
    #[clap(short, long, action = ArgAction::Count, global = true, default_value_t = 3, verbatim_doc_comment, help_heading = "Display")]
    verbosity: u8,

    /// Silence all log output.
    #[clap(long, alias = "silent", short = 'q', global = true, help_heading = "Display")]
    quiet: bool,
}

impl Verbosity {
    /// Get the corresponding [LevelFilter] for the given verbosity, or `OFF` if the verbosity
    /// corresponds to silent.
    fn directive(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::OFF
        } else {
            let level = match self.verbosity.saturating_sub(1) {
                0 => Level::ERROR,
                1 => Level::WARN,
                2 => Level::INFO,
                3 => Level::DEBUG,
                _ => Level::TRACE,
            };
            LevelFilter::from_level(level)
        }
    }
}
