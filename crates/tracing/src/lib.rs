//!  The `tracing` module provides functionalities for setting up and configuring logging.
//!
//!  The module's primary entry point is the [`EthblockTracer`] struct, which writes log records
//!  to stderr in the configured [`LogFormat`], leaving stdout to command output.
//!
//!  # Examples
//!
//!  Basic usage:
//!
//!  ```
//!  use ethblock_tracing::{
//!      EthblockTracer, LayerInfo, LogFormat, Tracer,
//!      tracing::level_filters::LevelFilter,
//!  };
//!
//!  fn main() -> eyre::Result<()> {
//!      let tracer = EthblockTracer::new().with_stderr(LayerInfo::new(
//!          LogFormat::Json,
//!          LevelFilter::INFO.to_string(),
//!          "consensus=debug".to_string(),
//!          None,
//!      ));
//!
//!      tracer.init()?;
//!
//!      // Your application logic here
//!
//!      Ok(())
//!  }
//!  ```

#![doc(issue_tracker_base_url = "https://github.com/ethblock/ethblock/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

// Re-export tracing crates
pub use tracing;
pub use tracing_subscriber;

// Re-export our types
pub use formatter::{BoxedLayer, LogFormat};
pub use test_tracer::TestTracer;

mod formatter;
mod test_tracer;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::Directive, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

///  Tracer for application logging.
#[derive(Debug, Clone, Default)]
pub struct EthblockTracer {
    stderr: LayerInfo,
}

impl EthblockTracer {
    ///  Constructs a new `Tracer` with the default stderr layer configuration.
    pub fn new() -> Self {
        Self::default()
    }

    ///  Sets a custom configuration for the stderr layer.
    pub fn with_stderr(mut self, config: LayerInfo) -> Self {
        self.stderr = config;
        self
    }
}

///  Configuration for a logging layer.
///
///  This struct holds configuration parameters for a tracing layer, including
///  the format, filtering directives, optional coloring, and directive.
#[derive(Debug, Clone)]
pub struct LayerInfo {
    format: LogFormat,
    default_directive: String,
    filters: String,
    color: Option<String>,
}

impl LayerInfo {
    ///  Constructs a new `LayerInfo`.
    ///
    ///  # Arguments
    ///  * `format` - Specifies the format for log messages.
    ///  * `default_directive` - Directive for filtering log messages.
    ///  * `filters` - Additional comma separated filter directives.
    ///  * `color` - Optional color configuration for the log messages.
    pub const fn new(
        format: LogFormat,
        default_directive: String,
        filters: String,
        color: Option<String>,
    ) -> Self {
        Self { format, default_directive, filters, color }
    }
}

impl Default for LayerInfo {
    ///  Provides default values for `LayerInfo`.
    ///
    ///  By default, it uses terminal format, INFO level filter,
    ///  no additional filters, and no color configuration.
    fn default() -> Self {
        Self {
            format: LogFormat::Terminal,
            default_directive: LevelFilter::INFO.to_string(),
            filters: String::new(),
            color: None,
        }
    }
}

/// Trait defining a general interface for logging configuration.
///
/// Implementations of this trait can specify different logging setups, such as the application
/// stderr logging or a setup tailored for tests.
pub trait Tracer {
    /// Initialize the logging configuration.
    fn init(self) -> eyre::Result<()>;
}

impl Tracer for EthblockTracer {
    ///  Installs the global tracing subscriber with the configured stderr layer.
    fn init(self) -> eyre::Result<()> {
        let filter =
            build_env_filter(Some(self.stderr.default_directive.parse()?), &self.stderr.filters)?;
        let layer = self.stderr.format.apply(filter, self.stderr.color);

        // The error is returned if the global default subscriber is already set,
        // so it's safe to ignore it
        let _ = tracing_subscriber::registry().with(layer).try_init().inspect_err(|e| {
            tracing::warn!(%e, "Tracing subscriber could not be initialized");
        });
        Ok(())
    }
}

/// Builds an [`EnvFilter`] from `RUST_LOG`, falling back to the default directive, with the
/// comma separated `directives` added on top.
pub fn build_env_filter(
    default_directive: Option<Directive>,
    directives: &str,
) -> eyre::Result<EnvFilter> {
    let env_filter = if let Some(default_directive) = default_directive {
        EnvFilter::builder().with_default_directive(default_directive).from_env_lossy()
    } else {
        EnvFilter::builder().from_env_lossy()
    };

    directives
        .split(',')
        .filter(|directive| !directive.is_empty())
        .try_fold(env_filter, |env_filter, directive| -> eyre::Result<EnvFilter> {
            Ok(env_filter.add_directive(directive.parse()?))
        })
}

///  Initializes a tracing subscriber for tests.
///
///  The filter is configurable via `RUST_LOG`.
///
///  # Note
///
///  The subscriber will silently fail if it could not be installed.
pub fn init_test_tracing() {
    let _ = TestTracer::default().init();
}
