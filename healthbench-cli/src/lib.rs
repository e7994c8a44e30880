//! healthbench-cli library: configuration files, batch runs and progress
//! display shared by the `healthbench` and `healthbench-batch` binaries.
//!
//! # Batch runs
//!
//! ```no_run
//! use healthbench_cli::{BatchRunner, ConfigLoader};
//! use healthbench_eval::DatasetLoader;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::load("providers.json")?;
//! let items = DatasetLoader::new()
//!     .load(Path::new("benchmark_perguntas_unificado.json"))
//!     .await?;
//!
//! let runner = BatchRunner::new(config).with_limit(Some(20));
//! let runs = runner.run(&items, &[]).await?;
//! runner.save_results(&runs, Path::new("evaluation_results"))?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod progress;

pub use batch::{print_batch_summary, BatchError, BatchRunner, RunMetadata, RunRecord};
pub use config::{
    substitute_placeholders, ConfigError, ConfigLoader, DefaultSettings, ProviderEntry,
    ProvidersFile, DEFAULT_CONFIG_PATH,
};
pub use progress::ProgressReporter;

/// Initialize env_logger: `info` when verbose, `warn` otherwise.
///
/// `RUST_LOG` overrides both.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
