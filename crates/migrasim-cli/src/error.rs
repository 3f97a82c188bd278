//! Error types for the migrasim binary.
//!
//! [`CliError`] is the top-level error type that wraps every possible
//! failure mode during startup and the simulation run itself.

/// Top-level error for the migrasim binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Engine configuration loading or validation failed.
    #[error("engine config error: {source}")]
    EngineConfig {
        /// The underlying config error.
        #[from]
        source: migrasim_engine::config::ConfigLoadError,
    },

    /// Reading or parsing the scenario file failed.
    #[error("scenario error: {message}")]
    Scenario {
        /// Description of the scenario failure.
        message: String,
    },

    /// Converting the loaded scenario into a live world failed.
    #[error("world construction error: {source}")]
    World {
        /// The underlying snapshot conversion error.
        #[from]
        source: migrasim_snapshot::SnapshotError,
    },

    /// Constructing the engine itself failed.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: migrasim_engine::EngineError,
    },
}
