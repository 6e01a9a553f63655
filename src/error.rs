use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the engine, the snapshot layer and the application loop.
///
/// Every fallible entry point validates before it mutates, so an `Err` always means the
/// simulation is still in the state it was in before the call.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected configuration value (e.g. a non-positive environment size).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Snapshot parsed as JSON but describes an impossible state.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// Snapshot bytes are not JSON of the expected shape.
    #[error("unreadable snapshot: {0}")]
    SnapshotFormat(#[from] serde_json::Error),

    /// Init config TOML failed to parse.
    #[error("invalid init config: {0}")]
    InitConfig(#[from] toml::de::Error),

    /// A command sent to the running loop was rejected.
    #[error("command failed: {0}")]
    CommandFailed(String),

    /// The simulation loop thread hung up.
    #[error("simulation loop disconnected")]
    Disconnected,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
