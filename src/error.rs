use thiserror::Error;

/// Errors surfaced by the store, the round sequencer and the binaries.
///
/// Gaps in the data (missing speaks, empty panels) are never errors: the
/// aggregator excludes the affected round from the affected metric instead.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("no such record")]
    NotFound,
    #[error(
        "rounds belong to different results (expected {expected}, found {found})"
    )]
    MixedResults { expected: i64, found: i64 },
    #[error("unknown event `{0}`")]
    InvalidEvent(String),
    #[error("invalid id `{0}`: {1}")]
    InvalidId(String, String),
    #[error("no weight table named `{0}`")]
    UnknownPolicy(String),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("could not connect to database: {0}")]
    Connection(#[from] diesel::ConnectionError),
    #[error("failed to run migrations: {0}")]
    Migration(String),
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
