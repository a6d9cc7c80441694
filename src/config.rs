//! Runtime configuration.
//!
//! Read from the TOML file named by `DEBATELAND_CONFIG` (if set), after which
//! `DATABASE_URL` overrides the database location. Everything has a default,
//! so no file is needed to run against an in-memory database.

use std::path::Path;

use serde::Deserialize;

use crate::{
    error::StatsError,
    statistics::{STANDARD_WEIGHTS, otr::WeightTable},
    store::SqliteStore,
};

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StatsConfig {
    pub database_url: String,
    /// One of `trace`, `debug`, `info`, `warn`, `error` or `off`.
    pub log_level: String,
    /// Name of the weight table used to compute OTR scores.
    pub policy: String,
    pub weights: Vec<WeightTable>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        StatsConfig {
            database_url: ":memory:".to_string(),
            log_level: "info".to_string(),
            policy: "standard".to_string(),
            weights: Vec::new(),
        }
    }
}

impl StatsConfig {
    /// Loads the configuration from the environment.
    pub fn load() -> Result<Self, StatsError> {
        let config = match std::env::var("DEBATELAND_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        Ok(config.with_env())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StatsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, StatsError> {
        Ok(toml::from_str(contents)?)
    }

    fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database_url = url;
        }
        self
    }

    /// The weight table named by `policy`. Tables from the file shadow the
    /// built-in `standard` table.
    pub fn otr_policy(&self) -> Result<&WeightTable, StatsError> {
        match self.weights.iter().find(|table| table.name == self.policy) {
            Some(table) => Ok(table),
            None if self.policy == STANDARD_WEIGHTS.name => Ok(&*STANDARD_WEIGHTS),
            None => Err(StatsError::UnknownPolicy(self.policy.clone())),
        }
    }

    /// Unrecognised levels fall back to `info`.
    pub fn max_level(&self) -> tracing_subscriber::filter::LevelFilter {
        if cfg!(fuzzing) {
            return tracing_subscriber::filter::LevelFilter::OFF;
        }

        self.log_level.parse().unwrap_or_else(|_| {
            tracing_subscriber::filter::LevelFilter::INFO
        })
    }

    /// Installs the global `tracing` subscriber.
    pub fn init_logging(&self) {
        tracing_subscriber::fmt()
            .with_max_level(self.max_level())
            .with_writer(std::io::stderr)
            .init();
    }

    /// Opens the configured database, running any pending migrations.
    pub fn connect(&self) -> Result<SqliteStore, StatsError> {
        tracing::debug!(location = %self.database_url, "opening database");
        SqliteStore::connect(&self.database_url)
    }
}
