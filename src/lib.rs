//! Team statistics for competitive debate.
//!
//! Results are read from the store ([`store::TeamSource`]), rounds are put in
//! canonical order ([`tournaments::rounds::sequence`]) and folded into derived
//! statistics ([`statistics::RecordAggregator`]), which are then labelled for
//! display ([`statistics::display::StatisticsView`]).

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod config;
pub mod error;
pub mod schema;
pub mod statistics;
pub mod store;
pub mod teams;
pub mod test;
pub mod tournaments;
pub mod validation;

pub use error::StatsError;
pub use statistics::{RecordAggregator, Statistics};
pub use store::{SqliteStore, TeamSource, team_statistics};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
