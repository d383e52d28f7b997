pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod schedule;

pub use config::Config;
pub use datasource::{DataSource, DataSourceError, MockDataSource, SqliteDataSource};
pub use db::{init_db, Repository};
pub use domain::{
    DateWindow, Fixture, FixtureResult, FixtureState, LogEntry, Participant, Points, Round, Winner,
};
pub use error::AppError;
pub use orchestration::{RoundReport, WeekProcessor};
pub use schedule::{generate, validate, ByePolicy};
