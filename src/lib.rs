//! # smokerlog
//!
//! smokerlog is a single-user, menu-driven command-line tool for recording and
//! reporting smoking-habit and health data for a cohort of tracked people,
//! stored in PostgreSQL.
//!
//! ## Features
//!
//! - **Saved connections**: named connection profiles kept in
//!   `~/.smokerlog/config.json`, passwords sealed with AES-256-GCM
//! - **Self-provisioning store**: creates the target database and its four
//!   tables on first use
//! - **Interactive records**: add a smoker with habit, health and demographic
//!   rows in one transaction; look up, list, sort and delete
//! - **Reports**: text tables, `.xlsx` export and a terminal bar chart of
//!   cigarettes per day
//!
//! ## Modules
//!
//! - `config`: connection profile storage
//! - `settings`: layered runtime settings
//! - `db`: connection bootstrap, schema and queries
//! - `model`: row types and the joined-record column set
//! - `prompt`: validating terminal prompts
//! - `report`, `export`, `tui`: text tables, spreadsheets, the chart
//! - `session`: the menu loop

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod model;
pub mod prompt;
pub mod report;
pub mod session;
pub mod settings;
pub mod tui;

pub use config::Config;
pub use db::DatabaseConnection;
pub use session::Session;
pub use settings::Settings;
