use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXPORT_PATH: &str = "smokers_data.xlsx";
pub const DEFAULT_MAINTENANCE_DATABASE: &str = "postgres";

/// Runtime knobs, layered: built-in defaults, then `settings.toml` in the
/// profile directory (if present), then `SMOKERLOG_*` environment variables.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Where the spreadsheet export is written.
    pub export_path: PathBuf,
    /// Database used for the bootstrap connection that creates the target database.
    pub maintenance_database: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            maintenance_database: DEFAULT_MAINTENANCE_DATABASE.to_string(),
        }
    }
}

impl Settings {
    pub fn load(dir: &Path) -> Result<Settings> {
        Self::load_with(dir, ::config::Environment::with_prefix("SMOKERLOG"))
    }

    fn load_with(dir: &Path, env: ::config::Environment) -> Result<Settings> {
        let file = dir.join("settings.toml");
        let settings = ::config::Config::builder()
            .set_default("export_path", DEFAULT_EXPORT_PATH)?
            .set_default("maintenance_database", DEFAULT_MAINTENANCE_DATABASE)?
            .add_source(::config::File::from(file.as_path()).required(false))
            .add_source(env)
            .build()
            .with_context(|| format!("Failed to read settings from {}", file.display()))?;

        Ok(settings.try_deserialize()?)
    }
}
