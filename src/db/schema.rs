//! Table definitions for the smoker store.

use super::{DatabaseConnection, db_error};
use anyhow::Result;
use tracing::debug;

/// Full schema DDL, parents before children. Idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS smokers (
    smoker_id           SERIAL PRIMARY KEY,
    first_name          VARCHAR(255),
    last_name           VARCHAR(255),
    date_of_birth       DATE,
    gender              VARCHAR(20),
    contact_information VARCHAR(255)
);

CREATE TABLE IF NOT EXISTS smoking_habits (
    habit_id           SERIAL PRIMARY KEY,
    smoker_id          INTEGER REFERENCES smokers(smoker_id),
    start_date         DATE,
    quit_date          DATE,
    cigarettes_per_day INTEGER,
    pack_years         INTEGER,
    smoking_status     VARCHAR(20)
);

CREATE INDEX IF NOT EXISTS smoking_habits_smoker_idx ON smoking_habits(smoker_id);

CREATE TABLE IF NOT EXISTS health_records (
    record_id         SERIAL PRIMARY KEY,
    smoker_id         INTEGER REFERENCES smokers(smoker_id),
    record_date       DATE,
    health_condition  VARCHAR(255),
    diagnosis_date    DATE,
    treatment_history TEXT,
    severity          VARCHAR(20)
);

-- One demographics row per smoker.
CREATE TABLE IF NOT EXISTS demographics (
    smoker_id         INTEGER PRIMARY KEY REFERENCES smokers(smoker_id),
    education_level   VARCHAR(255),
    income_level      VARCHAR(255),
    employment_status VARCHAR(255),
    ethnicity         VARCHAR(255),
    location          VARCHAR(255)
);
";

/// Tables in dependency order.
pub const TABLES: [&str; 4] = ["smokers", "smoking_habits", "health_records", "demographics"];

impl DatabaseConnection {
    /// Creates any missing tables. Safe to call before every operation.
    pub async fn create_tables(&mut self) -> Result<()> {
        let tx = self
            .client
            .transaction()
            .await
            .map_err(|e| db_error("Failed to start schema transaction", e))?;
        tx.batch_execute(SCHEMA)
            .await
            .map_err(|e| db_error("Failed to create tables", e))?;
        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit schema", e))?;
        debug!("schema ensured");
        Ok(())
    }

    /// Names of the smoker tables currently present in the public schema.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let rows = self
            .client
            .query(
                "SELECT table_name::text FROM information_schema.tables
                 WHERE table_schema = 'public' AND table_name::text = ANY($1)
                 ORDER BY table_name",
                &[&TABLES.as_slice()],
            )
            .await
            .map_err(|e| db_error("Failed to query tables", e))?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }
}
