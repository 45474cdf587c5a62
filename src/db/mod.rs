use crate::config::ConnectionInfo;
use crate::error::ConnectError;
use anyhow::{Result, anyhow};
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, Config, NoTls};
use tracing::{debug, info, warn};

mod queries;
mod schema;

pub use queries::DeleteOutcome;
pub use schema::SCHEMA;

#[derive(Debug)]
pub struct DatabaseConnection {
    pub client: Client,
    database: String,
}

impl DatabaseConnection {
    /// Connects to `info.database`, creating it first if it does not exist.
    ///
    /// The bootstrap connection goes to `maintenance_database`, since a
    /// PostgreSQL session always names some database.
    pub async fn connect(
        info: &ConnectionInfo,
        maintenance_database: &str,
    ) -> Result<DatabaseConnection, ConnectError> {
        let bootstrap = Self::open(info, maintenance_database).await?;
        Self::ensure_database(&bootstrap, &info.database).await?;
        drop(bootstrap);

        let client = Self::open(info, &info.database).await?;
        info!(database = %info.database, host = %info.host, "connected");
        Ok(DatabaseConnection {
            client,
            database: info.database.clone(),
        })
    }

    async fn open(info: &ConnectionInfo, database: &str) -> Result<Client, ConnectError> {
        let mut config = Config::new();
        config
            .host(&info.host)
            .port(info.port)
            .dbname(database)
            .user(&info.username)
            .password(&info.password);

        match config.connect(NoTls).await {
            Ok((client, connection)) => {
                // The connection object performs the actual communication with the database,
                // so spawn it off to run on its own.
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!("database connection error: {}", e);
                    }
                });
                debug!(database, "session opened");
                Ok(client)
            }
            Err(e) => Err(classify(&e)),
        }
    }

    async fn ensure_database(client: &Client, database: &str) -> Result<(), ConnectError> {
        let exists = client
            .query_opt("SELECT 1 FROM pg_database WHERE datname = $1", &[&database])
            .await
            .map_err(|e| classify(&e))?
            .is_some();
        if exists {
            return Ok(());
        }

        client
            .batch_execute(&format!("CREATE DATABASE {}", quote_ident(database)))
            .await
            .map_err(|e| classify(&e))?;
        info!(database, "created database");
        Ok(())
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Ends the session. The spawned connection task finishes once the client is gone.
    pub fn close(self) {
        debug!(database = %self.database, "closing connection");
        drop(self.client);
    }
}

fn classify(err: &tokio_postgres::Error) -> ConnectError {
    match err.code() {
        Some(code)
            if *code == SqlState::INVALID_PASSWORD
                || *code == SqlState::INVALID_AUTHORIZATION_SPECIFICATION =>
        {
            ConnectError::AccessDenied
        }
        Some(code) if *code == SqlState::INVALID_CATALOG_NAME => ConnectError::DatabaseMissing,
        _ => ConnectError::Other(err.to_string()),
    }
}

/// Double-quotes an identifier for statements that cannot take bind parameters.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn db_error(context: &str, err: tokio_postgres::Error) -> anyhow::Error {
    match err.as_db_error() {
        Some(db) => anyhow!("{}: {}", context, db.message()),
        None => anyhow!("{}: {}", context, err),
    }
}
