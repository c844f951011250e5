//! Server configuration.
//!
//! Every flag can also be set through a `FEEDBACK_*` environment variable and
//! has a default, so `feedback-widget serve` works without any setup.

use std::path::PathBuf;

use clap::Args;

use crate::db::Database;

/// Path the feedback API is mounted at.
pub const API_BASE: &str = "/api/feedback";

#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to
    #[arg(long, env = "FEEDBACK_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port for the HTTP API
    #[arg(short, long, env = "FEEDBACK_PORT", default_value = "3000")]
    pub port: u16,

    /// SQLite database file (defaults to the platform data directory)
    #[arg(long, env = "FEEDBACK_DATABASE")]
    pub database: Option<PathBuf>,

    /// Allow cross-origin requests so the widget can be embedded on other sites
    #[arg(long, env = "FEEDBACK_CORS")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database: None,
            cors: false,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open and migrate the configured database.
    pub fn open_database(&self) -> anyhow::Result<Database> {
        let db = match &self.database {
            Some(path) => Database::open(path)?,
            None => Database::open_default()?,
        };
        db.migrate()?;
        Ok(db)
    }
}
