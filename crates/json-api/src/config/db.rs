//! Database Config

use std::path::PathBuf;

use clap::Args;

/// Storage settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string; an in-process store is used when unset
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Apply pending migrations on startup
    #[arg(long, env = "RUN_MIGRATIONS", default_value_t = false)]
    pub run_migrations: bool,

    /// JSON file of products and promotions loaded into the in-process store
    #[arg(long, env = "SEED_FILE")]
    pub seed_file: Option<PathBuf>,
}
