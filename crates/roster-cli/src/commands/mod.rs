//! CLI subcommands

pub mod add;
pub mod list;
pub mod watch;

use clap::Args;
use roster_store::config::DEFAULT_DB_PATH;
use roster_store::{MigrationPolicy, PersonStore, StoreConfig};
use std::path::PathBuf;

/// Store options shared by every subcommand
#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Path to the SQLite database
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Drop stored records when the schema no longer matches
    #[arg(long)]
    pub destructive_migrations: bool,
}

impl StoreArgs {
    pub fn config(&self) -> StoreConfig {
        let policy = if self.destructive_migrations {
            MigrationPolicy::Destructive
        } else {
            MigrationPolicy::Strict
        };
        StoreConfig::file(&self.db).with_migration_policy(policy)
    }

    pub fn open(&self) -> Result<PersonStore, Box<dyn std::error::Error>> {
        Ok(PersonStore::open(self.config())?)
    }
}
