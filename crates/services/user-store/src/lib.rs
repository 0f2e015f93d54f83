//! User Store Library
//!
//! Data access for users and groups on top of SeaORM, plus the schema
//! bootstrap commands used by the `user-store` binary.

pub mod config;
pub mod infra;
pub mod repository;

use tracing::info;
use uuid::Uuid;

use common::{StoreError, StoreResult};

use crate::config::UserStoreConfig;
use crate::infra::Database;
use crate::repository::{UserGroupRepository, UserGroupStore};

pub use repository::{DROP_COMPLETED, SETUP_COMPLETED};

/// Open the pool, apply pending migrations and build the store.
pub async fn connect(config: &UserStoreConfig) -> StoreResult<UserGroupStore> {
    let db = Database::connect(&config.database).await?;
    Ok(UserGroupStore::new(db.get_connection()))
}

/// Open the pool without touching the schema.
pub async fn connect_without_migrations(config: &UserStoreConfig) -> StoreResult<UserGroupStore> {
    let db = Database::connect_without_migrations(&config.database).await?;
    Ok(UserGroupStore::new(db.get_connection()))
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: &UserStoreConfig,
    action: MigrateAction,
) -> StoreResult<Vec<String>> {
    let db = Database::connect_without_migrations(&config.database).await?;
    migrate(&db, action).await
}

/// Apply a migration action on an open pool.
///
/// Only `Status` produces output, one `[x]`/`[ ]` line per migration.
pub async fn migrate(db: &Database, action: MigrateAction) -> StoreResult<Vec<String>> {
    let mut lines = Vec::new();

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            for (name, applied) in db.migration_status().await? {
                let marker = if applied { "[x]" } else { "[ ]" };
                lines.push(format!("{} {}", marker, name));
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(lines)
}

/// Migration action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Explicit schema bootstrap commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaCommand {
    Setup,
    Drop,
}

/// Run a destructive schema command and return its status line.
pub async fn run_schema_command(
    repo: &dyn UserGroupRepository,
    command: SchemaCommand,
) -> StoreResult<String> {
    match command {
        SchemaCommand::Setup => repo.setup().await,
        SchemaCommand::Drop => repo.drop_schema().await,
    }
}

/// Render a user with its group as pretty JSON.
pub async fn describe_user(repo: &dyn UserGroupRepository, username: &str) -> StoreResult<String> {
    let details = repo.get_user(username).await?;
    to_json(&details)
}

/// Render a group with its users as pretty JSON.
pub async fn describe_group(repo: &dyn UserGroupRepository, id: Uuid) -> StoreResult<String> {
    let details = repo.get_group(id).await?;
    to_json(&details)
}

fn to_json<T: serde::Serialize>(value: &T) -> StoreResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| StoreError::internal(format!("JSON encoding failed: {}", e)))
}
