//! User Store - schema bootstrap and inspection for the user/group database.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use user_store_lib::config::UserStoreConfig;
use user_store_lib::infra::Database;
use user_store_lib::{MigrateAction, SchemaCommand};

#[derive(Parser)]
#[command(name = "user-store")]
#[command(about = "User and group data store")]
struct Cli {
    /// Database URL (overrides USER_STORE_DATABASE_URL / DATABASE_URL)
    #[arg(long, global = true, env = "USER_STORE_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop and recreate the whole schema
    Setup,
    /// Drop the whole schema
    Drop,
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
    /// Check database connectivity
    Ping,
    /// Print a user with its group as JSON
    ShowUser { username: String },
    /// Print a group with its users as JSON
    ShowGroup { id: Uuid },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = UserStoreConfig::from_env();
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }

    // Initialize tracing
    let default_filter = config.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Setup => {
            let store = user_store_lib::connect_without_migrations(&config).await?;
            let status = user_store_lib::run_schema_command(&store, SchemaCommand::Setup).await?;
            println!("{}", status);
        }
        Commands::Drop => {
            let store = user_store_lib::connect_without_migrations(&config).await?;
            let status = user_store_lib::run_schema_command(&store, SchemaCommand::Drop).await?;
            println!("{}", status);
        }
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            for line in user_store_lib::run_migrations(&config, migrate_action).await? {
                println!("{}", line);
            }
        }
        Commands::Ping => {
            let db = Database::connect_without_migrations(&config.database).await?;
            db.ping().await?;
            println!("Database reachable");
        }
        Commands::ShowUser { username } => {
            let store = user_store_lib::connect(&config).await?;
            println!("{}", user_store_lib::describe_user(&store, &username).await?);
        }
        Commands::ShowGroup { id } => {
            let store = user_store_lib::connect(&config).await?;
            println!("{}", user_store_lib::describe_group(&store, id).await?);
        }
    }

    Ok(())
}
