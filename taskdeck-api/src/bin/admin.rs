//! taskdeck-admin: database maintenance for TaskDeck
//!
//! Usage:
//!   taskdeck-admin migrate            # Apply pending migrations
//!   taskdeck-admin migrate --create   # Create the database first if missing
//!   taskdeck-admin status             # Show applied vs. embedded migrations
//!   taskdeck-admin prune-sessions     # Delete expired sessions
//!   taskdeck-admin reset-auth --yes   # Sign everyone out and unlink Google accounts
//!   taskdeck-admin reset-all --yes    # Delete all data

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use taskdeck_shared::db::{
    migrations::{ensure_database_exists, get_migration_status, run_migrations},
    pool::{close_pool, create_pool, DatabaseConfig},
    reset::{reset_all, reset_auth, ResetReport},
};
use taskdeck_shared::models::session::Session;

#[derive(Parser)]
#[command(name = "taskdeck-admin")]
#[command(about = "Database maintenance for TaskDeck")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Migrate {
        /// Create the database if it does not exist
        #[arg(long)]
        create: bool,
    },

    /// Show migration status
    Status,

    /// Delete sessions past their expiry
    PruneSessions,

    /// Delete all sessions and linked accounts
    ResetAuth {
        /// Skip the safety check
        #[arg(long)]
        yes: bool,
    },

    /// Delete calendar events, tasks, projects, sessions, accounts and users
    ResetAll {
        /// Skip the safety check
        #[arg(long)]
        yes: bool,
    },
}

fn print_report(report: &ResetReport) {
    println!("calendar events: {}", report.calendar_events);
    println!("tasks:           {}", report.tasks);
    println!("projects:        {}", report.projects);
    println!("sessions:        {}", report.sessions);
    println!("accounts:        {}", report.accounts);
    println!("users:           {}", report.users);
    println!("total:           {}", report.total());
}

fn require_confirmation(yes: bool, what: &str) -> Result<()> {
    if !yes {
        bail!("refusing to {} without --yes", what);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("taskdeck_shared={}", level).into()),
        )
        .init();

    let url = cli
        .database_url
        .context("DATABASE_URL must be set or passed with --database-url")?;

    if let Commands::Migrate { create: true } = cli.command {
        ensure_database_exists(&url)
            .await
            .context("Failed to create the database")?;
    }

    let pool = create_pool(DatabaseConfig {
        url,
        max_connections: 2,
        ..Default::default()
    })
    .await
    .context("Failed to connect to the database")?;

    match cli.command {
        Commands::Migrate { .. } => {
            run_migrations(&pool).await.context("Migration failed")?;
            let status = get_migration_status(&pool).await?;
            println!(
                "Database is up to date ({} migrations applied)",
                status.applied_migrations
            );
        }
        Commands::Status => {
            let status = get_migration_status(&pool).await?;
            println!("applied: {}", status.applied_migrations);
            println!("known:   {}", status.known_migrations);
            match status.latest_version {
                Some(version) => println!("latest:  {}", version),
                None => println!("latest:  none"),
            }
            if !status.is_up_to_date() {
                println!("Pending migrations; run `taskdeck-admin migrate`");
            }
        }
        Commands::PruneSessions => {
            let removed = Session::delete_expired(&pool).await?;
            println!("Removed {} expired sessions", removed);
        }
        Commands::ResetAuth { yes } => {
            require_confirmation(yes, "delete all sessions and accounts")?;
            let report = reset_auth(&pool).await.context("Auth reset failed")?;
            println!("Authentication data reset. Users must sign in with Google again.");
            print_report(&report);
        }
        Commands::ResetAll { yes } => {
            require_confirmation(yes, "delete all data")?;
            let report = reset_all(&pool).await.context("Reset failed")?;
            println!("All data deleted.");
            print_report(&report);
        }
    }

    close_pool(pool).await;
    Ok(())
}
