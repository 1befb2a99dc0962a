//! Mentora CLI — application entry point.
//!
//! Administrative commands: schema migration, the batch detectors
//! (inactivity, unmatched requests), and the completion sweep.
//! Findings are logged; notification dispatch requires the external
//! integrations a deployment wires in.

mod stubs;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mentora_core::error::{MentoraError, MentoraResult};
use mentora_db::repository::{SurrealRequestRepository, SurrealSessionRepository};
use mentora_db::{DbConfig, DbManager};
use mentora_match::RequestService;
use mentora_reports::{InactivityDetector, UnmatchedDetector};

use crate::stubs::{NullChat, NullDirectory};

#[derive(Parser)]
#[command(name = "mentora", about = "Mentora mentorship administration")]
struct Cli {
    /// SurrealDB WebSocket URL.
    #[arg(long, env = "MENTORA_DB_URL", default_value = "127.0.0.1:8000")]
    db_url: String,

    /// SurrealDB namespace.
    #[arg(long, env = "MENTORA_DB_NAMESPACE", default_value = "mentora")]
    db_namespace: String,

    /// SurrealDB database name.
    #[arg(long, env = "MENTORA_DB_NAME", default_value = "main")]
    db_name: String,

    /// SurrealDB root username.
    #[arg(long, env = "MENTORA_DB_USER", default_value = "root")]
    db_user: String,

    /// SurrealDB root password.
    #[arg(long, env = "MENTORA_DB_PASS", default_value = "root")]
    db_pass: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Flag matched engagements with no recently logged session.
    ScanInactive,
    /// Flag open requests older than the age threshold.
    ScanUnmatched {
        #[arg(long, default_value_t = 24)]
        age_threshold_hours: i64,
    },
    /// Complete matched requests whose engagement window elapsed.
    CompleteDue,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("mentora=info".parse().unwrap()),
        )
        .json()
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        tracing::error!(error = %err, "command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> MentoraResult<()> {
    let config = DbConfig {
        url: cli.db_url,
        namespace: cli.db_namespace,
        database: cli.db_name,
        username: cli.db_user,
        password: cli.db_pass,
    };
    let manager = DbManager::connect(&config)
        .await
        .map_err(|e| MentoraError::Database(e.to_string()))?;
    let db = manager.client().clone();

    match cli.command {
        Command::Migrate => {
            mentora_db::run_migrations(&db).await?;
            info!("migrations applied");
        }
        Command::ScanInactive => {
            let detector = InactivityDetector::new(
                SurrealRequestRepository::new(db.clone()),
                SurrealSessionRepository::new(db),
            );
            let inactive = detector.find_inactive(Utc::now()).await?;
            info!(count = inactive.len(), "inactivity scan finished");
            for engagement in &inactive {
                info!(
                    request_id = %engagement.request.id,
                    title = %engagement.request.title,
                    threshold = %engagement.threshold,
                    "engagement inactive"
                );
            }
        }
        Command::ScanUnmatched {
            age_threshold_hours,
        } => {
            let detector = UnmatchedDetector::new(SurrealRequestRepository::new(db));
            let stale = detector
                .find_unmatched(age_threshold_hours, Utc::now())
                .await?;
            info!(
                count = stale.len(),
                age_threshold_hours, "unmatched scan finished"
            );
            for request in &stale {
                info!(
                    request_id = %request.id,
                    title = %request.title,
                    created_at = %request.created_at,
                    "request unmatched"
                );
            }
        }
        Command::CompleteDue => {
            let service = RequestService::new(
                SurrealRequestRepository::new(db),
                NullDirectory,
                NullChat,
            );
            let completed = service.complete_due_requests(Utc::now()).await?;
            info!(count = completed.len(), "completion sweep finished");
        }
    }

    Ok(())
}
