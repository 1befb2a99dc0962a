//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs, calendar dates, and times of day are stored as strings
//! (ISO formats, so lexicographic order matches chronological
//! order). Enums are stored as strings with ASSERT constraints.
//! The uniqueness invariants of the domain (one session per request
//! and date, one rating per session and author) are UNIQUE indexes
//! here.

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, Deserialize)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Mentorship requests (root entity)
-- =======================================================================
DEFINE TABLE request SCHEMAFULL;
DEFINE FIELD creator_id ON TABLE request TYPE string;
DEFINE FIELD mentor_id ON TABLE request TYPE option<string>;
DEFINE FIELD mentee_id ON TABLE request TYPE option<string>;
DEFINE FIELD title ON TABLE request TYPE string;
DEFINE FIELD description ON TABLE request TYPE string;
DEFINE FIELD kind ON TABLE request TYPE string \
    ASSERT $value IN ['SeekingMentor', 'SeekingMentee'];
DEFINE FIELD status ON TABLE request TYPE string \
    ASSERT $value IN ['Open', 'Matched', 'Completed', 'Cancelled'];
DEFINE FIELD cancel_reason ON TABLE request TYPE option<string>;
DEFINE FIELD match_date ON TABLE request TYPE option<datetime>;
DEFINE FIELD duration_months ON TABLE request TYPE float;
DEFINE FIELD pairing ON TABLE request TYPE object;
DEFINE FIELD pairing.start_time ON TABLE request TYPE string;
DEFINE FIELD pairing.end_time ON TABLE request TYPE string;
DEFINE FIELD pairing.days ON TABLE request TYPE array;
DEFINE FIELD pairing.days.* ON TABLE request TYPE string \
    ASSERT $value IN ['monday', 'tuesday', 'wednesday', 'thursday', \
    'friday', 'saturday', 'sunday'];
DEFINE FIELD pairing.timezone ON TABLE request TYPE string;
DEFINE FIELD interested ON TABLE request TYPE array DEFAULT [];
DEFINE FIELD interested.* ON TABLE request TYPE string;
DEFINE FIELD created_at ON TABLE request TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE request TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_request_status ON TABLE request COLUMNS status;
DEFINE INDEX idx_request_creator ON TABLE request COLUMNS creator_id;

-- =======================================================================
-- Logged sessions (owned by a request)
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD request_id ON TABLE session TYPE string;
DEFINE FIELD date ON TABLE session TYPE string;
DEFINE FIELD start_time ON TABLE session TYPE string;
DEFINE FIELD end_time ON TABLE session TYPE string;
DEFINE FIELD mentee_approval ON TABLE session TYPE string \
    ASSERT $value IN ['Unset', 'Approved', 'Rejected'];
DEFINE FIELD mentee_logged_at ON TABLE session TYPE option<datetime>;
DEFINE FIELD mentor_approval ON TABLE session TYPE string \
    ASSERT $value IN ['Unset', 'Approved', 'Rejected'];
DEFINE FIELD mentor_logged_at ON TABLE session TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_session_request_date ON TABLE session \
    COLUMNS request_id, date UNIQUE;
DEFINE INDEX idx_session_request ON TABLE session COLUMNS request_id;

-- =======================================================================
-- Session ratings (one per session and author)
-- =======================================================================
DEFINE TABLE rating SCHEMAFULL;
DEFINE FIELD session_id ON TABLE rating TYPE string;
DEFINE FIELD author_id ON TABLE rating TYPE string;
DEFINE FIELD scores ON TABLE rating TYPE object FLEXIBLE;
DEFINE FIELD scale ON TABLE rating TYPE int;
DEFINE FIELD created_at ON TABLE rating TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_rating_session_author ON TABLE rating \
    COLUMNS session_id, author_id UNIQUE;
DEFINE INDEX idx_rating_author ON TABLE rating COLUMNS author_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
