//! # Database Module
//!
//! Insert-only log of completed analyses in PostgreSQL. Each successful
//! wizard run writes one `analyses` row holding the collected answers and
//! the structured result as JSONB, linked to the user who produced it.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use tracing::{debug, info, warn};

use crate::catalog::Flow;
use crate::dialogue::AnswerRecord;
use crate::errors::BotError;
use crate::localization::DEFAULT_LANGUAGE;
use crate::pipeline::GenerationResult;

/// A Telegram user known to the bot
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub language_code: String,
    pub created_at: DateTime<Utc>,
}

/// One persisted analysis
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub id: i64,
    pub user_id: i64,
    pub telegram_id: i64,
    pub flow: String,
    pub input_data: serde_json::Value,
    pub result: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            telegram_id BIGINT UNIQUE NOT NULL,
            language_code TEXT NOT NULL DEFAULT 'ko',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS analyses (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users(id),
            telegram_id BIGINT NOT NULL,
            flow TEXT NOT NULL,
            input_data JSONB NOT NULL,
            result JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create analyses table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS analyses_user_id_idx ON analyses (user_id)")
        .execute(pool)
        .await
        .context("Failed to create analyses index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        telegram_id: row.try_get("telegram_id")?,
        language_code: row.try_get("language_code")?,
        created_at: row.try_get("created_at")?,
    })
}

fn analysis_from_row(row: &PgRow) -> Result<Analysis, sqlx::Error> {
    Ok(Analysis {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        telegram_id: row.try_get("telegram_id")?,
        flow: row.try_get("flow")?,
        input_data: row.try_get("input_data")?,
        result: row.try_get("result")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Return the user for `telegram_id`, creating it on first contact
///
/// The language recorded at creation is kept on later calls.
pub async fn get_or_create_user(
    pool: &PgPool,
    telegram_id: i64,
    language_code: Option<&str>,
) -> Result<User> {
    let language_code = language_code.unwrap_or(DEFAULT_LANGUAGE);

    sqlx::query(
        "INSERT INTO users (telegram_id, language_code) VALUES ($1, $2)
         ON CONFLICT (telegram_id) DO NOTHING",
    )
    .bind(telegram_id)
    .bind(language_code)
    .execute(pool)
    .await
    .context("Failed to insert user")?;

    let row = sqlx::query(
        "SELECT id, telegram_id, language_code, created_at FROM users WHERE telegram_id = $1",
    )
    .bind(telegram_id)
    .fetch_one(pool)
    .await
    .context("Failed to load user")?;

    let user = user_from_row(&row).context("Failed to decode user row")?;
    debug!(user_id = user.id, telegram_id, "User resolved");
    Ok(user)
}

/// Look up a user by Telegram identifier
pub async fn get_user_by_telegram_id(pool: &PgPool, telegram_id: i64) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT id, telegram_id, language_code, created_at FROM users WHERE telegram_id = $1",
    )
    .bind(telegram_id)
    .fetch_optional(pool)
    .await
    .context("Failed to query user")?;

    row.as_ref()
        .map(user_from_row)
        .transpose()
        .context("Failed to decode user row")
}

/// Insert one analysis row and return its id
pub async fn save_analysis(
    pool: &PgPool,
    user_id: i64,
    telegram_id: i64,
    flow: &str,
    input_data: &serde_json::Value,
    result: &serde_json::Value,
) -> Result<i64> {
    let row = sqlx::query(
        "INSERT INTO analyses (user_id, telegram_id, flow, input_data, result)
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(user_id)
    .bind(telegram_id)
    .bind(flow)
    .bind(input_data)
    .bind(result)
    .fetch_one(pool)
    .await
    .context("Failed to insert analysis")?;

    let id: i64 = row.try_get("id").context("Failed to read analysis id")?;
    info!(analysis_id = id, telegram_id, flow, "Analysis saved");
    Ok(id)
}

/// Read an analysis by id
pub async fn read_analysis(pool: &PgPool, analysis_id: i64) -> Result<Option<Analysis>> {
    let row = sqlx::query(
        "SELECT id, user_id, telegram_id, flow, input_data, result, created_at
         FROM analyses WHERE id = $1",
    )
    .bind(analysis_id)
    .fetch_optional(pool)
    .await
    .context("Failed to query analysis")?;

    row.as_ref()
        .map(analysis_from_row)
        .transpose()
        .context("Failed to decode analysis row")
}

/// All analyses of a user, newest first
pub async fn list_analyses_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Analysis>> {
    let rows = sqlx::query(
        "SELECT id, user_id, telegram_id, flow, input_data, result, created_at
         FROM analyses WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list analyses")?;

    rows.iter()
        .map(analysis_from_row)
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to decode analysis rows")
}

/// Write-through log of completed runs
///
/// Without a pool every write is a no-op, so the bot runs without a database.
#[derive(Debug, Clone, Default)]
pub struct AnalysisStore {
    pool: Option<PgPool>,
}

impl AnalysisStore {
    pub fn new(pool: Option<PgPool>) -> Self {
        if pool.is_none() {
            warn!("No database configured; analyses will not be persisted");
        }
        Self { pool }
    }

    pub fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    /// Persist one completed run
    pub async fn record(
        &self,
        telegram_id: i64,
        language_code: Option<&str>,
        flow: &Flow,
        answers: &AnswerRecord,
        result: &GenerationResult,
    ) -> Result<(), BotError> {
        let Some(pool) = &self.pool else {
            debug!(telegram_id, "Skipping persistence: no database");
            return Ok(());
        };

        let user = get_or_create_user(pool, telegram_id, language_code)
            .await
            .map_err(|e| BotError::PersistenceFailed(format!("{e:#}")))?;

        save_analysis(
            pool,
            user.id,
            telegram_id,
            flow.id,
            &answers.to_json(),
            &result.to_json(flow),
        )
        .await
        .map_err(|e| BotError::PersistenceFailed(format!("{e:#}")))?;

        Ok(())
    }
}
