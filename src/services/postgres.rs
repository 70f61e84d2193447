use crate::models::{MatchPairing, MatchRecord, PlayerId, RoundMatch};
use crate::services::sources::{ConflictProvider, HistoryProvider, PlayerDirectory};
use chrono::NaiveDate;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Columns of a stored pairing joined with the player and creator names
const PAIRING_COLUMNS: &str = r#"
    mp.id, mp.session_date, mp.match_number,
    mp.player1_id, COALESCE(p1.name, 'Unknown') AS player1_name,
    mp.player2_id, COALESCE(p2.name, 'Unknown') AS player2_name,
    mp.created_by, COALESCE(pc.name, 'Unknown') AS created_by_name,
    mp.created_at, mp.updated_at
"#;

const PAIRING_JOINS: &str = r#"
    LEFT JOIN players p1 ON p1.id = mp.player1_id
    LEFT JOIN players p2 ON p2.id = mp.player2_id
    LEFT JOIN players pc ON pc.id = mp.created_by
"#;

/// PostgreSQL client
///
/// Reads match history and the player roster for the pairing engine and
/// stores the pairings an organizer decides to keep. Match results and
/// players are owned by the wider tracker; this service only reads them.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Client over a pool that connects on first use; no migrations are run
    #[cfg(test)]
    pub(crate) fn lazy(database_url: &str) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new().max_connections(1).connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Stored pairings for a session date, ordered by round
    pub async fn pairings_by_date(&self, session_date: NaiveDate) -> Result<Vec<MatchPairing>, PostgresError> {
        let query = format!(
            "SELECT {PAIRING_COLUMNS} FROM match_pairings mp {PAIRING_JOINS}
             WHERE mp.session_date = $1
             ORDER BY mp.match_number ASC, mp.id ASC"
        );

        let rows = sqlx::query(&query).bind(session_date).fetch_all(&self.pool).await?;
        let pairings = rows.iter().map(pairing_from_row).collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(pairings)
    }

    /// Stored pairings for one round of a session
    pub async fn pairings_by_round(
        &self,
        session_date: NaiveDate,
        match_number: i32,
    ) -> Result<Vec<MatchPairing>, PostgresError> {
        let query = format!(
            "SELECT {PAIRING_COLUMNS} FROM match_pairings mp {PAIRING_JOINS}
             WHERE mp.session_date = $1 AND mp.match_number = $2
             ORDER BY mp.id ASC"
        );

        let rows = sqlx::query(&query)
            .bind(session_date)
            .bind(match_number)
            .fetch_all(&self.pool)
            .await?;
        let pairings = rows.iter().map(pairing_from_row).collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(pairings)
    }

    /// Whether any pairing is stored for the round
    pub async fn pairings_exist(&self, session_date: NaiveDate, match_number: i32) -> Result<bool, PostgresError> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM match_pairings WHERE session_date = $1 AND match_number = $2) AS present",
        )
        .bind(session_date)
        .bind(match_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("present")?)
    }

    /// Store one pairing
    pub async fn create_pairing(
        &self,
        session_date: NaiveDate,
        match_number: i32,
        player1_id: PlayerId,
        player2_id: PlayerId,
        created_by: Option<PlayerId>,
    ) -> Result<MatchPairing, PostgresError> {
        if player1_id == player2_id {
            return Err(PostgresError::InvalidInput(format!(
                "player {player1_id} cannot be paired with themselves"
            )));
        }

        let query = insert_pairing_query();
        let row = sqlx::query(&query)
            .bind(session_date)
            .bind(match_number)
            .bind(player1_id)
            .bind(player2_id)
            .bind(created_by)
            .fetch_one(&self.pool)
            .await?;

        let pairing = pairing_from_row(&row)?;
        tracing::debug!(
            "Stored pairing {} for {} round {}: {} vs {}",
            pairing.id,
            session_date,
            match_number,
            player1_id,
            player2_id
        );

        Ok(pairing)
    }

    /// Replace every stored pairing of a round in one transaction
    pub async fn replace_round_pairings(
        &self,
        session_date: NaiveDate,
        match_number: i32,
        pairs: &[(PlayerId, PlayerId, Option<PlayerId>)],
    ) -> Result<Vec<MatchPairing>, PostgresError> {
        if let Some((player, _, _)) = pairs.iter().find(|(a, b, _)| a == b) {
            return Err(PostgresError::InvalidInput(format!(
                "player {player} cannot be paired with themselves"
            )));
        }

        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM match_pairings WHERE session_date = $1 AND match_number = $2")
            .bind(session_date)
            .bind(match_number)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let query = insert_pairing_query();
        let mut stored = Vec::with_capacity(pairs.len());
        for &(player1_id, player2_id, created_by) in pairs {
            let row = sqlx::query(&query)
                .bind(session_date)
                .bind(match_number)
                .bind(player1_id)
                .bind(player2_id)
                .bind(created_by)
                .fetch_one(&mut *tx)
                .await?;
            stored.push(pairing_from_row(&row)?);
        }

        tx.commit().await?;

        tracing::info!(
            "Replaced pairings for {} round {}: removed {}, stored {}",
            session_date,
            match_number,
            removed,
            stored.len()
        );

        Ok(stored)
    }

    /// Delete a stored pairing, returning the round it belonged to
    pub async fn delete_pairing(&self, id: i64) -> Result<(NaiveDate, i32), PostgresError> {
        let row = sqlx::query("DELETE FROM match_pairings WHERE id = $1 RETURNING session_date, match_number")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok((row.try_get("session_date")?, row.try_get("match_number")?)),
            None => Err(PostgresError::NotFound(format!("match pairing {id}"))),
        }
    }

    /// Delete all stored pairings of a round
    pub async fn delete_round_pairings(&self, session_date: NaiveDate, match_number: i32) -> Result<u64, PostgresError> {
        let result = sqlx::query("DELETE FROM match_pairings WHERE session_date = $1 AND match_number = $2")
            .bind(session_date)
            .bind(match_number)
            .execute(&self.pool)
            .await?;

        tracing::info!(
            "Deleted {} pairings for {} round {}",
            result.rows_affected(),
            session_date,
            match_number
        );

        Ok(result.rows_affected())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

impl HistoryProvider for PostgresClient {
    async fn recent_matches(
        &self,
        participant_ids: &[PlayerId],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MatchRecord>, PostgresError> {
        let query = r#"
            SELECT match_date,
                   LEAST(player1_id, player2_id) AS player_a,
                   GREATEST(player1_id, player2_id) AS player_b
            FROM matches
            WHERE match_date >= $1 AND match_date < $2
              AND player1_id = ANY($3) AND player2_id = ANY($3)
            ORDER BY match_date DESC
        "#;

        let rows = sqlx::query(query)
            .bind(from)
            .bind(to)
            .bind(participant_ids)
            .fetch_all(&self.pool)
            .await?;

        let records = rows
            .iter()
            .map(|row| {
                Ok(MatchRecord {
                    match_date: row.try_get("match_date")?,
                    player_a: row.try_get("player_a")?,
                    player_b: row.try_get("player_b")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        tracing::debug!("Loaded {} history rows between {} and {}", records.len(), from, to);

        Ok(records)
    }
}

impl ConflictProvider for PostgresClient {
    async fn matches_on(&self, session_date: NaiveDate) -> Result<Vec<RoundMatch>, PostgresError> {
        let query = r#"
            SELECT match_number, player1_id, player2_id
            FROM matches
            WHERE match_date = $1
        "#;

        let rows = sqlx::query(query).bind(session_date).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                Ok(RoundMatch {
                    match_number: row.try_get("match_number")?,
                    player_a: row.try_get("player1_id")?,
                    player_b: row.try_get("player2_id")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(Into::into)
    }
}

impl PlayerDirectory for PostgresClient {
    async fn player_names(&self, player_ids: &[PlayerId]) -> Result<HashMap<PlayerId, String>, PostgresError> {
        if player_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query("SELECT id, name FROM players WHERE id = ANY($1) AND deleted_at IS NULL")
            .bind(player_ids)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Ok((row.try_get("id")?, row.try_get("name")?)))
            .collect::<Result<HashMap<_, _>, sqlx::Error>>()
            .map_err(Into::into)
    }
}

fn insert_pairing_query() -> String {
    format!(
        "WITH mp AS (
             INSERT INTO match_pairings (session_date, match_number, player1_id, player2_id, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *
         )
         SELECT {PAIRING_COLUMNS} FROM mp {PAIRING_JOINS}"
    )
}

fn pairing_from_row(row: &PgRow) -> Result<MatchPairing, sqlx::Error> {
    Ok(MatchPairing {
        id: row.try_get("id")?,
        session_date: row.try_get("session_date")?,
        match_number: row.try_get("match_number")?,
        player1_id: row.try_get("player1_id")?,
        player1_name: row.try_get("player1_name")?,
        player2_id: row.try_get("player2_id")?,
        player2_name: row.try_get("player2_name")?,
        created_by: row.try_get("created_by")?,
        created_by_name: row.try_get("created_by_name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
