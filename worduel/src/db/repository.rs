//! Repository trait definitions for testability and dependency injection.
//!
//! Every record carries a `version`. `update_*` succeeds only when the
//! caller's copy has the stored version, then bumps it; anything else is a
//! [`DuelError::ConcurrentModification`] and the caller must reload.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow, types::Json};

use crate::duel::{DuelError, DuelResult};
use crate::game::{DuelSession, SessionId, SessionStatus};
use crate::invite::{Invite, InviteId};

/// Trait for duel session storage
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new session; the returned copy carries version 0
    async fn insert_session(&self, session: &DuelSession) -> DuelResult<DuelSession>;

    /// Load a session by ID
    async fn get_session(&self, id: SessionId) -> DuelResult<DuelSession>;

    /// Compare-and-swap on version; returns the stored copy
    async fn update_session(&self, session: &DuelSession) -> DuelResult<DuelSession>;

    /// Sessions where `player` is either participant, newest first
    async fn list_sessions_for(&self, player: &str) -> DuelResult<Vec<DuelSession>>;

    /// Sessions in the given status, newest first
    async fn list_sessions_by_status(&self, status: SessionStatus)
    -> DuelResult<Vec<DuelSession>>;
}

/// Trait for invite storage
#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Store a new invite; the returned copy carries version 0
    async fn insert_invite(&self, invite: &Invite) -> DuelResult<Invite>;

    /// Load an invite by ID
    async fn get_invite(&self, id: InviteId) -> DuelResult<Invite>;

    /// Compare-and-swap on version; returns the stored copy
    async fn update_invite(&self, invite: &Invite) -> DuelResult<Invite>;

    /// Invites sent or received by `player`, newest first
    async fn list_invites_for(&self, player: &str) -> DuelResult<Vec<Invite>>;

    /// All invites still waiting for an answer, oldest first
    async fn list_pending_invites(&self) -> DuelResult<Vec<Invite>>;
}

/// Storage for both record kinds, plus the one write that spans them
#[async_trait]
pub trait DuelRepository: SessionRepository + InviteRepository {
    /// Store an accepted invite together with the session it created.
    ///
    /// The invite is compare-and-swapped as by
    /// [`InviteRepository::update_invite`] and the session inserted as by
    /// [`SessionRepository::insert_session`]. Both are written or neither
    /// is: on any error the stored invite is left pending.
    async fn accept_invite(
        &self,
        invite: &Invite,
        session: &DuelSession,
    ) -> DuelResult<(Invite, DuelSession)>;
}

/// PostgreSQL implementation of the repositories
#[derive(Clone)]
pub struct PgDuelRepository {
    pool: PgPool,
}

impl PgDuelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn session_from_row(row: &PgRow) -> DuelResult<DuelSession> {
    let Json(mut session): Json<DuelSession> = row.try_get("document")?;
    session.set_version(row.try_get::<i64, _>("version")? as u64);
    Ok(session)
}

fn invite_from_row(row: &PgRow) -> DuelResult<Invite> {
    let Json(mut invite): Json<Invite> = row.try_get("document")?;
    invite.version = row.try_get::<i64, _>("version")? as u64;
    Ok(invite)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn insert_error(err: sqlx::Error) -> DuelError {
    if is_unique_violation(&err) {
        DuelError::ConcurrentModification
    } else {
        DuelError::Database(err)
    }
}

async fn insert_session_on(
    conn: &mut PgConnection,
    session: &DuelSession,
) -> DuelResult<DuelSession> {
    let mut stored = session.clone();
    stored.set_version(0);

    sqlx::query(
        r#"
        INSERT INTO duel_sessions (id, player_a, player_b, status, document, version, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, 0, $6, $7)
        "#,
    )
    .bind(stored.id())
    .bind(stored.player_a())
    .bind(stored.player_b())
    .bind(stored.status().to_string())
    .bind(Json(&stored))
    .bind(stored.created_at())
    .bind(stored.updated_at())
    .execute(&mut *conn)
    .await
    .map_err(insert_error)?;

    Ok(stored)
}

async fn update_invite_on(conn: &mut PgConnection, invite: &Invite) -> DuelResult<Invite> {
    let expected = invite.version;
    let mut stored = invite.clone();
    stored.version = expected + 1;

    let result = sqlx::query(
        r#"
        UPDATE duel_invites
        SET status = $1, document = $2, version = $3, updated_at = NOW()
        WHERE id = $4 AND version = $5
        "#,
    )
    .bind(stored.status.to_string())
    .bind(Json(&stored))
    .bind(stored.version as i64)
    .bind(stored.id)
    .bind(expected as i64)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        // Version moved, or the invite is gone
        let exists = sqlx::query("SELECT 1 FROM duel_invites WHERE id = $1")
            .bind(stored.id)
            .fetch_optional(&mut *conn)
            .await?;
        return Err(match exists {
            Some(_) => DuelError::ConcurrentModification,
            None => DuelError::InviteNotFound(stored.id),
        });
    }

    Ok(stored)
}

#[async_trait]
impl SessionRepository for PgDuelRepository {
    async fn insert_session(&self, session: &DuelSession) -> DuelResult<DuelSession> {
        let mut conn = self.pool.acquire().await?;
        insert_session_on(&mut conn, session).await
    }

    async fn get_session(&self, id: SessionId) -> DuelResult<DuelSession> {
        let row = sqlx::query("SELECT document, version FROM duel_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DuelError::SessionNotFound(id))?;

        session_from_row(&row)
    }

    async fn update_session(&self, session: &DuelSession) -> DuelResult<DuelSession> {
        let expected = session.version();
        let mut stored = session.clone();
        stored.set_version(expected + 1);

        let result = sqlx::query(
            r#"
            UPDATE duel_sessions
            SET status = $1, document = $2, version = $3, updated_at = $4
            WHERE id = $5 AND version = $6
            "#,
        )
        .bind(stored.status().to_string())
        .bind(Json(&stored))
        .bind(stored.version() as i64)
        .bind(stored.updated_at())
        .bind(stored.id())
        .bind(expected as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM duel_sessions WHERE id = $1")
                .bind(stored.id())
                .fetch_optional(&self.pool)
                .await?;
            return Err(match exists {
                Some(_) => DuelError::ConcurrentModification,
                None => DuelError::SessionNotFound(stored.id()),
            });
        }

        Ok(stored)
    }

    async fn list_sessions_for(&self, player: &str) -> DuelResult<Vec<DuelSession>> {
        let rows = sqlx::query(
            r#"
            SELECT document, version FROM duel_sessions
            WHERE player_a = $1 OR player_b = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(player)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(session_from_row).collect()
    }

    async fn list_sessions_by_status(
        &self,
        status: SessionStatus,
    ) -> DuelResult<Vec<DuelSession>> {
        let rows = sqlx::query(
            "SELECT document, version FROM duel_sessions WHERE status = $1 ORDER BY created_at DESC",
        )
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(session_from_row).collect()
    }
}

#[async_trait]
impl InviteRepository for PgDuelRepository {
    async fn insert_invite(&self, invite: &Invite) -> DuelResult<Invite> {
        let mut stored = invite.clone();
        stored.version = 0;

        sqlx::query(
            r#"
            INSERT INTO duel_invites (id, sender_id, receiver_id, status, document, version, created_at)
            VALUES ($1, $2, $3, $4, $5, 0, $6)
            "#,
        )
        .bind(stored.id)
        .bind(&stored.sender_id)
        .bind(&stored.receiver_id)
        .bind(stored.status.to_string())
        .bind(Json(&stored))
        .bind(stored.created_at)
        .execute(&self.pool)
        .await
        .map_err(insert_error)?;

        Ok(stored)
    }

    async fn get_invite(&self, id: InviteId) -> DuelResult<Invite> {
        let row = sqlx::query("SELECT document, version FROM duel_invites WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DuelError::InviteNotFound(id))?;

        invite_from_row(&row)
    }

    async fn update_invite(&self, invite: &Invite) -> DuelResult<Invite> {
        let mut conn = self.pool.acquire().await?;
        update_invite_on(&mut conn, invite).await
    }

    async fn list_invites_for(&self, player: &str) -> DuelResult<Vec<Invite>> {
        let rows = sqlx::query(
            r#"
            SELECT document, version FROM duel_invites
            WHERE sender_id = $1 OR receiver_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(player)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(invite_from_row).collect()
    }

    async fn list_pending_invites(&self) -> DuelResult<Vec<Invite>> {
        let rows = sqlx::query(
            "SELECT document, version FROM duel_invites WHERE status = 'pending' ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(invite_from_row).collect()
    }
}

#[async_trait]
impl DuelRepository for PgDuelRepository {
    async fn accept_invite(
        &self,
        invite: &Invite,
        session: &DuelSession,
    ) -> DuelResult<(Invite, DuelSession)> {
        // Dropping the transaction on an early return rolls it back
        let mut tx = self.pool.begin().await?;

        let stored_invite = update_invite_on(&mut tx, invite).await?;
        let stored_session = insert_session_on(&mut tx, session).await?;

        tx.commit().await?;
        Ok((stored_invite, stored_session))
    }
}
