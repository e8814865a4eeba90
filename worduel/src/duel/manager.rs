//! Duel manager: wires the invite ledger, the engine and storage together.

use chrono::{Duration, Utc};
use std::sync::Arc;

use super::{
    errors::{DuelError, DuelResult},
    models::GuessOutcome,
};
use crate::db::{DuelRepository, InMemoryRepository, InviteRepository, SessionRepository};
use crate::game::{
    DuelRules, DuelSession, RoundCount, RoundState, SessionId, SessionStatus,
    constants::MAX_WORD_OPTIONS,
};
use crate::invite::{Invite, InviteId, InviteLedger, InviteLists, InviteResponse};
use crate::stats::{self, LeaderboardEntry, PlayerStats};
use crate::words::{EmbeddedWordList, WordSource};

/// Duel manager
///
/// Every command follows the same shape: load, apply the engine transition
/// to the loaded copy, then write it back with a version check. A lost race
/// surfaces as [`DuelError::ConcurrentModification`]; the manager never
/// retries on the caller's behalf.
#[derive(Clone)]
pub struct DuelManager {
    repo: Arc<dyn DuelRepository>,
    words: Arc<dyn WordSource>,
    ledger: InviteLedger,
}

impl DuelManager {
    /// Create a new duel manager
    ///
    /// # Arguments
    ///
    /// * `repo` - Session and invite storage
    /// * `words` - Candidate words offered to setters
    /// * `rules` - Rules every new session starts with
    ///
    /// # Errors
    ///
    /// Returns `DuelError::InvalidRules` if `rules` fail
    /// [`DuelRules::validate`], e.g. a points curve whose length differs
    /// from `max_attempts`.
    pub fn new(
        repo: Arc<dyn DuelRepository>,
        words: Arc<dyn WordSource>,
        rules: DuelRules,
    ) -> DuelResult<Self> {
        rules.validate().map_err(DuelError::InvalidRules)?;

        Ok(Self {
            repo,
            words,
            ledger: InviteLedger::new(rules),
        })
    }

    /// Manager over a fresh in-memory store and the bundled word list.
    pub fn in_memory(rules: DuelRules) -> DuelResult<Self> {
        Self::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(EmbeddedWordList::new()),
            rules,
        )
    }

    pub fn rules(&self) -> &DuelRules {
        self.ledger.rules()
    }

    /// Challenge `receiver`. `total_rounds` defaults to five.
    pub async fn create_invite(
        &self,
        sender: &str,
        receiver: &str,
        message: Option<String>,
        total_rounds: Option<u32>,
    ) -> DuelResult<Invite> {
        let total_rounds = match total_rounds {
            Some(rounds) => RoundCount::try_from(rounds)?,
            None => RoundCount::default(),
        };

        let invite = self.ledger.propose(
            sender.to_string(),
            receiver.to_string(),
            message,
            total_rounds,
            Utc::now(),
        )?;
        let stored = self.repo.insert_invite(&invite).await?;

        log::info!(
            "Invite {} created: {} challenged {} to {} rounds",
            stored.id,
            sender,
            receiver,
            total_rounds
        );
        Ok(stored)
    }

    /// Receiver accepts or declines an invite.
    ///
    /// Acceptance stores the invite and the new session in one repository
    /// write. The invite's version check makes it happen at most once, and
    /// a failed write leaves the invite pending so the receiver can retry.
    pub async fn resolve_invite(
        &self,
        invite_id: InviteId,
        accept: bool,
        actor: &str,
    ) -> DuelResult<InviteResponse> {
        let invite = self.repo.get_invite(invite_id).await?;
        let response = self.ledger.respond(&invite, accept, actor, Utc::now())?;

        match response {
            InviteResponse::Declined(invite) => {
                let stored = self.repo.update_invite(&invite).await?;
                log::info!("Invite {} declined by {}", invite_id, actor);
                Ok(InviteResponse::Declined(stored))
            }
            InviteResponse::Accepted { invite, session } => {
                let (stored_invite, stored_session) =
                    self.repo.accept_invite(&invite, &session).await?;

                log::info!(
                    "Invite {} accepted by {}, session {} created",
                    invite_id,
                    actor,
                    stored_session.id()
                );
                Ok(InviteResponse::Accepted {
                    invite: stored_invite,
                    session: Box::new(stored_session),
                })
            }
        }
    }

    /// Word-setter of the live round chooses its word.
    pub async fn set_round_word(
        &self,
        session_id: SessionId,
        actor: &str,
        word: &str,
    ) -> DuelResult<RoundState> {
        let mut session = self.repo.get_session(session_id).await?;
        let round = session.set_round_word(actor, word, Utc::now())?.clone();
        self.repo.update_session(&session).await?;

        log::info!(
            "Session {} round {} word set by {}",
            session_id,
            round.round(),
            actor
        );
        Ok(round)
    }

    /// Guesser of the live round submits a guess.
    pub async fn submit_guess(
        &self,
        session_id: SessionId,
        actor: &str,
        guess: &str,
    ) -> DuelResult<GuessOutcome> {
        let mut session = self.repo.get_session(session_id).await?;
        let report = session.submit_guess(actor, guess, Utc::now())?;
        let stored = self.repo.update_session(&session).await?;

        log::debug!(
            "Session {} round {}: {} guessed ({}/{})",
            session_id,
            report.round.round(),
            actor,
            report.round.attempts_used(),
            report.round.max_attempts()
        );
        if report.round_complete {
            log::info!(
                "Session {} round {} finished as {}",
                session_id,
                report.round.round(),
                report.round.outcome()
            );
        }
        if stored.status() == SessionStatus::Completed {
            match stored.winner() {
                Some(winner) => log::info!("Session {} completed, {} wins", session_id, winner),
                None => log::info!("Session {} completed as a draw", session_id),
            }
        }

        Ok(GuessOutcome {
            round: report.round,
            result: report.result,
            round_complete: report.round_complete,
            session: stored,
        })
    }

    /// Load a session as stored.
    pub async fn get_session(&self, session_id: SessionId) -> DuelResult<DuelSession> {
        self.repo.get_session(session_id).await
    }

    /// Candidate words for a setter, `count` clamped to `1..=10`.
    pub fn list_pending_word_options(&self, count: usize) -> Vec<String> {
        self.words.candidates(count.clamp(1, MAX_WORD_OPTIONS))
    }

    /// A participant abandons a session.
    pub async fn forfeit(&self, session_id: SessionId, actor: &str) -> DuelResult<DuelSession> {
        let mut session = self.repo.get_session(session_id).await?;
        session.abandon(actor, Utc::now())?;
        let stored = self.repo.update_session(&session).await?;

        log::info!("Session {} abandoned by {}", session_id, actor);
        Ok(stored)
    }

    /// Invites `player` sent and received, newest first.
    pub async fn list_invites(&self, player: &str) -> DuelResult<InviteLists> {
        let (sent, received) = self
            .repo
            .list_invites_for(player)
            .await?
            .into_iter()
            .partition(|invite| invite.sender_id == player);
        Ok(InviteLists { sent, received })
    }

    /// Sessions `player` takes part in, newest first.
    pub async fn list_sessions(&self, player: &str) -> DuelResult<Vec<DuelSession>> {
        self.repo.list_sessions_for(player).await
    }

    /// Expire every pending invite older than `ttl`.
    ///
    /// An invite answered between listing and expiry is skipped. Returns how
    /// many invites were expired.
    pub async fn expire_stale_invites(&self, ttl: Duration) -> DuelResult<usize> {
        let now = Utc::now();
        let mut expired = 0;

        for invite in self.repo.list_pending_invites().await? {
            if !invite.is_stale(ttl, now) {
                continue;
            }
            let next = self.ledger.expire(&invite, now)?;
            match self.repo.update_invite(&next).await {
                Ok(_) => expired += 1,
                Err(DuelError::ConcurrentModification) => {
                    log::debug!("Invite {} changed during sweep, skipping", invite.id);
                }
                Err(e) => return Err(e),
            }
        }

        if expired > 0 {
            log::info!("Expired {} stale invites", expired);
        }
        Ok(expired)
    }

    /// Stats for one player over their completed duels.
    pub async fn player_stats(&self, player: &str) -> DuelResult<PlayerStats> {
        let sessions = self.repo.list_sessions_for(player).await?;
        Ok(stats::player_stats(player, &sessions))
    }

    /// Top `limit` players across every completed duel.
    pub async fn leaderboard(&self, limit: usize) -> DuelResult<Vec<LeaderboardEntry>> {
        let completed = self
            .repo
            .list_sessions_by_status(SessionStatus::Completed)
            .await?;
        Ok(stats::leaderboard(&completed, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameError;
    use crate::invite::InviteStatus;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn manager() -> DuelManager {
        DuelManager::in_memory(DuelRules::default()).unwrap()
    }

    async fn accepted_session(manager: &DuelManager) -> DuelSession {
        let invite = manager
            .create_invite("alice", "bob", None, Some(3))
            .await
            .unwrap();
        let response = manager.resolve_invite(invite.id, true, "bob").await.unwrap();
        response.session().unwrap().clone()
    }

    #[tokio::test]
    async fn test_create_invite_defaults_to_five_rounds() {
        let manager = manager();
        let invite = manager
            .create_invite("alice", "bob", Some("hi".to_string()), None)
            .await
            .unwrap();
        assert_eq!(invite.total_rounds, RoundCount::Five);
        assert_eq!(invite.status, InviteStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_invite_rejects_unsupported_rounds() {
        let result = manager().create_invite("alice", "bob", None, Some(4)).await;
        assert!(matches!(
            result,
            Err(DuelError::Game(GameError::UnsupportedRoundCount(4)))
        ));
    }

    #[tokio::test]
    async fn test_accept_persists_both_records() {
        let manager = manager();
        let session = accepted_session(&manager).await;

        let stored = manager.get_session(session.id()).await.unwrap();
        assert_eq!(stored.status(), SessionStatus::Waiting);
        assert_eq!(stored.total_rounds(), 3);

        let lists = manager.list_invites("bob").await.unwrap();
        assert!(lists.sent.is_empty());
        assert_eq!(lists.received[0].status, InviteStatus::Accepted);
        assert_eq!(lists.received[0].session_id, Some(session.id()));
    }

    #[tokio::test]
    async fn test_invite_resolves_only_once() {
        let manager = manager();
        let invite = manager.create_invite("alice", "bob", None, None).await.unwrap();
        manager.resolve_invite(invite.id, false, "bob").await.unwrap();

        let again = manager.resolve_invite(invite.id, true, "bob").await;
        assert!(matches!(
            again,
            Err(DuelError::Game(GameError::InviteAlreadyResolved(
                InviteStatus::Declined
            )))
        ));
        assert!(manager.list_sessions("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_guess_flow_updates_storage() {
        let manager = manager();
        let session = accepted_session(&manager).await;

        manager
            .set_round_word(session.id(), "alice", "crane")
            .await
            .unwrap();
        let outcome = manager
            .submit_guess(session.id(), "bob", "CRANE")
            .await
            .unwrap();

        assert!(outcome.round_complete);
        assert_eq!(outcome.round.round(), 1);
        assert_eq!(outcome.session.current_round(), 2);
        assert_eq!(outcome.session.points_for("bob"), 6);
        assert_eq!(outcome.session.version(), 2);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let manager = manager();
        let id = uuid::Uuid::new_v4();
        assert!(matches!(
            manager.get_session(id).await,
            Err(DuelError::SessionNotFound(_))
        ));
        assert!(matches!(
            manager.resolve_invite(id, true, "bob").await,
            Err(DuelError::InviteNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_forfeit() {
        let manager = manager();
        let session = accepted_session(&manager).await;
        let abandoned = manager.forfeit(session.id(), "bob").await.unwrap();
        assert_eq!(abandoned.status(), SessionStatus::Abandoned);
        assert_eq!(abandoned.abandoned_by(), Some("bob"));
    }

    #[tokio::test]
    async fn test_word_options_are_clamped() {
        let manager = manager();
        assert_eq!(manager.list_pending_word_options(0).len(), 1);
        assert_eq!(manager.list_pending_word_options(4).len(), 4);
        assert_eq!(
            manager.list_pending_word_options(100).len(),
            MAX_WORD_OPTIONS
        );
    }

    #[tokio::test]
    async fn test_expire_stale_invites() {
        let manager = manager();
        manager.create_invite("alice", "bob", None, None).await.unwrap();

        assert_eq!(
            manager.expire_stale_invites(Duration::hours(1)).await.unwrap(),
            0
        );
        assert_eq!(
            manager.expire_stale_invites(Duration::zero()).await.unwrap(),
            1
        );
        let lists = manager.list_invites("alice").await.unwrap();
        assert_eq!(lists.sent[0].status, InviteStatus::Expired);
    }

    #[test]
    fn test_mismatched_rules_are_rejected() {
        let rules = DuelRules {
            max_attempts: 3,
            ..DuelRules::default()
        };
        assert!(matches!(
            DuelManager::in_memory(rules),
            Err(DuelError::InvalidRules(_))
        ));
    }

    // ========================================================================
    // Storage failures during acceptance
    // ========================================================================

    /// In-memory storage whose combined accept write fails while `down` is set
    #[derive(Default)]
    struct FlakyRepository {
        inner: InMemoryRepository,
        down: AtomicBool,
    }

    #[async_trait]
    impl SessionRepository for FlakyRepository {
        async fn insert_session(&self, session: &DuelSession) -> DuelResult<DuelSession> {
            self.inner.insert_session(session).await
        }
        async fn get_session(&self, id: SessionId) -> DuelResult<DuelSession> {
            self.inner.get_session(id).await
        }
        async fn update_session(&self, session: &DuelSession) -> DuelResult<DuelSession> {
            self.inner.update_session(session).await
        }
        async fn list_sessions_for(&self, player: &str) -> DuelResult<Vec<DuelSession>> {
            self.inner.list_sessions_for(player).await
        }
        async fn list_sessions_by_status(
            &self,
            status: SessionStatus,
        ) -> DuelResult<Vec<DuelSession>> {
            self.inner.list_sessions_by_status(status).await
        }
    }

    #[async_trait]
    impl InviteRepository for FlakyRepository {
        async fn insert_invite(&self, invite: &Invite) -> DuelResult<Invite> {
            self.inner.insert_invite(invite).await
        }
        async fn get_invite(&self, id: InviteId) -> DuelResult<Invite> {
            self.inner.get_invite(id).await
        }
        async fn update_invite(&self, invite: &Invite) -> DuelResult<Invite> {
            self.inner.update_invite(invite).await
        }
        async fn list_invites_for(&self, player: &str) -> DuelResult<Vec<Invite>> {
            self.inner.list_invites_for(player).await
        }
        async fn list_pending_invites(&self) -> DuelResult<Vec<Invite>> {
            self.inner.list_pending_invites().await
        }
    }

    #[async_trait]
    impl DuelRepository for FlakyRepository {
        async fn accept_invite(
            &self,
            invite: &Invite,
            session: &DuelSession,
        ) -> DuelResult<(Invite, DuelSession)> {
            if self.down.load(Ordering::SeqCst) {
                return Err(DuelError::Database(sqlx::Error::PoolTimedOut));
            }
            self.inner.accept_invite(invite, session).await
        }
    }

    #[tokio::test]
    async fn test_failed_accept_can_be_retried() {
        let repo = Arc::new(FlakyRepository::default());
        let manager = DuelManager::new(
            repo.clone(),
            Arc::new(EmbeddedWordList::new()),
            DuelRules::default(),
        )
        .unwrap();
        let invite = manager.create_invite("alice", "bob", None, None).await.unwrap();

        repo.down.store(true, Ordering::SeqCst);
        let err = manager.resolve_invite(invite.id, true, "bob").await.unwrap_err();
        assert!(matches!(err, DuelError::Database(_)));

        let stored = repo.get_invite(invite.id).await.unwrap();
        assert_eq!(stored.status, InviteStatus::Pending);
        assert_eq!(stored.session_id, None);
        assert_eq!(repo.inner.session_count().await, 0);

        repo.down.store(false, Ordering::SeqCst);
        let response = manager.resolve_invite(invite.id, true, "bob").await.unwrap();
        let session = response.session().unwrap();
        assert_eq!(response.invite().session_id, Some(session.id()));
        assert_eq!(manager.get_session(session.id()).await.unwrap().id(), session.id());
    }
}
