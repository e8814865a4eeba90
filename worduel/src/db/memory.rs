//! In-process repository backed by hash maps.
//!
//! Used by tests and by the server's `memory` storage backend. Versioning
//! follows the same compare-and-swap contract as the PostgreSQL store.

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use super::repository::{DuelRepository, InviteRepository, SessionRepository};
use crate::duel::{DuelError, DuelResult};
use crate::game::{DuelSession, SessionId, SessionStatus};
use crate::invite::{Invite, InviteId, InviteStatus};

/// Hash-map storage for sessions and invites
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    /// Stored sessions
    sessions: Arc<RwLock<HashMap<SessionId, DuelSession>>>,

    /// Stored invites
    invites: Arc<RwLock<HashMap<InviteId, Invite>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Number of stored invites
    pub async fn invite_count(&self) -> usize {
        self.invites.read().await.len()
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn insert_session(&self, session: &DuelSession) -> DuelResult<DuelSession> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id()) {
            return Err(DuelError::ConcurrentModification);
        }

        let mut stored = session.clone();
        stored.set_version(0);
        sessions.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn get_session(&self, id: SessionId) -> DuelResult<DuelSession> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DuelError::SessionNotFound(id))
    }

    async fn update_session(&self, session: &DuelSession) -> DuelResult<DuelSession> {
        let mut sessions = self.sessions.write().await;
        let current = sessions
            .get_mut(&session.id())
            .ok_or(DuelError::SessionNotFound(session.id()))?;
        if current.version() != session.version() {
            return Err(DuelError::ConcurrentModification);
        }

        let mut stored = session.clone();
        stored.set_version(session.version() + 1);
        *current = stored.clone();
        Ok(stored)
    }

    async fn list_sessions_for(&self, player: &str) -> DuelResult<Vec<DuelSession>> {
        let mut found: Vec<DuelSession> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.is_participant(player))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(found)
    }

    async fn list_sessions_by_status(
        &self,
        status: SessionStatus,
    ) -> DuelResult<Vec<DuelSession>> {
        let mut found: Vec<DuelSession> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.status() == status)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(found)
    }
}

#[async_trait]
impl InviteRepository for InMemoryRepository {
    async fn insert_invite(&self, invite: &Invite) -> DuelResult<Invite> {
        let mut invites = self.invites.write().await;
        if invites.contains_key(&invite.id) {
            return Err(DuelError::ConcurrentModification);
        }

        let mut stored = invite.clone();
        stored.version = 0;
        invites.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_invite(&self, id: InviteId) -> DuelResult<Invite> {
        self.invites
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DuelError::InviteNotFound(id))
    }

    async fn update_invite(&self, invite: &Invite) -> DuelResult<Invite> {
        let mut invites = self.invites.write().await;
        let current = invites
            .get_mut(&invite.id)
            .ok_or(DuelError::InviteNotFound(invite.id))?;
        if current.version != invite.version {
            return Err(DuelError::ConcurrentModification);
        }

        let mut stored = invite.clone();
        stored.version = invite.version + 1;
        *current = stored.clone();
        Ok(stored)
    }

    async fn list_invites_for(&self, player: &str) -> DuelResult<Vec<Invite>> {
        let mut found: Vec<Invite> = self
            .invites
            .read()
            .await
            .values()
            .filter(|i| i.involves(player))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn list_pending_invites(&self) -> DuelResult<Vec<Invite>> {
        let mut found: Vec<Invite> = self
            .invites
            .read()
            .await
            .values()
            .filter(|i| i.status == InviteStatus::Pending)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }
}

#[async_trait]
impl DuelRepository for InMemoryRepository {
    async fn accept_invite(
        &self,
        invite: &Invite,
        session: &DuelSession,
    ) -> DuelResult<(Invite, DuelSession)> {
        // Lock order: invites, then sessions
        let mut invites = self.invites.write().await;
        let mut sessions = self.sessions.write().await;

        let current = invites
            .get_mut(&invite.id)
            .ok_or(DuelError::InviteNotFound(invite.id))?;
        if current.version != invite.version {
            return Err(DuelError::ConcurrentModification);
        }
        if sessions.contains_key(&session.id()) {
            return Err(DuelError::ConcurrentModification);
        }

        let mut stored_invite = invite.clone();
        stored_invite.version = invite.version + 1;
        let mut stored_session = session.clone();
        stored_session.set_version(0);

        *current = stored_invite.clone();
        sessions.insert(stored_session.id(), stored_session.clone());
        Ok((stored_invite, stored_session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{DuelRules, RoundCount};
    use crate::invite::InviteLedger;
    use chrono::Utc;
    use uuid::Uuid;

    fn session() -> DuelSession {
        DuelSession::new(
            Uuid::new_v4(),
            "alice".to_string(),
            "bob".to_string(),
            RoundCount::Three,
            DuelRules::default(),
            Utc::now(),
        )
        .unwrap()
    }

    fn invite() -> Invite {
        InviteLedger::default()
            .propose(
                "alice".to_string(),
                "bob".to_string(),
                None,
                RoundCount::Five,
                Utc::now(),
            )
            .unwrap()
    }

    #[tokio::test]
    async fn test_session_insert_and_get() {
        let repo = InMemoryRepository::new();
        let stored = repo.insert_session(&session()).await.unwrap();
        assert_eq!(stored.version(), 0);

        let loaded = repo.get_session(stored.id()).await.unwrap();
        assert_eq!(loaded, stored);
        assert_eq!(repo.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let repo = InMemoryRepository::new();
        let s = session();
        repo.insert_session(&s).await.unwrap();
        assert!(matches!(
            repo.insert_session(&s).await,
            Err(DuelError::ConcurrentModification)
        ));
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let repo = InMemoryRepository::new();
        let mut s = repo.insert_session(&session()).await.unwrap();
        s.set_round_word("alice", "CRANE", Utc::now()).unwrap();

        let updated = repo.update_session(&s).await.unwrap();
        assert_eq!(updated.version(), 1);
        assert_eq!(repo.get_session(s.id()).await.unwrap().version(), 1);
    }

    #[tokio::test]
    async fn test_stale_update_is_rejected() {
        let repo = InMemoryRepository::new();
        let original = repo.insert_session(&session()).await.unwrap();

        let mut first = original.clone();
        first.set_round_word("alice", "CRANE", Utc::now()).unwrap();
        repo.update_session(&first).await.unwrap();

        let mut second = original;
        second.abandon("bob", Utc::now()).unwrap();
        assert!(matches!(
            repo.update_session(&second).await,
            Err(DuelError::ConcurrentModification)
        ));

        let stored = repo.get_session(first.id()).await.unwrap();
        assert_eq!(stored.status(), SessionStatus::InProgress);
    }

    #[tokio::test]
    async fn test_missing_records() {
        let repo = InMemoryRepository::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            repo.get_session(id).await,
            Err(DuelError::SessionNotFound(missing)) if missing == id
        ));
        assert!(matches!(
            repo.update_invite(&invite()).await,
            Err(DuelError::InviteNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_sessions_filters() {
        let repo = InMemoryRepository::new();
        let s = repo.insert_session(&session()).await.unwrap();

        assert_eq!(repo.list_sessions_for("bob").await.unwrap().len(), 1);
        assert!(repo.list_sessions_for("carol").await.unwrap().is_empty());
        assert_eq!(
            repo.list_sessions_by_status(SessionStatus::Waiting)
                .await
                .unwrap()[0]
                .id(),
            s.id()
        );
        assert!(
            repo.list_sessions_by_status(SessionStatus::Completed)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_invite_cas_and_pending_listing() {
        let repo = InMemoryRepository::new();
        let stored = repo.insert_invite(&invite()).await.unwrap();
        assert_eq!(repo.list_pending_invites().await.unwrap().len(), 1);

        let expired = InviteLedger::default().expire(&stored, Utc::now()).unwrap();
        let updated = repo.update_invite(&expired).await.unwrap();
        assert_eq!(updated.version, 1);
        assert!(repo.list_pending_invites().await.unwrap().is_empty());

        assert!(matches!(
            repo.update_invite(&expired).await,
            Err(DuelError::ConcurrentModification)
        ));
        assert_eq!(repo.list_invites_for("alice").await.unwrap().len(), 1);
        assert_eq!(repo.invite_count().await, 1);
    }

    #[tokio::test]
    async fn test_accept_invite_stores_both() {
        let repo = InMemoryRepository::new();
        let pending = repo.insert_invite(&invite()).await.unwrap();
        let response = InviteLedger::default()
            .respond(&pending, true, "bob", Utc::now())
            .unwrap();
        let (accepted, created) = match response {
            crate::invite::InviteResponse::Accepted { invite, session } => (invite, *session),
            other => panic!("expected acceptance, got {other:?}"),
        };

        let (stored_invite, stored_session) =
            repo.accept_invite(&accepted, &created).await.unwrap();
        assert_eq!(stored_invite.version, 1);
        assert_eq!(stored_invite.session_id, Some(stored_session.id()));
        assert_eq!(stored_session.version(), 0);
        assert_eq!(repo.session_count().await, 1);
        assert_eq!(
            repo.get_invite(pending.id).await.unwrap().status,
            InviteStatus::Accepted
        );
    }

    #[tokio::test]
    async fn test_failed_accept_leaves_invite_pending() {
        let repo = InMemoryRepository::new();
        let pending = repo.insert_invite(&invite()).await.unwrap();
        let response = InviteLedger::default()
            .respond(&pending, true, "bob", Utc::now())
            .unwrap();
        let (accepted, created) = match response {
            crate::invite::InviteResponse::Accepted { invite, session } => (invite, *session),
            other => panic!("expected acceptance, got {other:?}"),
        };

        // A session with the same id already exists, so the insert half fails
        repo.insert_session(&created).await.unwrap();
        assert!(matches!(
            repo.accept_invite(&accepted, &created).await,
            Err(DuelError::ConcurrentModification)
        ));

        let stored = repo.get_invite(pending.id).await.unwrap();
        assert_eq!(stored.status, InviteStatus::Pending);
        assert_eq!(stored.session_id, None);
        assert_eq!(stored.version, 0);
    }

    #[tokio::test]
    async fn test_stale_accept_is_rejected() {
        let repo = InMemoryRepository::new();
        let pending = repo.insert_invite(&invite()).await.unwrap();
        let ledger = InviteLedger::default();

        let expired = ledger.expire(&pending, Utc::now()).unwrap();
        repo.update_invite(&expired).await.unwrap();

        let response = ledger.respond(&pending, true, "bob", Utc::now()).unwrap();
        let session = response.session().unwrap().clone();
        assert!(matches!(
            repo.accept_invite(response.invite(), &session).await,
            Err(DuelError::ConcurrentModification)
        ));
        assert_eq!(repo.session_count().await, 0);
    }
}
