//! Invite data models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::game::{DuelSession, PlayerId, RoundCount, SessionId};

/// Invite identifier
pub type InviteId = Uuid;

/// Invite lifecycle state
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    /// Waiting for the receiver
    Pending,
    /// Receiver accepted and a session was created
    Accepted,
    /// Receiver declined
    Declined,
    /// Nobody answered in time
    Expired,
}

impl InviteStatus {
    pub fn is_resolved(self) -> bool {
        self != InviteStatus::Pending
    }
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InviteStatus::Pending => write!(f, "pending"),
            InviteStatus::Accepted => write!(f, "accepted"),
            InviteStatus::Declined => write!(f, "declined"),
            InviteStatus::Expired => write!(f, "expired"),
        }
    }
}

/// A challenge from one player to another
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Invite {
    /// Invite ID
    pub id: InviteId,
    /// Player who sent the challenge
    pub sender_id: PlayerId,
    /// Player being challenged
    pub receiver_id: PlayerId,
    /// Optional note from the sender
    pub message: Option<String>,
    /// Duel length the sender asked for
    pub total_rounds: RoundCount,
    /// Current state
    pub status: InviteStatus,
    /// Session created on acceptance
    pub session_id: Option<SessionId>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Accepted/declined/expired at timestamp
    pub resolved_at: Option<DateTime<Utc>>,
    /// Optimistic-lock version, managed by the repository
    pub version: u64,
}

impl Invite {
    /// Whether a pending invite has outlived `ttl`.
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.status == InviteStatus::Pending && now - self.created_at >= ttl
    }

    pub fn involves(&self, player: &str) -> bool {
        self.sender_id == player || self.receiver_id == player
    }
}

/// Result of answering an invite
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InviteResponse {
    /// Receiver said no; carries the updated invite
    Declined(Invite),
    /// Receiver said yes; carries the updated invite and the new session
    Accepted {
        invite: Invite,
        session: Box<DuelSession>,
    },
}

impl InviteResponse {
    pub fn invite(&self) -> &Invite {
        match self {
            InviteResponse::Declined(invite) => invite,
            InviteResponse::Accepted { invite, .. } => invite,
        }
    }

    pub fn session(&self) -> Option<&DuelSession> {
        match self {
            InviteResponse::Declined(_) => None,
            InviteResponse::Accepted { session, .. } => Some(session),
        }
    }
}

/// Invites touching one player, split by direction
#[derive(Clone, Debug, Default, Serialize)]
pub struct InviteLists {
    pub sent: Vec<Invite>,
    pub received: Vec<Invite>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(created_at: DateTime<Utc>) -> Invite {
        Invite {
            id: Uuid::new_v4(),
            sender_id: "alice".to_string(),
            receiver_id: "bob".to_string(),
            message: None,
            total_rounds: RoundCount::Five,
            status: InviteStatus::Pending,
            session_id: None,
            created_at,
            resolved_at: None,
            version: 0,
        }
    }

    #[test]
    fn test_is_stale_after_ttl() {
        let now = Utc::now();
        let invite = pending(now - Duration::hours(25));
        assert!(invite.is_stale(Duration::hours(24), now));
        assert!(!invite.is_stale(Duration::hours(48), now));
    }

    #[test]
    fn test_resolved_invite_is_never_stale() {
        let now = Utc::now();
        let mut invite = pending(now - Duration::days(3));
        invite.status = InviteStatus::Declined;
        assert!(!invite.is_stale(Duration::hours(1), now));
    }

    #[test]
    fn test_involves() {
        let invite = pending(Utc::now());
        assert!(invite.involves("alice"));
        assert!(invite.involves("bob"));
        assert!(!invite.involves("carol"));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&InviteStatus::Accepted).unwrap(),
            "\"accepted\""
        );
        assert!(InviteStatus::Expired.is_resolved());
        assert!(!InviteStatus::Pending.is_resolved());
    }
}
