//! Invite lifecycle: propose, respond, expire.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::models::{Invite, InviteResponse, InviteStatus};
use crate::game::{
    DuelRules, DuelSession, GameError, GameResult, PlayerId, RoundCount,
    constants::MAX_INVITE_MESSAGE_CHARS,
};

/// Applies invite transitions and creates sessions on acceptance.
///
/// The ledger never mutates an invite in place: each transition takes the
/// current record and returns the next one, so a rejected command cannot
/// leave a half-updated invite behind.
#[derive(Clone, Debug, Default)]
pub struct InviteLedger {
    rules: DuelRules,
}

impl InviteLedger {
    /// Create a ledger whose sessions start with `rules`.
    ///
    /// `rules` are taken as given; [`crate::DuelManager::new`] validates
    /// them before building its ledger.
    pub fn new(rules: DuelRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &DuelRules {
        &self.rules
    }

    /// Challenge `receiver` to a duel of `total_rounds` rounds.
    pub fn propose(
        &self,
        sender: PlayerId,
        receiver: PlayerId,
        message: Option<String>,
        total_rounds: RoundCount,
        now: DateTime<Utc>,
    ) -> GameResult<Invite> {
        if sender == receiver {
            return Err(GameError::SelfInvite);
        }

        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        if message
            .as_ref()
            .is_some_and(|m| m.chars().count() > MAX_INVITE_MESSAGE_CHARS)
        {
            return Err(GameError::MessageTooLong {
                max: MAX_INVITE_MESSAGE_CHARS,
            });
        }

        Ok(Invite {
            id: Uuid::new_v4(),
            sender_id: sender,
            receiver_id: receiver,
            message,
            total_rounds,
            status: InviteStatus::Pending,
            session_id: None,
            created_at: now,
            resolved_at: None,
            version: 0,
        })
    }

    /// Receiver accepts or declines.
    ///
    /// Accepting creates the session (sender is player A) and links its id
    /// into the returned invite.
    pub fn respond(
        &self,
        invite: &Invite,
        accept: bool,
        actor: &str,
        now: DateTime<Utc>,
    ) -> GameResult<InviteResponse> {
        if actor != invite.receiver_id {
            return Err(GameError::NotAuthorized(actor.to_string()));
        }
        if invite.status.is_resolved() {
            return Err(GameError::InviteAlreadyResolved(invite.status));
        }

        let mut next = invite.clone();
        next.resolved_at = Some(now);

        if !accept {
            next.status = InviteStatus::Declined;
            return Ok(InviteResponse::Declined(next));
        }

        let session = DuelSession::new(
            Uuid::new_v4(),
            invite.sender_id.clone(),
            invite.receiver_id.clone(),
            invite.total_rounds,
            self.rules.clone(),
            now,
        )?;
        next.status = InviteStatus::Accepted;
        next.session_id = Some(session.id());

        Ok(InviteResponse::Accepted {
            invite: next,
            session: Box::new(session),
        })
    }

    /// Mark a pending invite expired. Driven by an external sweep.
    pub fn expire(&self, invite: &Invite, now: DateTime<Utc>) -> GameResult<Invite> {
        if invite.status.is_resolved() {
            return Err(GameError::InviteAlreadyResolved(invite.status));
        }
        let mut next = invite.clone();
        next.status = InviteStatus::Expired;
        next.resolved_at = Some(now);
        Ok(next)
    }
}
