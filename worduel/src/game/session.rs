//! The duel aggregate and its state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use uuid::Uuid;

use super::{
    PlayerId,
    errors::{GameError, GameResult},
    round::{RoundHistory, RoundState},
    rules::{DuelRules, FirstSetter, RoundCount},
    scorer::{GuessResult, Verdict},
};

/// Session identifier
pub type SessionId = Uuid;

/// Overall status of a duel.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Round 1 word not chosen yet
    Waiting,
    /// At least one word has been set
    InProgress,
    /// Every round played
    Completed,
    /// Cancelled by a participant
    Abandoned,
}

impl SessionStatus {
    pub fn is_active(self) -> bool {
        matches!(self, SessionStatus::Waiting | SessionStatus::InProgress)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Waiting => write!(f, "waiting"),
            SessionStatus::InProgress => write!(f, "in_progress"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// Final result of a completed duel.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "result", content = "player", rename_all = "snake_case")]
pub enum MatchOutcome {
    Winner(PlayerId),
    Draw,
}

/// What a single accepted guess did to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuessReport {
    /// The round the guess was applied to, as of right after the guess.
    pub round: RoundState,
    pub result: GuessResult,
    pub round_complete: bool,
}

/// A two-player duel across a fixed number of rounds.
///
/// Invariants upheld by every transition:
/// - while active, `current_round == round_history.len() + 1` and a live
///   round exists;
/// - `round_history.len() == total_rounds` iff the session is completed;
/// - `points` holds exactly the two participants;
/// - the word-setter alternates every round.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DuelSession {
    id: SessionId,
    player_a: PlayerId,
    player_b: PlayerId,
    total_rounds: RoundCount,
    current_round: u32,
    round_history: Vec<RoundHistory>,
    current: Option<RoundState>,
    points: BTreeMap<PlayerId, u32>,
    status: SessionStatus,
    outcome: Option<MatchOutcome>,
    abandoned_by: Option<PlayerId>,
    rules: DuelRules,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    version: u64,
}

impl DuelSession {
    /// Create a session in `waiting` with round 1 awaiting its word.
    ///
    /// `inviter` becomes player A and `invitee` player B; the round-1 setter
    /// follows `rules.first_setter`.
    pub fn new(
        id: SessionId,
        inviter: PlayerId,
        invitee: PlayerId,
        total_rounds: RoundCount,
        rules: DuelRules,
        now: DateTime<Utc>,
    ) -> GameResult<Self> {
        if inviter == invitee {
            return Err(GameError::SelfInvite);
        }

        let (setter, guesser) = match rules.first_setter {
            FirstSetter::Inviter => (inviter.clone(), invitee.clone()),
            FirstSetter::Invitee => (invitee.clone(), inviter.clone()),
        };
        let first_round = RoundState::new(1, setter, guesser, rules.max_attempts);
        let points = BTreeMap::from([(inviter.clone(), 0), (invitee.clone(), 0)]);

        Ok(Self {
            id,
            player_a: inviter,
            player_b: invitee,
            total_rounds,
            current_round: 1,
            round_history: Vec::new(),
            current: Some(first_round),
            points,
            status: SessionStatus::Waiting,
            outcome: None,
            abandoned_by: None,
            rules,
            created_at: now,
            updated_at: now,
            completed_at: None,
            version: 0,
        })
    }

    /// Word-setter of the live round chooses its word.
    pub fn set_round_word(
        &mut self,
        actor: &str,
        word: &str,
        now: DateTime<Utc>,
    ) -> GameResult<&RoundState> {
        self.ensure_active()?;
        let round = self.current.as_mut().ok_or(GameError::SessionNotActive)?;
        round.set_word(actor, word)?;

        self.status = SessionStatus::InProgress;
        self.updated_at = now;
        Ok(round)
    }

    /// Guesser of the live round submits a guess.
    ///
    /// When the guess finishes the round, the round is folded into the
    /// history, points are awarded and either the next round is opened with
    /// roles swapped or the session completes.
    pub fn submit_guess(
        &mut self,
        actor: &str,
        guess: &str,
        now: DateTime<Utc>,
    ) -> GameResult<GuessReport> {
        self.ensure_active()?;
        let round = self.current.as_mut().ok_or(GameError::SessionNotActive)?;
        let result = round.submit_guess(actor, guess)?;
        self.updated_at = now;

        if !round.is_finished() {
            return Ok(GuessReport {
                round: round.clone(),
                result,
                round_complete: false,
            });
        }

        let finished = round.clone();
        self.complete_round(now);
        Ok(GuessReport {
            round: finished,
            result,
            round_complete: true,
        })
    }

    /// A participant walks away. No points are awarded and the live round
    /// is discarded.
    pub fn abandon(&mut self, actor: &str, now: DateTime<Utc>) -> GameResult<()> {
        if !self.is_participant(actor) {
            return Err(GameError::NotAuthorized(actor.to_string()));
        }
        self.ensure_active()?;

        self.current = None;
        self.status = SessionStatus::Abandoned;
        self.abandoned_by = Some(actor.to_string());
        self.updated_at = now;
        self.completed_at = Some(now);
        Ok(())
    }

    fn complete_round(&mut self, now: DateTime<Utc>) {
        let Some(round) = self.current.take() else {
            return;
        };
        let award = self.rules.scoring.award(round.outcome(), round.attempts_used());
        let next_setter = round.guesser().to_string();
        let next_guesser = round.word_setter().to_string();

        if let Some(points) = self.points.get_mut(round.guesser()) {
            *points += award.guesser_points;
        }
        if let Some(points) = self.points.get_mut(round.word_setter()) {
            *points += award.setter_points;
        }
        log::debug!(
            "Session {} round {} finished as {} ({} / {} points)",
            self.id,
            round.round(),
            round.outcome(),
            award.guesser_points,
            award.setter_points
        );
        self.round_history.push(round.into_history(award, now));

        if self.current_round >= self.total_rounds.get() {
            self.status = SessionStatus::Completed;
            self.outcome = Some(self.decide_outcome());
            self.completed_at = Some(now);
        } else {
            self.current_round += 1;
            self.current = Some(RoundState::new(
                self.current_round,
                next_setter,
                next_guesser,
                self.rules.max_attempts,
            ));
        }
    }

    fn decide_outcome(&self) -> MatchOutcome {
        let a = self.points_for(&self.player_a);
        let b = self.points_for(&self.player_b);
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => MatchOutcome::Winner(self.player_a.clone()),
            std::cmp::Ordering::Less => MatchOutcome::Winner(self.player_b.clone()),
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        }
    }

    fn ensure_active(&self) -> GameResult<()> {
        if self.status.is_active() {
            Ok(())
        } else {
            Err(GameError::SessionNotActive)
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn player_a(&self) -> &str {
        &self.player_a
    }

    pub fn player_b(&self) -> &str {
        &self.player_b
    }

    pub fn participants(&self) -> [&str; 2] {
        [&self.player_a, &self.player_b]
    }

    pub fn is_participant(&self, player: &str) -> bool {
        self.player_a == player || self.player_b == player
    }

    /// The other participant, if `player` is one of the two.
    pub fn opponent_of(&self, player: &str) -> Option<&str> {
        if player == self.player_a {
            Some(&self.player_b)
        } else if player == self.player_b {
            Some(&self.player_a)
        } else {
            None
        }
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds.get()
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn round_history(&self) -> &[RoundHistory] {
        &self.round_history
    }

    /// The live round, absent once the session is over.
    pub fn current_round_state(&self) -> Option<&RoundState> {
        self.current.as_ref()
    }

    pub fn word_setter(&self) -> Option<&str> {
        self.current.as_ref().map(RoundState::word_setter)
    }

    pub fn guesser(&self) -> Option<&str> {
        self.current.as_ref().map(RoundState::guesser)
    }

    pub fn points(&self) -> &BTreeMap<PlayerId, u32> {
        &self.points
    }

    pub fn points_for(&self, player: &str) -> u32 {
        self.points.get(player).copied().unwrap_or(0)
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    /// Winner of a completed duel; `None` for draws and unfinished duels.
    pub fn winner(&self) -> Option<&str> {
        match &self.outcome {
            Some(MatchOutcome::Winner(player)) => Some(player),
            _ => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.outcome == Some(MatchOutcome::Draw)
    }

    pub fn abandoned_by(&self) -> Option<&str> {
        self.abandoned_by.as_deref()
    }

    pub fn rules(&self) -> &DuelRules {
        &self.rules
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Optimistic-lock version, managed by the repository.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Keyboard hints for the live round.
    pub fn letter_hints(&self) -> BTreeMap<char, Verdict> {
        self.current
            .as_ref()
            .map(RoundState::letter_hints)
            .unwrap_or_default()
    }

    /// Read-only projection for `viewer`: the live round's word is hidden
    /// from everyone except its setter. Finished rounds stay visible.
    pub fn view_for(&self, viewer: &str) -> DuelSession {
        let mut view = self.clone();
        if let Some(round) = view.current.as_mut()
            && round.word_setter() != viewer
        {
            *round = round.redacted();
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{round::RoundOutcome, rules::ScoringPolicy};

    fn session(rounds: RoundCount) -> DuelSession {
        DuelSession::new(
            Uuid::new_v4(),
            "alice".to_string(),
            "bob".to_string(),
            rounds,
            DuelRules::default(),
            Utc::now(),
        )
        .unwrap()
    }

    /// Play the live round to completion, solving on `solve_on` or never.
    fn play_round(session: &mut DuelSession, solve_on: Option<usize>) {
        let setter = session.word_setter().unwrap().to_string();
        let guesser = session.guesser().unwrap().to_string();
        session.set_round_word(&setter, "CRANE", Utc::now()).unwrap();
        for attempt in 1..=6 {
            let guess = if Some(attempt) == solve_on { "CRANE" } else { "MOUTH" };
            let report = session.submit_guess(&guesser, guess, Utc::now()).unwrap();
            if report.round_complete {
                return;
            }
        }
    }

    #[test]
    fn test_new_session_waits_for_inviter_word() {
        let s = session(RoundCount::Three);
        assert_eq!(s.status(), SessionStatus::Waiting);
        assert_eq!(s.current_round(), 1);
        assert_eq!(s.word_setter(), Some("alice"));
        assert_eq!(s.guesser(), Some("bob"));
        assert_eq!(s.points().len(), 2);
        assert_eq!(s.points_for("alice"), 0);
    }

    #[test]
    fn test_invitee_can_be_first_setter() {
        let rules = DuelRules {
            first_setter: FirstSetter::Invitee,
            ..DuelRules::default()
        };
        let s = DuelSession::new(
            Uuid::new_v4(),
            "alice".to_string(),
            "bob".to_string(),
            RoundCount::Three,
            rules,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(s.word_setter(), Some("bob"));
        assert_eq!(s.player_a(), "alice");
    }

    #[test]
    fn test_cannot_duel_yourself() {
        let result = DuelSession::new(
            Uuid::new_v4(),
            "alice".to_string(),
            "alice".to_string(),
            RoundCount::Three,
            DuelRules::default(),
            Utc::now(),
        );
        assert_eq!(result, Err(GameError::SelfInvite));
    }

    #[test]
    fn test_setting_first_word_starts_session() {
        let mut s = session(RoundCount::Three);
        s.set_round_word("alice", "crane", Utc::now()).unwrap();
        assert_eq!(s.status(), SessionStatus::InProgress);
    }

    #[test]
    fn test_rejected_command_leaves_session_untouched() {
        let mut s = session(RoundCount::Three);
        let before = s.clone();

        assert!(s.set_round_word("bob", "CRANE", Utc::now()).is_err());
        assert!(s.set_round_word("alice", "CR4NE", Utc::now()).is_err());
        assert!(s.submit_guess("bob", "CRANE", Utc::now()).is_err());
        assert_eq!(s, before);
    }

    #[test]
    fn test_finished_round_swaps_roles() {
        let mut s = session(RoundCount::Three);
        play_round(&mut s, Some(2));

        assert_eq!(s.current_round(), 2);
        assert_eq!(s.round_history().len(), 1);
        assert_eq!(s.word_setter(), Some("bob"));
        assert_eq!(s.guesser(), Some("alice"));
        assert_eq!(
            s.current_round_state().unwrap().outcome(),
            RoundOutcome::AwaitingWord
        );
        assert_eq!(s.points_for("bob"), 5);
    }

    #[test]
    fn test_submit_guess_reports_finished_round() {
        let mut s = session(RoundCount::Three);
        s.set_round_word("alice", "CRANE", Utc::now()).unwrap();
        let report = s.submit_guess("bob", "CRANE", Utc::now()).unwrap();

        assert!(report.round_complete);
        assert_eq!(report.round.round(), 1);
        assert_eq!(report.round.outcome(), RoundOutcome::Guessed);
        assert_eq!(s.round_history()[0].guesser_points, 6);
    }

    #[test]
    fn test_exhausted_round_awards_setter_consolation() {
        let mut s = session(RoundCount::Three);
        play_round(&mut s, None);

        let history = &s.round_history()[0];
        assert_eq!(history.outcome, RoundOutcome::Exhausted);
        assert_eq!(history.guesser_points, 0);
        assert_eq!(history.setter_points, 1);
        assert_eq!(s.points_for("alice"), 1);
        assert_eq!(s.points_for("bob"), 0);
    }

    #[test]
    fn test_exhausted_round_without_consolation() {
        let rules = DuelRules {
            scoring: ScoringPolicy::default().without_consolation(),
            ..DuelRules::default()
        };
        let mut s = DuelSession::new(
            Uuid::new_v4(),
            "alice".to_string(),
            "bob".to_string(),
            RoundCount::Three,
            rules,
            Utc::now(),
        )
        .unwrap();
        play_round(&mut s, None);
        assert_eq!(s.points_for("alice"), 0);
    }

    #[test]
    fn test_full_duel_completes_with_winner() {
        let mut s = session(RoundCount::Three);
        // Round 1: bob guesses on attempt 1 (6). Round 2: alice on 3 (4).
        // Round 3: bob on 2 (5).
        play_round(&mut s, Some(1));
        play_round(&mut s, Some(3));
        play_round(&mut s, Some(2));

        assert_eq!(s.status(), SessionStatus::Completed);
        assert_eq!(s.round_history().len(), 3);
        assert!(s.current_round_state().is_none());
        assert_eq!(s.points_for("bob"), 11);
        assert_eq!(s.points_for("alice"), 4);
        assert_eq!(s.winner(), Some("bob"));
        assert!(s.completed_at().is_some());
    }

    #[test]
    fn test_tied_duel_is_a_draw() {
        let mut s = session(RoundCount::Three);
        // bob 6 + 0, alice 1 (consolation) + 5 = 6 each
        play_round(&mut s, Some(1));
        play_round(&mut s, Some(2));
        play_round(&mut s, None);

        assert_eq!(s.status(), SessionStatus::Completed);
        assert_eq!(s.points_for("alice"), 6);
        assert_eq!(s.points_for("bob"), 6);
        assert!(s.is_draw());
        assert_eq!(s.winner(), None);
    }

    #[test]
    fn test_completed_session_rejects_commands() {
        let mut s = session(RoundCount::Three);
        for _ in 0..3 {
            play_round(&mut s, Some(1));
        }
        assert_eq!(
            s.submit_guess("bob", "CRANE", Utc::now()),
            Err(GameError::SessionNotActive)
        );
        assert_eq!(s.abandon("bob", Utc::now()), Err(GameError::SessionNotActive));
    }

    #[test]
    fn test_roles_alternate_every_round() {
        let mut s = session(RoundCount::Five);
        for _ in 0..5 {
            play_round(&mut s, Some(4));
        }
        let history = s.round_history();
        for pair in history.windows(2) {
            assert_eq!(pair[1].word_setter, pair[0].guesser);
            assert_ne!(pair[1].word_setter, pair[0].word_setter);
        }
    }

    #[test]
    fn test_abandon_by_participant() {
        let mut s = session(RoundCount::Three);
        play_round(&mut s, Some(1));
        s.abandon("alice", Utc::now()).unwrap();

        assert_eq!(s.status(), SessionStatus::Abandoned);
        assert_eq!(s.abandoned_by(), Some("alice"));
        assert!(s.current_round_state().is_none());
        assert_eq!(s.winner(), None);
        assert_eq!(s.points_for("bob"), 6);
    }

    #[test]
    fn test_abandon_by_stranger_is_rejected() {
        let mut s = session(RoundCount::Three);
        assert_eq!(
            s.abandon("mallory", Utc::now()),
            Err(GameError::NotAuthorized("mallory".to_string()))
        );
        assert_eq!(s.status(), SessionStatus::Waiting);
    }

    #[test]
    fn test_view_hides_live_word_from_guesser() {
        let mut s = session(RoundCount::Three);
        s.set_round_word("alice", "CRANE", Utc::now()).unwrap();

        let guesser_view = s.view_for("bob");
        assert_eq!(guesser_view.current_round_state().unwrap().target_word(), None);

        let setter_view = s.view_for("alice");
        assert_eq!(
            setter_view.current_round_state().unwrap().target_word(),
            Some("CRANE")
        );
    }

    #[test]
    fn test_history_rescoring_matches_submissions() {
        let mut s = session(RoundCount::Three);
        s.set_round_word("alice", "ALLOY", Utc::now()).unwrap();
        let mut returned = Vec::new();
        for guess in ["LOLLY", "ALOFT", "ALLOY"] {
            returned.push(s.submit_guess("bob", guess, Utc::now()).unwrap().result);
        }
        assert_eq!(s.round_history()[0].scored_guesses(), returned);
    }

    #[test]
    fn test_opponent_of() {
        let s = session(RoundCount::Three);
        assert_eq!(s.opponent_of("alice"), Some("bob"));
        assert_eq!(s.opponent_of("bob"), Some("alice"));
        assert_eq!(s.opponent_of("carol"), None);
    }

    #[test]
    fn test_session_serde_round_trip_keeps_state() {
        let mut s = session(RoundCount::Three);
        s.set_round_word("alice", "CRANE", Utc::now()).unwrap();
        s.submit_guess("bob", "SLATE", Utc::now()).unwrap();

        let json = serde_json::to_string(&s).unwrap();
        let back: DuelSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
