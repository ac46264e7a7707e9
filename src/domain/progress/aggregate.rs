//! Progress aggregate entity.
//!
//! One progress record exists per user. It is mutated only through the
//! transitions below, each of which leaves `level` consistent with `xp`.
//!
//! # Ownership
//!
//! The record is owned by its user's account and destroyed only as part of
//! whole-account deletion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{
    BadgeId, DomainError, GameId, ScenarioId, Timestamp, UserId, ValidationError,
    VigilanceScore,
};
use crate::domain::scoring::{AccuracyTier, ScoreCalculator, MAX_HINTS};

use super::badges::{self, BadgeContext};

/// Per-question statistics reported with a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePerformance {
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub hints_used: u8,
    /// Seconds spent in the game.
    pub time_spent: u32,
}

impl GamePerformance {
    /// Creates validated performance statistics.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if more correct answers than answered questions
    /// - `OutOfRange` if more than `MAX_HINTS` hints were used
    pub fn new(
        questions_answered: u32,
        correct_answers: u32,
        hints_used: u8,
        time_spent: u32,
    ) -> Result<Self, ValidationError> {
        if correct_answers > questions_answered {
            return Err(ValidationError::out_of_range(
                "correct_answers",
                0,
                i64::from(questions_answered),
                i64::from(correct_answers),
            ));
        }
        if hints_used > MAX_HINTS {
            return Err(ValidationError::out_of_range(
                "hints_used",
                0,
                i64::from(MAX_HINTS),
                i64::from(hints_used),
            ));
        }
        Ok(Self {
            questions_answered,
            correct_answers,
            hints_used,
            time_spent,
        })
    }

    pub fn tier(&self) -> AccuracyTier {
        AccuracyTier::classify(self.correct_answers, self.questions_answered)
    }

    /// True when at least one question was answered and none were wrong.
    pub fn is_flawless(&self) -> bool {
        self.questions_answered > 0 && self.correct_answers == self.questions_answered
    }
}

/// A finished game as reported to the progress service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameCompletion {
    pub game_id: GameId,
    pub score: u32,
    pub performance: Option<GamePerformance>,
}

/// What a game completion changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameCompletionOutcome {
    pub xp_gained: u64,
    pub previous_level: u32,
    pub new_level: u32,
    /// False when the game id was already in `completed_games` (XP is still awarded).
    pub first_completion: bool,
    pub badges_awarded: Vec<BadgeId>,
}

impl GameCompletionOutcome {
    /// Returns true if the completion crossed a level boundary.
    pub fn leveled_up(&self) -> bool {
        self.new_level > self.previous_level
    }
}

/// Progress aggregate - the durable per-user record.
///
/// # Invariants
///
/// - `level()` is always `floor(xp / 100) + 1`; there is no level field to set
/// - `xp` never decreases
/// - `games_played` grows by exactly 1 per recorded game
/// - `badges` contains `starter` from creation
/// - `completed_games` / `completed_scenarios` only grow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    user_id: UserId,
    xp: u64,
    vigilance_score: VigilanceScore,
    completed_scenarios: BTreeSet<ScenarioId>,
    completed_games: BTreeSet<GameId>,
    badges: BTreeSet<BadgeId>,
    games_played: u32,
    consecutive_correct: u32,
    last_played: Option<Timestamp>,
    created_at: Timestamp,
    updated_at: Timestamp,
    /// Optimistic-lock version, bumped by the repository on every write.
    version: u32,
}

impl Progress {
    /// Creates the default record for a user.
    pub fn new(user_id: UserId, now: Timestamp) -> Self {
        let mut badges = BTreeSet::new();
        badges.insert(BadgeId::well_known(badges::STARTER));

        Self {
            user_id,
            xp: 0,
            vigilance_score: VigilanceScore::INITIAL,
            completed_scenarios: BTreeSet::new(),
            completed_games: BTreeSet::new(),
            badges,
            games_played: 0,
            consecutive_correct: 0,
            last_played: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Reconstitute a record from persistence (no validation, no side effects).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        user_id: UserId,
        xp: u64,
        vigilance_score: VigilanceScore,
        completed_scenarios: BTreeSet<ScenarioId>,
        completed_games: BTreeSet<GameId>,
        badges: BTreeSet<BadgeId>,
        games_played: u32,
        consecutive_correct: u32,
        last_played: Option<Timestamp>,
        created_at: Timestamp,
        updated_at: Timestamp,
        version: u32,
    ) -> Self {
        Self {
            user_id,
            xp,
            vigilance_score,
            completed_scenarios,
            completed_games,
            badges,
            games_played,
            consecutive_correct,
            last_played,
            created_at,
            updated_at,
            version,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Level derived from experience.
    pub fn level(&self) -> u32 {
        ScoreCalculator::level_for_xp(self.xp)
    }

    pub fn xp(&self) -> u64 {
        self.xp
    }

    pub fn vigilance_score(&self) -> VigilanceScore {
        self.vigilance_score
    }

    pub fn completed_scenarios(&self) -> &BTreeSet<ScenarioId> {
        &self.completed_scenarios
    }

    pub fn completed_games(&self) -> &BTreeSet<GameId> {
        &self.completed_games
    }

    pub fn badges(&self) -> &BTreeSet<BadgeId> {
        &self.badges
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    /// Current streak of consecutive correct answers.
    pub fn consecutive_correct(&self) -> u32 {
        self.consecutive_correct
    }

    pub fn last_played(&self) -> Option<&Timestamp> {
        self.last_played.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────────

    /// Checks if the given user owns this record.
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Validates that the user can access this record.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if user is not the owner
    pub fn authorize(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.is_owner(user_id) {
            Ok(())
        } else {
            Err(DomainError::unauthorized(
                "User is not authorized to access this progress",
            ))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Applies a finished game.
    ///
    /// Replaying a game already in `completed_games` awards XP again; only the
    /// set membership is deduplicated.
    pub fn record_game(
        &mut self,
        completion: &GameCompletion,
        at: Timestamp,
        scenario_catalog_size: usize,
    ) -> GameCompletionOutcome {
        let previous_level = self.level();
        let xp_gained = ScoreCalculator::xp_gained(completion.score);

        self.xp = self.xp.saturating_add(xp_gained);
        self.games_played = self.games_played.saturating_add(1);
        let first_completion = self.completed_games.insert(completion.game_id.clone());

        if let Some(performance) = completion.performance {
            self.apply_performance(&performance);
        }

        self.last_played = Some(at);
        self.updated_at = at;

        let badges_awarded = self.award_badges(Some(completion.score), scenario_catalog_size);

        GameCompletionOutcome {
            xp_gained,
            previous_level,
            new_level: self.level(),
            first_completion,
            badges_awarded,
        }
    }

    /// Marks a scenario as completed. Awards no XP.
    ///
    /// Returns the badges newly awarded by the completion.
    pub fn record_scenario(
        &mut self,
        scenario_id: &ScenarioId,
        at: Timestamp,
        scenario_catalog_size: usize,
    ) -> Vec<BadgeId> {
        self.completed_scenarios.insert(scenario_id.clone());
        self.last_played = Some(at);
        self.updated_at = at;
        self.award_badges(None, scenario_catalog_size)
    }

    /// Moves the vigilance score by `delta`, saturating at 0 and 100.
    pub fn adjust_vigilance(&mut self, delta: i32) {
        self.vigilance_score = self.vigilance_score.adjusted(delta);
    }

    /// Called by repositories after a successful write.
    pub fn mark_persisted(&mut self, version: u32) {
        self.version = version;
    }

    fn apply_performance(&mut self, performance: &GamePerformance) {
        if performance.is_flawless() {
            self.consecutive_correct = self
                .consecutive_correct
                .saturating_add(performance.correct_answers);
        } else {
            self.consecutive_correct = 0;
        }

        if performance.questions_answered > 0 {
            self.adjust_vigilance(performance.tier().vigilance_delta());
        }
    }

    fn award_badges(&mut self, last_game_score: Option<u32>, scenario_catalog_size: usize) -> Vec<BadgeId> {
        let ctx = BadgeContext {
            games_played: self.games_played,
            last_game_score,
            scenarios_completed: self.completed_scenarios.len(),
            level: self.level(),
            scenario_catalog_size,
        };

        badges::earned_badges(&ctx)
            .into_iter()
            .filter(|badge| self.badges.insert(badge.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CATALOG: usize = 10;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn game(id: &str, score: u32) -> GameCompletion {
        GameCompletion {
            game_id: GameId::new(id).unwrap(),
            score,
            performance: None,
        }
    }

    fn progress_with_xp(xp: u64) -> Progress {
        let now = Timestamp::now();
        let mut badges = BTreeSet::new();
        badges.insert(BadgeId::well_known(badges::STARTER));
        Progress::reconstitute(
            user(),
            xp,
            VigilanceScore::INITIAL,
            BTreeSet::new(),
            BTreeSet::new(),
            badges,
            0,
            0,
            None,
            now,
            now,
            1,
        )
    }

    #[test]
    fn new_progress_has_defaults() {
        let progress = Progress::new(user(), Timestamp::now());

        assert_eq!(progress.level(), 1);
        assert_eq!(progress.xp(), 0);
        assert_eq!(progress.vigilance_score().value(), 50);
        assert_eq!(progress.games_played(), 0);
        assert_eq!(progress.consecutive_correct(), 0);
        assert!(progress.last_played().is_none());
        assert!(progress.completed_games().is_empty());
        assert!(progress.completed_scenarios().is_empty());
        assert_eq!(
            progress.badges().iter().map(|b| b.as_str()).collect::<Vec<_>>(),
            vec!["starter"]
        );
    }

    #[test]
    fn record_game_crosses_level_boundary() {
        let mut progress = progress_with_xp(95);

        let outcome = progress.record_game(&game("phish-quiz", 100), Timestamp::now(), CATALOG);

        assert_eq!(outcome.xp_gained, 5);
        assert_eq!(progress.xp(), 100);
        assert_eq!(progress.level(), 2);
        assert!(outcome.leveled_up());
    }

    #[test]
    fn record_game_updates_counters_and_last_played() {
        let mut progress = Progress::new(user(), Timestamp::now());
        let at = Timestamp::now().plus_secs(10);

        progress.record_game(&game("phish-quiz", 60), at, CATALOG);

        assert_eq!(progress.games_played(), 1);
        assert_eq!(progress.last_played(), Some(&at));
        assert!(progress.completed_games().contains(&GameId::new("phish-quiz").unwrap()));
    }

    #[test]
    fn replaying_a_game_awards_xp_again_without_duplicating_membership() {
        let mut progress = Progress::new(user(), Timestamp::now());

        let first = progress.record_game(&game("phish-quiz", 100), Timestamp::now(), CATALOG);
        let second = progress.record_game(&game("phish-quiz", 100), Timestamp::now(), CATALOG);

        assert!(first.first_completion);
        assert!(!second.first_completion);
        assert_eq!(progress.xp(), 10);
        assert_eq!(progress.games_played(), 2);
        assert_eq!(progress.completed_games().len(), 1);
    }

    #[test]
    fn first_game_awards_badges_once() {
        let mut progress = Progress::new(user(), Timestamp::now());

        let first = progress.record_game(&game("g1", 100), Timestamp::now(), CATALOG);
        let second = progress.record_game(&game("g2", 100), Timestamp::now(), CATALOG);

        let names: Vec<_> = first.badges_awarded.iter().map(|b| b.as_str()).collect();
        assert_eq!(names, vec![badges::FIRST_GAME, badges::PERFECT_GAME]);
        assert!(second.badges_awarded.is_empty());
        assert_eq!(progress.badges().len(), 3);
    }

    #[test]
    fn flawless_game_extends_streak_and_raises_vigilance() {
        let mut progress = Progress::new(user(), Timestamp::now());
        let completion = GameCompletion {
            performance: Some(GamePerformance::new(5, 5, 0, 20).unwrap()),
            ..game("g1", 100)
        };

        progress.record_game(&completion, Timestamp::now(), CATALOG);
        progress.record_game(&completion, Timestamp::now(), CATALOG);

        assert_eq!(progress.consecutive_correct(), 10);
        assert_eq!(progress.vigilance_score().value(), 54);
    }

    #[test]
    fn imperfect_game_resets_streak() {
        let mut progress = Progress::new(user(), Timestamp::now());
        let flawless = GameCompletion {
            performance: Some(GamePerformance::new(5, 5, 0, 20).unwrap()),
            ..game("g1", 100)
        };
        let weak = GameCompletion {
            performance: Some(GamePerformance::new(10, 3, 1, 20).unwrap()),
            ..game("g1", 20)
        };

        progress.record_game(&flawless, Timestamp::now(), CATALOG);
        progress.record_game(&weak, Timestamp::now(), CATALOG);

        assert_eq!(progress.consecutive_correct(), 0);
        assert_eq!(progress.vigilance_score().value(), 50);
    }

    #[test]
    fn just_under_eighty_percent_leaves_vigilance_unchanged() {
        let mut progress = Progress::new(user(), Timestamp::now());
        let near_miss = GameCompletion {
            performance: Some(GamePerformance::new(200, 159, 0, 60).unwrap()),
            ..game("g1", 80)
        };

        progress.record_game(&near_miss, Timestamp::now(), CATALOG);

        assert_eq!(progress.vigilance_score().value(), 50);
    }

    #[test]
    fn just_under_sixty_percent_lowers_vigilance() {
        let mut progress = Progress::new(user(), Timestamp::now());
        let near_miss = GameCompletion {
            performance: Some(GamePerformance::new(200, 119, 0, 60).unwrap()),
            ..game("g1", 60)
        };

        progress.record_game(&near_miss, Timestamp::now(), CATALOG);

        assert_eq!(progress.vigilance_score().value(), 48);
    }

    #[test]
    fn game_performance_rejects_inconsistent_counts() {
        assert!(GamePerformance::new(3, 4, 0, 10).is_err());
        assert!(GamePerformance::new(3, 3, 4, 10).is_err());
        assert!(GamePerformance::new(3, 3, 3, 10).is_ok());
    }

    #[test]
    fn record_scenario_adds_to_set_without_xp() {
        let mut progress = Progress::new(user(), Timestamp::now());
        let scenario = ScenarioId::new("scenario-1").unwrap();

        let awarded = progress.record_scenario(&scenario, Timestamp::now(), CATALOG);
        progress.record_scenario(&scenario, Timestamp::now(), CATALOG);

        assert_eq!(progress.xp(), 0);
        assert_eq!(progress.completed_scenarios().len(), 1);
        assert!(progress.last_played().is_some());
        assert_eq!(awarded.len(), 1);
        assert_eq!(awarded[0].as_str(), badges::SCENARIO_EXPLORER);
    }

    #[test]
    fn completing_catalog_awards_badge() {
        let mut progress = Progress::new(user(), Timestamp::now());
        for i in 0..2 {
            let id = ScenarioId::new(format!("scenario-{}", i)).unwrap();
            progress.record_scenario(&id, Timestamp::now(), 2);
        }
        assert!(progress
            .badges()
            .contains(&BadgeId::well_known(badges::CATALOG_COMPLETE)));
    }

    #[test]
    fn adjust_vigilance_stays_in_bounds() {
        let mut progress = Progress::new(user(), Timestamp::now());
        progress.adjust_vigilance(200);
        assert_eq!(progress.vigilance_score().value(), 100);
        progress.adjust_vigilance(-500);
        assert_eq!(progress.vigilance_score().value(), 0);
    }

    #[test]
    fn authorize_rejects_other_user() {
        let progress = Progress::new(user(), Timestamp::now());
        assert!(progress.authorize(&user()).is_ok());
        assert!(progress.authorize(&UserId::new("intruder").unwrap()).is_err());
    }

    proptest! {
        #[test]
        fn game_sequence_keeps_invariants(scores in proptest::collection::vec(0u32..=150, 0..40)) {
            let mut progress = Progress::new(user(), Timestamp::now());
            let mut expected_xp = 0u64;
            let mut last_xp = 0u64;

            for (i, score) in scores.iter().enumerate() {
                progress.record_game(&game(&format!("g{}", i % 3), *score), Timestamp::now(), CATALOG);
                expected_xp += ScoreCalculator::xp_gained(*score);

                prop_assert!(progress.xp() >= last_xp);
                prop_assert_eq!(u64::from(progress.level()), progress.xp() / 100 + 1);
                last_xp = progress.xp();
            }

            prop_assert_eq!(progress.games_played() as usize, scores.len());
            prop_assert_eq!(progress.xp(), expected_xp);
        }
    }
}
