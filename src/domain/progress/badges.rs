//! Built-in badge catalog and award rules.

use crate::domain::foundation::BadgeId;

/// Granted to every new progress record.
pub const STARTER: &str = "starter";
/// First finished game.
pub const FIRST_GAME: &str = "first-game";
/// A game scored 100 or more.
pub const PERFECT_GAME: &str = "perfect-game";
/// First completed scenario.
pub const SCENARIO_EXPLORER: &str = "scenario-explorer";
/// Reached level 5.
pub const LEVEL_FIVE: &str = "level-5";
/// Completed every scenario in the catalog.
pub const CATALOG_COMPLETE: &str = "catalog-complete";

/// Level that unlocks `LEVEL_FIVE`.
const LEVEL_FIVE_THRESHOLD: u32 = 5;

/// Facts about a progress record after a transition, used to decide badges.
#[derive(Debug, Clone, Copy)]
pub struct BadgeContext {
    pub games_played: u32,
    pub last_game_score: Option<u32>,
    pub scenarios_completed: usize,
    pub level: u32,
    pub scenario_catalog_size: usize,
}

/// Returns every badge the context qualifies for.
///
/// Callers insert the result into a set, so repeated evaluation is idempotent.
pub fn earned_badges(ctx: &BadgeContext) -> Vec<BadgeId> {
    let mut earned = Vec::new();

    if ctx.games_played >= 1 {
        earned.push(BadgeId::well_known(FIRST_GAME));
    }
    if ctx.last_game_score.is_some_and(|score| score >= 100) {
        earned.push(BadgeId::well_known(PERFECT_GAME));
    }
    if ctx.scenarios_completed >= 1 {
        earned.push(BadgeId::well_known(SCENARIO_EXPLORER));
    }
    if ctx.level >= LEVEL_FIVE_THRESHOLD {
        earned.push(BadgeId::well_known(LEVEL_FIVE));
    }
    if ctx.scenario_catalog_size > 0 && ctx.scenarios_completed >= ctx.scenario_catalog_size {
        earned.push(BadgeId::well_known(CATALOG_COMPLETE));
    }

    earned
}
