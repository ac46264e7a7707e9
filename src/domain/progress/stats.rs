//! Progress statistics read model.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, VigilanceScore};

use super::{Progress, ScenarioScore};

/// Number of scenario scores included in `recent_scores`.
pub const RECENT_SCORES_LIMIT: usize = 10;

/// Aggregated view of a user's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub level: u32,
    pub xp: u64,
    pub vigilance_score: VigilanceScore,
    pub total_scenarios_completed: usize,
    pub total_games_played: u32,
    pub badges_count: usize,
    /// Latest scenario scores, newest first.
    pub recent_scores: Vec<ScenarioScore>,
    /// Mean of `recent_scores`, 0 when there are none.
    pub average_score: f64,
    /// Percentage of the scenario catalog completed, 0-100.
    pub completion_rate: u32,
    pub streak: u32,
    pub last_played: Option<Timestamp>,
}

impl ProgressStats {
    /// Builds statistics from a progress record and its scenario scores.
    ///
    /// `scores` may be in any order and of any length; only the newest
    /// `RECENT_SCORES_LIMIT` are kept.
    pub fn compute(progress: &Progress, mut scores: Vec<ScenarioScore>, scenario_catalog_size: usize) -> Self {
        scores.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        scores.truncate(RECENT_SCORES_LIMIT);

        let average_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().map(|s| f64::from(s.score)).sum::<f64>() / scores.len() as f64
        };

        let completed = progress.completed_scenarios().len();

        Self {
            level: progress.level(),
            xp: progress.xp(),
            vigilance_score: progress.vigilance_score(),
            total_scenarios_completed: completed,
            total_games_played: progress.games_played(),
            badges_count: progress.badges().len(),
            recent_scores: scores,
            average_score,
            completion_rate: completion_rate(completed, scenario_catalog_size),
            streak: progress.consecutive_correct(),
            last_played: progress.last_played().copied(),
        }
    }
}

fn completion_rate(completed: usize, catalog_size: usize) -> u32 {
    if catalog_size == 0 {
        return 0;
    }
    let rate = (completed as f64 / catalog_size as f64 * 100.0).round();
    rate.min(100.0) as u32
}
