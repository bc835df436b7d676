//! Candidate ordering.
//!
//! Input candidates arrive sorted by ascending distance (discovery order).
//! Every mode uses a stable sort, so equal keys keep that order.

use domain::Candidate;

use crate::config::RankingMode;

/// Blended desirability score: higher is better.
fn balanced_score(candidate: &Candidate) -> f64 {
    candidate.rating * 0.4 - candidate.distance_km * 0.6
}

/// Orders candidates for the offer fan-out.
pub fn rank(mut candidates: Vec<Candidate>, mode: RankingMode) -> Vec<Candidate> {
    match mode {
        RankingMode::Distance => {
            // Discovery order is already nearest-first.
        }
        RankingMode::Rating => {
            candidates.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        }
        RankingMode::Balanced => {
            candidates.sort_by(|a, b| balanced_score(b).total_cmp(&balanced_score(a)));
        }
    }
    candidates
}
