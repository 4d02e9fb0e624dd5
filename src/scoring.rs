#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Turns a similarity score into points for a question.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::types::clamp_score;

/// Credit bands, highest first, with the minimum score for each.
const TIERS: [(f64, CreditTier); 4] = [
    (0.85, CreditTier::Full),
    (0.70, CreditTier::HighPartial),
    (0.60, CreditTier::MediumPartial),
    (0.50, CreditTier::LowPartial),
];

/// Questions worth less than this are rounded to the nearest half point;
/// others to the nearest quarter.
const HALF_POINT_BELOW: f64 = 4.0;

/// Share of a question's points earned by a similarity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreditTier {
    /// 100% of points.
    Full,
    /// 75% of points.
    HighPartial,
    /// 50% of points.
    MediumPartial,
    /// 25% of points.
    LowPartial,
    /// Nothing.
    None,
}

impl CreditTier {
    /// Tier for a similarity score.
    pub fn for_score(score: f64) -> Self {
        TIERS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, tier)| *tier)
            .unwrap_or(CreditTier::None)
    }

    /// Fraction of points this tier earns.
    pub fn share(self) -> f64 {
        match self {
            CreditTier::Full => 1.0,
            CreditTier::HighPartial => 0.75,
            CreditTier::MediumPartial => 0.5,
            CreditTier::LowPartial => 0.25,
            CreditTier::None => 0.0,
        }
    }
}

impl Display for CreditTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CreditTier::Full => "Full Credit (100%)",
            CreditTier::HighPartial => "High Partial (75%)",
            CreditTier::MediumPartial => "Medium Partial (50%)",
            CreditTier::LowPartial => "Low Partial (25%)",
            CreditTier::None => "No Credit (0%)",
        };
        f.write_str(label)
    }
}

/// Points earned out of points available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Points {
    /// Points earned.
    pub earned: f64,
    /// Points available.
    pub out_of: f64,
}

impl Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}/{:.2}", self.earned, self.out_of)
    }
}

/// Points awarded for one answer.
#[derive(Tabled, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsAward {
    #[tabled(rename = "Points")]
    /// * `points`: earned/out_of after rounding
    pub points: Points,
    #[tabled(rename = "Tier")]
    /// * `tier`: credit band the score fell into
    pub tier:   CreditTier,
}

impl PointsAward {
    /// Points earned.
    pub fn earned(&self) -> f64 {
        self.points.earned
    }
}

/// Awards points for `similarity_score` on a question worth `max_points`.
///
/// Questions under four points round to the nearest 0.5, others to the
/// nearest 0.25; the award never exceeds `max_points`.
pub fn award_points(similarity_score: f64, max_points: f64) -> PointsAward {
    let tier = CreditTier::for_score(clamp_score(similarity_score));
    if !max_points.is_finite() || max_points <= 0.0 {
        return PointsAward {
            points: Points::default(),
            tier,
        };
    }

    let raw = max_points * tier.share();
    let step = if max_points < HALF_POINT_BELOW { 2.0 } else { 4.0 };
    let earned = ((raw * step).round() / step).min(max_points);

    PointsAward {
        points: Points {
            earned,
            out_of: max_points,
        },
        tier,
    }
}
