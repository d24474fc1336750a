//! Raw score computation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Score components of one evaluation row.
///
/// Bonus and penalty columns are nullable; a missing value counts as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_score: Decimal,
    pub total_bonus: Option<Decimal>,
    pub total_penalty: Option<Decimal>,
}

impl ScoreBreakdown {
    pub fn new(base_score: Decimal) -> Self {
        Self {
            base_score,
            total_bonus: None,
            total_penalty: None,
        }
    }

    pub fn with_bonus(mut self, bonus: Decimal) -> Self {
        self.total_bonus = Some(bonus);
        self
    }

    pub fn with_penalty(mut self, penalty: Decimal) -> Self {
        self.total_penalty = Some(penalty);
        self
    }

    /// `base + coalesce(bonus, 0) - coalesce(penalty, 0)`.
    ///
    /// No clamping: a penalty larger than the base yields a negative score.
    pub fn raw_score(&self) -> Decimal {
        self.base_score + self.total_bonus.unwrap_or(Decimal::ZERO)
            - self.total_penalty.unwrap_or(Decimal::ZERO)
    }
}
