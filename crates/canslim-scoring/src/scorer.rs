use scoring_core::{BarSeries, CanslimScore, FactorScores, FundamentalSnapshot, Grade};
use tracing::debug;

use crate::factors::*;

/// Seven-factor CANSLIM grading engine.
///
/// Stateless and synchronous: each call is a pure function of its inputs.
/// Fundamentals are optional — with no snapshot every factor falls back to
/// its price/volume proxy, so the worst case is a low, clearly-described
/// score rather than a failure.
pub struct CanslimScorer;

impl CanslimScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(
        &self,
        current_price: f64,
        series: &BarSeries,
        current_volume: f64,
        fundamentals: Option<&FundamentalSnapshot>,
    ) -> CanslimScore {
        // Fall back to the last close when the caller has no live quote.
        let price = if current_price > 0.0 {
            current_price
        } else {
            series.last().map(|b| b.close).unwrap_or(0.0)
        };

        let factors = FactorScores {
            current_earnings: score_current_earnings(series, fundamentals),
            annual_earnings: score_annual_earnings(series, fundamentals),
            new_highs: score_new_highs(price, series, fundamentals),
            supply_demand: score_supply_demand(series, current_volume, fundamentals),
            leadership: score_leadership(series, fundamentals),
            institutional: score_institutional(series),
            market_direction: score_market_direction(series),
        };

        let total_score: f64 = factors.all().iter().map(|f| f.score).sum();
        let max_total_score: f64 = factors.all().iter().map(|f| f.max_score).sum();
        let percentage = if max_total_score > 0.0 {
            total_score / max_total_score * 100.0
        } else {
            0.0
        };
        let overall_grade = Grade::from_percentage(percentage);

        debug!(
            total = total_score,
            max = max_total_score,
            grade = overall_grade.letter(),
            bars = series.len(),
            "computed CANSLIM score"
        );

        CanslimScore {
            overall_grade,
            factors,
            total_score,
            max_total_score,
            percentage,
        }
    }
}

impl Default for CanslimScorer {
    fn default() -> Self {
        Self::new()
    }
}
