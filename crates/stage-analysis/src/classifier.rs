use scoring_core::{BarSeries, Stage, StageAnalysis, TrendStrength, VolatilityLevel};
use tracing::debug;

use crate::calculator::{
    adaptive_moving_average, mean, percent_vs_ma, trailing_trend_percent, trailing_volatility,
    MA_WINDOW, MIN_BARS, TREND_WINDOW,
};

/// Rule-based Weinstein stage classifier.
///
/// Recomputes the stage fresh from the current price/MA/trend/volatility
/// snapshot on every call — there is no persisted previous stage and no
/// transition graph. Stage 1 (Accumulation) is the catch-all; Stages 2-4
/// are carved out by ordered checks, first match wins.
pub struct StageClassifier {
    /// Bars needed to fill the canonical 30-week moving average.
    full_window: usize,
    /// Below this, the moving average is unavailable and classification
    /// degrades to a simplified average-vs-current comparison.
    min_full_bars: usize,
}

impl StageClassifier {
    pub fn new() -> Self {
        Self {
            full_window: MA_WINDOW,
            min_full_bars: MIN_BARS,
        }
    }

    pub fn classify(&self, series: &BarSeries) -> StageAnalysis {
        if series.is_empty() {
            debug!("stage classification with zero usable bars");
            return self.insufficient_data();
        }
        if series.len() < self.min_full_bars {
            debug!(bars = series.len(), "limited-data stage classification");
            return self.classify_limited(series);
        }
        self.classify_full(series)
    }

    /// Zero usable bars: a Stage-1-equivalent placeholder with zeroed fields.
    fn insufficient_data(&self) -> StageAnalysis {
        StageAnalysis {
            stage: Stage::Accumulation,
            stage_name: "Insufficient Data".to_string(),
            description: "No usable price bars were available; stage cannot be determined"
                .to_string(),
            moving_average: 0.0,
            current_price: 0.0,
            price_vs_ma: 0.0,
            trend_strength: TrendStrength::Weak,
            volatility_level: VolatilityLevel::Low,
            bars_analyzed: 0,
        }
    }

    /// Too few bars for a moving average: compare current price against the
    /// simple average of all closes and report only Stage 2 or Stage 4.
    fn classify_limited(&self, series: &BarSeries) -> StageAnalysis {
        let closes = series.closes();
        let current_price = *closes.last().expect("non-empty series");
        let avg = mean(&closes);
        let price_vs_ma = percent_vs_ma(current_price, avg);

        let stage = if price_vs_ma >= 0.0 {
            Stage::Advancing
        } else {
            Stage::Declining
        };

        StageAnalysis {
            stage,
            stage_name: format!("Stage {}: {} (Limited Data)", stage.number(), stage.name()),
            description: format!(
                "Only {} bar(s) available; simplified price-vs-average comparison. {}",
                series.len(),
                stage.description()
            ),
            moving_average: avg,
            current_price,
            price_vs_ma,
            trend_strength: TrendStrength::from_percent(trailing_trend_percent(&closes)),
            volatility_level: VolatilityLevel::from_percent(trailing_volatility(&closes)),
            bars_analyzed: series.len(),
        }
    }

    fn classify_full(&self, series: &BarSeries) -> StageAnalysis {
        let closes = series.closes();
        let current_price = *closes.last().expect("non-empty series");
        let ma = adaptive_moving_average(&closes);
        let price_vs_ma = percent_vs_ma(current_price, ma);
        let trend = trailing_trend_percent(&closes);
        let volatility = trailing_volatility(&closes);
        let volatility_level = VolatilityLevel::from_percent(volatility);

        let window = series.len().min(TREND_WINDOW);
        let (up_days, down_days) = series.up_down_days(window);
        let highest_high = series.highest_high(window).unwrap_or(current_price);

        let stage = self.resolve_stage(
            price_vs_ma,
            trend,
            volatility_level,
            up_days,
            down_days,
            current_price,
            highest_high,
        );

        // The canonical window is 150 bars; anything shorter is an estimate.
        let label = if series.len() < self.full_window {
            " (Estimated)"
        } else {
            ""
        };

        StageAnalysis {
            stage,
            stage_name: format!("Stage {}: {}{}", stage.number(), stage.name(), label),
            description: stage.description().to_string(),
            moving_average: ma,
            current_price,
            price_vs_ma,
            trend_strength: TrendStrength::from_percent(trend),
            volatility_level,
            bars_analyzed: series.len(),
        }
    }

    /// Ordered stage rules; first match wins, Stage 1 is the default.
    #[allow(clippy::too_many_arguments)]
    fn resolve_stage(
        &self,
        price_vs_ma: f64,
        trend: f64,
        volatility_level: VolatilityLevel,
        up_days: usize,
        down_days: usize,
        current_price: f64,
        highest_high: f64,
    ) -> Stage {
        // Stage 2 Advancing: above the MA, trending up, demand dominating
        if price_vs_ma > 0.0 && trend > 2.0 && up_days as f64 > down_days as f64 * 1.2 {
            return Stage::Advancing;
        }

        // Stage 4 Declining: the mirror image
        if price_vs_ma < 0.0 && trend < -2.0 && down_days as f64 > up_days as f64 * 1.2 {
            return Stage::Declining;
        }

        // Stage 3 Distribution: churning near highs — high volatility with a
        // flat trend while price holds within 5% of the window high
        if volatility_level == VolatilityLevel::High
            && price_vs_ma > -5.0
            && highest_high > 0.0
            && current_price >= highest_high * 0.95
            && trend > -3.0
            && trend < 3.0
        {
            return Stage::Distribution;
        }

        Stage::Accumulation
    }
}

impl Default for StageClassifier {
    fn default() -> Self {
        Self::new()
    }
}
