use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw OHLCV bar as delivered by a price/volume provider.
///
/// Every field is optional because provider payloads are untrusted: closes
/// can be missing or NaN, volumes negative, timestamps absent or malformed.
/// Pass a slice of these through [`crate::normalize_bars`] before analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBar {
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Validated OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Bar {
    /// An up-day closes above its open.
    pub fn is_up_day(&self) -> bool {
        self.close > self.open
    }
}

/// An ordered sequence of validated bars, oldest first.
///
/// Created per analysis call by the normalizer and owned by the caller;
/// nothing in the engine persists or caches a series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// The trailing `window` bars (the whole series when shorter).
    pub fn tail(&self, window: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(window);
        &self.bars[start..]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Count (up-days, down-days) over the trailing `window` bars.
    /// A bar closing exactly at its open counts as neither.
    pub fn up_down_days(&self, window: usize) -> (usize, usize) {
        let tail = self.tail(window);
        let up = tail.iter().filter(|b| b.close > b.open).count();
        let down = tail.iter().filter(|b| b.close < b.open).count();
        (up, down)
    }

    /// Highest high over the trailing `window` bars.
    pub fn highest_high(&self, window: usize) -> Option<f64> {
        self.tail(window)
            .iter()
            .map(|b| b.high)
            .fold(None, |acc: Option<f64>, h| match acc {
                Some(m) if m >= h => Some(m),
                _ => Some(h),
            })
    }
}

/// Weinstein market-cycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Accumulation,
    Advancing,
    Distribution,
    Declining,
}

impl Stage {
    pub fn number(&self) -> u8 {
        match self {
            Stage::Accumulation => 1,
            Stage::Advancing => 2,
            Stage::Distribution => 3,
            Stage::Declining => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Accumulation => "Accumulation",
            Stage::Advancing => "Advancing",
            Stage::Distribution => "Distribution",
            Stage::Declining => "Declining",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Stage::Accumulation => {
                "Basing phase: price moving sideways around a flat moving average"
            }
            Stage::Advancing => "Markup phase: price above a rising moving average with demand in control",
            Stage::Distribution => "Topping phase: price churning near highs with elevated volatility",
            Stage::Declining => "Markdown phase: price below a falling moving average with supply in control",
        }
    }
}

/// Trend strength bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStrength {
    Strong,
    Moderate,
    Weak,
}

impl TrendStrength {
    /// Bucket a trailing trend percentage: |t| > 10 Strong, > 5 Moderate, else Weak.
    pub fn from_percent(trend_pct: f64) -> Self {
        let t = trend_pct.abs();
        if t > 10.0 {
            TrendStrength::Strong
        } else if t > 5.0 {
            TrendStrength::Moderate
        } else {
            TrendStrength::Weak
        }
    }
}

/// Volatility bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityLevel {
    High,
    Medium,
    Low,
}

impl VolatilityLevel {
    /// Bucket a return-stddev percentage: > 3 High, > 1.5 Medium, else Low.
    pub fn from_percent(volatility_pct: f64) -> Self {
        if volatility_pct > 3.0 {
            VolatilityLevel::High
        } else if volatility_pct > 1.5 {
            VolatilityLevel::Medium
        } else {
            VolatilityLevel::Low
        }
    }
}

/// Result of a stage classification. Derived fresh on each call; the
/// classifier keeps no previous-stage state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageAnalysis {
    pub stage: Stage,
    /// Display name including data-quality label, e.g.
    /// "Stage 2: Advancing (Estimated)".
    pub stage_name: String,
    pub description: String,
    pub moving_average: f64,
    pub current_price: f64,
    /// Percent distance of current price from the moving average.
    pub price_vs_ma: f64,
    pub trend_strength: TrendStrength,
    pub volatility_level: VolatilityLevel,
    /// Number of usable bars the classification was computed from.
    pub bars_analyzed: usize,
}

/// Normalized fundamental metrics from whichever provider resolved first.
///
/// Every figure is independently optional; the factor scorer pattern-matches
/// on presence and falls back to price-derived proxies otherwise. Resolved
/// once per scoring call and discarded — never cached here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    /// Name of the provider that produced this snapshot.
    pub source: String,
    pub quarterly_eps_growth: Option<f64>,
    pub annual_eps_growth: Option<f64>,
    pub eps_growth_3y: Option<f64>,
    pub eps_growth_5y: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub week_52_high: Option<f64>,
    /// Performance relative to a benchmark index, in percent.
    pub relative_strength: Option<f64>,
}

impl FundamentalSnapshot {
    /// Whether at least one metric is populated.
    pub fn has_data(&self) -> bool {
        self.quarterly_eps_growth.is_some()
            || self.annual_eps_growth.is_some()
            || self.eps_growth_3y.is_some()
            || self.eps_growth_5y.is_some()
            || self.shares_outstanding.is_some()
            || self.week_52_high.is_some()
            || self.relative_strength.is_some()
    }

    /// Best available multi-year EPS growth figure: 3Y, then 5Y, then annual.
    pub fn multi_year_eps_growth(&self) -> Option<f64> {
        self.eps_growth_3y
            .or(self.eps_growth_5y)
            .or(self.annual_eps_growth)
    }
}

/// One factor's contribution to the CANSLIM grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorScore {
    pub score: f64,
    pub max_score: f64,
    /// Explains the figure used, including whether a price/volume proxy
    /// substituted for missing fundamentals.
    pub description: String,
}

impl FactorScore {
    pub fn new(score: f64, max_score: f64, description: impl Into<String>) -> Self {
        Self {
            score,
            max_score,
            description: description.into(),
        }
    }
}

/// The seven CANSLIM factor scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorScores {
    pub current_earnings: FactorScore,
    pub annual_earnings: FactorScore,
    pub new_highs: FactorScore,
    pub supply_demand: FactorScore,
    pub leadership: FactorScore,
    pub institutional: FactorScore,
    pub market_direction: FactorScore,
}

impl FactorScores {
    pub fn all(&self) -> [&FactorScore; 7] {
        [
            &self.current_earnings,
            &self.annual_earnings,
            &self.new_highs,
            &self.supply_demand,
            &self.leadership,
            &self.institutional,
            &self.market_direction,
        ]
    }
}

/// Letter grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Map a 0-100 percentage to a letter grade. Total over all inputs:
    /// ≥85 A, ≥70 B, ≥55 C, ≥40 D, else F.
    pub fn from_percentage(pct: f64) -> Self {
        if pct >= 85.0 {
            Grade::A
        } else if pct >= 70.0 {
            Grade::B
        } else if pct >= 55.0 {
            Grade::C
        } else if pct >= 40.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn letter(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

/// Final CANSLIM grading record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanslimScore {
    pub overall_grade: Grade,
    pub factors: FactorScores,
    pub total_score: f64,
    /// Always 85: 15 + 15 + 15 + 10 + 10 + 10 + 10.
    pub max_total_score: f64,
    pub percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(Grade::from_percentage(100.0), Grade::A);
        assert_eq!(Grade::from_percentage(85.0), Grade::A);
        assert_eq!(Grade::from_percentage(84.9), Grade::B);
        assert_eq!(Grade::from_percentage(70.0), Grade::B);
        assert_eq!(Grade::from_percentage(55.0), Grade::C);
        assert_eq!(Grade::from_percentage(40.0), Grade::D);
        assert_eq!(Grade::from_percentage(39.9), Grade::F);
        assert_eq!(Grade::from_percentage(0.0), Grade::F);
    }

    #[test]
    fn test_grade_monotonic() {
        // Higher percentage never produces a worse grade
        let mut prev = Grade::F;
        for i in 0..=1000 {
            let g = Grade::from_percentage(i as f64 / 10.0);
            assert!(g <= prev, "grade regressed at {}", i as f64 / 10.0);
            prev = g;
        }
    }

    #[test]
    fn test_trend_strength_buckets() {
        assert_eq!(TrendStrength::from_percent(15.0), TrendStrength::Strong);
        assert_eq!(TrendStrength::from_percent(-12.0), TrendStrength::Strong);
        assert_eq!(TrendStrength::from_percent(7.0), TrendStrength::Moderate);
        assert_eq!(TrendStrength::from_percent(3.0), TrendStrength::Weak);
        assert_eq!(TrendStrength::from_percent(0.0), TrendStrength::Weak);
    }

    #[test]
    fn test_volatility_buckets() {
        assert_eq!(VolatilityLevel::from_percent(4.0), VolatilityLevel::High);
        assert_eq!(VolatilityLevel::from_percent(2.0), VolatilityLevel::Medium);
        assert_eq!(VolatilityLevel::from_percent(1.0), VolatilityLevel::Low);
    }

    #[test]
    fn test_snapshot_growth_preference() {
        let snap = FundamentalSnapshot {
            source: "test".to_string(),
            eps_growth_3y: Some(20.0),
            eps_growth_5y: Some(10.0),
            annual_eps_growth: Some(5.0),
            ..Default::default()
        };
        assert_eq!(snap.multi_year_eps_growth(), Some(20.0));

        let snap = FundamentalSnapshot {
            source: "test".to_string(),
            eps_growth_5y: Some(10.0),
            annual_eps_growth: Some(5.0),
            ..Default::default()
        };
        assert_eq!(snap.multi_year_eps_growth(), Some(10.0));

        let snap = FundamentalSnapshot::default();
        assert_eq!(snap.multi_year_eps_growth(), None);
        assert!(!snap.has_data());
    }

    #[test]
    fn test_highest_high_window() {
        let bars: Vec<Bar> = [(10.0, 12.0), (11.0, 15.0), (11.5, 13.0)]
            .iter()
            .map(|&(close, high)| Bar {
                open: close,
                high,
                low: close,
                close,
                volume: 0.0,
                timestamp: None,
            })
            .collect();
        let series = BarSeries::new(bars);
        assert_eq!(series.highest_high(3), Some(15.0));
        assert_eq!(series.highest_high(1), Some(13.0));
        assert_eq!(BarSeries::default().highest_high(5), None);
    }

    #[test]
    fn test_up_down_days() {
        let bars: Vec<Bar> = [(10.0, 11.0), (11.0, 10.5), (10.5, 10.5), (10.5, 11.5)]
            .iter()
            .map(|&(open, close)| Bar {
                open,
                high: open.max(close),
                low: open.min(close),
                close,
                volume: 0.0,
                timestamp: None,
            })
            .collect();
        let series = BarSeries::new(bars);
        // One flat bar counts as neither up nor down
        assert_eq!(series.up_down_days(4), (2, 1));
        assert_eq!(series.up_down_days(1), (1, 0));
    }
}
