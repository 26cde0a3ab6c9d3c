use crate::classifier::StageClassifier;
use scoring_core::{Bar, BarSeries, Stage, VolatilityLevel};

/// Build a series where each bar opens at the previous close, so up/down
/// days follow the close-to-close direction.
fn series_from_closes(closes: &[f64]) -> BarSeries {
    let mut bars = Vec::with_capacity(closes.len());
    let mut prev = closes.first().copied().unwrap_or(0.0);
    for &close in closes {
        bars.push(Bar {
            open: prev,
            high: prev.max(close),
            low: prev.min(close),
            close,
            volume: 1_000_000.0,
            timestamp: None,
        });
        prev = close;
    }
    BarSeries::new(bars)
}

#[test]
fn test_empty_series_reports_insufficient_data() {
    let result = StageClassifier::new().classify(&BarSeries::default());
    assert_eq!(result.stage, Stage::Accumulation);
    assert_eq!(result.stage_name, "Insufficient Data");
    assert_eq!(result.moving_average, 0.0);
    assert_eq!(result.current_price, 0.0);
    assert_eq!(result.price_vs_ma, 0.0);
    assert_eq!(result.bars_analyzed, 0);
}

#[test]
fn test_five_rising_bars_is_limited_data_stage_two() {
    let series = series_from_closes(&[10.0, 10.5, 11.0, 11.5, 12.0]);
    let result = StageClassifier::new().classify(&series);

    assert_eq!(result.stage, Stage::Advancing);
    assert!(result.stage_name.contains("(Limited Data)"));
    assert!(result.price_vs_ma > 0.0);
    assert_eq!(result.bars_analyzed, 5);
}

#[test]
fn test_falling_bars_is_limited_data_stage_four() {
    let series = series_from_closes(&[12.0, 11.0, 10.0, 9.0]);
    let result = StageClassifier::new().classify(&series);

    assert_eq!(result.stage, Stage::Declining);
    assert!(result.stage_name.contains("(Limited Data)"));
    assert!(result.price_vs_ma < 0.0);
}

#[test]
fn test_single_bar_classifies_without_panicking() {
    let series = series_from_closes(&[42.0]);
    let result = StageClassifier::new().classify(&series);
    assert!(result.stage_name.contains("(Limited Data)"));
    assert_eq!(result.current_price, 42.0);
}

#[test]
fn test_monotonic_uptrend_is_stage_two() {
    let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    let result = StageClassifier::new().classify(&series_from_closes(&closes));

    assert_eq!(result.stage, Stage::Advancing);
    assert!(result.stage_name.contains("(Estimated)"));
    assert!(result.price_vs_ma > 0.0);
}

#[test]
fn test_monotonic_downtrend_is_stage_four() {
    let closes: Vec<f64> = (0..40).map(|i| 140.0 - i as f64).collect();
    let result = StageClassifier::new().classify(&series_from_closes(&closes));

    assert_eq!(result.stage, Stage::Declining);
    assert!(result.price_vs_ma < 0.0);
}

#[test]
fn test_churn_near_highs_is_stage_three() {
    // Flat base, then 30 bars whipsawing between 100 and 106 and settling
    // near the highs: high volatility, flat trend, price within 5% of the
    // window high — the topping signature.
    let mut closes = vec![100.0; 10];
    for i in 0..30 {
        closes.push(if i == 29 {
            102.9
        } else if i % 2 == 1 {
            106.0
        } else {
            100.0
        });
    }
    let result = StageClassifier::new().classify(&series_from_closes(&closes));

    assert_eq!(result.volatility_level, VolatilityLevel::High);
    assert_eq!(result.stage, Stage::Distribution);
}

#[test]
fn test_flat_series_defaults_to_stage_one() {
    let closes = vec![50.0; 40];
    let result = StageClassifier::new().classify(&series_from_closes(&closes));

    assert_eq!(result.stage, Stage::Accumulation);
    assert!(result.stage_name.contains("(Estimated)"));
}

#[test]
fn test_full_window_drops_estimated_label() {
    let closes: Vec<f64> = (0..150).map(|i| 100.0 + i as f64 * 0.5).collect();
    let result = StageClassifier::new().classify(&series_from_closes(&closes));

    assert_eq!(result.stage, Stage::Advancing);
    assert_eq!(result.stage_name, "Stage 2: Advancing");
    assert_eq!(result.bars_analyzed, 150);
}
