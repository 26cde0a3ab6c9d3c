//! The seven CANSLIM factor scorers.
//!
//! Each factor is a pure function of the current price, the normalized bar
//! series, the current volume, and an optional fundamental snapshot. Every
//! factor prefers resolved fundamental data and substitutes a price/volume
//! proxy when the snapshot lacks the figure it needs. None of them fail:
//! zero bars scores 0 with a "no data" description, a single bar degrades
//! to a minimal direction proxy.

use scoring_core::{BarSeries, FactorScore, FundamentalSnapshot};
use stage_analysis::{mean, percent_change, trailing_trend_percent, TREND_WINDOW};

/// Maximum for the two earnings factors and the new-highs factor.
pub const MAX_EARNINGS: f64 = 15.0;
/// Maximum for the supply/demand, leadership, institutional, and
/// market-direction factors.
pub const MAX_SECONDARY: f64 = 10.0;

/// One quarter of daily bars, the C-factor proxy window.
const QUARTER_BARS: usize = 60;
/// One year of daily bars, the A-factor proxy window.
const YEAR_BARS: usize = 252;
/// New-highs lookback.
const NEW_HIGH_BARS: usize = 60;
/// Volume lookback for the S and I factors.
const VOLUME_BARS: usize = 20;

/// Map an earnings-growth percentage onto the canonical 15-point tiers,
/// scaled proportionally for other factor maxima. 25% exactly is top tier.
fn growth_tier(growth_pct: f64, max: f64) -> f64 {
    let points = if growth_pct >= 25.0 {
        15.0
    } else if growth_pct >= 15.0 {
        12.0
    } else if growth_pct >= 5.0 {
        8.0
    } else if growth_pct >= 0.0 {
        5.0
    } else {
        2.0
    };
    points * max / 15.0
}

/// Price-momentum stand-in for a missing earnings-growth figure, graded on
/// the same tiers. Scales its window down to whatever history exists.
fn momentum_proxy(series: &BarSeries, window: usize, max: f64, missing: &str) -> FactorScore {
    if series.is_empty() {
        return FactorScore::new(0.0, max, format!("No price data and no {missing} available"));
    }
    if series.len() == 1 {
        let bar = &series.as_slice()[0];
        let g = if bar.open > 0.0 {
            (bar.close - bar.open) / bar.open * 100.0
        } else {
            0.0
        };
        return FactorScore::new(
            growth_tier(g, max),
            max,
            format!("Single-bar direction {g:+.1}% as proxy; no {missing} available"),
        );
    }
    let closes = series.closes();
    let tail = &closes[closes.len() - closes.len().min(window)..];
    let g = percent_change(tail);
    FactorScore::new(
        growth_tier(g, max),
        max,
        format!(
            "Price momentum {g:+.1}% over {} bars as proxy; no {missing} available",
            tail.len()
        ),
    )
}

/// C — current-quarter earnings growth (max 15).
pub fn score_current_earnings(
    series: &BarSeries,
    fundamentals: Option<&FundamentalSnapshot>,
) -> FactorScore {
    if let Some(snap) = fundamentals {
        if let Some(growth) = snap.quarterly_eps_growth {
            return FactorScore::new(
                growth_tier(growth, MAX_EARNINGS),
                MAX_EARNINGS,
                format!("Quarterly EPS growth {growth:+.1}% ({})", snap.source),
            );
        }
    }
    momentum_proxy(series, QUARTER_BARS, MAX_EARNINGS, "quarterly EPS growth")
}

/// A — annual/multi-year earnings growth (max 15). Prefers 3-year, then
/// 5-year, then annual EPS growth; falls back to one-year price appreciation.
pub fn score_annual_earnings(
    series: &BarSeries,
    fundamentals: Option<&FundamentalSnapshot>,
) -> FactorScore {
    if let Some(snap) = fundamentals {
        if let Some(growth) = snap.multi_year_eps_growth() {
            return FactorScore::new(
                growth_tier(growth, MAX_EARNINGS),
                MAX_EARNINGS,
                format!("Multi-year EPS growth {growth:+.1}% ({})", snap.source),
            );
        }
    }
    momentum_proxy(series, YEAR_BARS, MAX_EARNINGS, "annual EPS growth")
}

fn new_high_tier(price: f64, high: f64, source: &str) -> FactorScore {
    let distance = (high - price) / high * 100.0;
    let score = if distance <= 5.0 {
        15.0
    } else if distance <= 10.0 {
        12.0
    } else if distance <= 20.0 {
        8.0
    } else if distance <= 35.0 {
        5.0
    } else {
        2.0
    };
    FactorScore::new(
        score,
        MAX_EARNINGS,
        format!("Price {:.1}% below {source} of {high:.2}", distance.max(0.0)),
    )
}

/// N — proximity to new highs (max 15). Uses the snapshot's 52-week high
/// when available, otherwise the trailing 60-bar highest high. A single
/// bar compares the price against that bar's own high.
pub fn score_new_highs(
    current_price: f64,
    series: &BarSeries,
    fundamentals: Option<&FundamentalSnapshot>,
) -> FactorScore {
    if current_price > 0.0 {
        if let Some(high) = fundamentals
            .and_then(|f| f.week_52_high)
            .filter(|h| *h > 0.0)
        {
            return new_high_tier(current_price, high, "52-week high");
        }
    }

    let window = series.len().min(NEW_HIGH_BARS);
    match series.highest_high(window) {
        Some(high) if high > 0.0 && current_price > 0.0 => {
            new_high_tier(current_price, high, "trailing high")
        }
        _ => FactorScore::new(
            0.0,
            MAX_EARNINGS,
            "No price data to measure distance from highs",
        ),
    }
}

/// S — supply/demand (max 10). A known float is graded directly: the
/// smaller the float, the higher the score. Without shares outstanding,
/// today's volume is compared against the trailing average and the
/// average on up-days specifically.
pub fn score_supply_demand(
    series: &BarSeries,
    current_volume: f64,
    fundamentals: Option<&FundamentalSnapshot>,
) -> FactorScore {
    if let Some(shares) = fundamentals
        .and_then(|f| f.shares_outstanding)
        .filter(|s| *s > 0.0)
    {
        let (score, tier) = if shares < 50_000_000.0 {
            (10.0, "low float")
        } else if shares < 200_000_000.0 {
            (8.0, "moderate float")
        } else if shares < 500_000_000.0 {
            (5.0, "large float")
        } else {
            (2.0, "very large float")
        };
        return FactorScore::new(
            score,
            MAX_SECONDARY,
            format!("{:.0}M shares outstanding ({tier})", shares / 1_000_000.0),
        );
    }

    if series.is_empty() {
        return FactorScore::new(
            0.0,
            MAX_SECONDARY,
            "No volume data and no float figure available",
        );
    }

    let tail = series.tail(series.len().min(VOLUME_BARS));
    let avg_volume = mean(&tail.iter().map(|b| b.volume).collect::<Vec<_>>());
    if avg_volume <= 0.0 {
        return FactorScore::new(
            2.0,
            MAX_SECONDARY,
            "Zero average volume; neutral-low supply/demand score",
        );
    }

    let up_volumes: Vec<f64> = tail
        .iter()
        .filter(|b| b.is_up_day())
        .map(|b| b.volume)
        .collect();
    let up_avg = mean(&up_volumes);
    let ratio = current_volume / avg_volume;

    let score = if ratio >= 1.5 && up_avg > avg_volume {
        8.0
    } else if ratio >= 1.0 {
        6.0
    } else if ratio >= 0.5 {
        4.0
    } else {
        2.0
    };
    FactorScore::new(
        score,
        MAX_SECONDARY,
        format!("Volume {ratio:.2}x trailing average (float unknown, volume proxy)"),
    )
}

/// L — relative leadership (max 10). Uses the snapshot's relative-strength
/// figure when present; otherwise the recent half of the series must
/// out-return the earlier half by a meaningful margin.
pub fn score_leadership(
    series: &BarSeries,
    fundamentals: Option<&FundamentalSnapshot>,
) -> FactorScore {
    if let Some(rs) = fundamentals.and_then(|f| f.relative_strength) {
        let score = if rs > 10.0 {
            10.0
        } else if rs > 0.0 {
            7.0
        } else if rs > -10.0 {
            4.0
        } else {
            2.0
        };
        return FactorScore::new(
            score,
            MAX_SECONDARY,
            format!("Relative strength vs benchmark {rs:+.1}%"),
        );
    }

    if series.is_empty() {
        return FactorScore::new(
            0.0,
            MAX_SECONDARY,
            "No price data and no relative-strength figure available",
        );
    }
    if series.len() == 1 {
        let score = if series.as_slice()[0].is_up_day() { 4.0 } else { 2.0 };
        return FactorScore::new(
            score,
            MAX_SECONDARY,
            "Single-bar direction as leadership proxy",
        );
    }

    let closes = series.closes();
    let mid = closes.len() / 2;
    let earlier_return = percent_change(&closes[..mid]);
    let recent_return = percent_change(&closes[mid..]);

    let score = if recent_return > 10.0 && recent_return > earlier_return {
        10.0
    } else if recent_return > 5.0 && recent_return > earlier_return {
        7.0
    } else if recent_return > 0.0 {
        4.0
    } else {
        2.0
    };
    FactorScore::new(
        score,
        MAX_SECONDARY,
        format!(
            "Recent-half return {recent_return:+.1}% vs earlier {earlier_return:+.1}% (price proxy)"
        ),
    )
}

/// I — institutional-activity proxy (max 10). Counts high-volume days
/// (> 1.5x the trailing average) in the window. No true institutional
/// ownership source exists, so the result is always an approximation.
/// The 4/2/1-day thresholds assume a 20-bar window and are scaled down
/// (rounded up) for shorter series.
pub fn score_institutional(series: &BarSeries) -> FactorScore {
    if series.is_empty() {
        return FactorScore::new(
            0.0,
            MAX_SECONDARY,
            "No volume data; institutional activity unknown (approximation)",
        );
    }

    let window = series.len().min(VOLUME_BARS);
    let tail = series.tail(window);
    let avg_volume = mean(&tail.iter().map(|b| b.volume).collect::<Vec<_>>());
    let high_volume_days = if avg_volume > 0.0 {
        tail.iter().filter(|b| b.volume > avg_volume * 1.5).count()
    } else {
        0
    };

    let scale = window as f64 / VOLUME_BARS as f64;
    let strong = (4.0 * scale).ceil() as usize;
    let moderate = (2.0 * scale).ceil() as usize;
    let light = scale.ceil() as usize;

    let score = if high_volume_days >= strong {
        10.0
    } else if high_volume_days >= moderate {
        7.0
    } else if high_volume_days >= light {
        4.0
    } else {
        2.0
    };
    FactorScore::new(
        score,
        MAX_SECONDARY,
        format!(
            "{high_volume_days} high-volume day(s) in {window} bars (approximation, no ownership data)"
        ),
    )
}

/// M — market-direction / trend alignment (max 10). Trailing trend percent
/// combined with up-day dominance.
pub fn score_market_direction(series: &BarSeries) -> FactorScore {
    if series.is_empty() {
        return FactorScore::new(0.0, MAX_SECONDARY, "No price data to judge trend direction");
    }
    if series.len() == 1 {
        let score = if series.as_slice()[0].is_up_day() { 7.0 } else { 2.0 };
        return FactorScore::new(
            score,
            MAX_SECONDARY,
            "Single-bar direction as trend proxy",
        );
    }

    let closes = series.closes();
    let trend = trailing_trend_percent(&closes);
    let (up_days, down_days) = series.up_down_days(series.len().min(TREND_WINDOW));

    let score = if trend > 5.0 && up_days > down_days {
        10.0
    } else if trend > 0.0 {
        7.0
    } else if trend > -5.0 {
        4.0
    } else {
        2.0
    };
    FactorScore::new(
        score,
        MAX_SECONDARY,
        format!("Trailing trend {trend:+.1}% with {up_days} up / {down_days} down days"),
    )
}
