//! Adaptive-window trend and dispersion statistics.
//!
//! Every function here shrinks its window to the available data instead of
//! refusing short series; callers label degraded results rather than erroring.

/// Canonical moving-average window: 150 bars ≈ 30 weeks of daily data.
pub const MA_WINDOW: usize = 150;

/// Minimum bars for a meaningful moving average or trend figure.
pub const MIN_BARS: usize = 10;

/// Volatility lookback.
pub const VOLATILITY_WINDOW: usize = 20;

/// Trend lookback, also the classifier's up/down-day window.
pub const TREND_WINDOW: usize = 30;

/// Mean of a data slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population standard deviation.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / data.len() as f64;
    variance.sqrt()
}

/// Arithmetic mean of the trailing min(150, len) closes.
///
/// Returns 0.0 with fewer than 10 bars: the average is considered
/// unavailable, and [`percent_vs_ma`] guards that sentinel.
pub fn adaptive_moving_average(closes: &[f64]) -> f64 {
    if closes.len() < MIN_BARS {
        return 0.0;
    }
    let window = closes.len().min(MA_WINDOW);
    mean(&closes[closes.len() - window..])
}

/// Percent distance of `price` from `ma`; 0.0 when the average is unavailable.
pub fn percent_vs_ma(price: f64, ma: f64) -> f64 {
    if ma == 0.0 {
        0.0
    } else {
        (price - ma) / ma * 100.0
    }
}

/// Standard deviation of simple returns over the trailing min(20, len)
/// closes, as a percentage. The first return in the window is 0.
pub fn trailing_volatility(closes: &[f64]) -> f64 {
    if closes.len() < 2 {
        return 0.0;
    }
    let window = closes.len().min(VOLATILITY_WINDOW);
    let tail = &closes[closes.len() - window..];

    let mut returns = Vec::with_capacity(tail.len());
    returns.push(0.0);
    for i in 1..tail.len() {
        let prev = tail[i - 1];
        returns.push(if prev != 0.0 { (tail[i] - prev) / prev } else { 0.0 });
    }
    std_dev(&returns) * 100.0
}

/// Percent change from the first to the last close of the trailing
/// min(30, len) window. 0.0 when the window holds fewer than 10 bars.
pub fn trailing_trend_percent(closes: &[f64]) -> f64 {
    let window = closes.len().min(TREND_WINDOW);
    if window < MIN_BARS {
        return 0.0;
    }
    let tail = &closes[closes.len() - window..];
    let start = tail[0];
    if start == 0.0 {
        0.0
    } else {
        (tail[tail.len() - 1] - start) / start * 100.0
    }
}

/// Percent change across an arbitrary close slice, tolerating any length.
/// Used by the factor scorers' momentum proxies, which have no minimum-bars
/// rule — they scale down to whatever history exists.
pub fn percent_change(closes: &[f64]) -> f64 {
    if closes.len() < 2 {
        return 0.0;
    }
    let start = closes[0];
    if start == 0.0 {
        0.0
    } else {
        (closes[closes.len() - 1] - start) / start * 100.0
    }
}
