use chrono::{DateTime, NaiveDate, Utc};

use crate::types::{Bar, BarSeries, RawBar};

/// Validate and repair a raw bar sequence into a canonical series.
///
/// Rules:
/// - drop any bar whose close is missing, NaN, or <= 0;
/// - for kept bars, substitute the close for a missing/NaN open, high, or low;
/// - clamp missing, NaN, or negative volume to 0;
/// - when every surviving bar carried a timestamp, stable-sort oldest first
///   (unparseable timestamps tie with their neighbors); otherwise trust
///   input order as chronological.
///
/// Pure function: never mutates its input and never fails. Zero surviving
/// bars yields an empty series, which downstream analysis treats as a
/// first-class case rather than an error.
pub fn normalize_bars(raw: &[RawBar]) -> BarSeries {
    let mut all_timestamped = true;
    let mut keyed: Vec<(i64, Bar)> = Vec::with_capacity(raw.len());

    // Unparseable timestamps inherit the previous bar's sort key so a
    // stable sort keeps them in input position relative to their neighbors.
    let mut last_key = i64::MIN;

    for r in raw {
        let close = match r.close {
            Some(c) if c.is_finite() && c > 0.0 => c,
            _ => continue,
        };

        let repair = |field: Option<f64>| match field {
            Some(v) if v.is_finite() => v,
            _ => close,
        };
        let volume = match r.volume {
            Some(v) if v.is_finite() && v >= 0.0 => v,
            _ => 0.0,
        };

        let parsed = match &r.timestamp {
            Some(ts) => parse_timestamp(ts),
            None => {
                all_timestamped = false;
                None
            }
        };
        if let Some(ts) = parsed {
            last_key = ts.timestamp_millis();
        }

        keyed.push((
            last_key,
            Bar {
                open: repair(r.open),
                high: repair(r.high),
                low: repair(r.low),
                close,
                volume,
                timestamp: parsed,
            },
        ));
    }

    if all_timestamped {
        keyed.sort_by_key(|(key, _)| *key);
    }

    BarSeries::new(keyed.into_iter().map(|(_, bar)| bar).collect())
}

/// Parse an RFC 3339 timestamp, falling back to a plain `YYYY-MM-DD` date.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(close: Option<f64>) -> RawBar {
        RawBar {
            close,
            ..Default::default()
        }
    }

    #[test]
    fn test_drops_unusable_closes() {
        let input = vec![
            raw(Some(10.0)),
            raw(None),
            raw(Some(f64::NAN)),
            raw(Some(0.0)),
            raw(Some(-5.0)),
            raw(Some(11.0)),
        ];
        let series = normalize_bars(&input);
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![10.0, 11.0]);
    }

    #[test]
    fn test_repairs_missing_fields() {
        let input = vec![RawBar {
            open: None,
            high: Some(f64::NAN),
            low: None,
            close: Some(42.0),
            volume: Some(-100.0),
            timestamp: None,
        }];
        let series = normalize_bars(&input);
        let bar = &series.as_slice()[0];
        assert_eq!(bar.open, 42.0);
        assert_eq!(bar.high, 42.0);
        assert_eq!(bar.low, 42.0);
        assert_eq!(bar.volume, 0.0);
    }

    #[test]
    fn test_sorts_when_all_timestamped() {
        let mut b1 = raw(Some(1.0));
        b1.timestamp = Some("2024-01-03".to_string());
        let mut b2 = raw(Some(2.0));
        b2.timestamp = Some("2024-01-01".to_string());
        let mut b3 = raw(Some(3.0));
        b3.timestamp = Some("2024-01-02T12:00:00Z".to_string());

        let series = normalize_bars(&[b1, b2, b3]);
        assert_eq!(series.closes(), vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_skips_sort_when_any_timestamp_missing() {
        let mut b1 = raw(Some(1.0));
        b1.timestamp = Some("2024-01-03".to_string());
        let b2 = raw(Some(2.0)); // no timestamp
        let mut b3 = raw(Some(3.0));
        b3.timestamp = Some("2024-01-01".to_string());

        // Input order trusted as chronological
        let series = normalize_bars(&[b1, b2, b3]);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_unparseable_timestamps_tie_in_place() {
        let mut b1 = raw(Some(1.0));
        b1.timestamp = Some("2024-01-02".to_string());
        let mut b2 = raw(Some(2.0));
        b2.timestamp = Some("not-a-date".to_string());
        let mut b3 = raw(Some(3.0));
        b3.timestamp = Some("2024-01-01".to_string());

        // The malformed bar stays beside the bar it followed
        let series = normalize_bars(&[b1, b2, b3]);
        assert_eq!(series.closes(), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_empty_input_yields_empty_series() {
        let series = normalize_bars(&[]);
        assert!(series.is_empty());

        let series = normalize_bars(&[raw(None), raw(Some(-1.0))]);
        assert!(series.is_empty());
    }

    #[test]
    fn test_deserializes_sparse_provider_json() {
        let payload = r#"[
            {"close": 10.5, "volume": 1000, "timestamp": "2024-01-02"},
            {"open": 10.0, "high": 11.0, "low": 9.5, "close": 10.8}
        ]"#;
        let raw: Vec<RawBar> = serde_json::from_str(payload).unwrap();
        let series = normalize_bars(&raw);
        assert_eq!(series.len(), 2);
        assert_eq!(series.as_slice()[0].open, 10.5);
    }
}
