// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of GridCast.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Forecast CSV parsing and the actual-demand merge.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use csv::StringRecord;
use serde::Serialize;
use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// One hour of the forecast series after merging in actual demand.
/// `actual` stays `None` (JSON `null`) when the reconciler produced no
/// reading for that hour key.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastPoint {
    pub hour: String,
    pub predicted: i64,
    pub actual: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourDemand {
    pub hour: String,
    pub demand: i64,
}

/// Payload for `/api/forecast/latest`. `peak`/`low` are `null` when the
/// forecast file holds no rows at all.
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub forecast_data: Vec<ForecastPoint>,
    pub peak: Option<HourDemand>,
    pub low: Option<HourDemand>,
    pub timestamp: String,
    pub total_hours: usize,
}

fn find_column(headers: &StringRecord, name: &'static str) -> CoreResult<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
        .ok_or(CoreError::MissingColumn(name))
}

/// Derive the "HH:MM" hour key from a forecast timestamp cell.
///
/// Timestamps are expected as `YYYY-MM-DD HH:MM:SS`; when that does not
/// parse, fall back to taking the first five characters of the second
/// whitespace-separated token, else "00:00".
fn hour_key(raw: &str, parsed: Option<NaiveDateTime>) -> String {
    if let Some(dt) = parsed {
        return dt.format("%H:%M").to_string();
    }
    debug!("Forecast timestamp '{raw}' did not parse, extracting hour heuristically");
    raw.split_whitespace()
        .nth(1)
        .map(|token| token.chars().take(5).collect::<String>())
        .unwrap_or_else(|| "00:00".to_owned())
}

/// Parse the forecast CSV and merge in the actual-demand map.
///
/// The CSV must carry `time` and `predicted_ontario_demand` columns; a
/// missing column or an unparseable predicted value is a hard error
/// (the file itself is broken, unlike the fail-soft training dataset).
/// Merge hits require exact hour-key equality, no nearest-hour
/// fallback. The response timestamp is the first row's time rendered as
/// `%I:%M %p`, or "N/A" when the first row does not parse.
pub fn build_forecast(
    data: &[u8],
    actuals: &HashMap<String, i64>,
) -> CoreResult<ForecastResponse> {
    let mut reader = csv::Reader::from_reader(data);
    let headers = reader.headers()?.clone();
    let time_idx = find_column(&headers, "time")?;
    let predicted_idx = find_column(&headers, "predicted_ontario_demand")?;

    let mut points = Vec::new();
    let mut timestamp = "N/A".to_owned();

    for record in reader.records() {
        let record = record?;
        let raw_time = record.get(time_idx).map_or("", str::trim);
        let parsed = NaiveDateTime::parse_from_str(raw_time, "%Y-%m-%d %H:%M:%S").ok();

        if points.is_empty()
            && let Some(first) = parsed
        {
            timestamp = first.format("%I:%M %p").to_string();
        }

        let hour = hour_key(raw_time, parsed);

        let raw_predicted = record.get(predicted_idx).map_or("", str::trim);
        let predicted: f64 = raw_predicted
            .parse()
            .ok()
            .filter(|value: &f64| value.is_finite())
            .ok_or_else(|| {
                CoreError::MalformedField(format!(
                    "predicted_ontario_demand '{raw_predicted}' at {raw_time}"
                ))
            })?;

        let actual = actuals.get(&hour).copied();
        points.push(ForecastPoint {
            hour,
            predicted: predicted.round() as i64,
            actual,
        });
    }

    // max_by_key keeps the last maximum; reverse so the earliest hour
    // wins a tie, same as min_by_key does on the low side.
    let peak = points
        .iter()
        .rev()
        .max_by_key(|point| point.predicted)
        .map(|point| HourDemand {
            hour: point.hour.clone(),
            demand: point.predicted,
        });
    let low = points
        .iter()
        .min_by_key(|point| point.predicted)
        .map(|point| HourDemand {
            hour: point.hour.clone(),
            demand: point.predicted,
        });

    Ok(ForecastResponse {
        total_hours: points.len(),
        forecast_data: points,
        peak,
        low,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::reconcile_actuals;
    use chrono::NaiveDate;

    const FORECAST_CSV: &[u8] = b"time,predicted_ontario_demand\n\
        2025-10-17 00:00:00,1000\n\
        2025-10-17 01:00:00,2000\n";

    #[test]
    fn test_merge_hit_and_miss() {
        let mut actuals = HashMap::new();
        actuals.insert("05:00".to_owned(), 12345);
        let csv = b"time,predicted_ontario_demand\n\
            2025-10-17 05:00:00,14000\n\
            2025-10-17 06:00:00,15000\n";
        let response = build_forecast(csv, &actuals).unwrap();
        assert_eq!(response.forecast_data[0].hour, "05:00");
        assert_eq!(response.forecast_data[0].predicted, 14000);
        assert_eq!(response.forecast_data[0].actual, Some(12345));
        assert_eq!(response.forecast_data[1].actual, None);
    }

    #[test]
    fn test_end_to_end_reconciliation() {
        // Full pipeline: one matching training row supplies the actual
        // for hour 1 only.
        let training = b"Date,Hour,Ontario Demand\n2025-10-17,1,999\n";
        let target = NaiveDate::from_ymd_opt(2025, 10, 17).unwrap();
        let actuals = reconcile_actuals(training, target);

        let response = build_forecast(FORECAST_CSV, &actuals).unwrap();
        assert_eq!(response.total_hours, 2);
        assert_eq!(response.forecast_data[0].hour, "00:00");
        assert_eq!(response.forecast_data[0].predicted, 1000);
        assert_eq!(response.forecast_data[0].actual, Some(999));
        assert_eq!(response.forecast_data[1].hour, "01:00");
        assert_eq!(response.forecast_data[1].predicted, 2000);
        assert_eq!(response.forecast_data[1].actual, None);

        let peak = response.peak.unwrap();
        assert_eq!(peak.hour, "01:00");
        assert_eq!(peak.demand, 2000);
        let low = response.low.unwrap();
        assert_eq!(low.hour, "00:00");
        assert_eq!(low.demand, 1000);
        assert_eq!(response.timestamp, "12:00 AM");
    }

    #[test]
    fn test_peak_and_low_ties_break_to_earliest_hour() {
        let csv = b"time,predicted_ontario_demand\n\
            2025-10-17 00:00:00,2000\n\
            2025-10-17 01:00:00,2000\n\
            2025-10-17 02:00:00,1000\n\
            2025-10-17 03:00:00,1000\n";
        let response = build_forecast(csv, &HashMap::new()).unwrap();
        assert_eq!(response.peak.unwrap().hour, "00:00");
        assert_eq!(response.low.unwrap().hour, "02:00");
    }

    #[test]
    fn test_non_finite_predicted_is_an_error() {
        for value in ["nan", "inf", "-inf"] {
            let csv = format!("time,predicted_ontario_demand\n2025-10-17 00:00:00,{value}\n");
            assert!(matches!(
                build_forecast(csv.as_bytes(), &HashMap::new()),
                Err(CoreError::MalformedField(_))
            ));
        }
    }

    #[test]
    fn test_empty_series_yields_null_peak_and_low() {
        let csv = b"time,predicted_ontario_demand\n";
        let response = build_forecast(csv, &HashMap::new()).unwrap();
        assert!(response.forecast_data.is_empty());
        assert!(response.peak.is_none());
        assert!(response.low.is_none());
        assert_eq!(response.total_hours, 0);
        assert_eq!(response.timestamp, "N/A");
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let csv = b"time,predicted_quebec_demand\n2025-10-17 00:00:00,1000\n";
        assert!(matches!(
            build_forecast(csv, &HashMap::new()),
            Err(CoreError::MissingColumn("predicted_ontario_demand"))
        ));
    }

    #[test]
    fn test_unparseable_predicted_is_an_error() {
        let csv = b"time,predicted_ontario_demand\n2025-10-17 00:00:00,oops\n";
        assert!(matches!(
            build_forecast(csv, &HashMap::new()),
            Err(CoreError::MalformedField(_))
        ));
    }

    #[test]
    fn test_timestamp_fallback_extraction() {
        let csv = b"time,predicted_ontario_demand\n2025-10-17T05:30 05:15:00,1500.6\n";
        let response = build_forecast(csv, &HashMap::new()).unwrap();
        assert_eq!(response.forecast_data[0].hour, "05:15");
        assert_eq!(response.forecast_data[0].predicted, 1501);
        assert_eq!(response.timestamp, "N/A");
    }
}
