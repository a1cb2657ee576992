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

//! Actual-demand reconciliation.
//!
//! Maps per-hour rows of the training dataset onto forecast hour keys
//! for one target calendar date. The dataset is produced upstream and
//! arrives with unstable column names and occasionally malformed rows,
//! so everything here degrades to partial or empty results instead of
//! failing the request.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, warn};

/// Demand values the upstream export uses for "no reading".
const MISSING_TOKENS: [&str; 4] = ["na", "n/a", "null", "none"];

/// Column names resolved from the dataset header.
#[derive(Debug, Clone, Serialize)]
pub struct DemandColumns {
    pub date: String,
    pub hour: String,
    pub demand: String,
}

struct ColumnIndices {
    date: usize,
    hour: usize,
    demand: usize,
}

/// Diagnostic view of one reconciliation pass, served by the
/// `/api/test/actual-demand` probe endpoint.
#[derive(Debug, Serialize)]
pub struct DemandDiagnostics {
    pub target_date: NaiveDate,
    pub columns: Option<DemandColumns>,
    pub rows_seen: usize,
    pub sample_rows: Vec<BTreeMap<String, String>>,
    pub actuals: HashMap<String, i64>,
}

/// Locate the date/hour/demand columns in the header row.
///
/// Date and hour are matched by exact case-insensitive name; the demand
/// column is any name containing both "ontario" and "demand". Returns
/// `None` when any of the three cannot be found.
fn resolve_columns(headers: &StringRecord) -> Option<(DemandColumns, ColumnIndices)> {
    let mut date = None;
    let mut hour = None;
    let mut demand = None;

    for (idx, name) in headers.iter().enumerate() {
        let trimmed = name.trim();
        let lower = trimmed.to_lowercase();
        if lower == "date" && date.is_none() {
            date = Some((idx, trimmed.to_owned()));
        } else if lower == "hour" && hour.is_none() {
            hour = Some((idx, trimmed.to_owned()));
        } else if lower.contains("ontario") && lower.contains("demand") && demand.is_none() {
            demand = Some((idx, trimmed.to_owned()));
        }
    }

    let (date_idx, date_name) = date?;
    let (hour_idx, hour_name) = hour?;
    let (demand_idx, demand_name) = demand?;
    Some((
        DemandColumns {
            date: date_name,
            hour: hour_name,
            demand: demand_name,
        },
        ColumnIndices {
            date: date_idx,
            hour: hour_idx,
            demand: demand_idx,
        },
    ))
}

/// Parse a dataset date cell, accepting `YYYY-MM-DD` or `YYYY/MM/DD`.
fn parse_row_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y/%m/%d"))
        .ok()
}

/// Reconcile the training dataset against one target date.
///
/// Returns a map from hour key ("00:00".."23:00") to the rounded demand
/// reading for every row matching `target_date`. Hour N in the dataset
/// denotes the interval [N-1, N) o'clock, so hour 1 keys "00:00" and
/// hour 24 keys "23:00". Absence of a key means "no data", which is
/// distinct from a value of zero.
///
/// This never fails: an unreadable header, unresolvable columns, or any
/// malformed row degrades to a smaller (possibly empty) map, with the
/// skips logged. Duplicate date+hour rows are tolerated, last one wins.
pub fn reconcile_actuals(data: &[u8], target_date: NaiveDate) -> HashMap<String, i64> {
    reconcile_inner(data, target_date, 0).actuals
}

/// Same pass as [`reconcile_actuals`], but keeps the resolved column
/// names and a few raw sample rows for the diagnostic endpoint.
pub fn reconcile_diagnostics(data: &[u8], target_date: NaiveDate) -> DemandDiagnostics {
    reconcile_inner(data, target_date, 3)
}

fn reconcile_inner(data: &[u8], target_date: NaiveDate, sample_limit: usize) -> DemandDiagnostics {
    let mut diag = DemandDiagnostics {
        target_date,
        columns: None,
        rows_seen: 0,
        sample_rows: Vec::new(),
        actuals: HashMap::new(),
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);
    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            warn!("⚠️ Training dataset header unreadable: {e}");
            return diag;
        }
    };

    let Some((names, indices)) = resolve_columns(&headers) else {
        warn!(
            "⚠️ Could not resolve date/hour/demand columns in training dataset header: {:?}",
            headers
        );
        return diag;
    };
    debug!(
        "Resolved dataset columns: date='{}' hour='{}' demand='{}'",
        names.date, names.hour, names.demand
    );
    diag.columns = Some(names);

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping unreadable dataset row: {e}");
                continue;
            }
        };
        diag.rows_seen += 1;

        if diag.sample_rows.len() < sample_limit {
            diag.sample_rows.push(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(name, value)| (name.to_owned(), value.to_owned()))
                    .collect(),
            );
        }

        let Some(date) = record.get(indices.date).and_then(parse_row_date) else {
            debug!(
                "Skipping row with unparseable date '{}'",
                record.get(indices.date).unwrap_or("")
            );
            continue;
        };
        if date != target_date {
            continue;
        }

        let hour = record
            .get(indices.hour)
            .map(str::trim)
            .and_then(|raw| raw.parse::<i64>().ok());
        let Some(hour) = hour.filter(|h| (1..=24).contains(h)) else {
            debug!(
                "Skipping row with out-of-range hour '{}' on {date}",
                record.get(indices.hour).unwrap_or("")
            );
            continue;
        };
        // Hour N covers [N-1, N) o'clock; the forecast keys on interval start.
        let key = format!("{:02}:00", hour - 1);

        let raw_demand = record.get(indices.demand).map_or("", str::trim);
        if raw_demand.is_empty() || MISSING_TOKENS.contains(&raw_demand.to_lowercase().as_str()) {
            continue;
        }
        // A "nan"/"inf" cell parses as a float but carries no reading;
        // it must skip like any unparseable value, never round to 0.
        let demand: f64 = match raw_demand.parse() {
            Ok(value) if f64::is_finite(value) => value,
            Ok(_) | Err(_) => {
                debug!("Skipping row with unparseable demand '{raw_demand}' on {date} hour {hour}");
                continue;
            }
        };

        // Last write wins on duplicate date+hour rows.
        diag.actuals.insert(key, demand.round() as i64);
    }

    debug!(
        "Reconciled {} actual demand values for {target_date} from {} rows",
        diag.actuals.len(),
        diag.rows_seen
    );
    diag
}
