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

//! Hourly supply breakdown built from the grid telemetry JSON snapshot.

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreResult;

/// Fixed presentation order and chart colors for the supply sources.
/// The dashboard relies on both, keep them stable.
const SUPPLY_SOURCES: [(&str, &str); 6] = [
    ("Nuclear", "#8B5CF6"),
    ("Gas", "#EF4444"),
    ("Wind", "#10B981"),
    ("Hydro", "#3B82F6"),
    ("Solar", "#FBBF24"),
    ("Biofuel", "#84CC16"),
];

#[derive(Debug, Clone, Serialize)]
pub struct SupplySlice {
    pub source: String,
    pub mw: f64,
    pub color: String,
}

/// Payload for `/api/hourly-data/latest`.
#[derive(Debug, Serialize)]
pub struct HourlyResponse {
    pub supply_breakdown: Vec<SupplySlice>,
    pub imports: f64,
    pub exports: f64,
    pub fetched_at: String,
    pub file_key: String,
}

/// Build the supply breakdown from one hourly telemetry object.
///
/// Sources missing from the snapshot report 0 MW rather than being
/// dropped, so the dashboard always renders the full set.
pub fn build_hourly(data: &[u8], file_key: &str) -> CoreResult<HourlyResponse> {
    let snapshot: Value = serde_json::from_slice(data)?;
    let readings = snapshot.get("data").cloned().unwrap_or(Value::Null);

    let megawatts = |name: &str| -> f64 {
        readings
            .get(name)
            .and_then(Value::as_f64)
            .unwrap_or_default()
    };

    let supply_breakdown = SUPPLY_SOURCES
        .iter()
        .map(|(source, color)| SupplySlice {
            source: (*source).to_owned(),
            mw: megawatts(source),
            color: (*color).to_owned(),
        })
        .collect();

    Ok(HourlyResponse {
        supply_breakdown,
        imports: megawatts("HourlyImports"),
        exports: megawatts("HourlyExports"),
        fetched_at: snapshot
            .get("fetched_at_utc")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        file_key: file_key.to_owned(),
    })
}
