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

use std::collections::HashMap;

use axum::{Json, extract::State};
use chrono::Utc;
use gridcast_core::{clock, demand, forecast, supply};
use gridcast_store::StoreError;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::{AppState, error::ApiError};

/// Object keys the data pipeline writes; read-only from this side.
const FORECAST_KEY: &str = "daily_prediction/latest_forecast.csv";
const TRAINING_DATASET_KEY: &str = "training_dataset/daily.csv";
const HOURLY_DATA_PREFIX: &str = "hourly_data/";

pub(crate) async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "GridCast API is running", "status": "healthy" }))
}

pub(crate) async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "GridCast API" }))
}

/// Setup probe: reports client configuration and best-effort bucket
/// access. Always responds 200; trouble is reported inside the body so
/// the probe stays usable when the store is misconfigured.
pub(crate) async fn store_diagnostics_handler(State(state): State<AppState>) -> Json<Value> {
    let store = &state.store;
    let mut result = json!({
        "client_initialized": true,
        "config": {
            "credentials_set": store.has_credentials(),
            "region": store.region(),
            "bucket": store.bucket(),
        },
        "bucket_access": Value::Null,
        "error": Value::Null,
    });

    match store.list_objects("").await {
        Ok(objects) => {
            result["bucket_access"] = json!("success");
            result["object_count"] = json!(objects.len());
            result["sample_objects"] = json!(
                objects
                    .iter()
                    .take(10)
                    .map(|object| object.key.clone())
                    .collect::<Vec<_>>()
            );
            match store.bucket_location().await {
                Ok(location) => result["bucket_location"] = json!(location),
                Err(e) => debug!("Bucket location probe failed: {e}"),
            }
        }
        Err(e) => {
            result["bucket_access"] = json!("failed");
            result["error"] = json!(e.to_string());
        }
    }

    Json(result)
}

/// Diagnostic dump of one reconciliation pass for Ontario "today".
pub(crate) async fn actual_demand_diagnostics_handler(
    State(state): State<AppState>,
) -> Result<Json<demand::DemandDiagnostics>, ApiError> {
    let data = state.store.get_object(TRAINING_DATASET_KEY).await?;
    let target = clock::ontario_today(Utc::now());
    Ok(Json(demand::reconcile_diagnostics(&data, target)))
}

pub(crate) async fn forecast_latest_handler(
    State(state): State<AppState>,
) -> Result<Json<forecast::ForecastResponse>, ApiError> {
    let csv_data = state.store.get_object(FORECAST_KEY).await.map_err(|e| match e {
        StoreError::NotFound(_) => {
            ApiError::NotFound("Forecast file not found in store".to_owned())
        }
        other => other.into(),
    })?;

    // The actual-demand side is fail-soft: a missing or broken training
    // dataset degrades to a forecast with all-null actuals.
    let target = clock::ontario_today(Utc::now());
    let actuals = match state.store.get_object(TRAINING_DATASET_KEY).await {
        Ok(data) => demand::reconcile_actuals(&data, target),
        Err(e) => {
            warn!("⚠️ Actual demand unavailable, serving forecast without actuals: {e}");
            HashMap::new()
        }
    };

    let response = forecast::build_forecast(&csv_data, &actuals)?;
    let with_actuals = response
        .forecast_data
        .iter()
        .filter(|point| point.actual.is_some())
        .count();
    info!(
        "📈 Forecast served for {target}: {} hours, {with_actuals} with actuals",
        response.total_hours
    );
    Ok(Json(response))
}

pub(crate) async fn hourly_latest_handler(
    State(state): State<AppState>,
) -> Result<Json<supply::HourlyResponse>, ApiError> {
    let objects = state.store.list_objects(HOURLY_DATA_PREFIX).await?;
    let Some(most_recent) = objects.iter().max_by_key(|object| object.last_modified) else {
        return Err(ApiError::NotFound(
            "No hourly data files found in store".to_owned(),
        ));
    };

    debug!(
        "Most recent hourly snapshot: {} ({})",
        most_recent.key, most_recent.last_modified
    );
    let data = state.store.get_object(&most_recent.key).await?;
    Ok(Json(supply::build_hourly(&data, &most_recent.key)?))
}
