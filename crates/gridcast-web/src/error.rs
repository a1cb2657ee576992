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

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gridcast_core::CoreError;
use gridcast_store::StoreError;
use serde_json::json;
use tracing::error;

/// Request-level failure taxonomy: an absent object maps to 404,
/// everything else that escapes a handler maps to 500. Row-level data
/// trouble never reaches this type.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            Self::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };
        if status.is_server_error() {
            error!("❌ Request failed: {detail}");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => Self::NotFound(format!("Object not found in store: {key}")),
            // Display for Service is "AWS Error (code): message"
            service @ StoreError::Service { .. } => Self::Internal(service.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::Internal(format!("Error processing data: {err}"))
    }
}
