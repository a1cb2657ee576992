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

//! Error types for the core crate

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("malformed field: {0}")]
    MalformedField(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
