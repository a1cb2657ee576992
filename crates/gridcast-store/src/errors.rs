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

//! Error types for the object-store client

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested key does not exist in the bucket.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The store rejected the request (credentials, permissions,
    /// transient backend fault). Carries the upstream error code and
    /// message so callers can surface them.
    #[error("AWS Error ({code}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    /// A 2xx response whose body could not be decoded.
    #[error("failed to decode store response: {0}")]
    Decode(String),

    #[error("store client config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
