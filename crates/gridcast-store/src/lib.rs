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

//! Read-only client for the S3-compatible object store holding the
//! pre-computed forecast and telemetry files.

pub mod client;
pub mod errors;
mod sign;
pub mod types;

pub use client::{Credentials, StoreClient};
pub use errors::{StoreError, StoreResult};
pub use types::ObjectMeta;
