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

//! Domain logic for the GridCast API: demand reconciliation, forecast
//! parsing and merging, hourly supply breakdown, and the Ontario clock.
//! No I/O happens here; callers hand in raw object bytes.

pub mod clock;
pub mod demand;
pub mod error;
pub mod forecast;
pub mod supply;

pub use clock::ontario_today;
pub use demand::{DemandDiagnostics, reconcile_actuals, reconcile_diagnostics};
pub use error::{CoreError, CoreResult};
pub use forecast::{ForecastPoint, ForecastResponse, HourDemand, build_forecast};
pub use supply::{HourlyResponse, SupplySlice, build_hourly};
