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

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Calendar date in Ontario, approximated as a fixed UTC-5 offset.
///
/// The serving process may run in any timezone, so "today" for
/// reconciliation purposes is derived from UTC rather than the
/// server's local clock. The offset deliberately ignores daylight
/// saving: it is off by one hour against true Eastern wall-clock
/// time for roughly half the year. Known limitation, kept as-is so
/// the selected date always matches the data pipeline's convention.
pub fn ontario_today(now: DateTime<Utc>) -> NaiveDate {
    (now - Duration::hours(5)).date_naive()
}
