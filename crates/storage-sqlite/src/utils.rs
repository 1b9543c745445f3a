//! Parsing helpers shared by the DB model conversions.
//!
//! Timestamps and decimals are stored as TEXT. Rows predate any given code
//! version, so conversions tolerate bad values instead of failing a whole
//! query: they log and fall back.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses an RFC3339 timestamp column, falling back to now on bad data.
pub(crate) fn parse_rfc3339(value: &str, field_name: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            log::error!("Failed to parse {} '{}': {}", field_name, value, e);
            Utc::now()
        })
}

/// Parses an optional RFC3339 timestamp column; bad values become None.
pub(crate) fn parse_rfc3339_opt(value: Option<&str>, field_name: &str) -> Option<DateTime<Utc>> {
    let value = value?;
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            log::error!("Failed to parse {} '{}': {}", field_name, value, e);
            None
        }
    }
}

/// Parses a decimal column, with a fallback through f64 for scientific
/// notation. Unparseable values become zero.
pub(crate) fn parse_decimal(value: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value) {
        Ok(d) => d,
        Err(_) => match f64::from_str(value).ok().and_then(Decimal::from_f64) {
            Some(d) => d,
            None => {
                log::error!("Failed to parse {} '{}' as Decimal", field_name, value);
                Decimal::ZERO
            }
        },
    }
}
