// crates/netplane-core/src/model/schedule.rs
// ============================================================================
// Module: Netplane Schedule Window
// Description: Time window carried by a specification (`when` field).
// Purpose: Parse and format `"<start> ... <stop> / <periodMs>"` windows.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A specification is time-bounded by a schedule window written on the wire
//! as a single string: `"<start> ... <stop> / <periodMs>"`. `<start>` is
//! either the literal `now` or an absolute epoch-millisecond timestamp,
//! `<stop>` is an absolute epoch-millisecond timestamp, and `<periodMs>` is
//! the sampling period in milliseconds.
//! Invariants:
//! - Formatting then parsing a [`Schedule`] yields an equal value.
//! - Parsing rejects windows with missing or non-numeric segments.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Schedule Errors
// ============================================================================

/// Errors produced while parsing a schedule window string.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// Window string is missing the `...` start/stop separator.
    #[error("schedule window is missing the start/stop separator: {0}")]
    MissingStopSeparator(String),
    /// Window string is missing the `/` period separator.
    #[error("schedule window is missing the period separator: {0}")]
    MissingPeriodSeparator(String),
    /// Start segment is neither `now` nor an epoch-millisecond value.
    #[error("schedule start is not `now` or epoch milliseconds: {0}")]
    InvalidStart(String),
    /// Stop segment is not an epoch-millisecond value.
    #[error("schedule stop is not epoch milliseconds: {0}")]
    InvalidStop(String),
    /// Period segment is not a millisecond value.
    #[error("schedule period is not milliseconds: {0}")]
    InvalidPeriod(String),
}

// ============================================================================
// SECTION: Schedule Window
// ============================================================================

/// Start boundary of a schedule window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScheduleStart {
    /// Start immediately on receipt (`now` on the wire).
    Now,
    /// Start at an absolute epoch-millisecond timestamp.
    AtMillis(u64),
}

/// Time window bounding a specification.
///
/// # Invariants
/// - `stop_millis` is an absolute epoch-millisecond timestamp.
/// - `period_millis` is the sampling period between results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Start boundary (`now` or absolute).
    pub start: ScheduleStart,
    /// Absolute stop timestamp in epoch milliseconds.
    pub stop_millis: u64,
    /// Sampling period in milliseconds.
    pub period_millis: u64,
}

impl Schedule {
    /// Creates a window starting immediately.
    #[must_use]
    pub const fn starting_now(stop_millis: u64, period_millis: u64) -> Self {
        Self {
            start: ScheduleStart::Now,
            stop_millis,
            period_millis,
        }
    }

    /// Creates a window with an absolute start timestamp.
    #[must_use]
    pub const fn starting_at(start_millis: u64, stop_millis: u64, period_millis: u64) -> Self {
        Self {
            start: ScheduleStart::AtMillis(start_millis),
            stop_millis,
            period_millis,
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start {
            ScheduleStart::Now => write!(f, "now")?,
            ScheduleStart::AtMillis(start) => write!(f, "{start}")?,
        }
        write!(f, " ... {} / {}", self.stop_millis, self.period_millis)
    }
}

impl FromStr for Schedule {
    type Err = ScheduleError;

    fn from_str(window: &str) -> Result<Self, Self::Err> {
        let (start, rest) = window
            .split_once("...")
            .ok_or_else(|| ScheduleError::MissingStopSeparator(window.to_string()))?;
        let (stop, period) = rest
            .split_once('/')
            .ok_or_else(|| ScheduleError::MissingPeriodSeparator(window.to_string()))?;

        let start = start.trim();
        let start = if start == "now" {
            ScheduleStart::Now
        } else {
            ScheduleStart::AtMillis(
                start.parse().map_err(|_| ScheduleError::InvalidStart(start.to_string()))?,
            )
        };
        let stop = stop.trim();
        let stop_millis = stop.parse().map_err(|_| ScheduleError::InvalidStop(stop.to_string()))?;
        let period = period.trim();
        let period_millis =
            period.parse().map_err(|_| ScheduleError::InvalidPeriod(period.to_string()))?;

        Ok(Self {
            start,
            stop_millis,
            period_millis,
        })
    }
}
