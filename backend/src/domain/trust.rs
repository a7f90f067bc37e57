//! Trust scoring for checkpoint scans and whole rounds.
//!
//! Each scan earns points for the evidence it carries; the score is additive
//! and clamped to 100. Speed and battery reuse the anomaly thresholds, and
//! their absent values count in the guard's favour. Evidence weights
//! (movement, photo, device continuity) only score when actually present.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::anomaly::{AnomalyCode, LOW_BATTERY_PCT, SPEED_LIMIT_KMH};

const GEO_POINTS: u16 = 30;
const MOVEMENT_POINTS: u16 = 15;
const PHOTO_POINTS: u16 = 15;
const DEVICE_POINTS: u16 = 10;
const SPEED_POINTS: u16 = 20;
const BATTERY_POINTS: u16 = 10;

const GREEN_THRESHOLD: u8 = 80;
const YELLOW_THRESHOLD: u8 = 60;

/// Evidence weighed when scoring one checkpoint scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrustSignals {
    /// Whether the reported position passed the geofence check.
    pub geo_valid: bool,
    /// Whether the device reported meaningful motion for this scan.
    pub has_movement: bool,
    /// Whether photo evidence was attached.
    pub has_photo: bool,
    /// Whether the device fingerprint matches the previous mark's.
    pub same_device_as_prev: bool,
    /// Speed from the previous mark, when computable.
    pub speed_from_prev_kmh: Option<f64>,
    /// Battery percentage, when reported.
    pub battery_pct: Option<i16>,
}

/// Score one checkpoint scan on the additive 0 to 100 scale.
#[must_use]
pub fn checkpoint_trust_score(signals: &TrustSignals) -> u8 {
    let mut score: u16 = 0;
    if signals.geo_valid {
        score += GEO_POINTS;
    }
    if signals.has_movement {
        score += MOVEMENT_POINTS;
    }
    if signals.has_photo {
        score += PHOTO_POINTS;
    }
    if signals.same_device_as_prev {
        score += DEVICE_POINTS;
    }
    // Missing telemetry is not held against the guard for these two rules.
    if signals
        .speed_from_prev_kmh
        .is_none_or(|speed| speed <= SPEED_LIMIT_KMH)
    {
        score += SPEED_POINTS;
    }
    if signals
        .battery_pct
        .is_none_or(|battery| battery > LOW_BATTERY_PCT)
    {
        score += BATTERY_POINTS;
    }
    score.min(100) as u8
}

/// Mean of per-checkpoint scores rounded half-up; `0` for an empty round.
#[must_use]
pub fn round_trust_score(scores: &[u8]) -> u8 {
    if scores.is_empty() {
        return 0;
    }
    let total: u32 = scores.iter().map(|score| u32::from(*score)).sum();
    let count = scores.len() as u32;
    ((total + count / 2) / count) as u8
}

/// Traffic-light band derived from a trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustBand {
    /// Score of 80 or above.
    Green,
    /// Score between 60 and 79.
    Yellow,
    /// Score below 60.
    Red,
}

impl TrustBand {
    /// Stable wire label for the band.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for TrustBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band a score into green, yellow, or red.
#[must_use]
pub fn trust_band(score: u8) -> TrustBand {
    if score >= GREEN_THRESHOLD {
        TrustBand::Green
    } else if score >= YELLOW_THRESHOLD {
        TrustBand::Yellow
    } else {
        TrustBand::Red
    }
}

/// Severity attached to alerts raised from scan anomalies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Informational; no anomaly was present.
    Info,
    /// Anomalies present but none questioning the guard's location.
    Warning,
    /// Location integrity is in doubt.
    Critical,
}

impl AlertSeverity {
    /// Stable wire and storage label for the severity.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown severity label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAlertSeverityError {
    value: String,
}

impl fmt::Display for ParseAlertSeverityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown alert severity: {}", self.value)
    }
}

impl std::error::Error for ParseAlertSeverityError {}

impl FromStr for AlertSeverity {
    type Err = ParseAlertSeverityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            other => Err(ParseAlertSeverityError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Severity for an alert raised from the given anomaly codes.
///
/// Position-integrity anomalies escalate to critical; any other anomaly is a
/// warning; no anomalies is informational.
#[must_use]
pub fn alert_severity(codes: &BTreeSet<AnomalyCode>) -> AlertSeverity {
    if codes.contains(&AnomalyCode::GeoOutOfRange) || codes.contains(&AnomalyCode::RepeatedPosition)
    {
        AlertSeverity::Critical
    } else if codes.is_empty() {
        AlertSeverity::Info
    } else {
        AlertSeverity::Warning
    }
}
