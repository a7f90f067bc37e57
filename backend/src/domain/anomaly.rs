//! Anomaly detection over per-scan signals.
//!
//! Every rule is evaluated independently and codes accumulate; a single scan
//! can carry several anomalies. Absent optional signals default to values
//! that do not trigger their rule, so a device that reports nothing is not
//! penalised for missing telemetry here. The trust scorer applies the same
//! thresholds when weighting scan evidence.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Speed above which movement between marks is considered abnormal, in km/h.
pub const SPEED_LIMIT_KMH: f64 = 15.0;

/// Motion-sensor aggregate below which the device is considered stationary.
pub const MOVEMENT_FLOOR: f64 = 0.05;

/// Battery percentage at or below which the device is considered low.
pub const LOW_BATTERY_PCT: i16 = 10;

/// Per-scan anomaly category persisted with each checkpoint mark.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyCode {
    /// The reported position failed the checkpoint geofence check.
    GeoOutOfRange,
    /// The reported position is identical to the previous mark's position.
    RepeatedPosition,
    /// Speed from the previous mark exceeds [`SPEED_LIMIT_KMH`].
    AbnormalSpeed,
    /// Movement score is below [`MOVEMENT_FLOOR`].
    NoMovement,
    /// Battery is at or below [`LOW_BATTERY_PCT`] percent.
    LowBattery,
    /// Battery level has not changed since the previous mark.
    StaticBattery,
}

impl AnomalyCode {
    /// Stable wire and storage label for the code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GeoOutOfRange => "geo_out_of_range",
            Self::RepeatedPosition => "repeated_position",
            Self::AbnormalSpeed => "abnormal_speed",
            Self::NoMovement => "no_movement",
            Self::LowBattery => "low_battery",
            Self::StaticBattery => "static_battery",
        }
    }
}

impl fmt::Display for AnomalyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown anomaly label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAnomalyCodeError {
    value: String,
}

impl fmt::Display for ParseAnomalyCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown anomaly code: {}", self.value)
    }
}

impl std::error::Error for ParseAnomalyCodeError {}

impl FromStr for AnomalyCode {
    type Err = ParseAnomalyCodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "geo_out_of_range" => Ok(Self::GeoOutOfRange),
            "repeated_position" => Ok(Self::RepeatedPosition),
            "abnormal_speed" => Ok(Self::AbnormalSpeed),
            "no_movement" => Ok(Self::NoMovement),
            "low_battery" => Ok(Self::LowBattery),
            "static_battery" => Ok(Self::StaticBattery),
            other => Err(ParseAnomalyCodeError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Signals gathered while recording one checkpoint scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanSignals {
    /// Whether the reported position passed the geofence check.
    pub geo_valid: bool,
    /// Whether the reported position equals the previous mark's position.
    pub same_position_as_prev: bool,
    /// Speed from the previous mark, when both positions were known.
    pub speed_from_prev_kmh: Option<f64>,
    /// Motion-sensor aggregate in `[0, 1]`, when reported.
    pub movement_score: Option<f64>,
    /// Battery percentage, when reported.
    pub battery_pct: Option<i16>,
    /// Battery percentage carried by the previous mark, when known.
    pub prev_battery_pct: Option<i16>,
}

/// Evaluate every anomaly rule against the scan signals.
#[must_use]
pub fn detect_anomalies(signals: &ScanSignals) -> BTreeSet<AnomalyCode> {
    let mut codes = BTreeSet::new();
    if !signals.geo_valid {
        codes.insert(AnomalyCode::GeoOutOfRange);
    }
    if signals.same_position_as_prev {
        codes.insert(AnomalyCode::RepeatedPosition);
    }
    if signals
        .speed_from_prev_kmh
        .is_some_and(|speed| speed > SPEED_LIMIT_KMH)
    {
        codes.insert(AnomalyCode::AbnormalSpeed);
    }
    if signals
        .movement_score
        .is_some_and(|score| score < MOVEMENT_FLOOR)
    {
        codes.insert(AnomalyCode::NoMovement);
    }
    if signals
        .battery_pct
        .is_some_and(|battery| battery <= LOW_BATTERY_PCT)
    {
        codes.insert(AnomalyCode::LowBattery);
    }
    if let (Some(current), Some(previous)) = (signals.battery_pct, signals.prev_battery_pct) {
        if current == previous {
            codes.insert(AnomalyCode::StaticBattery);
        }
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn clean_signals() -> ScanSignals {
        ScanSignals {
            geo_valid: true,
            same_position_as_prev: false,
            speed_from_prev_kmh: Some(4.0),
            movement_score: Some(0.6),
            battery_pct: Some(80),
            prev_battery_pct: Some(82),
        }
    }

    #[test]
    fn clean_scan_raises_nothing() {
        assert!(detect_anomalies(&clean_signals()).is_empty());
    }

    #[test]
    fn invalid_geo_with_high_speed_accumulates_both_codes() {
        let signals = ScanSignals {
            geo_valid: false,
            same_position_as_prev: false,
            speed_from_prev_kmh: Some(20.0),
            movement_score: Some(0.5),
            battery_pct: Some(50),
            prev_battery_pct: None,
        };
        let codes = detect_anomalies(&signals);
        let expected: BTreeSet<_> = [AnomalyCode::GeoOutOfRange, AnomalyCode::AbnormalSpeed]
            .into_iter()
            .collect();
        assert_eq!(codes, expected);
    }

    #[rstest]
    #[case::geo(
        ScanSignals { geo_valid: false, ..clean_signals() },
        AnomalyCode::GeoOutOfRange
    )]
    #[case::repeated(
        ScanSignals { same_position_as_prev: true, ..clean_signals() },
        AnomalyCode::RepeatedPosition
    )]
    #[case::speed(
        ScanSignals { speed_from_prev_kmh: Some(15.1), ..clean_signals() },
        AnomalyCode::AbnormalSpeed
    )]
    #[case::movement(
        ScanSignals { movement_score: Some(0.04), ..clean_signals() },
        AnomalyCode::NoMovement
    )]
    #[case::battery(
        ScanSignals { battery_pct: Some(10), prev_battery_pct: Some(30), ..clean_signals() },
        AnomalyCode::LowBattery
    )]
    #[case::static_battery(
        ScanSignals { battery_pct: Some(41), prev_battery_pct: Some(41), ..clean_signals() },
        AnomalyCode::StaticBattery
    )]
    fn each_rule_fires_alone(#[case] signals: ScanSignals, #[case] expected: AnomalyCode) {
        let codes = detect_anomalies(&signals);
        assert_eq!(codes, BTreeSet::from([expected]));
    }

    #[rstest]
    #[case::at_limit(15.0)]
    #[case::slow(3.0)]
    fn speed_at_or_below_limit_is_normal(#[case] speed: f64) {
        let signals = ScanSignals {
            speed_from_prev_kmh: Some(speed),
            ..clean_signals()
        };
        assert!(detect_anomalies(&signals).is_empty());
    }

    #[test]
    fn movement_at_floor_is_normal() {
        let signals = ScanSignals {
            movement_score: Some(MOVEMENT_FLOOR),
            ..clean_signals()
        };
        assert!(detect_anomalies(&signals).is_empty());
    }

    #[test]
    fn absent_signals_do_not_trigger_rules() {
        let signals = ScanSignals {
            geo_valid: true,
            same_position_as_prev: false,
            speed_from_prev_kmh: None,
            movement_score: None,
            battery_pct: None,
            prev_battery_pct: None,
        };
        assert!(detect_anomalies(&signals).is_empty());
    }

    #[test]
    fn missing_previous_battery_never_reads_as_static() {
        let signals = ScanSignals {
            battery_pct: Some(50),
            prev_battery_pct: None,
            ..clean_signals()
        };
        assert!(detect_anomalies(&signals).is_empty());
    }

    #[test]
    fn every_rule_can_fire_at_once() {
        let signals = ScanSignals {
            geo_valid: false,
            same_position_as_prev: true,
            speed_from_prev_kmh: Some(30.0),
            movement_score: Some(0.0),
            battery_pct: Some(5),
            prev_battery_pct: Some(5),
        };
        assert_eq!(detect_anomalies(&signals).len(), 6);
    }

    #[rstest]
    #[case(AnomalyCode::GeoOutOfRange, "geo_out_of_range")]
    #[case(AnomalyCode::RepeatedPosition, "repeated_position")]
    #[case(AnomalyCode::AbnormalSpeed, "abnormal_speed")]
    #[case(AnomalyCode::NoMovement, "no_movement")]
    #[case(AnomalyCode::LowBattery, "low_battery")]
    #[case(AnomalyCode::StaticBattery, "static_battery")]
    fn labels_round_trip(#[case] code: AnomalyCode, #[case] label: &str) {
        assert_eq!(code.to_string(), label);
        assert_eq!(label.parse::<AnomalyCode>(), Ok(code));
    }

    #[test]
    fn unknown_label_fails_to_parse() {
        assert!("teleportation".parse::<AnomalyCode>().is_err());
    }

    #[test]
    fn serde_uses_snake_case_labels() {
        let json = serde_json::to_string(&AnomalyCode::GeoOutOfRange).expect("serializes");
        assert_eq!(json, "\"geo_out_of_range\"");
    }
}
