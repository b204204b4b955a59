//! Round outcome model.
//!
//! A `RoundEvent` is one observed crash point. Sources deliver `RawRound`
//! records, which are decoded leniently and validated into `RoundEvent`s.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lowest crash point a round can report.
pub const MIN_MULTIPLIER: f64 = 1.0;

/// Highest crash point accepted from a feed.
pub const MAX_MULTIPLIER: f64 = 1000.0;

/// Where a round came from. Recorded for provenance only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Observed from a live source feed.
    #[default]
    Live,
    /// Loaded from a stored history to seed a replay.
    ReplaySeed,
    /// Generated for tests and demos.
    SyntheticTest,
}

impl Origin {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::ReplaySeed => "replay-seed",
            Self::SyntheticTest => "synthetic-test",
        }
    }
}

impl std::str::FromStr for Origin {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(Self::Live),
            "replay-seed" => Ok(Self::ReplaySeed),
            "synthetic-test" => Ok(Self::SyntheticTest),
            other => Err(ValidationError::Malformed(format!("unknown origin {other:?}"))),
        }
    }
}

/// A single accepted round outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundEvent {
    /// The crash point, in [1.0, 1000.0].
    pub multiplier: f64,
    /// Milliseconds since epoch, as reported by the source.
    pub timestamp: i64,
    /// Source-provided unique identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_id: Option<String>,
    #[serde(default)]
    pub origin: Origin,
}

impl RoundEvent {
    /// Creates a live round after validating the multiplier.
    ///
    /// # Errors
    /// Returns `ValidationError` if the multiplier is not finite or out of range.
    pub fn new(multiplier: f64, timestamp: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            multiplier: validate_multiplier(multiplier)?,
            timestamp,
            round_id: None,
            origin: Origin::Live,
        })
    }

    /// Sets the source round identifier.
    #[must_use]
    pub fn with_round_id(mut self, round_id: impl Into<String>) -> Self {
        self.round_id = Some(round_id.into());
        self
    }

    /// Sets the provenance tag.
    #[must_use]
    pub const fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

/// Current wall-clock time in milliseconds since epoch.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Checks a multiplier against the domain-valid range.
///
/// # Errors
/// `Malformed` for NaN/infinite values, `OutOfRange` for finite values outside
/// [`MIN_MULTIPLIER`, `MAX_MULTIPLIER`]. Values are never clamped.
pub fn validate_multiplier(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::Malformed(format!(
            "multiplier is not finite: {value}"
        )));
    }
    if !(MIN_MULTIPLIER..=MAX_MULTIPLIER).contains(&value) {
        return Err(ValidationError::OutOfRange(value));
    }
    Ok(value)
}

/// A numeric field that may arrive as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    fn parse(&self) -> Result<f64, ValidationError> {
        match self {
            Self::Number(v) => Ok(*v),
            Self::Text(text) => text
                .trim()
                .trim_end_matches(['x', 'X'])
                .parse::<f64>()
                .map_err(|_| {
                    ValidationError::Malformed(format!("unparseable multiplier {text:?}"))
                }),
        }
    }
}

/// A round identifier that may arrive as a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Integer(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Integer(n) => n.to_string(),
        }
    }
}

/// Unvalidated round record as delivered by a source feed.
///
/// Collectors have seen the crash point under several field names, so the
/// decoder accepts the common aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRound {
    #[serde(
        default,
        alias = "crashPoint",
        alias = "crash_point",
        alias = "bust",
        alias = "crash",
        alias = "crashMultiplier",
        alias = "finalMultiplier",
        alias = "result"
    )]
    pub multiplier: Option<RawNumber>,

    #[serde(default, alias = "id", alias = "gameId", alias = "round_id")]
    pub round_id: Option<RawId>,

    #[serde(default)]
    pub timestamp: Option<i64>,

    #[serde(default)]
    pub origin: Option<Origin>,
}

impl From<RoundEvent> for RawRound {
    fn from(round: RoundEvent) -> Self {
        Self {
            multiplier: Some(RawNumber::Number(round.multiplier)),
            round_id: round.round_id.map(RawId::Text),
            timestamp: Some(round.timestamp),
            origin: Some(round.origin),
        }
    }
}

impl RawRound {
    /// Builds a raw record carrying just a numeric multiplier.
    #[must_use]
    pub fn from_multiplier(multiplier: f64) -> Self {
        Self {
            multiplier: Some(RawNumber::Number(multiplier)),
            ..Self::default()
        }
    }

    /// Sets the round identifier.
    #[must_use]
    pub fn with_round_id(mut self, round_id: impl Into<String>) -> Self {
        self.round_id = Some(RawId::Text(round_id.into()));
        self
    }

    /// Sets the source timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the provenance tag.
    #[must_use]
    pub const fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Validates the record into a `RoundEvent`.
    ///
    /// A missing timestamp defaults to `now_ms`; a missing origin to `Live`.
    ///
    /// # Errors
    /// Returns `ValidationError` if the multiplier is missing, unparseable,
    /// not finite, or outside [1.0, 1000.0].
    pub fn validate(self, now_ms: i64) -> Result<RoundEvent, ValidationError> {
        let raw = self
            .multiplier
            .ok_or_else(|| ValidationError::Malformed("missing multiplier".to_string()))?;
        let multiplier = validate_multiplier(raw.parse()?)?;

        Ok(RoundEvent {
            multiplier,
            timestamp: self.timestamp.unwrap_or(now_ms),
            round_id: self.round_id.map(RawId::into_string),
            origin: self.origin.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================
    // Multiplier validation
    // ============================================

    #[test]
    fn validate_accepts_range_bounds() {
        assert_eq!(validate_multiplier(1.0), Ok(1.0));
        assert_eq!(validate_multiplier(1000.0), Ok(1000.0));
    }

    #[test]
    fn validate_rejects_below_one() {
        assert_eq!(
            validate_multiplier(0.99),
            Err(ValidationError::OutOfRange(0.99))
        );
    }

    #[test]
    fn validate_rejects_above_thousand_without_clamping() {
        assert_eq!(
            validate_multiplier(1000.01),
            Err(ValidationError::OutOfRange(1000.01))
        );
    }

    #[test]
    fn validate_rejects_non_finite() {
        assert!(matches!(
            validate_multiplier(f64::NAN),
            Err(ValidationError::Malformed(_))
        ));
        assert!(matches!(
            validate_multiplier(f64::INFINITY),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn round_event_builder_sets_fields() {
        let round = RoundEvent::new(2.5, 1_700_000_000_000)
            .unwrap()
            .with_round_id("r-1")
            .with_origin(Origin::ReplaySeed);

        assert_eq!(round.round_id.as_deref(), Some("r-1"));
        assert_eq!(round.origin, Origin::ReplaySeed);
    }

    // ============================================
    // RawRound decoding
    // ============================================

    #[test]
    fn raw_round_decodes_crash_point_alias() {
        let raw: RawRound = serde_json::from_str(r#"{"crashPoint": 2.31, "id": "abc"}"#).unwrap();
        let round = raw.validate(42).unwrap();

        assert!((round.multiplier - 2.31).abs() < f64::EPSILON);
        assert_eq!(round.round_id.as_deref(), Some("abc"));
        assert_eq!(round.timestamp, 42);
        assert_eq!(round.origin, Origin::Live);
    }

    #[test]
    fn raw_round_decodes_string_multiplier_with_suffix() {
        let raw: RawRound = serde_json::from_str(r#"{"multiplier": "3.50x"}"#).unwrap();
        let round = raw.validate(0).unwrap();
        assert!((round.multiplier - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn raw_round_decodes_integer_id_and_multiplier() {
        let raw: RawRound = serde_json::from_str(r#"{"bust": 2, "gameId": 981}"#).unwrap();
        let round = raw.validate(0).unwrap();
        assert!((round.multiplier - 2.0).abs() < f64::EPSILON);
        assert_eq!(round.round_id.as_deref(), Some("981"));
    }

    #[test]
    fn raw_round_keeps_source_timestamp_and_origin() {
        let raw: RawRound = serde_json::from_str(
            r#"{"multiplier": 1.2, "timestamp": 1000, "origin": "synthetic-test"}"#,
        )
        .unwrap();
        let round = raw.validate(5000).unwrap();
        assert_eq!(round.timestamp, 1000);
        assert_eq!(round.origin, Origin::SyntheticTest);
    }

    #[test]
    fn raw_round_missing_multiplier_is_malformed() {
        let raw: RawRound = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(matches!(raw.validate(0), Err(ValidationError::Malformed(_))));
    }

    #[test]
    fn raw_round_garbage_text_is_malformed() {
        let raw: RawRound = serde_json::from_str(r#"{"multiplier": "soon"}"#).unwrap();
        assert!(matches!(raw.validate(0), Err(ValidationError::Malformed(_))));
    }

    #[test]
    fn raw_round_out_of_range_is_rejected() {
        let raw = RawRound::from_multiplier(0.5);
        assert_eq!(raw.validate(0), Err(ValidationError::OutOfRange(0.5)));
    }

    #[test]
    fn round_event_serializes_camel_case() {
        let round = RoundEvent::new(1.5, 10).unwrap().with_round_id("g");
        let json = serde_json::to_string(&round).unwrap();
        assert!(json.contains("\"roundId\":\"g\""));
        assert!(json.contains("\"origin\":\"live\""));
    }

    #[test]
    fn origin_parses_from_kebab_case() {
        assert_eq!("replay-seed".parse::<Origin>().unwrap(), Origin::ReplaySeed);
        assert!("demo".parse::<Origin>().is_err());
    }
}
