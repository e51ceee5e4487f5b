//! Pressure level scalar and its derived presentation bands.
//!
//! The canonical representation is a unit interval `[0, 1]`. Older scenario
//! files and callers use an integer 1–5 scale; the two meet only through
//! [`PressureLevel::from_legacy`] and [`PressureLevel::as_legacy`], which apply
//! `(level - 1) / 4` and its inverse.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Starting pressure when a scenario does not specify one.
pub const DEFAULT_PRESSURE: f64 = 0.6;

/// Lowest value on the legacy scale.
pub const LEGACY_MIN: f64 = 1.0;

/// Highest value on the legacy scale.
pub const LEGACY_MAX: f64 = 5.0;

/// A pressure/difficulty level, always within `[0, 1]`.
///
/// Construction clamps instead of failing: out-of-range inputs saturate at the
/// nearest bound and NaN falls back to [`DEFAULT_PRESSURE`]. Deserialization is
/// strict and rejects values outside the unit interval.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct PressureLevel(f64);

impl PressureLevel {
    /// The calmest possible level.
    pub const MIN: PressureLevel = PressureLevel(0.0);
    /// The most confrontational level.
    pub const MAX: PressureLevel = PressureLevel(1.0);

    /// Creates a level from a unit-scale value, clamping into `[0, 1]`.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(DEFAULT_PRESSURE);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Creates a level from the legacy 1–5 scale, clamping into `[1, 5]` first.
    pub fn from_legacy(level: f64) -> Self {
        if level.is_nan() {
            return Self(DEFAULT_PRESSURE);
        }
        let clamped = level.clamp(LEGACY_MIN, LEGACY_MAX);
        Self::new((clamped - LEGACY_MIN) / (LEGACY_MAX - LEGACY_MIN))
    }

    /// The unit-scale value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// The equivalent value on the legacy 1–5 scale.
    pub fn as_legacy(self) -> f64 {
        LEGACY_MIN + self.0 * (LEGACY_MAX - LEGACY_MIN)
    }

    /// Raises the level by `step`, saturating at [`PressureLevel::MAX`].
    pub fn raised(self, step: f64) -> Self {
        Self::new(self.0 + step.abs())
    }

    /// Lowers the level by `step`, saturating at [`PressureLevel::MIN`].
    pub fn lowered(self, step: f64) -> Self {
        Self::new(self.0 - step.abs())
    }

    /// The presentation band this level falls in.
    pub fn band(self) -> PressureBand {
        PressureBand::for_value(self.0)
    }
}

impl Default for PressureLevel {
    fn default() -> Self {
        Self(DEFAULT_PRESSURE)
    }
}

impl From<PressureLevel> for f64 {
    fn from(level: PressureLevel) -> f64 {
        level.0
    }
}

impl TryFrom<f64> for PressureLevel {
    type Error = DifficultyError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(DifficultyError::OutOfRange(value));
        }
        Ok(Self(value))
    }
}

impl fmt::Display for PressureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Qualitative band derived from a [`PressureLevel`]. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureBand {
    /// `[0, 0.4)`: firm but professional.
    Calm,
    /// `[0.4, 0.7)`: challenging, interrupts weak answers.
    Aggressive,
    /// `[0.7, 1.0]`: zero tolerance for vagueness.
    Confrontational,
}

impl PressureBand {
    /// Lower bound (inclusive) of the aggressive band.
    pub const AGGRESSIVE_FROM: f64 = 0.4;
    /// Lower bound (inclusive) of the confrontational band.
    pub const CONFRONTATIONAL_FROM: f64 = 0.7;

    fn for_value(value: f64) -> Self {
        if value >= Self::CONFRONTATIONAL_FROM {
            Self::Confrontational
        } else if value >= Self::AGGRESSIVE_FROM {
            Self::Aggressive
        } else {
            Self::Calm
        }
    }

    /// Returns the lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Aggressive => "aggressive",
            Self::Confrontational => "confrontational",
        }
    }
}

impl fmt::Display for PressureBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced when interpreting a raw difficulty value.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum DifficultyError {
    /// The value is NaN or infinite.
    #[error("difficulty must be a finite number")]
    NotFinite,
    /// The value lies outside both `[0, 1]` and the legacy `[1, 5]` scale.
    #[error("difficulty {0} is outside [0, 1] (or legacy [1, 5])")]
    OutOfRange(f64),
}

/// Interprets a raw difficulty from a scenario descriptor.
///
/// Values in `[0, 1]` are canonical. Values in `(1, 5]` are treated as the
/// legacy scale and normalized. Anything else is rejected.
pub fn normalize_difficulty(raw: f64) -> Result<PressureLevel, DifficultyError> {
    if !raw.is_finite() {
        return Err(DifficultyError::NotFinite);
    }
    if (0.0..=1.0).contains(&raw) {
        return Ok(PressureLevel(raw));
    }
    if raw > LEGACY_MIN && raw <= LEGACY_MAX {
        return Ok(PressureLevel::from_legacy(raw));
    }
    Err(DifficultyError::OutOfRange(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_mapping_matches_linear_formula() {
        assert_eq!(PressureLevel::from_legacy(1.0).value(), 0.0);
        assert_eq!(PressureLevel::from_legacy(3.0).value(), 0.5);
        assert_eq!(PressureLevel::from_legacy(5.0).value(), 1.0);
        assert_eq!(PressureLevel::new(0.25).as_legacy(), 2.0);
    }

    #[test]
    fn construction_clamps() {
        assert_eq!(PressureLevel::new(1.7), PressureLevel::MAX);
        assert_eq!(PressureLevel::new(-0.2), PressureLevel::MIN);
        assert_eq!(PressureLevel::new(f64::NAN).value(), DEFAULT_PRESSURE);
        assert_eq!(PressureLevel::from_legacy(9.0), PressureLevel::MAX);
    }

    #[test]
    fn raise_and_lower_saturate() {
        let top = PressureLevel::new(0.9).raised(0.25);
        assert_eq!(top, PressureLevel::MAX);
        let bottom = PressureLevel::new(0.1).lowered(0.25);
        assert_eq!(bottom, PressureLevel::MIN);
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(PressureLevel::new(0.0).band(), PressureBand::Calm);
        assert_eq!(PressureLevel::new(0.39).band(), PressureBand::Calm);
        assert_eq!(PressureLevel::new(0.4).band(), PressureBand::Aggressive);
        assert_eq!(PressureLevel::new(0.69).band(), PressureBand::Aggressive);
        assert_eq!(PressureLevel::new(0.7).band(), PressureBand::Confrontational);
        assert_eq!(PressureLevel::MAX.band(), PressureBand::Confrontational);
    }

    #[test]
    fn normalize_accepts_both_scales() {
        assert_eq!(normalize_difficulty(0.6).unwrap().value(), 0.6);
        assert_eq!(normalize_difficulty(1.0).unwrap().value(), 1.0);
        assert_eq!(normalize_difficulty(3.0).unwrap().value(), 0.5);
        assert_eq!(normalize_difficulty(5.0).unwrap().value(), 1.0);
    }

    #[test]
    fn normalize_rejects_out_of_range() {
        assert_eq!(
            normalize_difficulty(-0.1),
            Err(DifficultyError::OutOfRange(-0.1))
        );
        assert_eq!(normalize_difficulty(6.0), Err(DifficultyError::OutOfRange(6.0)));
        assert_eq!(normalize_difficulty(f64::NAN), Err(DifficultyError::NotFinite));
    }

    #[test]
    fn deserialization_is_strict() {
        let ok: PressureLevel = serde_json::from_str("0.35").unwrap();
        assert_eq!(ok.value(), 0.35);
        assert!(serde_json::from_str::<PressureLevel>("1.5").is_err());
        assert_eq!(serde_json::to_string(&PressureLevel::new(0.5)).unwrap(), "0.5");
    }
}
