//! Output units and coordinate formatting
//!
//! Handles the choice between Metric (mm) and Imperial (inch) output and
//! the three-decimal coordinate format used on every emitted word.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Millimetres per document pixel (90 dpi).
pub const MM_PER_PX: f64 = 0.282222222222;

/// Inches per document pixel (90 dpi).
pub const IN_PER_PX: f64 = 0.011111;

/// Measurement system of the emitted program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Metric system (mm)
    #[default]
    Metric,
    /// Imperial system (inches)
    Imperial,
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "mm" => Ok(Self::Metric),
            "imperial" | "inch" | "in" => Ok(Self::Imperial),
            _ => Err(format!("Unknown measurement system: {}", s)),
        }
    }
}

impl MeasurementSystem {
    /// The G-code word selecting this unit system.
    pub fn units_word(&self) -> &'static str {
        match self {
            Self::Metric => "G21",
            Self::Imperial => "G20",
        }
    }

    /// Scale from document pixels to output units.
    pub fn px_scale(&self) -> f64 {
        match self {
            Self::Metric => MM_PER_PX,
            Self::Imperial => IN_PER_PX,
        }
    }
}

/// Get the unit label for the given system ("mm" or "in")
pub fn get_unit_label(system: MeasurementSystem) -> &'static str {
    match system {
        MeasurementSystem::Metric => "mm",
        MeasurementSystem::Imperial => "in",
    }
}

/// Rounds to three decimals, folding negative zero into zero.
pub fn round_coordinate(value: f64) -> f64 {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Formats a coordinate with exactly three decimals.
///
/// Values that round to zero print as `0.000`, never `-0.000`.
pub fn format_coordinate(value: f64) -> String {
    format!("{:.3}", round_coordinate(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_measurement_system() {
        assert_eq!("mm".parse::<MeasurementSystem>().unwrap(), MeasurementSystem::Metric);
        assert_eq!("Inch".parse::<MeasurementSystem>().unwrap(), MeasurementSystem::Imperial);
        assert!("furlong".parse::<MeasurementSystem>().is_err());
    }

    #[test]
    fn test_units_word() {
        assert_eq!(MeasurementSystem::Metric.units_word(), "G21");
        assert_eq!(MeasurementSystem::Imperial.units_word(), "G20");
    }

    #[test]
    fn test_unit_labels() {
        assert_eq!(get_unit_label(MeasurementSystem::Metric), "mm");
        assert_eq!(get_unit_label(MeasurementSystem::Imperial), "in");
    }

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(10.0), "10.000");
        assert_eq!(format_coordinate(1.23456), "1.235");
        assert_eq!(format_coordinate(-2.5), "-2.500");
    }

    #[test]
    fn test_negative_zero_is_normalized() {
        assert_eq!(format_coordinate(-0.0), "0.000");
        assert_eq!(format_coordinate(-0.0004), "0.000");
        assert!(round_coordinate(-0.0001).is_sign_positive());
    }

    proptest! {
        #[test]
        fn formatted_coordinates_round_trip(v in -1.0e6f64..1.0e6) {
            let text = format_coordinate(v);
            prop_assert!(text != "-0.000");
            let parsed: f64 = text.parse().unwrap();
            prop_assert!((parsed - v).abs() < 0.0006);
        }
    }
}
