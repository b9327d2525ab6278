//! Conversions between the units roofing materials are sold in

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const BUNDLES_PER_SQUARE: f64 = 3.0;
pub const LINEAR_FEET_PER_ROLL: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "Sq")]
    Square,
    #[serde(rename = "Bdl")]
    Bundle,
    #[serde(rename = "LF")]
    LinearFoot,
    #[serde(rename = "Rolls")]
    Roll,
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sq" | "square" | "squares" => Ok(Unit::Square),
            "bdl" | "bundle" | "bundles" => Ok(Unit::Bundle),
            "lf" | "linear foot" | "linear feet" => Ok(Unit::LinearFoot),
            "roll" | "rolls" => Ok(Unit::Roll),
            _ => Err(format!("Unknown unit: {s}")),
        }
    }
}

/// Converts `value` between units. Pairs without a conversion return `value` unchanged.
///
/// Linear feet round up to whole rolls.
pub fn convert(value: f64, from: Unit, to: Unit) -> f64 {
    match (from, to) {
        (Unit::Square, Unit::Bundle) => value * BUNDLES_PER_SQUARE,
        (Unit::Bundle, Unit::Square) => value / BUNDLES_PER_SQUARE,
        (Unit::LinearFoot, Unit::Roll) => (value / LINEAR_FEET_PER_ROLL).ceil(),
        (Unit::Roll, Unit::LinearFoot) => value * LINEAR_FEET_PER_ROLL,
        _ => value,
    }
}

/// Like [`convert`] for unit labels; unknown labels return `value` unchanged.
pub fn convert_labels(value: f64, from: &str, to: &str) -> f64 {
    match (from.parse::<Unit>(), to.parse::<Unit>()) {
        (Ok(from), Ok(to)) => convert(value, from, to),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_bundle_conversion() {
        assert_eq!(convert(40.0, Unit::Square, Unit::Bundle), 120.0);
        assert_eq!(convert(120.0, Unit::Bundle, Unit::Square), 40.0);
    }

    #[test]
    fn test_linear_feet_round_up_to_rolls() {
        assert_eq!(convert(200.0, Unit::LinearFoot, Unit::Roll), 2.0);
        assert_eq!(convert(201.0, Unit::LinearFoot, Unit::Roll), 3.0);
        assert_eq!(convert(3.0, Unit::Roll, Unit::LinearFoot), 300.0);
    }

    #[test]
    fn test_unrelated_units_pass_through() {
        assert_eq!(convert(7.0, Unit::Square, Unit::Roll), 7.0);
        assert_eq!(convert_labels(7.0, "Box", "Pcs"), 7.0);
        assert_eq!(convert_labels(2.0, "Sq", "Bdl"), 6.0);
    }
}
