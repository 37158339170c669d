//! Length units and millimeter conversion

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Length unit declared for imported coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Millimeters (no scaling)
    Millimeter,
    /// Centimeters (scale by 10)
    Centimeter,
    /// Meters (scale by 1000)
    Meter,
    /// Kilometers (scale by 1e6)
    Kilometer,
    /// Inches (scale by 25.4)
    Inch,
    /// Statute miles (scale by 1 609 344)
    Mile,
}

impl Unit {
    /// Number of millimeters in one of this unit
    pub fn scale_to_millimeters(&self) -> f64 {
        match self {
            Unit::Millimeter => 1.0,
            Unit::Centimeter => 10.0,
            Unit::Meter => 1_000.0,
            Unit::Kilometer => 1_000_000.0,
            Unit::Inch => 25.4,
            Unit::Mile => 1_609_344.0,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Millimeter => "mm",
            Unit::Centimeter => "cm",
            Unit::Meter => "m",
            Unit::Kilometer => "km",
            Unit::Inch => "in",
            Unit::Mile => "mile",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Unit::Millimeter => "Millimeter",
            Unit::Centimeter => "Centimeter",
            Unit::Meter => "Meter",
            Unit::Kilometer => "Kilometer",
            Unit::Inch => "Inch",
            Unit::Mile => "Mile",
        }
    }

    pub const ALL: &'static [Unit] = &[
        Unit::Millimeter,
        Unit::Centimeter,
        Unit::Meter,
        Unit::Kilometer,
        Unit::Inch,
        Unit::Mile,
    ];
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A unit name outside the supported set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported unit: '{0}' (expected one of mm, cm, m, km, in, mile)")]
pub struct UnsupportedUnitError(pub String);

impl FromStr for Unit {
    type Err = UnsupportedUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => {
                Ok(Unit::Millimeter)
            }
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                Ok(Unit::Centimeter)
            }
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(Unit::Meter),
            "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => Ok(Unit::Kilometer),
            "in" | "inch" | "inches" | "\"" => Ok(Unit::Inch),
            "mi" | "mile" | "miles" => Ok(Unit::Mile),
            _ => Err(UnsupportedUnitError(s.to_string())),
        }
    }
}

/// Millimeter scale factor for `unit`
pub fn scale_to_millimeters(unit: Unit) -> f64 {
    unit.scale_to_millimeters()
}

/// Convert a value expressed in `unit` to millimeters
pub fn convert_to_millimeters(value: f64, unit: Unit) -> f64 {
    value * unit.scale_to_millimeters()
}

/// Convert a millimeter value back to `unit`
pub fn convert_from_millimeters(value_mm: f64, unit: Unit) -> f64 {
    value_mm / unit.scale_to_millimeters()
}
