//! Unit conversion tables.
//!
//! Every linear category converts through a base unit (metre, kilogram,
//! litre, square metre, second, metre per second, byte). Temperature is
//! affine and goes through Celsius instead.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

pub const INVALID_INPUT: &str = "Invalid input";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Length,
    Mass,
    Volume,
    Area,
    Time,
    Speed,
    Data,
    Temperature,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Unit {
    pub name: &'static str,
    pub abbreviation: &'static str,
    /// Multiply by this to reach the category's base unit. Unused for temperature.
    pub factor: f64,
}

const fn unit(name: &'static str, abbreviation: &'static str, factor: f64) -> Unit {
    Unit { name, abbreviation, factor }
}

const LENGTH: &[Unit] = &[
    unit("millimeter", "mm", 0.001),
    unit("centimeter", "cm", 0.01),
    unit("meter", "m", 1.0),
    unit("kilometer", "km", 1000.0),
    unit("inch", "in", 0.0254),
    unit("foot", "ft", 0.3048),
    unit("yard", "yd", 0.9144),
    unit("mile", "mi", 1609.344),
];

const MASS: &[Unit] = &[
    unit("milligram", "mg", 0.000001),
    unit("gram", "g", 0.001),
    unit("kilogram", "kg", 1.0),
    unit("tonne", "t", 1000.0),
    unit("ounce", "oz", 0.028349523125),
    unit("pound", "lb", 0.45359237),
];

const VOLUME: &[Unit] = &[
    unit("milliliter", "ml", 0.001),
    unit("liter", "l", 1.0),
    unit("cubic meter", "m3", 1000.0),
    unit("teaspoon", "tsp", 0.00492892159375),
    unit("tablespoon", "tbsp", 0.01478676478125),
    unit("fluid ounce", "fl oz", 0.0295735295625),
    unit("cup", "cup", 0.2365882365),
    unit("pint", "pt", 0.473176473),
    unit("quart", "qt", 0.946352946),
    unit("gallon", "gal", 3.785411784),
];

const AREA: &[Unit] = &[
    unit("square millimeter", "mm2", 0.000001),
    unit("square centimeter", "cm2", 0.0001),
    unit("square meter", "m2", 1.0),
    unit("hectare", "ha", 10_000.0),
    unit("square kilometer", "km2", 1_000_000.0),
    unit("square inch", "in2", 0.00064516),
    unit("square foot", "ft2", 0.09290304),
    unit("acre", "ac", 4046.8564224),
];

const TIME: &[Unit] = &[
    unit("millisecond", "ms", 0.001),
    unit("second", "s", 1.0),
    unit("minute", "min", 60.0),
    unit("hour", "h", 3600.0),
    unit("day", "d", 86_400.0),
    unit("week", "wk", 604_800.0),
    unit("year", "yr", 31_536_000.0),
];

const SPEED: &[Unit] = &[
    unit("meter per second", "m/s", 1.0),
    unit("kilometer per hour", "km/h", 1.0 / 3.6),
    unit("mile per hour", "mph", 0.44704),
    unit("foot per second", "ft/s", 0.3048),
    unit("knot", "kn", 1852.0 / 3600.0),
];

const DATA: &[Unit] = &[
    unit("bit", "b", 0.125),
    unit("byte", "B", 1.0),
    unit("kilobyte", "KB", 1024.0),
    unit("megabyte", "MB", 1_048_576.0),
    unit("gigabyte", "GB", 1_073_741_824.0),
    unit("terabyte", "TB", 1_099_511_627_776.0),
];

const TEMPERATURE: &[Unit] = &[
    unit("celsius", "°C", 1.0),
    unit("fahrenheit", "°F", 1.0),
    unit("kelvin", "K", 1.0),
];

#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Unknown {category:?} unit: {unit}")]
    UnknownUnit { category: Category, unit: String },
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Length,
        Category::Mass,
        Category::Volume,
        Category::Area,
        Category::Time,
        Category::Speed,
        Category::Data,
        Category::Temperature,
    ];

    pub fn units(&self) -> &'static [Unit] {
        match self {
            Category::Length => LENGTH,
            Category::Mass => MASS,
            Category::Volume => VOLUME,
            Category::Area => AREA,
            Category::Time => TIME,
            Category::Speed => SPEED,
            Category::Data => DATA,
            Category::Temperature => TEMPERATURE,
        }
    }

    /// Match by full name, plural name or abbreviation. Abbreviations are
    /// case-sensitive first (`b` vs `B`), then everything case-insensitively.
    pub fn find_unit(&self, raw: &str) -> Result<&'static Unit, ConversionError> {
        let raw = raw.trim();
        let units = self.units();
        if let Some(u) = units.iter().find(|u| u.abbreviation == raw) {
            return Ok(u);
        }
        let lower = raw.to_lowercase();
        let singular = lower.strip_suffix('s').unwrap_or(&lower);
        let singular_es = lower.strip_suffix("es").unwrap_or(&lower);
        units
            .iter()
            .find(|u| {
                u.name == lower
                    || u.name == singular
                    || u.name == singular_es
                    || u.abbreviation.to_lowercase() == lower
                    || u.name.replace(' ', "_") == lower
            })
            .ok_or_else(|| ConversionError::UnknownUnit {
                category: *self,
                unit: raw.to_string(),
            })
    }
}

impl FromStr for Category {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "length" => Ok(Category::Length),
            "mass" | "weight" => Ok(Category::Mass),
            "volume" => Ok(Category::Volume),
            "area" => Ok(Category::Area),
            "time" => Ok(Category::Time),
            "speed" => Ok(Category::Speed),
            "data" | "digital" => Ok(Category::Data),
            "temperature" => Ok(Category::Temperature),
            other => Err(ConversionError::UnknownCategory(other.to_string())),
        }
    }
}

fn to_celsius(unit: &str, value: f64) -> f64 {
    match unit {
        "fahrenheit" => (value - 32.0) * 5.0 / 9.0,
        "kelvin" => value - 273.15,
        _ => value,
    }
}

fn from_celsius(unit: &str, celsius: f64) -> f64 {
    match unit {
        "fahrenheit" => celsius * 9.0 / 5.0 + 32.0,
        "kelvin" => celsius + 273.15,
        _ => celsius,
    }
}

pub fn convert(category: Category, from: &str, to: &str, value: f64) -> Result<f64, ConversionError> {
    let from = category.find_unit(from)?;
    let to = category.find_unit(to)?;
    if category == Category::Temperature {
        return Ok(from_celsius(to.name, to_celsius(from.name, value)));
    }
    Ok(value * from.factor / to.factor)
}

/// Truncate toward zero at 6 decimals and strip trailing zeros.
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return INVALID_INPUT.to_string();
    }
    // Nudge by a relative 1e-12 so 2.9999999999999996 does not truncate to 2.999999
    let truncated = (value * 1e6 * (1.0 + 1e-12)).trunc() / 1e6;
    let text = format!("{:.6}", truncated);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Convert what the user typed. Non-numeric input is not an error: the
/// result is the literal `"Invalid input"`.
pub fn convert_input(category: Category, from: &str, to: &str, input: &str) -> Result<String, ConversionError> {
    let Ok(value) = input.trim().parse::<f64>() else {
        return Ok(INVALID_INPUT.to_string());
    };
    if !value.is_finite() {
        return Ok(INVALID_INPUT.to_string());
    }
    convert(category, from, to, value).map(format_value)
}
