//! Scaling of raw readings into physical quantities
//!
//! Metering devices report integers together with a divisor and multiplier
//! for each quantity. Those factors may arrive as attributes of their own, at
//! any point in the report stream, so each device keeps a [`DivisorTable`]
//! that is updated as announcements are resolved.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A runtime scaling slot shared by a group of related attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivisorSlot {
    Power,
    Voltage,
    Current,
    Energy,
}

impl DivisorSlot {
    /// Divisor used until the device announces its own
    ///
    /// Power and voltage default to tenths, current to milliamps and energy
    /// to watt-hours.
    #[must_use]
    pub fn fallback_divisor(self) -> f64 {
        match self {
            DivisorSlot::Power | DivisorSlot::Voltage => 10.0,
            DivisorSlot::Current | DivisorSlot::Energy => 1000.0,
        }
    }
}

/// Which factor of a slot an announcement carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalePart {
    Divisor,
    Multiplier,
}

/// Per-device divisor and multiplier state
///
/// Owned by exactly one device; never share a table between devices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DivisorTable {
    divisors: HashMap<DivisorSlot, f64>,
    multipliers: HashMap<DivisorSlot, f64>,
}

impl DivisorTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Announced divisor, or the slot's fallback
    #[must_use]
    pub fn divisor(&self, slot: DivisorSlot) -> f64 {
        self.divisors
            .get(&slot)
            .copied()
            .unwrap_or_else(|| slot.fallback_divisor())
    }

    /// Announced multiplier, or 1
    #[must_use]
    pub fn multiplier(&self, slot: DivisorSlot) -> f64 {
        self.multipliers.get(&slot).copied().unwrap_or(1.0)
    }

    /// Whether the device has announced a divisor for `slot`
    #[must_use]
    pub fn is_announced(&self, slot: DivisorSlot) -> bool {
        self.divisors.contains_key(&slot)
    }

    /// Record an announced factor
    ///
    /// Zero, negative and non-finite factors are ignored and the previous
    /// value is kept. Returns whether the table changed.
    pub fn announce(&mut self, slot: DivisorSlot, part: ScalePart, value: f64) -> bool {
        if !value.is_finite() || value <= 0.0 {
            return false;
        }
        let map = match part {
            ScalePart::Divisor => &mut self.divisors,
            ScalePart::Multiplier => &mut self.multipliers,
        };
        map.insert(slot, value) != Some(value)
    }

    /// Forget every announcement, e.g. after the device rejoins
    pub fn clear(&mut self) {
        self.divisors.clear();
        self.multipliers.clear();
    }
}

/// How a raw reading is scaled
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleRule {
    /// Pass the raw value through
    #[default]
    None,
    /// Divide by a fixed constant
    DivideBy(f64),
    /// Multiply by a fixed constant
    MultiplyBy(f64),
    /// `raw * multiplier / divisor` using the slot's current factors
    DivideByRuntime(DivisorSlot),
}

impl ScaleRule {
    /// Scale a raw reading
    #[must_use]
    pub fn apply(&self, raw: f64, table: &DivisorTable) -> f64 {
        match *self {
            ScaleRule::None => raw,
            ScaleRule::DivideBy(k) => raw / k,
            ScaleRule::MultiplyBy(k) => raw * k,
            ScaleRule::DivideByRuntime(slot) => {
                raw * table.multiplier(slot) / table.divisor(slot)
            }
        }
    }

    /// Turn a physical quantity back into a raw reading
    #[must_use]
    pub fn invert(&self, value: f64, table: &DivisorTable) -> f64 {
        match *self {
            ScaleRule::None => value,
            ScaleRule::DivideBy(k) => value * k,
            ScaleRule::MultiplyBy(k) => value / k,
            ScaleRule::DivideByRuntime(slot) => {
                value * table.divisor(slot) / table.multiplier(slot)
            }
        }
    }
}

/// Unit attached to an event value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "°C")]
    Celsius,
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "V")]
    Volt,
    #[serde(rename = "mV")]
    Millivolt,
    #[serde(rename = "A")]
    Ampere,
    #[serde(rename = "W")]
    Watt,
    #[serde(rename = "kWh")]
    KilowattHour,
    #[serde(rename = "lx")]
    Lux,
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "m")]
    Meter,
}

impl Unit {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::None => "",
            Unit::Celsius => "°C",
            Unit::Percent => "%",
            Unit::Volt => "V",
            Unit::Millivolt => "mV",
            Unit::Ampere => "A",
            Unit::Watt => "W",
            Unit::KilowattHour => "kWh",
            Unit::Lux => "lx",
            Unit::Centimeter => "cm",
            Unit::Meter => "m",
        }
    }

    /// Decimal places kept when a value in this unit is reported
    #[must_use]
    pub fn precision(self) -> i32 {
        match self {
            Unit::Celsius | Unit::Percent | Unit::Volt | Unit::Watt => 1,
            Unit::Ampere | Unit::KilowattHour => 3,
            Unit::Meter => 2,
            Unit::None | Unit::Millivolt | Unit::Lux | Unit::Centimeter => 0,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round to a fixed number of decimal places
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Scale, calibrate and round a raw reading for reporting in `unit`
#[must_use]
pub fn normalize(
    raw: f64,
    rule: &ScaleRule,
    offset: f64,
    unit: Unit,
    table: &DivisorTable,
) -> f64 {
    round_to(rule.apply(raw, table) + offset, unit.precision())
}
