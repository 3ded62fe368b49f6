//! Built-in device profiles

use crate::cluster::{
    basic_attrs, electrical_attrs, id, lumi_attrs, manufacturer, measurement_attrs,
    metering_attrs, on_off_attrs, power_config_attrs,
};
use crate::error::RegistryError;
use crate::registry::{AttributeKey, Registry, RegistryEntry};
use crate::scaling::{DivisorSlot, ScalePart, ScaleRule, Unit};
use zcl_codec::{TypeCode, UnknownTypePolicy};

/// Names accepted by [`builtin`]
pub const BUILTIN_PROFILES: &[&str] = &[
    "smart_plug",
    "wall_switch",
    "climate_sensor",
    "presence_sensor",
];

/// Look up a built-in profile by name
#[must_use]
pub fn builtin(name: &str) -> Option<Registry> {
    let registry = match name {
        "smart_plug" => smart_plug(),
        "wall_switch" => wall_switch(),
        "climate_sensor" => climate_sensor(),
        "presence_sensor" => presence_sensor(),
        _ => return None,
    };
    registry.ok()
}

fn electrical(attribute: u16) -> AttributeKey {
    AttributeKey::zcl(id::ELECTRICAL_MEASUREMENT, attribute)
}

fn metering(attribute: u16) -> AttributeKey {
    AttributeKey::zcl(id::METERING, attribute)
}

/// Mains plug with ZCL electrical measurement and metering
///
/// Divisors and multipliers are announced by the plug as attributes of
/// their own and scale every later reading of the same quantity.
pub fn smart_plug() -> Result<Registry, RegistryError> {
    Registry::new(
        "smart_plug",
        vec![
            RegistryEntry::binary(
                AttributeKey::zcl(id::ON_OFF, on_off_attrs::ON_OFF),
                "switch",
                "on",
                "off",
            )
            .with_type(TypeCode::Boolean),
            RegistryEntry::announce(
                electrical(electrical_attrs::AC_POWER_MULTIPLIER),
                DivisorSlot::Power,
                ScalePart::Multiplier,
            ),
            RegistryEntry::announce(
                electrical(electrical_attrs::AC_POWER_DIVISOR),
                DivisorSlot::Power,
                ScalePart::Divisor,
            ),
            RegistryEntry::announce(
                electrical(electrical_attrs::AC_VOLTAGE_MULTIPLIER),
                DivisorSlot::Voltage,
                ScalePart::Multiplier,
            ),
            RegistryEntry::announce(
                electrical(electrical_attrs::AC_VOLTAGE_DIVISOR),
                DivisorSlot::Voltage,
                ScalePart::Divisor,
            ),
            RegistryEntry::announce(
                electrical(electrical_attrs::AC_CURRENT_MULTIPLIER),
                DivisorSlot::Current,
                ScalePart::Multiplier,
            ),
            RegistryEntry::announce(
                electrical(electrical_attrs::AC_CURRENT_DIVISOR),
                DivisorSlot::Current,
                ScalePart::Divisor,
            ),
            RegistryEntry::announce(
                metering(metering_attrs::MULTIPLIER),
                DivisorSlot::Energy,
                ScalePart::Multiplier,
            ),
            RegistryEntry::announce(
                metering(metering_attrs::DIVISOR),
                DivisorSlot::Energy,
                ScalePart::Divisor,
            ),
            RegistryEntry::measurement(
                electrical(electrical_attrs::ACTIVE_POWER),
                "power",
                Unit::Watt,
                ScaleRule::DivideByRuntime(DivisorSlot::Power),
            ),
            RegistryEntry::measurement(
                electrical(electrical_attrs::RMS_VOLTAGE),
                "voltage",
                Unit::Volt,
                ScaleRule::DivideByRuntime(DivisorSlot::Voltage),
            ),
            RegistryEntry::measurement(
                electrical(electrical_attrs::RMS_CURRENT),
                "amperage",
                Unit::Ampere,
                ScaleRule::DivideByRuntime(DivisorSlot::Current),
            ),
            RegistryEntry::measurement(
                metering(metering_attrs::CURRENT_SUMMATION_DELIVERED),
                "energy",
                Unit::KilowattHour,
                ScaleRule::DivideByRuntime(DivisorSlot::Energy),
            ),
        ],
    )
}

/// In-wall relay reporting through the Lumi private status stream
pub fn wall_switch() -> Result<Registry, RegistryError> {
    Registry::new(
        "wall_switch",
        vec![
            RegistryEntry::binary(
                AttributeKey::zcl(id::ON_OFF, on_off_attrs::ON_OFF),
                "switch",
                "on",
                "off",
            ),
            RegistryEntry::tlv_stream(
                AttributeKey::manufacturer(
                    id::LUMI_PRIVATE,
                    lumi_attrs::STATUS_REPORT,
                    manufacturer::LUMI,
                ),
                UnknownTypePolicy::Abort,
            ),
            RegistryEntry::measurement(
                AttributeKey::tag(0x03),
                "temperature",
                Unit::Celsius,
                ScaleRule::None,
            ),
            RegistryEntry::binary(AttributeKey::tag(0x64), "switch", "on", "off")
                .with_type(TypeCode::Boolean),
            RegistryEntry::measurement(
                AttributeKey::tag(0x95),
                "energy",
                Unit::KilowattHour,
                ScaleRule::None,
            ),
            RegistryEntry::measurement(
                AttributeKey::tag(0x96),
                "voltage",
                Unit::Volt,
                ScaleRule::DivideBy(10.0),
            ),
            RegistryEntry::measurement(
                AttributeKey::tag(0x97),
                "amperage",
                Unit::Ampere,
                ScaleRule::DivideBy(1000.0),
            ),
            RegistryEntry::measurement(
                AttributeKey::tag(0x98),
                "power",
                Unit::Watt,
                ScaleRule::None,
            ),
        ],
    )
}

/// Battery temperature/humidity sensor
///
/// Readings arrive both as ZCL measurements and inside the legacy status
/// stream on the Basic cluster.
pub fn climate_sensor() -> Result<Registry, RegistryError> {
    Registry::new(
        "climate_sensor",
        vec![
            RegistryEntry::measurement(
                AttributeKey::zcl(
                    id::TEMPERATURE_MEASUREMENT,
                    measurement_attrs::MEASURED_VALUE,
                ),
                "temperature",
                Unit::Celsius,
                ScaleRule::DivideBy(100.0),
            )
            .with_type(TypeCode::Int16),
            RegistryEntry::measurement(
                AttributeKey::zcl(id::HUMIDITY_MEASUREMENT, measurement_attrs::MEASURED_VALUE),
                "humidity",
                Unit::Percent,
                ScaleRule::DivideBy(100.0),
            )
            .with_type(TypeCode::Uint16),
            RegistryEntry::measurement(
                AttributeKey::zcl(
                    id::POWER_CONFIG,
                    power_config_attrs::BATTERY_PERCENTAGE_REMAINING,
                ),
                "battery",
                Unit::Percent,
                ScaleRule::MultiplyBy(0.5),
            )
            .with_type(TypeCode::Uint8),
            RegistryEntry::tlv_stream(
                AttributeKey::manufacturer(
                    id::BASIC,
                    basic_attrs::LUMI_STATUS,
                    manufacturer::LUMI,
                ),
                UnknownTypePolicy::SkipWidth(1),
            ),
            RegistryEntry::measurement(
                AttributeKey::tag(0x01),
                "batteryVoltage",
                Unit::Millivolt,
                ScaleRule::None,
            ),
            RegistryEntry::measurement(
                AttributeKey::tag(0x64),
                "temperature",
                Unit::Celsius,
                ScaleRule::DivideBy(100.0),
            ),
            RegistryEntry::measurement(
                AttributeKey::tag(0x65),
                "humidity",
                Unit::Percent,
                ScaleRule::DivideBy(100.0),
            ),
        ],
    )
}

/// mmWave presence sensor configured through its vendor stream
pub fn presence_sensor() -> Result<Registry, RegistryError> {
    Registry::new(
        "presence_sensor",
        vec![
            RegistryEntry::tlv_stream(
                AttributeKey::manufacturer(
                    id::LUMI_PRIVATE,
                    lumi_attrs::STATUS_REPORT,
                    manufacturer::LUMI,
                ),
                UnknownTypePolicy::Abort,
            ),
            RegistryEntry::binary(
                AttributeKey::tag(0x65),
                "presence",
                "present",
                "not present",
            ),
            RegistryEntry::measurement(
                AttributeKey::tag(0x66),
                "distance",
                Unit::Meter,
                ScaleRule::DivideBy(100.0),
            ),
            RegistryEntry::measurement(
                AttributeKey::tag(0x67),
                "illuminance",
                Unit::Lux,
                ScaleRule::None,
            ),
            RegistryEntry::enumeration(
                AttributeKey::tag(0x68),
                "sensitivity",
                &[(1, "low"), (2, "medium"), (3, "high")],
            )
            .with_type(TypeCode::Enum8),
            RegistryEntry::measurement(
                AttributeKey::tag(0x69),
                "detectionRange",
                Unit::Meter,
                ScaleRule::DivideBy(100.0),
            )
            .with_type(TypeCode::Uint16)
            .with_range(0.0, 6.0),
        ],
    )
}
