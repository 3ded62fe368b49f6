//! Tag/attribute registry
//!
//! A registry is the declarative description of one device model: which
//! ZCL attributes and vendor stream tags it reports, how each raw value is
//! scaled, and which event it becomes. Registries are built once when a
//! device is configured and are read-only afterwards; the only mutable state
//! involved in resolving a value is the device's [`DivisorTable`].

use crate::error::RegistryError;
use crate::event::{DomainEvent, EventValue};
use crate::scaling::{normalize, DivisorSlot, DivisorTable, ScalePart, ScaleRule, Unit};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use zcl_codec::{
    build, encode, Interpretation, ScalarValue, TlvRecord, TypeCode, UnknownTypePolicy,
};

/// Lookup key for a registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeKey {
    /// A ZCL attribute, optionally manufacturer specific
    Zcl {
        cluster: u16,
        attribute: u16,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        manufacturer_code: Option<u16>,
    },
    /// A record tag inside a vendor tag-type-value stream
    Tag { tag: u8 },
}

impl AttributeKey {
    #[must_use]
    pub fn zcl(cluster: u16, attribute: u16) -> Self {
        AttributeKey::Zcl {
            cluster,
            attribute,
            manufacturer_code: None,
        }
    }

    #[must_use]
    pub fn manufacturer(cluster: u16, attribute: u16, code: u16) -> Self {
        AttributeKey::Zcl {
            cluster,
            attribute,
            manufacturer_code: Some(code),
        }
    }

    #[must_use]
    pub fn tag(tag: u8) -> Self {
        AttributeKey::Tag { tag }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKey::Zcl {
                cluster,
                attribute,
                manufacturer_code: None,
            } => write!(f, "{cluster:#06x}/{attribute:#06x}"),
            AttributeKey::Zcl {
                cluster,
                attribute,
                manufacturer_code: Some(code),
            } => write!(f, "{cluster:#06x}/{attribute:#06x} (mfr {code:#06x})"),
            AttributeKey::Tag { tag } => write!(f, "tag {tag:#04x}"),
        }
    }
}

/// What an entry does with a resolved value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryKind {
    /// Numeric reading, scaled and rounded for its unit
    #[default]
    Measurement,
    /// Boolean state mapped to one of two labels
    Binary { on: String, off: String },
    /// Integer mapped to a label; unmapped values are dropped
    Enumeration { labels: Vec<(i64, String)> },
    /// The attribute carries a divisor or multiplier, not a reading
    Announce { slot: DivisorSlot, part: ScalePart },
    /// The attribute carries a vendor stream whose records resolve by tag
    TlvStream {
        #[serde(default)]
        policy: UnknownTypePolicy,
    },
}

/// One row of a device registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub key: AttributeKey,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub scale: ScaleRule,
    #[serde(default)]
    pub kind: EntryKind,
    /// Calibration added after scaling
    #[serde(default)]
    pub offset: f64,
    /// Wire type used when a report carries none, and for writes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_code: Option<TypeCode>,
    /// Accepted write range in reported units; writes are clamped into it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,
}

impl RegistryEntry {
    fn base(key: AttributeKey, event_name: &str, kind: EntryKind) -> Self {
        Self {
            key,
            event_name: event_name.to_string(),
            unit: Unit::None,
            scale: ScaleRule::None,
            kind,
            offset: 0.0,
            type_code: None,
            range: None,
        }
    }

    #[must_use]
    pub fn measurement(key: AttributeKey, event_name: &str, unit: Unit, scale: ScaleRule) -> Self {
        Self {
            unit,
            scale,
            ..Self::base(key, event_name, EntryKind::Measurement)
        }
    }

    #[must_use]
    pub fn binary(key: AttributeKey, event_name: &str, on: &str, off: &str) -> Self {
        Self::base(
            key,
            event_name,
            EntryKind::Binary {
                on: on.to_string(),
                off: off.to_string(),
            },
        )
    }

    #[must_use]
    pub fn enumeration(key: AttributeKey, event_name: &str, labels: &[(i64, &str)]) -> Self {
        let labels = labels
            .iter()
            .map(|(code, label)| (*code, (*label).to_string()))
            .collect();
        Self::base(key, event_name, EntryKind::Enumeration { labels })
    }

    #[must_use]
    pub fn announce(key: AttributeKey, slot: DivisorSlot, part: ScalePart) -> Self {
        Self::base(key, "", EntryKind::Announce { slot, part })
    }

    #[must_use]
    pub fn tlv_stream(key: AttributeKey, policy: UnknownTypePolicy) -> Self {
        Self::base(key, "", EntryKind::TlvStream { policy })
    }

    #[must_use]
    pub fn with_type(mut self, type_code: TypeCode) -> Self {
        self.type_code = Some(type_code);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Whether resolving this entry can produce an event
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        !matches!(
            self.kind,
            EntryKind::Announce { .. } | EntryKind::TlvStream { .. }
        )
    }

    /// Whether the write path can target this entry
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.is_reportable() && self.type_code.is_some()
    }

    fn to_event(&self, raw: &ScalarValue, divisors: &DivisorTable) -> Option<DomainEvent> {
        match &self.kind {
            EntryKind::Measurement => {
                let raw = raw.as_f64()?;
                let value = normalize(raw, &self.scale, self.offset, self.unit, divisors);
                Some(DomainEvent::number(&self.event_name, value, self.unit))
            }
            EntryKind::Binary { on, off } => {
                let state = match raw {
                    ScalarValue::Bool(b) => *b,
                    other => other.as_i64()? != 0,
                };
                let label = if state { on } else { off };
                Some(DomainEvent::text(&self.event_name, label.as_str()))
            }
            EntryKind::Enumeration { labels } => {
                let code = raw.as_i64()?;
                let (_, label) = labels.iter().find(|(c, _)| *c == code)?;
                Some(DomainEvent::text(&self.event_name, label.as_str()))
            }
            EntryKind::Announce { .. } | EntryKind::TlvStream { .. } => None,
        }
    }

    fn raw_for_write(
        &self,
        type_code: TypeCode,
        value: &EventValue,
        divisors: &DivisorTable,
    ) -> Result<ScalarValue, RegistryError> {
        let invalid = || RegistryError::InvalidValue {
            event: self.event_name.clone(),
            value: value.to_string(),
        };

        match (&self.kind, value) {
            (EntryKind::Measurement, EventValue::Number(v)) => {
                let v = match self.range {
                    Some((min, max)) => v.max(min).min(max),
                    None => *v,
                };
                let raw = self.scale.invert(v - self.offset, divisors);
                scalar_from_f64(type_code, raw).ok_or_else(invalid)
            }
            (EntryKind::Binary { on, off }, EventValue::Text(label)) => {
                let state = if label == on {
                    true
                } else if label == off {
                    false
                } else {
                    return Err(invalid());
                };
                Ok(match type_code.interpretation() {
                    Some(Interpretation::Boolean) => ScalarValue::Bool(state),
                    Some(Interpretation::Signed) => ScalarValue::Int(i64::from(state)),
                    _ => ScalarValue::UInt(u64::from(state)),
                })
            }
            (EntryKind::Enumeration { labels }, EventValue::Text(label)) => {
                let code = labels
                    .iter()
                    .find(|(_, l)| l == label)
                    .map(|(code, _)| *code)
                    .ok_or_else(invalid)?;
                match type_code.interpretation() {
                    Some(Interpretation::Signed) => Ok(ScalarValue::Int(code)),
                    _ => u64::try_from(code)
                        .map(ScalarValue::UInt)
                        .map_err(|_| invalid()),
                }
            }
            _ => Err(invalid()),
        }
    }
}

/// 2^63 and 2^64, the first values past the `i64` / `u64` ranges
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scalar_from_f64(type_code: TypeCode, raw: f64) -> Option<ScalarValue> {
    if !raw.is_finite() {
        return None;
    }
    let rounded = raw.round();
    match type_code.interpretation()? {
        Interpretation::Float32 => Some(ScalarValue::F32(raw as f32)),
        Interpretation::Float64 => Some(ScalarValue::F64(raw)),
        Interpretation::Signed if (-I64_LIMIT..I64_LIMIT).contains(&rounded) => {
            Some(ScalarValue::Int(rounded as i64))
        }
        Interpretation::Unsigned if (0.0..U64_LIMIT).contains(&rounded) => {
            Some(ScalarValue::UInt(rounded as u64))
        }
        Interpretation::Boolean => Some(ScalarValue::Bool(raw != 0.0)),
        Interpretation::Signed | Interpretation::Unsigned | Interpretation::Bytes => None,
    }
}

/// Encoded write, ready for the command transport to frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteRequest {
    pub key: AttributeKey,
    pub type_code: TypeCode,
    /// Primitive value for ZCL keys, a one-record stream for tag keys
    pub payload: Vec<u8>,
}

impl WriteRequest {
    #[must_use]
    pub fn payload_hex(&self) -> String {
        zcl_codec::to_hex(&self.payload)
    }
}

/// Serialized form of a registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub name: String,
    pub entries: Vec<RegistryEntry>,
}

/// Read-only lookup table for one device model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "DeviceProfile", into = "DeviceProfile")]
pub struct Registry {
    name: String,
    entries: Vec<RegistryEntry>,
    by_key: HashMap<AttributeKey, usize>,
    writable: HashMap<String, usize>,
}

impl Registry {
    /// Build a registry, rejecting duplicate keys
    pub fn new(
        name: impl Into<String>,
        entries: Vec<RegistryEntry>,
    ) -> Result<Self, RegistryError> {
        let mut by_key = HashMap::with_capacity(entries.len());
        let mut writable = HashMap::new();

        for (idx, entry) in entries.iter().enumerate() {
            if by_key.insert(entry.key, idx).is_some() {
                return Err(RegistryError::DuplicateKey(entry.key.to_string()));
            }
            if entry.is_writable() {
                writable.entry(entry.event_name.clone()).or_insert(idx);
            }
        }

        Ok(Self {
            name: name.into(),
            entries,
            by_key,
            writable,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn entry(&self, key: &AttributeKey) -> Option<&RegistryEntry> {
        self.by_key.get(key).map(|&idx| &self.entries[idx])
    }

    /// Resolve a decoded value into a domain event
    ///
    /// Unknown keys resolve to `None`. Divisor and multiplier announcements
    /// update `divisors` in place and also resolve to `None`.
    pub fn resolve(
        &self,
        key: &AttributeKey,
        raw: &ScalarValue,
        divisors: &mut DivisorTable,
    ) -> Option<DomainEvent> {
        let entry = self.entry(key)?;
        if let EntryKind::Announce { slot, part } = entry.kind {
            divisors.announce(slot, part, raw.as_f64()?);
            return None;
        }
        entry.to_event(raw, divisors)
    }

    /// Resolve stream records by tag, in stream order
    pub fn resolve_records(
        &self,
        records: &[TlvRecord],
        divisors: &mut DivisorTable,
    ) -> Vec<DomainEvent> {
        records
            .iter()
            .filter_map(|record| {
                self.resolve(&AttributeKey::tag(record.tag), &record.value, divisors)
            })
            .collect()
    }

    /// Build the payload that sets `event_name` to `value` on the device
    pub fn encode_write(
        &self,
        event_name: &str,
        value: &EventValue,
        divisors: &DivisorTable,
    ) -> Result<WriteRequest, RegistryError> {
        let Some(&idx) = self.writable.get(event_name) else {
            let known = self.entries.iter().any(|e| e.event_name == event_name);
            return Err(if known {
                RegistryError::NotWritable(event_name.to_string())
            } else {
                RegistryError::UnknownEvent(event_name.to_string())
            });
        };
        let entry = &self.entries[idx];
        let type_code = entry
            .type_code
            .ok_or_else(|| RegistryError::NotWritable(event_name.to_string()))?;

        let raw = entry.raw_for_write(type_code, value, divisors)?;
        let payload = match entry.key {
            AttributeKey::Zcl { .. } => encode(type_code, &raw)?,
            AttributeKey::Tag { tag } => build(&[(tag, type_code, raw)])?,
        };

        Ok(WriteRequest {
            key: entry.key,
            type_code,
            payload,
        })
    }
}

impl TryFrom<DeviceProfile> for Registry {
    type Error = RegistryError;

    fn try_from(profile: DeviceProfile) -> Result<Self, Self::Error> {
        Registry::new(profile.name, profile.entries)
    }
}

impl From<Registry> for DeviceProfile {
    fn from(registry: Registry) -> Self {
        DeviceProfile {
            name: registry.name,
            entries: registry.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::new(
            "test",
            vec![
                RegistryEntry::binary(AttributeKey::tag(0x64), "switch", "on", "off")
                    .with_type(TypeCode::Boolean),
                RegistryEntry::measurement(
                    AttributeKey::tag(0x03),
                    "temperature",
                    Unit::Celsius,
                    ScaleRule::None,
                ),
                RegistryEntry::announce(
                    AttributeKey::zcl(0x0B04, 0x0605),
                    DivisorSlot::Power,
                    ScalePart::Divisor,
                ),
                RegistryEntry::measurement(
                    AttributeKey::zcl(0x0B04, 0x050B),
                    "power",
                    Unit::Watt,
                    ScaleRule::DivideByRuntime(DivisorSlot::Power),
                ),
                RegistryEntry::enumeration(
                    AttributeKey::tag(0x68),
                    "sensitivity",
                    &[(1, "low"), (2, "medium"), (3, "high")],
                )
                .with_type(TypeCode::Enum8),
                RegistryEntry::measurement(
                    AttributeKey::zcl(0x0201, 0x0012),
                    "heatingSetpoint",
                    Unit::Celsius,
                    ScaleRule::DivideBy(100.0),
                )
                .with_type(TypeCode::Int16)
                .with_range(5.0, 30.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let mut divisors = DivisorTable::new();
        assert!(registry()
            .resolve(&AttributeKey::tag(0x99), &ScalarValue::UInt(1), &mut divisors)
            .is_none());
    }

    #[test]
    fn test_binary_label() {
        let mut divisors = DivisorTable::new();
        let event = registry()
            .resolve(&AttributeKey::tag(0x64), &ScalarValue::Bool(true), &mut divisors)
            .unwrap();
        assert_eq!(event, DomainEvent::text("switch", "on"));
    }

    #[test]
    fn test_announcement_updates_table() {
        let registry = registry();
        let mut divisors = DivisorTable::new();
        let key = AttributeKey::zcl(0x0B04, 0x0605);
        assert!(registry
            .resolve(&key, &ScalarValue::UInt(100), &mut divisors)
            .is_none());
        assert_eq!(divisors.divisor(DivisorSlot::Power), 100.0);
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let registry = registry();
        let mut divisors = DivisorTable::new();
        let key = AttributeKey::zcl(0x0B04, 0x050B);
        let first = registry.resolve(&key, &ScalarValue::Int(1234), &mut divisors);
        let second = registry.resolve(&key, &ScalarValue::Int(1234), &mut divisors);
        assert_eq!(first, second);
        assert_eq!(first.unwrap().value, EventValue::Number(123.4));
    }

    #[test]
    fn test_unmapped_enumeration_value_dropped() {
        let mut divisors = DivisorTable::new();
        assert!(registry()
            .resolve(&AttributeKey::tag(0x68), &ScalarValue::UInt(9), &mut divisors)
            .is_none());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let entry = RegistryEntry::binary(AttributeKey::tag(1), "a", "on", "off");
        let result = Registry::new("dup", vec![entry.clone(), entry]);
        assert!(matches!(result, Err(RegistryError::DuplicateKey(_))));
    }

    #[test]
    fn test_write_tag_binary() {
        let request = registry()
            .encode_write("switch", &EventValue::from("off"), &DivisorTable::new())
            .unwrap();
        assert_eq!(request.key, AttributeKey::tag(0x64));
        assert_eq!(request.payload, vec![0x64, 0x10, 0x00]);
    }

    #[test]
    fn test_write_enumeration_label() {
        let request = registry()
            .encode_write("sensitivity", &EventValue::from("high"), &DivisorTable::new())
            .unwrap();
        assert_eq!(request.payload, vec![0x68, 0x30, 0x03]);
    }

    #[test]
    fn test_write_scaled_and_clamped() {
        let registry = registry();
        let divisors = DivisorTable::new();
        let request = registry
            .encode_write("heatingSetpoint", &EventValue::Number(21.5), &divisors)
            .unwrap();
        assert_eq!(request.payload_hex(), "6608");

        let clamped = registry
            .encode_write("heatingSetpoint", &EventValue::Number(45.0), &divisors)
            .unwrap();
        assert_eq!(clamped.payload, 3000i16.to_le_bytes().to_vec());
    }

    #[test]
    fn test_write_errors() {
        let registry = registry();
        let divisors = DivisorTable::new();
        assert!(matches!(
            registry.encode_write("power", &EventValue::Number(1.0), &divisors),
            Err(RegistryError::NotWritable(_))
        ));
        assert!(matches!(
            registry.encode_write("missing", &EventValue::Number(1.0), &divisors),
            Err(RegistryError::UnknownEvent(_))
        ));
        assert!(matches!(
            registry.encode_write("switch", &EventValue::from("dim"), &divisors),
            Err(RegistryError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_resolve_records_in_stream_order() {
        let registry = registry();
        let mut divisors = DivisorTable::new();
        let records = zcl_codec::parse(&[0x64, 0x10, 0x01, 0x99, 0x20, 0x07, 0x03, 0x28, 0xEC]);
        assert_eq!(records.len(), 3);
        assert_eq!(
            registry.resolve_records(&records, &mut divisors),
            vec![
                DomainEvent::text("switch", "on"),
                DomainEvent::number("temperature", -20.0, Unit::Celsius),
            ]
        );
    }

    #[test]
    fn test_offset_applied_after_scaling() {
        let registry = Registry::new(
            "calibrated",
            vec![RegistryEntry::measurement(
                AttributeKey::zcl(0x0402, 0x0000),
                "temperature",
                Unit::Celsius,
                ScaleRule::DivideBy(100.0),
            )
            .with_type(TypeCode::Int16)
            .with_offset(-1.5)],
        )
        .unwrap();
        let mut divisors = DivisorTable::new();
        let event = registry
            .resolve(&AttributeKey::zcl(0x0402, 0x0000), &ScalarValue::Int(2150), &mut divisors)
            .unwrap();
        assert_eq!(event.value, EventValue::Number(20.0));

        let request = registry
            .encode_write("temperature", &EventValue::Number(20.0), &divisors)
            .unwrap();
        assert_eq!(request.payload, 2150i16.to_le_bytes().to_vec());
    }

    #[test]
    fn test_write_beyond_64_bit_range_rejected() {
        let registry = Registry::new(
            "wide",
            vec![
                RegistryEntry::measurement(
                    AttributeKey::zcl(0x0702, 0x0000),
                    "counter",
                    Unit::None,
                    ScaleRule::None,
                )
                .with_type(TypeCode::Int64),
                RegistryEntry::measurement(
                    AttributeKey::zcl(0x0702, 0x0001),
                    "total",
                    Unit::None,
                    ScaleRule::None,
                )
                .with_type(TypeCode::Uint64),
            ],
        )
        .unwrap();
        let divisors = DivisorTable::new();
        let cases = [
            ("counter", 1e30),
            ("counter", -1e30),
            ("total", 1e30),
            ("total", -1.0),
        ];
        for (event, value) in cases {
            assert!(
                matches!(
                    registry.encode_write(event, &EventValue::Number(value), &divisors),
                    Err(RegistryError::InvalidValue { .. })
                ),
                "{event} = {value}"
            );
        }
        let request = registry
            .encode_write("counter", &EventValue::Number(-42.0), &divisors)
            .unwrap();
        assert_eq!(request.payload, (-42i64).to_le_bytes().to_vec());
    }

    #[test]
    fn test_profile_json_roundtrip() {
        let registry = registry();
        let json = serde_json::to_string(&registry).unwrap();
        let restored: Registry = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.entries(), registry.entries());
        assert_eq!(restored.name(), "test");
    }
}
