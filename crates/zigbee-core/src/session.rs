//! Per-device attribute report handling
//!
//! A [`DeviceSession`] pairs a device's read-only [`Registry`] with the
//! device's own [`DivisorTable`] and feeds incoming reports through the codec
//! in arrival order.

use crate::error::RegistryError;
use crate::event::{DomainEvent, EventValue};
use crate::registry::{AttributeKey, EntryKind, Registry, WriteRequest};
use crate::scaling::{DivisorTable, ScalePart};
use dashmap::DashMap;
use std::sync::Arc;
use zcl_codec::{
    bytes_from_hex, decode, ScalarValue, TlvParser, TypeCode, UnknownTypePolicy,
};

/// A demultiplexed attribute report as handed over by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeReport {
    pub cluster: u16,
    pub attribute: u16,
    pub manufacturer_code: Option<u16>,
    /// Wire type from the report, if the transport kept it
    pub encoding: Option<TypeCode>,
    /// Raw value in wire byte order, as hex
    pub value: String,
}

impl AttributeReport {
    #[must_use]
    pub fn new(cluster: u16, attribute: u16, value: impl Into<String>) -> Self {
        Self {
            cluster,
            attribute,
            manufacturer_code: None,
            encoding: None,
            value: value.into(),
        }
    }

    /// Build a report from hex identifiers such as `"0B04"` or `"0x050B"`
    pub fn from_hex_ids(
        cluster: &str,
        attribute: &str,
        value: impl Into<String>,
    ) -> Result<Self, RegistryError> {
        Ok(Self::new(parse_id(cluster)?, parse_id(attribute)?, value))
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: TypeCode) -> Self {
        self.encoding = Some(encoding);
        self
    }

    #[must_use]
    pub fn with_manufacturer(mut self, code: u16) -> Self {
        self.manufacturer_code = Some(code);
        self
    }

    #[must_use]
    pub fn key(&self) -> AttributeKey {
        AttributeKey::Zcl {
            cluster: self.cluster,
            attribute: self.attribute,
            manufacturer_code: self.manufacturer_code,
        }
    }
}

/// Parse a 16-bit hex identifier, with or without a `0x` prefix
pub fn parse_id(text: &str) -> Result<u16, RegistryError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u16::from_str_radix(digits, 16)
        .map_err(|_| RegistryError::InvalidIdentifier(text.to_string()))
}

/// Format an IEEE address for display (colon-separated, most significant first)
#[must_use]
pub fn ieee_string(ieee: &[u8; 8]) -> String {
    ieee.iter()
        .rev()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Codec state for one device
#[derive(Debug, Clone)]
pub struct DeviceSession {
    registry: Arc<Registry>,
    divisors: DivisorTable,
}

impl DeviceSession {
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            divisors: DivisorTable::new(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn divisors(&self) -> &DivisorTable {
        &self.divisors
    }

    /// Forget announced divisors, e.g. after the device rejoins
    pub fn reset(&mut self) {
        self.divisors.clear();
    }

    /// Handle one attribute report
    ///
    /// Reports for unmapped attributes, malformed hex and values that cannot
    /// be decoded are dropped. Stream attributes may yield several events.
    pub fn handle_report(&mut self, report: &AttributeReport) -> Vec<DomainEvent> {
        let key = report.key();
        let Some(entry) = self.registry.entry(&key) else {
            tracing::trace!("Ignoring report for unmapped attribute {}", key);
            return Vec::new();
        };

        let bytes = match bytes_from_hex(&report.value) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Dropping report for {}: {}", key, e);
                return Vec::new();
            }
        };

        if let EntryKind::TlvStream { policy } = entry.kind {
            return self.handle_stream(&bytes, policy);
        }

        let Some(type_code) = report.encoding.or(entry.type_code) else {
            tracing::debug!("No wire type known for {}, dropping report", key);
            return Vec::new();
        };

        match decode(type_code, &bytes) {
            Ok(raw) => self.handle_value(&key, &raw).into_iter().collect(),
            Err(e) => {
                tracing::warn!("Failed to decode {} as {}: {}", key, type_code, e);
                Vec::new()
            }
        }
    }

    /// Handle a raw vendor stream, resolving its records in order
    pub fn handle_stream(
        &mut self,
        buffer: &[u8],
        policy: UnknownTypePolicy,
    ) -> Vec<DomainEvent> {
        let parsed = TlvParser::new(policy).parse_detailed(buffer);
        for (offset, code) in &parsed.skipped {
            tracing::debug!(
                "Skipped stream record with unknown type {:#04x} at {}",
                code,
                offset
            );
        }
        if let Some(stop) = &parsed.stop {
            tracing::debug!(
                "Stream parsing stopped at offset {} after {} records: {}",
                stop.offset,
                parsed.records.len(),
                stop.error
            );
        }

        let events = self
            .registry
            .resolve_records(&parsed.records, &mut self.divisors);
        for record in &parsed.records {
            self.log_announcement(&AttributeKey::tag(record.tag));
        }
        events
    }

    /// Resolve an already decoded value
    pub fn handle_value(
        &mut self,
        key: &AttributeKey,
        raw: &ScalarValue,
    ) -> Option<DomainEvent> {
        let event = self.registry.resolve(key, raw, &mut self.divisors);
        self.log_announcement(key);
        event
    }

    fn log_announcement(&self, key: &AttributeKey) {
        if let Some(EntryKind::Announce { slot, part }) = self.registry.entry(key).map(|e| &e.kind)
        {
            let current = match part {
                ScalePart::Divisor => self.divisors.divisor(*slot),
                ScalePart::Multiplier => self.divisors.multiplier(*slot),
            };
            tracing::debug!("{:?} {:?} announced by {} is now {}", slot, part, key, current);
        }
    }

    /// Encode a write using this device's current divisors
    pub fn encode_write(
        &self,
        event_name: &str,
        value: &EventValue,
    ) -> Result<WriteRequest, RegistryError> {
        self.registry.encode_write(event_name, value, &self.divisors)
    }
}

/// Sessions for every device on a network, keyed by IEEE address
///
/// Each device keeps its own divisor table. Reports for one device must be
/// handed in arrival order; different devices may be served concurrently.
#[derive(Debug, Default)]
pub struct DeviceSessions {
    sessions: DashMap<[u8; 8], DeviceSession>,
}

impl DeviceSessions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device, replacing any previous session for it
    pub fn insert(&self, ieee: [u8; 8], registry: Arc<Registry>) {
        tracing::info!(
            "Registering device {} with profile {}",
            ieee_string(&ieee),
            registry.name()
        );
        self.sessions.insert(ieee, DeviceSession::new(registry));
    }

    pub fn remove(&self, ieee: &[u8; 8]) -> bool {
        self.sessions.remove(ieee).is_some()
    }

    #[must_use]
    pub fn contains(&self, ieee: &[u8; 8]) -> bool {
        self.sessions.contains_key(ieee)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Route a report to its device; `None` if the device is not registered
    pub fn handle_report(
        &self,
        ieee: &[u8; 8],
        report: &AttributeReport,
    ) -> Option<Vec<DomainEvent>> {
        let Some(mut session) = self.sessions.get_mut(ieee) else {
            tracing::debug!("Report from unregistered device {}", ieee_string(ieee));
            return None;
        };
        Some(session.handle_report(report))
    }

    /// Encode a write for a registered device
    pub fn encode_write(
        &self,
        ieee: &[u8; 8],
        event_name: &str,
        value: &EventValue,
    ) -> Option<Result<WriteRequest, RegistryError>> {
        self.sessions
            .get(ieee)
            .map(|session| session.encode_write(event_name, value))
    }
}
