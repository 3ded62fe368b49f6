//! Domain events produced from decoded attribute values

use crate::scaling::Unit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value carried by a domain event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    Number(f64),
    Text(String),
}

impl EventValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            EventValue::Number(v) => Some(*v),
            EventValue::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EventValue::Number(_) => None,
            EventValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for EventValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventValue::Number(v) => write!(f, "{v}"),
            EventValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for EventValue {
    fn from(value: f64) -> Self {
        EventValue::Number(value)
    }
}

impl From<&str> for EventValue {
    fn from(value: &str) -> Self {
        EventValue::Text(value.to_string())
    }
}

/// A named, scaled, unit-tagged reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub name: String,
    pub value: EventValue,
    #[serde(default)]
    pub unit: Unit,
}

impl DomainEvent {
    #[must_use]
    pub fn number(name: impl Into<String>, value: f64, unit: Unit) -> Self {
        Self {
            name: name.into(),
            value: EventValue::Number(value),
            unit,
        }
    }

    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: EventValue::Text(value.into()),
            unit: Unit::None,
        }
    }
}

impl fmt::Display for DomainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::None => write!(f, "{} = {}", self.name, self.value),
            unit => write!(f, "{} = {} {}", self.name, self.value, unit),
        }
    }
}
