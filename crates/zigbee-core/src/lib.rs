//! Zigbee device value layer
//!
//! This crate turns decoded attribute values into domain events. It holds
//! the per-device registries that map ZCL attributes and vendor stream tags
//! to named, scaled readings, the runtime divisor state those readings
//! depend on, and the sessions that route transport reports through the
//! codec.

pub mod cluster;
pub mod error;
pub mod event;
pub mod persistence;
pub mod profiles;
pub mod registry;
pub mod scaling;
pub mod session;

pub use error::RegistryError;
pub use event::{DomainEvent, EventValue};
pub use registry::{AttributeKey, DeviceProfile, EntryKind, Registry, RegistryEntry, WriteRequest};
pub use scaling::{DivisorSlot, DivisorTable, ScalePart, ScaleRule, Unit};
pub use session::{AttributeReport, DeviceSession, DeviceSessions};
