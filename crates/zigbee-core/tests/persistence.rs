use std::sync::Arc;
use tempfile::tempdir;
use zigbee_core::persistence::{load_profile, save_profile};
use zigbee_core::profiles;
use zigbee_core::{AttributeKey, AttributeReport, DeviceSession, DomainEvent, RegistryError};

#[tokio::test]
async fn test_save_and_load_profile() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("profiles").join("presence_sensor.json");

    let registry = profiles::presence_sensor().unwrap();
    save_profile(&path, &registry).await.unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let loaded = load_profile(&path).await.unwrap();
    assert_eq!(loaded.name(), "presence_sensor");
    assert_eq!(loaded.entries(), registry.entries());
}

#[tokio::test]
async fn test_loaded_profile_resolves_reports() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.json");
    let json = r#"{
        "name": "custom_plug",
        "entries": [
            {
                "key": { "cluster": 64704, "attribute": 247, "manufacturer_code": 4447 },
                "kind": { "kind": "tlv_stream" }
            },
            {
                "key": { "tag": 100 },
                "event_name": "switch",
                "kind": { "kind": "binary", "on": "on", "off": "off" },
                "type_code": 16
            },
            {
                "key": { "tag": 3 },
                "event_name": "temperature",
                "unit": "°C",
                "offset": -1.5
            }
        ]
    }"#;
    tokio::fs::write(&path, json).await.unwrap();

    let registry = load_profile(&path).await.unwrap();
    assert!(registry.entry(&AttributeKey::tag(100)).unwrap().is_writable());

    let mut session = DeviceSession::new(Arc::new(registry));
    let report = AttributeReport::new(0xFCC0, 0x00F7, "641001 0328EC").with_manufacturer(0x115F);
    let events = session.handle_report(&report);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], DomainEvent::text("switch", "on"));
    assert_eq!(events[1].to_string(), "temperature = -21.5 °C");
}

#[tokio::test]
async fn test_duplicate_keys_rejected_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dup.json");
    let json = r#"{
        "name": "dup",
        "entries": [
            { "key": { "tag": 1 }, "event_name": "a" },
            { "key": { "tag": 1 }, "event_name": "b" }
        ]
    }"#;
    tokio::fs::write(&path, json).await.unwrap();
    assert!(matches!(load_profile(&path).await, Err(RegistryError::Json(_))));
}

#[tokio::test]
async fn test_missing_profile_file() {
    let dir = tempdir().unwrap();
    let result = load_profile(&dir.path().join("absent.json")).await;
    assert!(matches!(result, Err(RegistryError::Io(_))));
}
