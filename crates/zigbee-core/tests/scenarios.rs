use std::sync::Arc;
use zcl_codec::{build, ScalarValue, TypeCode, UnknownTypePolicy};
use zigbee_core::cluster::{electrical_attrs, id, lumi_attrs, manufacturer};
use zigbee_core::profiles;
use zigbee_core::{
    AttributeKey, AttributeReport, DeviceSession, DeviceSessions, DivisorSlot, DomainEvent,
    EventValue, Registry, RegistryEntry, RegistryError, ScalePart, ScaleRule, Unit,
};

fn lumi_status(value: &str) -> AttributeReport {
    AttributeReport::new(id::LUMI_PRIVATE, lumi_attrs::STATUS_REPORT, value)
        .with_manufacturer(manufacturer::LUMI)
}

fn power_divisor(value: &str) -> AttributeReport {
    AttributeReport::new(
        id::ELECTRICAL_MEASUREMENT,
        electrical_attrs::AC_POWER_DIVISOR,
        value,
    )
    .with_encoding(TypeCode::Uint16)
}

fn active_power(value: &str) -> AttributeReport {
    AttributeReport::new(id::ELECTRICAL_MEASUREMENT, electrical_attrs::ACTIVE_POWER, value)
        .with_encoding(TypeCode::Int16)
}

fn session(profile: &str) -> DeviceSession {
    DeviceSession::new(Arc::new(profiles::builtin(profile).unwrap()))
}

#[test]
fn test_stream_switch_state() {
    let mut session = session("wall_switch");
    let events = session.handle_report(&lumi_status("641001"));
    assert_eq!(events, vec![DomainEvent::text("switch", "on")]);
}

#[test]
fn test_stream_signed_temperature() {
    let mut session = session("wall_switch");
    let events = session.handle_report(&lumi_status("0328EC"));
    assert_eq!(
        events,
        vec![DomainEvent::number("temperature", -20.0, Unit::Celsius)]
    );
}

#[test]
fn test_stream_records_in_order() {
    let mut session = session("wall_switch");
    // switch off, voltage 2301 / 10, power 12 W
    let events = session.handle_report(&lumi_status("64 10 00 96 21 FD08 98 20 0C"));
    assert_eq!(
        events,
        vec![
            DomainEvent::text("switch", "off"),
            DomainEvent::number("voltage", 230.1, Unit::Volt),
            DomainEvent::number("power", 12.0, Unit::Watt),
        ]
    );
}

#[test]
fn test_stream_without_manufacturer_is_unmapped() {
    let mut session = session("wall_switch");
    let report = AttributeReport::new(id::LUMI_PRIVATE, lumi_attrs::STATUS_REPORT, "641001");
    assert!(session.handle_report(&report).is_empty());
}

#[test]
fn test_truncated_stream_keeps_prefix() {
    let mut session = session("wall_switch");
    let events = session.handle_report(&lumi_status("641001 0328"));
    assert_eq!(events, vec![DomainEvent::text("switch", "on")]);
}

#[test]
fn test_legacy_stream_skips_unknown_type() {
    let mut session = session("climate_sensor");
    let report = AttributeReport::new(0x0000, 0xFF01, "0121E50B 0542AA 64297008")
        .with_manufacturer(manufacturer::LUMI);
    let events = session.handle_report(&report);
    assert_eq!(
        events,
        vec![
            DomainEvent::number("batteryVoltage", 3045.0, Unit::Millivolt),
            DomainEvent::number("temperature", 21.6, Unit::Celsius),
        ]
    );
}

#[test]
fn test_zcl_measurement_uses_entry_type() {
    let mut session = session("climate_sensor");
    let report = AttributeReport::from_hex_ids("0x0402", "0000", "3CF6").unwrap();
    assert_eq!(
        session.handle_report(&report),
        vec![DomainEvent::number("temperature", -25.0, Unit::Celsius)]
    );
}

#[test]
fn test_announced_divisor_scales_power() {
    let mut session = session("smart_plug");
    assert!(session.handle_report(&power_divisor("6400")).is_empty());
    assert!(session.divisors().is_announced(DivisorSlot::Power));
    assert_eq!(
        session.handle_report(&active_power("D859")),
        vec![DomainEvent::number("power", 230.0, Unit::Watt)]
    );
}

#[test]
fn test_power_before_divisor_uses_fallback() {
    let mut session = session("smart_plug");
    assert_eq!(
        session.handle_report(&active_power("D859")),
        vec![DomainEvent::number("power", 2300.0, Unit::Watt)]
    );

    session.handle_report(&power_divisor("6400"));
    assert_eq!(
        session.handle_report(&active_power("D859")),
        vec![DomainEvent::number("power", 230.0, Unit::Watt)]
    );

    session.reset();
    assert_eq!(
        session.handle_report(&active_power("D859")),
        vec![DomainEvent::number("power", 2300.0, Unit::Watt)]
    );
}

fn metered_stream_session() -> DeviceSession {
    let registry = Registry::new(
        "metered_stream",
        vec![
            RegistryEntry::announce(
                AttributeKey::tag(0x05),
                DivisorSlot::Power,
                ScalePart::Divisor,
            ),
            RegistryEntry::measurement(
                AttributeKey::tag(0x06),
                "power",
                Unit::Watt,
                ScaleRule::DivideByRuntime(DivisorSlot::Power),
            ),
        ],
    )
    .unwrap();
    DeviceSession::new(Arc::new(registry))
}

#[test]
fn test_divisor_in_stream_applies_to_later_records() {
    let divisor = (0x05, TypeCode::Uint16, ScalarValue::UInt(100));
    let power = (0x06, TypeCode::Uint32, ScalarValue::UInt(23000));

    let announced_first = build(&[divisor.clone(), power.clone()]).unwrap();
    assert_eq!(
        metered_stream_session().handle_stream(&announced_first, UnknownTypePolicy::Abort),
        vec![DomainEvent::number("power", 230.0, Unit::Watt)]
    );

    let announced_last = build(&[power, divisor]).unwrap();
    let mut session = metered_stream_session();
    assert_eq!(
        session.handle_stream(&announced_last, UnknownTypePolicy::Abort),
        vec![DomainEvent::number("power", 2300.0, Unit::Watt)]
    );
    assert_eq!(session.divisors().divisor(DivisorSlot::Power), 100.0);
}

#[test]
fn test_zero_divisor_keeps_previous() {
    let mut session = session("smart_plug");
    session.handle_report(&power_divisor("6400"));
    session.handle_report(&power_divisor("0000"));
    assert_eq!(
        session.handle_report(&active_power("D859")),
        vec![DomainEvent::number("power", 230.0, Unit::Watt)]
    );
}

#[test]
fn test_malformed_reports_are_dropped() {
    let mut session = session("smart_plug");
    assert!(session.handle_report(&active_power("D8")).is_empty());
    assert!(session.handle_report(&active_power("ZZZZ")).is_empty());
    // no wire type in the report or the entry
    let untyped = AttributeReport::new(
        id::ELECTRICAL_MEASUREMENT,
        electrical_attrs::ACTIVE_POWER,
        "D859",
    );
    assert!(session.handle_report(&untyped).is_empty());
}

#[test]
fn test_devices_keep_separate_divisors() {
    let plug = Arc::new(profiles::smart_plug().unwrap());
    let sessions = DeviceSessions::new();
    let a = [1, 0, 0, 0, 0, 0, 0, 0];
    let b = [2, 0, 0, 0, 0, 0, 0, 0];
    sessions.insert(a, Arc::clone(&plug));
    sessions.insert(b, plug);
    assert_eq!(sessions.len(), 2);

    sessions.handle_report(&a, &power_divisor("6400")).unwrap();
    assert_eq!(
        sessions.handle_report(&a, &active_power("D859")).unwrap(),
        vec![DomainEvent::number("power", 230.0, Unit::Watt)]
    );
    assert_eq!(
        sessions.handle_report(&b, &active_power("D859")).unwrap(),
        vec![DomainEvent::number("power", 2300.0, Unit::Watt)]
    );

    assert!(sessions.handle_report(&[9; 8], &active_power("D859")).is_none());
    assert!(sessions.remove(&b));
    assert!(!sessions.contains(&b));
}

#[tokio::test]
async fn test_sessions_shared_across_tasks() {
    let sessions = Arc::new(DeviceSessions::new());
    let plug = Arc::new(profiles::smart_plug().unwrap());
    for n in 0..4u8 {
        sessions.insert([n; 8], Arc::clone(&plug));
    }

    let mut handles = Vec::new();
    for n in 0..4u8 {
        let sessions = Arc::clone(&sessions);
        handles.push(tokio::spawn(async move {
            if n % 2 == 0 {
                sessions.handle_report(&[n; 8], &power_divisor("6400"));
            }
            sessions.handle_report(&[n; 8], &active_power("D859")).unwrap()
        }));
    }

    for (n, handle) in handles.into_iter().enumerate() {
        let expected = if n % 2 == 0 { 230.0 } else { 2300.0 };
        let events = handle.await.unwrap();
        assert_eq!(events[0].value, EventValue::Number(expected));
    }
}

#[test]
fn test_write_through_session() {
    let sessions = DeviceSessions::new();
    let ieee = [7; 8];
    sessions.insert(ieee, Arc::new(profiles::presence_sensor().unwrap()));

    let request = sessions
        .encode_write(&ieee, "detectionRange", &EventValue::Number(10.0))
        .unwrap()
        .unwrap();
    assert_eq!(request.payload, vec![0x69, 0x21, 0x58, 0x02]);

    let request = sessions
        .encode_write(&ieee, "sensitivity", &EventValue::from("medium"))
        .unwrap()
        .unwrap();
    assert_eq!(request.payload_hex(), "683002");

    assert!(matches!(
        sessions.encode_write(&ieee, "presence", &EventValue::from("present")),
        Some(Err(RegistryError::NotWritable(_)))
    ));
    assert!(sessions
        .encode_write(&[0; 8], "sensitivity", &EventValue::from("low"))
        .is_none());
}
