//! zcl-decode - decode Zigbee attribute payloads from the command line

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zcl_codec::{bytes_from_hex, decode, TlvParser, TypeCode, UnknownTypePolicy};
use zigbee_core::persistence::load_profile;
use zigbee_core::profiles::{self, BUILTIN_PROFILES};
use zigbee_core::session::parse_id;
use zigbee_core::{AttributeReport, DeviceSession, EventValue, Registry};

const DEFAULT_PROFILE: &str = "smart_plug";

#[derive(Parser, Debug)]
#[command(name = "zcl-decode")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Built-in profile name or path to a JSON profile
    #[arg(short, long, global = true)]
    profile: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode one primitive value
    Primitive {
        /// ZCL type code in hex, e.g. 21 or 0x21
        #[arg(value_parser = parse_type)]
        type_code: TypeCode,
        /// Value bytes in wire order
        hex: String,
    },
    /// Parse a vendor tag-type-value stream
    Tlv {
        hex: String,
        /// Skip records with unknown types, assuming this value width
        #[arg(long)]
        skip: Option<usize>,
    },
    /// Feed attribute reports through a device profile, in order
    Report {
        /// Cluster id in hex
        cluster: String,
        /// Attribute id in hex
        attribute: String,
        /// One or more values in wire order, handled in sequence
        #[arg(required = true)]
        values: Vec<String>,
        /// Wire type of the values, if the profile does not define one
        #[arg(short, long, value_parser = parse_type)]
        encoding: Option<TypeCode>,
        /// Manufacturer code in hex
        #[arg(short, long)]
        manufacturer: Option<String>,
    },
    /// Encode a write for a named event
    Write {
        event: String,
        /// Number, or a label such as "on"
        value: String,
    },
    /// Print the selected profile as JSON
    Profile,
    /// List built-in profiles
    Profiles,
}

fn parse_type(text: &str) -> Result<TypeCode, String> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let code = u8::from_str_radix(digits, 16).map_err(|e| format!("{text}: {e}"))?;
    let type_code = TypeCode::from(code);
    if !type_code.is_known() {
        return Err(format!("unsupported type code {code:#04x}"));
    }
    Ok(type_code)
}

fn parse_event_value(text: &str) -> EventValue {
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => EventValue::Number(v),
        _ => EventValue::from(text),
    }
}

async fn select_profile(arg: Option<&str>) -> Result<Registry> {
    let env_path = std::env::var("ZCL_PROFILE_PATH").ok();
    let selector = arg
        .map(str::to_string)
        .or(env_path)
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

    if let Some(registry) = profiles::builtin(&selector) {
        tracing::debug!("Using built-in profile {}", selector);
        return Ok(registry);
    }

    let path = Path::new(&selector);
    if !path.exists() {
        bail!(
            "no built-in profile or file named {} (built-ins: {})",
            selector,
            BUILTIN_PROFILES.join(", ")
        );
    }
    load_profile(path)
        .await
        .with_context(|| format!("loading profile {}", path.display()))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zcl_decode=debug,zigbee_core=debug,info".into()),
        )
        .init();

    match args.command {
        Command::Primitive { type_code, hex } => {
            let bytes = bytes_from_hex(&hex)?;
            let value = decode(type_code, &bytes)?;
            print_json(&json!({
                "type": type_code.to_string(),
                "value": value,
                "display": value.to_string(),
            }))?;
        }
        Command::Tlv { hex, skip } => {
            let bytes = bytes_from_hex(&hex)?;
            let policy = skip.map_or(UnknownTypePolicy::Abort, UnknownTypePolicy::SkipWidth);
            let parsed = TlvParser::new(policy).parse_detailed(&bytes);
            let skipped: Vec<_> = parsed
                .skipped
                .iter()
                .map(|(offset, code)| json!({ "offset": offset, "type_code": code }))
                .collect();
            let stop = parsed.stop.as_ref().map(|stop| {
                json!({ "offset": stop.offset, "error": stop.error.to_string() })
            });
            print_json(&json!({
                "records": parsed.records,
                "skipped": skipped,
                "stop": stop,
            }))?;
        }
        Command::Report {
            cluster,
            attribute,
            values,
            encoding,
            manufacturer,
        } => {
            let registry = select_profile(args.profile.as_deref()).await?;
            let cluster = parse_id(&cluster)?;
            let attribute = parse_id(&attribute)?;
            let manufacturer = manufacturer.as_deref().map(parse_id).transpose()?;

            let mut session = DeviceSession::new(Arc::new(registry));
            let mut events = Vec::new();
            for value in values {
                let mut report = AttributeReport::new(cluster, attribute, value);
                report.encoding = encoding;
                report.manufacturer_code = manufacturer;
                events.extend(session.handle_report(&report));
            }
            print_json(&serde_json::to_value(&events)?)?;
        }
        Command::Write { event, value } => {
            let registry = select_profile(args.profile.as_deref()).await?;
            let session = DeviceSession::new(Arc::new(registry));
            let request = session.encode_write(&event, &parse_event_value(&value))?;
            print_json(&json!({
                "key": request.key,
                "type": request.type_code.to_string(),
                "payload": request.payload_hex(),
            }))?;
        }
        Command::Profile => {
            let registry = select_profile(args.profile.as_deref()).await?;
            print_json(&serde_json::to_value(&registry)?)?;
        }
        Command::Profiles => {
            for name in BUILTIN_PROFILES {
                println!("{name}");
            }
        }
    }

    Ok(())
}
