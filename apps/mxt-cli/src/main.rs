use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use mxt_transport::DeviceIo;
use register_map as regmap;
use register_map::{
    DeviceImage, FieldLocation, MetricsHub, NodeStatus, ObjectStatus, RegisterNode, RegisterStore,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "mxt",
    version,
    about = "maXTouch register map tool",
    disable_help_subcommand = true
)]
struct Cli {
    /// Device image (YAML or JSON) seeding the mock backend; blank image if omitted
    #[arg(long, global = true)]
    image: Option<String>,

    /// Emit JSON instead of text
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    json: bool,

    /// Debug logging (RUST_LOG otherwise)
    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List supported objects and their field locations
    List {
        /// Also print every field
        #[arg(long, action = ArgAction::SetTrue)]
        fields: bool,
    },
    /// Check descriptor tables (and the device image, if given)
    Validate,
    /// Read every object and print the register tree
    Dump {
        /// Only this object (e.g. 7 or t7)
        #[arg(long)]
        object: Option<String>,
    },
    /// Write one field, then print the object as re-read from the device
    Set {
        /// Object id, e.g. 7 or t7
        object: String,
        /// Field or bit group name, e.g. ACTVPIPEEN or CFG
        field: String,
        /// Decimal or 0x-prefixed hex
        value: String,
    },
    /// Refresh once and print metrics in Prometheus text format
    Metrics,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match cli.command {
        Commands::List { fields } => list_objects(fields, cli.json),
        Commands::Validate => validate(cli.image.as_deref()),
        Commands::Dump { object } => {
            let store = open_store(cli.image.as_deref(), None)?;
            dump(&store, object.as_deref(), cli.json).await
        }
        Commands::Set {
            object,
            field,
            value,
        } => {
            let store = open_store(cli.image.as_deref(), None)?;
            set_field(&store, &object, &field, &value, cli.json).await
        }
        Commands::Metrics => {
            let hub = MetricsHub::new().map_err(anyhow::Error::msg)?;
            let store = open_store(cli.image.as_deref(), Some(hub.clone()))?;
            store.refresh().await;
            print!("{}", hub.encode_text());
            Ok(())
        }
    }
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_image(path: Option<&str>) -> Result<DeviceImage> {
    match path {
        Some(p) => regmap::load_device_image(p),
        None => Ok(DeviceImage::blank()),
    }
}

fn open_store(image: Option<&str>, metrics: Option<MetricsHub>) -> Result<RegisterStore> {
    let image = load_image(image)?;
    info!(
        image = image.name.as_deref().unwrap_or("unnamed"),
        objects = image.objects.len(),
        "mock device ready"
    );
    let device: Arc<dyn DeviceIo> = Arc::new(image.to_mock()?);
    let store = RegisterStore::new(device)?;
    Ok(match metrics {
        Some(m) => store.with_metrics(m),
        None => store,
    })
}

fn parse_object(s: &str) -> Result<u8> {
    let digits = s.trim_start_matches(['t', 'T']);
    let id: u8 = digits
        .parse()
        .with_context(|| format!("invalid object id: {s}"))?;
    regmap::object_type(id).with_context(|| format!("T{id} is not a supported object"))?;
    Ok(id)
}

fn parse_value(s: &str) -> Result<i64> {
    let v = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => s.parse::<i64>(),
    };
    v.with_context(|| format!("invalid value: {s}"))
}

fn list_objects(fields: bool, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(regmap::CATALOG)?);
        return Ok(());
    }
    for ty in regmap::CATALOG {
        println!(
            "T{}\tsize={}\tfields={}\t{}",
            ty.id,
            ty.size,
            ty.fields.len(),
            ty.name
        );
        if !fields {
            continue;
        }
        for f in ty.fields {
            let loc = match f.location {
                FieldLocation::Concrete { offset, width } => format!("byte {offset} x{width}"),
                FieldLocation::Bitfield {
                    offset,
                    shift,
                    mask,
                } => format!("byte {offset} shift {shift} mask {mask:#04x}"),
                FieldLocation::Unmapped => "reserved".to_string(),
            };
            println!("  {:<20} {loc}", f.name);
        }
    }
    Ok(())
}

fn validate(image: Option<&str>) -> Result<()> {
    regmap::validate_catalog()?;
    println!("ok: {} object tables", regmap::CATALOG.len());
    if let Some(path) = image {
        let image = regmap::load_device_image(path)?;
        image.to_mock()?;
        for obj in &image.objects {
            if let Some(ty) = regmap::object_type(obj.id) {
                if obj.bytes.len() < usize::from(ty.size) {
                    println!(
                        "note: T{} image is {} bytes, table expects {}",
                        obj.id,
                        obj.bytes.len(),
                        ty.size
                    );
                }
            }
        }
        println!("ok: {path} ({} objects)", image.objects.len());
    }
    Ok(())
}

async fn dump(store: &RegisterStore, object: Option<&str>, json: bool) -> Result<()> {
    let filter = object.map(parse_object).transpose()?;
    let mut diags = store.subscribe();
    let mut snap = store.refresh().await;
    drain_diagnostics(&mut diags);
    if let Some(id) = filter {
        snap.objects.retain(|o| o.id == id);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
        return Ok(());
    }
    for obj in &snap.objects {
        let stale = if obj.status == ObjectStatus::Stale {
            " [stale]"
        } else {
            ""
        };
        println!("{} ({}){stale}", obj.name, obj.key);
        for node in &obj.fields {
            print_node(node, 1);
        }
    }
    Ok(())
}

async fn set_field(
    store: &RegisterStore,
    object: &str,
    field: &str,
    value: &str,
    json: bool,
) -> Result<()> {
    let id = parse_object(object)?;
    let value = parse_value(value)?;
    let mut diags = store.subscribe();
    store.refresh().await;
    let outcome = store.edit_field(id, field, value).await;
    drain_diagnostics(&mut diags);
    let outcome = outcome.with_context(|| format!("setting T{id}.{field} = {value}"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        let bytes: Vec<String> = outcome.data.iter().map(|b| format!("{b:02X}")).collect();
        println!(
            "wrote T{} offset {}: {}",
            outcome.object,
            outcome.offset,
            bytes.join(" ")
        );
    }
    let snap = store.refresh().await;
    if !json {
        if let Some(obj) = snap.object(id) {
            for node in &obj.fields {
                print_node(node, 1);
            }
        }
    }
    Ok(())
}

fn print_node(node: &RegisterNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let value = match node.value {
        Some(v) if !node.children.is_empty() => format!("{v:#04x}"),
        Some(v) => v.to_string(),
        None => "-".to_string(),
    };
    let mut flags = String::new();
    if node.readonly {
        flags.push_str(" (ro)");
    }
    match node.status {
        NodeStatus::Confirmed => {}
        NodeStatus::Pending { requested } => flags.push_str(&format!(" (pending {requested})")),
        NodeStatus::Stale { requested } => flags.push_str(&format!(" (stale, wanted {requested})")),
    }
    let width = 24usize.saturating_sub(indent.len());
    println!("{indent}{:<width$} {value}{flags}", node.name);
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

fn drain_diagnostics(rx: &mut tokio::sync::broadcast::Receiver<regmap::Diagnostic>) {
    loop {
        match rx.try_recv() {
            Ok(d) => eprintln!("warning: {d}"),
            Err(TryRecvError::Lagged(n)) => eprintln!("warning: {n} diagnostics dropped"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_ids_accept_prefix() {
        assert_eq!(parse_object("7").unwrap(), 7);
        assert_eq!(parse_object("t100").unwrap(), 100);
        assert_eq!(parse_object("T8").unwrap(), 8);
        assert!(parse_object("t6").is_err());
        assert!(parse_object("x").is_err());
    }

    #[test]
    fn values_accept_hex() {
        assert_eq!(parse_value("0x3C").unwrap(), 60);
        assert_eq!(parse_value("12").unwrap(), 12);
        assert!(parse_value("0xZZ").is_err());
    }
}
