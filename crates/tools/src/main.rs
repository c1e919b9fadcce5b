use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use mapstate::{
    AppState, HeadlessMap, Host, HostConfig, MapModule, ParameterError, Resolution,
    ViewDescriptor, resolve,
};
use runtime::{InteractivityFlag, LocalFlag};
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mapstate", about = "Resolve map views and replay state sync headlessly")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a view descriptor (JSON file) into a map command.
    Resolve { descriptor: PathBuf },
    /// Apply app state to a fresh or positioned headless map.
    Apply {
        /// Host configuration (JSON).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Inbound app state (JSON). Defaults to an empty state.
        #[arg(long)]
        state: Option<PathBuf>,
        /// Value of the `initial-map-view` parameter. Without it the lookup fails.
        #[arg(long)]
        parameter: Option<PathBuf>,
        /// Start from a positioned map at this zoom.
        #[arg(long)]
        zoom: Option<f64>,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        lon: f64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    match Cli::parse().command {
        Command::Resolve { descriptor } => cmd_resolve(&descriptor),
        Command::Apply {
            config,
            state,
            parameter,
            zoom,
            lat,
            lon,
        } => cmd_apply(
            config.as_deref(),
            state.as_deref(),
            parameter.as_deref(),
            zoom.map(|z| (lat, lon, z)),
        ),
    }
}

fn read_json(path: &Path) -> Result<Value, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("parse {path:?}: {e}"))
}

fn print_json(value: &Value) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

fn cmd_resolve(path: &Path) -> Result<(), String> {
    let descriptor = ViewDescriptor::from_value(&read_json(path)?);
    match resolve(&descriptor) {
        Resolution::Applied(cmd) => print_json(&cmd.to_value()),
        Resolution::NotApplicable => {
            println!("not applicable");
            Ok(())
        }
    }
}

/// Host backed by files given on the command line.
struct CliHost {
    flag: LocalFlag,
    parameter: Option<Value>,
}

impl InteractivityFlag for CliHost {
    fn set_non_interactive(&self, value: bool) {
        self.flag.set_non_interactive(value)
    }

    fn is_interactive(&self) -> bool {
        self.flag.is_interactive()
    }
}

impl Host for CliHost {
    async fn get_parameter(&self, name: &str) -> Result<Value, ParameterError> {
        self.parameter
            .clone()
            .ok_or_else(|| ParameterError::Missing(name.to_string()))
    }

    fn update_link(&self) {
        info!("link update requested");
    }
}

fn cmd_apply(
    config: Option<&Path>,
    state: Option<&Path>,
    parameter: Option<&Path>,
    positioned: Option<(f64, f64, f64)>,
) -> Result<(), String> {
    let config = match config {
        Some(p) => HostConfig::from_path(p).map_err(|e| e.to_string())?,
        None => HostConfig::default(),
    };
    let inbound: AppState = match state {
        Some(p) => serde_json::from_value(read_json(p)?).map_err(|e| format!("state: {e}"))?,
        None => AppState::default(),
    };
    let parameter = parameter.map(read_json).transpose()?;

    let map = match positioned {
        Some((lat, lon, zoom)) => HeadlessMap::showing(foundation::LatLng::new(lat, lon), zoom),
        None => HeadlessMap::new(config.max_zoom),
    };
    let host = CliHost {
        flag: LocalFlag::new(),
        parameter,
    };
    let sync = MapModule::init(map, host, config);

    pollster::block_on(sync.apply_state(&inbound));

    let mut captured = inbound.clone();
    sync.capture_state(&mut captured);

    let issued: Vec<Value> = sync.map().issued().iter().map(|c| c.to_value()).collect();
    let events: Vec<Value> = sync
        .drain_events()
        .into_iter()
        .map(|e| json!({ "seq": e.seq, "kind": e.kind, "message": e.message }))
        .collect();
    let state = serde_json::to_value(&captured).map_err(|e| e.to_string())?;

    print_json(&json!({
        "issued": issued,
        "state": state,
        "events": events,
    }))
}
