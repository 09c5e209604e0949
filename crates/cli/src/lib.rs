use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use measure_core::{Calibration, MeasureRequest, MeasurementResult, Point, ScaleSpec, Unit};
use measure_storage::{SessionRecord, SessionStore};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "measure-cli")]
#[command(about = "Measure traced paths on images")]
pub struct Cli {
    /// Directory holding the session store.
    #[arg(long, global = true, env = "MEASURE_STORE_DIR", value_name = "DIR")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Measure the length and area of a traced path.
    Measure(MeasureArgs),
    /// Derive units-per-pixel from two reference points.
    Calibrate {
        #[arg(value_name = "X1,Y1", value_parser = parse_point, allow_hyphen_values = true)]
        start: Point,
        #[arg(value_name = "X2,Y2", value_parser = parse_point, allow_hyphen_values = true)]
        end: Point,
        /// Real-world distance between the two points.
        #[arg(long)]
        distance: f64,
        #[arg(long, default_value_t = Unit::Pixel)]
        unit: Unit,
    },
    /// Inspect saved sessions.
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// List supported units.
    Units,
    /// Print CLI version.
    Version,
}

#[derive(Debug, Subcommand)]
enum SessionCommands {
    /// Print all saved sessions.
    List,
    /// Print one saved session.
    Show {
        #[arg(value_name = "ID")]
        session_id: String,
    },
    /// Delete a saved session.
    Delete {
        #[arg(value_name = "ID")]
        session_id: String,
    },
}

#[derive(Debug, Args)]
struct MeasureArgs {
    /// Path points as space-separated X,Y pairs, e.g. "0,0 10,0 10,10".
    #[arg(long, allow_hyphen_values = true, conflicts_with = "request")]
    points: Option<String>,
    /// JSON measurement request file, or "-" for stdin.
    #[arg(long, value_name = "FILE")]
    request: Option<PathBuf>,
    /// Close the path into a polygon.
    #[arg(long)]
    closed: bool,
    #[arg(long)]
    unit: Option<Unit>,
    #[arg(long)]
    units_per_pixel: Option<f64>,
    /// Real-world length of the reference segment.
    #[arg(long, requires = "reference_pixels")]
    reference_distance: Option<f64>,
    /// Pixel length of the reference segment.
    #[arg(long, requires = "reference_distance")]
    reference_pixels: Option<f64>,
    #[arg(long, value_name = "ID")]
    session: Option<String>,
    /// Save the request and result to the session store.
    #[arg(long)]
    persist: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Serialize)]
struct MeasureOutput<'a> {
    session_id: Option<&'a str>,
    measurement: &'a MeasurementResult,
}

#[derive(Debug, Serialize)]
struct CalibrateOutput {
    unit: Unit,
    pixel_length: f64,
    distance: f64,
    units_per_pixel: f64,
}

#[derive(Debug, Serialize)]
struct UnitOutput {
    name: Unit,
    label: &'static str,
    requires_calibration: bool,
    secondary: Option<&'static str>,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let store_dir = cli.store.as_deref();

    match cli.command {
        Commands::Measure(args) => run_measure(args, store_dir),
        Commands::Calibrate { start, end, distance, unit } => {
            run_calibrate(start, end, distance, unit)
        }
        Commands::Sessions { command } => run_sessions(command, store_dir),
        Commands::Units => run_units(),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_measure(args: MeasureArgs, store_dir: Option<&Path>) -> Result<()> {
    let mut request = build_request(&args)?;
    let measurement = request.measure().context("invalid measurement request")?;

    if request.persist && request.session_id.as_deref().map_or(true, str::is_empty) {
        request.session_id = Some(uuid::Uuid::new_v4().to_string());
    }

    if let Some(session_id) = request.persist_target() {
        let store = open_store(store_dir)?;
        store
            .save_session(session_id, SessionRecord::new(&request, measurement.clone()))
            .with_context(|| format!("failed to save session {session_id}"))?;
        info!(session_id, path = %store.sessions_path().display(), "persisted measurement");
    }

    match args.format {
        OutputFormat::Json => {
            let payload =
                MeasureOutput { session_id: request.session_id.as_deref(), measurement: &measurement };
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Text => {
            println!("{}", measurement.summary());
            if let Some(session_id) = request.persist_target() {
                println!("session: {session_id}");
            }
        }
    }

    Ok(())
}

fn build_request(args: &MeasureArgs) -> Result<MeasureRequest> {
    let mut request = match (&args.request, &args.points) {
        (Some(path), _) => read_request(path)?,
        (None, Some(points)) => MeasureRequest::new(parse_points(points)?, false, ScaleSpec::pixels()),
        (None, None) => anyhow::bail!("either --points or --request is required"),
    };

    if args.closed {
        request.closed = true;
    }
    if let Some(unit) = args.unit {
        request.scale.unit_name = unit;
    }
    if args.units_per_pixel.is_some() {
        request.scale.units_per_pixel = args.units_per_pixel;
    }
    if let (Some(distance), Some(pixels)) = (args.reference_distance, args.reference_pixels) {
        request.scale.reference_distance = Some(distance);
        request.scale.reference_pixel_length = Some(pixels);
    }
    if let Some(session) = &args.session {
        request.session_id = Some(session.clone());
    }
    if args.persist {
        request.persist = true;
    }

    debug!(?request, "built measurement request");
    Ok(request)
}

fn read_request(path: &Path) -> Result<MeasureRequest> {
    let json = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer).context("failed to read request from stdin")?;
        buffer
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read request file {}", path.display()))?
    };

    serde_json::from_str(&json).context("failed to parse measurement request")
}

fn run_calibrate(start: Point, end: Point, distance: f64, unit: Unit) -> Result<()> {
    let calibration =
        Calibration::from_reference(start, end, distance).context("invalid calibration")?;

    let payload = CalibrateOutput {
        unit,
        pixel_length: calibration.pixel_length(),
        distance,
        units_per_pixel: calibration.units_per_pixel(),
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_sessions(command: SessionCommands, store_dir: Option<&Path>) -> Result<()> {
    let store = open_store(store_dir)?;

    let payload = match command {
        SessionCommands::List => {
            let sessions = store.list_sessions().context("failed to read sessions")?;
            serde_json::json!({ "sessions": sessions })
        }
        SessionCommands::Show { session_id } => {
            let record = store
                .load_session(&session_id)
                .context("failed to read sessions")?
                .with_context(|| format!("session not found: {session_id}"))?;
            serde_json::json!({ "session_id": session_id, "payload": record })
        }
        SessionCommands::Delete { session_id } => {
            let deleted = store
                .delete_session(&session_id)
                .with_context(|| format!("failed to delete session {session_id}"))?;
            serde_json::json!({ "session_id": session_id, "deleted": deleted })
        }
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_units() -> Result<()> {
    let units: Vec<UnitOutput> = Unit::ALL
        .into_iter()
        .map(|unit| UnitOutput {
            name: unit,
            label: unit.label(),
            requires_calibration: unit.requires_calibration(),
            secondary: unit.secondary().map(|(label, _)| label),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&units)?);
    Ok(())
}

fn open_store(store_dir: Option<&Path>) -> Result<SessionStore> {
    match store_dir {
        Some(dir) => Ok(SessionStore::with_root(dir)),
        None => SessionStore::from_default_project().context("failed to locate session store"),
    }
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("invalid point '{value}': expected X,Y"))?;

    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("invalid point '{value}': '{}' is not a number", part.trim()))
    };

    Ok(Point::new(parse(x)?, parse(y)?))
}

fn parse_points(value: &str) -> Result<Vec<Point>> {
    value
        .split(|c: char| c.is_whitespace() || c == ';')
        .filter(|part| !part.is_empty())
        .map(|part| parse_point(part).map_err(anyhow::Error::msg))
        .collect()
}
