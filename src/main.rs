mod assets;
mod config;

use std::io::{self, Cursor, Write as _};
use std::string::FromUtf8Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use overlay::doc::{DocStore, Snapshot};
use overlay::engine::EngineCore;
use overlay::export::{self, ExportError};
use overlay::formats::Format;
use overlay::raster::RasterError;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::assets::FsAssetSource;
use crate::config::Config;

/// Relative aspect difference tolerated between a base image and its format.
const FORMAT_TOLERANCE: f64 = 0.01;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not valid UTF-8: {source}", path.display())]
    InvalidUtf8 {
        path: PathBuf,
        #[source]
        source: FromUtf8Error,
    },
    #[error("invalid snapshot JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("unknown format `{0}`; run `cobrand formats` to list them")]
    UnknownFormat(String),
    #[error("failed to read base image size: {0}")]
    BaseImage(#[from] image::ImageError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error("font loading failed: {0}")]
    Font(#[from] RasterError),
}

#[derive(Parser, Debug)]
#[command(name = "cobrand", about = "Flatten co-branded overlay layouts at native resolution")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten a snapshot over its base image and write a PNG.
    Export(ExportArgs),
    /// Restore a snapshot, clamp it for a format, and print it back.
    Normalize(NormalizeArgs),
    /// List the supported output formats.
    Formats {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Snapshot JSON file.
    #[arg(long)]
    snapshot: PathBuf,

    /// Base image; its pixel size is the export size.
    #[arg(long)]
    base: PathBuf,

    /// Output PNG path.
    #[arg(long, short)]
    output: PathBuf,

    /// Expected format id (e.g. `16:9`); a mismatching base image only warns.
    #[arg(long)]
    format: Option<String>,
}

#[derive(Args, Debug)]
struct NormalizeArgs {
    /// Snapshot JSON file, or `-` for stdin.
    snapshot: PathBuf,

    /// Format whose native size the layout is clamped for.
    #[arg(long, default_value = "1:1")]
    format: String,

    /// Output path; stdout when omitted.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct FormatRow {
    id: &'static str,
    label: &'static str,
    width: u32,
    height: u32,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Export(args) => run_export(&cli.config, &args),
        Command::Normalize(args) => run_normalize(&cli.config, &args),
        Command::Formats { json } => run_formats(json),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "cobrand failed");
            ExitCode::FAILURE
        }
    }
}

fn run_export(config: &Config, args: &ExportArgs) -> Result<(), CliError> {
    let fonts = config::load_fonts(config)?;
    let snapshot = read_snapshot(&args.snapshot)?;
    let base = config::read(&args.base)?;
    let (width, height) = image::ImageReader::new(Cursor::new(&base))
        .with_guessed_format()
        .map_err(|source| CliError::Read { path: args.base.clone(), source })?
        .into_dimensions()?;

    if let Some(id) = &args.format {
        let format = parse_format(id)?;
        if !format.matches(width, height, FORMAT_TOLERANCE) {
            tracing::warn!(format = format.id(), width, height, "base image does not match format");
        }
    }

    // The layout is drawn as the editor left it; clamping is `normalize`'s job.
    let mut doc = DocStore::new();
    doc.load_snapshot(snapshot);

    let assets = FsAssetSource::new(&config.asset_root);
    let image = export::export(doc.snapshot(), &base, &assets, &fonts)?;
    let png = export::encode_png(&image)?;
    std::fs::write(&args.output, png).map_err(|source| CliError::Write { path: args.output.clone(), source })?;
    tracing::info!(output = %args.output.display(), width, height, "exported");
    Ok(())
}

fn run_normalize(config: &Config, args: &NormalizeArgs) -> Result<(), CliError> {
    let format = parse_format(&args.format)?;
    let (width, height) = format.native_size();
    let snapshot = read_snapshot(&args.snapshot)?;

    let mut core = EngineCore::with_measure(Box::new(config::load_fonts(config)?));
    core.set_surface_size(f64::from(width), f64::from(height));
    core.load_snapshot(snapshot);
    let json = serde_json::to_string_pretty(core.snapshot())?;

    match &args.output {
        Some(path) => std::fs::write(path, json).map_err(|source| CliError::Write { path: path.clone(), source }),
        None => write_stdout(&json),
    }
}

fn run_formats(json: bool) -> Result<(), CliError> {
    let rows: Vec<FormatRow> = Format::ALL
        .iter()
        .map(|f| {
            let (width, height) = f.native_size();
            FormatRow { id: f.id(), label: f.label(), width, height }
        })
        .collect();
    if json {
        return write_stdout(&serde_json::to_string_pretty(&rows)?);
    }
    let table = rows
        .iter()
        .map(|r| format!("{:<5} {:<10} {}x{}", r.id, r.label, r.width, r.height))
        .collect::<Vec<_>>()
        .join("\n");
    write_stdout(&table)
}

fn parse_format(id: &str) -> Result<Format, CliError> {
    Format::from_id(id).ok_or_else(|| CliError::UnknownFormat(id.to_owned()))
}

fn read_snapshot(path: &Path) -> Result<Snapshot, CliError> {
    let json = if path == Path::new("-") {
        io::read_to_string(io::stdin()).map_err(|source| CliError::Read { path: path.to_owned(), source })?
    } else {
        String::from_utf8(config::read(path)?).map_err(|source| CliError::InvalidUtf8 { path: path.to_owned(), source })?
    };
    Ok(serde_json::from_str(&json)?)
}

fn write_stdout(text: &str) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    writeln!(out, "{text}").map_err(|source| CliError::Write { path: PathBuf::from("<stdout>"), source })
}
