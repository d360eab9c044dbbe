//! plotwatch: CLI for running change detection between a reference
//! allotment map and one or more satellite captures.
//!
//! Each capture is analyzed against the reference, rendered, and held
//! in an in-memory result store for the duration of the run. Results
//! print as a human-readable summary or as the full JSON report, and
//! the rendered JPEG outputs can be written to a directory.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin plotwatch -- [OPTIONS] <REFERENCE> <COMPARISON>...
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use base64::{Engine as _, engine::general_purpose};
use clap::Parser;
use plotwatch_pipeline::AnalysisConfig;
use plotwatch_render::{AnalysisReport, RenderOptions};
use plotwatch_store::ResultStore;

/// Change detection between a reference allotment map and satellite
/// captures.
///
/// Analyzes each capture against the reference, printing a per-run
/// summary and, with multiple captures, a final listing across runs.
#[derive(Parser)]
#[command(name = "plotwatch", version)]
struct Cli {
    /// Path to the reference map image (PNG or JPEG).
    reference: PathBuf,

    /// Paths to one or more capture images to compare.
    #[arg(required = true)]
    comparisons: Vec<PathBuf>,

    /// Gaussian blur sigma applied before differencing.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_BLUR_SIGMA)]
    blur_sigma: f32,

    /// Absolute-difference binarization threshold.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_DIFF_THRESHOLD)]
    diff_threshold: u8,

    /// Minimum region area in pixels; smaller regions are discarded.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_MIN_REGION_AREA)]
    min_region_area: u64,

    /// JPEG quality for rendered output images (1-100).
    #[arg(long, default_value_t = RenderOptions::DEFAULT_JPEG_QUALITY, value_parser = clap::builder::RangedU64ValueParser::<u8>::new().range(1..=100))]
    jpeg_quality: u8,

    /// Directory to write the rendered JPEG outputs into.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print the full JSON report instead of the human-readable summary.
    #[arg(long)]
    json: bool,

    /// Full analysis config as a JSON string.
    ///
    /// When provided, the individual parameter flags are ignored. The
    /// JSON must be a valid `AnalysisConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build an [`AnalysisConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<AnalysisConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(AnalysisConfig {
        blur_sigma: cli.blur_sigma,
        diff_threshold: cli.diff_threshold,
        min_region_area: cli.min_region_area,
        ..AnalysisConfig::default()
    })
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    let options = RenderOptions {
        jpeg_quality: cli.jpeg_quality,
        ..RenderOptions::default()
    };

    let reference_bytes = match std::fs::read(&cli.reference) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.reference.display());
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "reference: {} ({} bytes)",
        cli.reference.display(),
        reference_bytes.len(),
    );

    let store = ResultStore::new();

    for comparison_path in &cli.comparisons {
        let comparison_bytes = match std::fs::read(comparison_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Error reading {}: {e}", comparison_path.display());
                return ExitCode::FAILURE;
            }
        };
        log::info!(
            "comparison: {} ({} bytes)",
            comparison_path.display(),
            comparison_bytes.len(),
        );

        let analysis =
            match plotwatch_pipeline::analyze(&reference_bytes, &comparison_bytes, &config) {
                Ok(analysis) => analysis,
                Err(e) => {
                    eprintln!("Analysis error for {}: {e}", comparison_path.display());
                    return ExitCode::FAILURE;
                }
            };
        log::info!(
            "analysis {}: {} region(s), {:.2}% changed",
            analysis.result_id,
            analysis.summary.region_count,
            analysis.summary.change_percentage,
        );

        let report = match plotwatch_render::render_report(&analysis, &options) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("Render error for {}: {e}", comparison_path.display());
                return ExitCode::FAILURE;
            }
        };

        if let Some(ref out_dir) = cli.out
            && let Err(e) = write_images(out_dir, &report)
        {
            eprintln!("Error writing images to {}: {e}", out_dir.display());
            return ExitCode::FAILURE;
        }

        if cli.json {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error serializing report: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            print_report(comparison_path, &report);
        }

        if let Err(e) = store.put(report) {
            eprintln!("Error storing result: {e}");
            return ExitCode::FAILURE;
        }
    }

    if cli.comparisons.len() > 1 && !cli.json {
        print_listing(&store);
    }

    ExitCode::SUCCESS
}

/// Print one analysis as a human-readable summary.
fn print_report(comparison_path: &Path, report: &AnalysisReport) {
    println!(
        "{} [{}]",
        comparison_path.display(),
        report.result_id,
    );
    println!(
        "  risk: {:?}  regions: {}  changed: {:.2}% ({} of {} px)",
        report.summary.risk_level,
        report.summary.region_count,
        report.summary.change_percentage,
        report.summary.changed_area_pixels,
        report.summary.total_area_pixels,
    );
    for region in &report.regions {
        println!(
            "  {}: {} ({:?}) at ({}, {}) {}x{}, {} px",
            region.id,
            region.kind,
            region.severity,
            region.bbox.x,
            region.bbox.y,
            region.bbox.width,
            region.bbox.height,
            region.area_pixels,
        );
    }
}

/// Print the cross-run listing held by the store.
fn print_listing(store: &ResultStore) {
    let entries = match store.list() {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error listing results: {e}");
            return;
        }
    };

    println!();
    println!(
        "{:<10} {:<10} {:>8} {:>10}",
        "Result", "Risk", "Regions", "Changed",
    );
    println!("{}", "-".repeat(42));
    for entry in entries {
        println!(
            "{:<10} {:<10} {:>8} {:>9.2}%",
            entry.result_id,
            format!("{:?}", entry.summary.risk_level),
            entry.summary.region_count,
            entry.summary.change_percentage,
        );
    }
}

/// Write the five rendered JPEGs of one report into `out_dir`, named by
/// result id.
fn write_images(out_dir: &Path, report: &AnalysisReport) -> Result<(), std::io::Error> {
    std::fs::create_dir_all(out_dir)?;
    let outputs = [
        ("overlay", &report.images.overlay),
        ("annotated_current", &report.images.annotated_current),
        ("annotated_reference", &report.images.annotated_reference),
        ("heatmap", &report.images.heatmap),
        ("difference", &report.images.difference),
    ];
    for (name, encoded) in outputs {
        let bytes = general_purpose::STANDARD
            .decode(encoded)
            .map_err(std::io::Error::other)?;
        let path = out_dir.join(format!("{}_{name}.jpg", report.result_id));
        std::fs::write(&path, bytes)?;
        log::debug!("wrote {}", path.display());
    }
    Ok(())
}
