use anyhow::Context;
use clap::Parser;
use generator::raster::{build_scan_table, RasterConfig};
use std::fs;
use std::path::PathBuf;
use workflow::config::ScanJobConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline driver for the beamscanner ingestion core")]
struct Args {
    /// Scan table to load (comma-delimited)
    input: Option<PathBuf>,
    /// Load a scan job config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Skip the reference columns and the calibration field
    #[arg(long, default_value_t = false)]
    raw: bool,
    /// Smoothing window for the reference channels
    #[arg(long)]
    smooth: Option<usize>,
    /// Write a JSON summary of the regularized grid
    #[arg(long)]
    summary: Option<PathBuf>,
    /// Write a synthetic raster scan table and exit
    #[arg(long)]
    generate: Option<PathBuf>,
    /// YAML raster description for --generate (defaults otherwise)
    #[arg(long)]
    raster_config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(path) = args.generate {
        let raster_config = match args.raster_config {
            Some(config_path) => RasterConfig::load(config_path)?,
            None => RasterConfig::default(),
        };
        let table = build_scan_table(&raster_config);
        fs::write(&path, table)
            .with_context(|| format!("writing scan table {}", path.display()))?;
        println!("Wrote synthetic raster scan to {}", path.display());
        return Ok(());
    }

    let input = args
        .input
        .context("no scan table given (pass a file path or --generate)")?;

    let job_config = if let Some(path) = args.workflow {
        ScanJobConfig::load(path)?
    } else {
        ScanJobConfig::from_args(!args.raw, args.smooth)
    };

    let runner = Runner::new(job_config);
    let (scan, summary) = runner.execute(&input)?;

    println!(
        "Loaded {} rows -> {}x{} grid, x step {:.4}, y step {:.4}, coverage gaps {}",
        summary.rows,
        summary.x_points,
        summary.y_points,
        summary.x_step,
        summary.y_step,
        summary.coverage_gaps
    );
    if let Some(cal) = scan.cal_data() {
        println!("Calibration field ready ({} nodes)", cal.len());
    }

    if let Some(path) = args.summary {
        let encoded = serde_json::to_string_pretty(&summary)?;
        fs::write(&path, encoded)
            .with_context(|| format!("writing summary {}", path.display()))?;
        println!("Summary written to {}", path.display());
    }

    Ok(())
}
