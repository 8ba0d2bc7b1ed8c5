use tracing::info;
use tracing_subscriber::EnvFilter;

use siftile::{
    BuildParams, average_tile_file, build_dataset, build_dataset_with_statistics,
    build_standardized_dataset, subtile_averages_file, write_report,
};

use super::args::{BuildArgs, CliArgs, Command, SubtileArgs, TileArgs};
use super::errors::AppError;

/// 0 (or less) turns a threshold off.
fn coverage_threshold(value: f64) -> Result<Option<f64>, AppError> {
    if !value.is_finite() {
        return Err(AppError::InvalidThreshold {
            arg: "--min-coverage",
            value,
        });
    }
    Ok((value > 0.0).then_some(value))
}

fn checked(arg: &'static str, value: Option<f64>) -> Result<Option<f64>, AppError> {
    match value {
        Some(v) if !v.is_finite() => Err(AppError::InvalidThreshold { arg, value: v }),
        other => Ok(other),
    }
}

fn tile_params(args: &TileArgs) -> Result<BuildParams, AppError> {
    let mut params = match &args.config {
        Some(path) => BuildParams::from_json_file(path)?,
        None => BuildParams::default(),
    };
    if let Some(format) = args.format {
        params.input_format = format;
    }
    if let Some(min) = args.min_coverage {
        params.min_coverage = coverage_threshold(min)?;
    }
    Ok(params)
}

fn run_average(args: &TileArgs) -> Result<(), AppError> {
    let params = tile_params(args)?;
    let outcome = average_tile_file(&args.input, params.input_format, &params.averaging_config())?;
    println!(
        "{}",
        serde_json::to_string_pretty(&outcome).map_err(siftile::Error::from)?
    );
    Ok(())
}

fn run_subtiles(args: &SubtileArgs) -> Result<(), AppError> {
    if args.size == 0 {
        return Err(AppError::ZeroSize { size: args.size });
    }
    let params = tile_params(&args.tile)?;
    let outcomes = subtile_averages_file(
        &args.tile.input,
        params.input_format,
        args.size,
        &params.averaging_config(),
    )?;
    let accepted = outcomes.iter().filter(|s| s.outcome.is_accepted()).count();
    info!("{} of {} sub-tiles accepted", accepted, outcomes.len());
    println!(
        "{}",
        serde_json::to_string_pretty(&outcomes).map_err(siftile::Error::from)?
    );
    Ok(())
}

fn build_params(args: &BuildArgs) -> Result<BuildParams, AppError> {
    let mut params = match &args.config {
        Some(path) => BuildParams::from_json_file(path)?,
        None => BuildParams::default(),
    };
    if let Some(format) = args.format {
        params.input_format = format;
    }
    if let Some(min) = args.min_coverage {
        params.min_coverage = coverage_threshold(min)?;
    }
    if let Some(v) = checked("--min-fraction-valid", args.min_fraction_valid)? {
        params.filter.min_fraction_valid = Some(v);
    }
    if let Some(v) = checked("--max-missing", args.max_missing)? {
        params.filter.max_missing_fraction = Some(v);
    }
    if let Some(v) = checked("--min-sif", args.min_sif)? {
        params.filter.min_sif = Some(v);
    }
    if let Some(v) = checked("--min-soundings", args.min_soundings)? {
        params.filter.min_num_soundings = Some(v);
    }
    if args.fail_fast {
        params.continue_on_error = false;
    }
    if args.sequential {
        params.parallel = false;
    }
    Ok(params)
}

fn run_build(args: &BuildArgs) -> Result<(), AppError> {
    let params = build_params(args)?;
    info!("Starting dataset build from: {:?}", args.metadata);
    info!("Output dataset: {:?}", args.output);

    let report = match (&args.band_stats, &args.standardized) {
        (Some(stats_path), Some(standardized)) => {
            let (report, _) = build_standardized_dataset(
                &args.metadata,
                &args.output,
                stats_path,
                standardized,
                &params,
            )?;
            report
        }
        (Some(stats_path), None) => {
            let (report, _) =
                build_dataset_with_statistics(&args.metadata, &args.output, stats_path, &params)?;
            report
        }
        (None, _) => build_dataset(&args.metadata, &args.output, &params)?,
    };

    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }

    println!(
        "total={} accepted={} rejected={}",
        report.total,
        report.accepted,
        report.rejected_total()
    );
    for (code, count) in &report.rejected {
        println!("  {}: {}", code, count);
    }
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    match &args.command {
        Command::Average(a) => run_average(&a.tile)?,
        Command::Subtiles(s) => run_subtiles(s)?,
        Command::Build(b) => run_build(b)?,
    }
    Ok(())
}
