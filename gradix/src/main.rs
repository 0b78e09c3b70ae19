use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use args::{json_output_file, parse_args, Args};
use clap::builder::styling::AnsiColor;
use env_logger::Builder;
use formatting::{format_duration, format_km, format_kmh, format_utc_date, or_dash};
use gradix_core::{
    analyse_batch, model::AnalysisResult, model_impls::category_label, AnalysisJob, JobOutcome,
};
use log::{debug, error, info, warn};
use logging_timer::time;

mod args;
mod formatting;

pub const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");

#[time]
fn main() -> Result<()> {
    configure_logging();
    info!("Starting {PROGRAM_NAME}");

    let args = parse_args();
    debug!("{:?}", &args);
    if args.force {
        info!("'--force' specified, all existing output files will be overwritten");
    }

    let input_files = args.files();
    if input_files.is_empty() {
        warn!("No .gpx files specified, exiting");
        return Ok(());
    }

    let (paths, jobs) = read_jobs(&args, &input_files);
    let outcomes = analyse_batch(&jobs, &args.analysis_config());

    for (path, outcome) in paths.iter().zip(outcomes) {
        match outcome {
            JobOutcome::Success { data } => {
                print_summary(&data);
                if let Some(json_file) = json_output_file(&args, path) {
                    write_analysis_to_file(&json_file, &data)?;
                }
            }
            JobOutcome::Error { error } => match error.details {
                Some(details) => error!("{:?}: {}: {}", path, error.message, details),
                None => error!("{:?}: {}", path, error.message),
            },
        }
    }

    Ok(())
}

/// Reads every input file into a job. Files that cannot be read are logged
/// and left out, the rest are still processed.
fn read_jobs(args: &Args, input_files: &[PathBuf]) -> (Vec<PathBuf>, Vec<AnalysisJob>) {
    let mut paths = Vec::with_capacity(input_files.len());
    let mut jobs = Vec::with_capacity(input_files.len());

    for f in input_files {
        match std::fs::read_to_string(f) {
            Ok(text) => {
                let file_name = f.file_name().map(|n| n.to_string_lossy().into_owned());
                jobs.push(AnalysisJob::new(text, file_name, args.smoothing));
                paths.push(f.clone());
            }
            Err(e) => error!("Could not read {:?}, skipping: {}", f, e),
        }
    }

    (paths, jobs)
}

fn print_summary(result: &AnalysisResult) {
    let stats = &result.stats;
    let title = result
        .metadata
        .name
        .as_deref()
        .or(result.file_name.as_deref())
        .unwrap_or("Unnamed route");

    println!("{title}");
    if let Some(file_name) = &result.file_name {
        println!("  File:            {file_name}");
    }
    if let Some(start) = result.points.first().and_then(|p| p.time) {
        println!("  Start:           {}", format_utc_date(&start));
    }
    println!("  Points:          {} ({} simplified)", result.points.len(), result.simplified_points.len());
    println!("  Distance:        {}", format_km(stats.total_distance));
    println!("  Loop:            {}", if result.is_loop { "yes" } else { "no" });

    if result.has_elevation {
        println!(
            "  Ascent:          {:.0} m ({} smoothing)",
            stats.total_elevation_gain, result.smoothing
        );
        println!("  Descent:         {:.0} m", stats.total_elevation_loss);
        println!(
            "  Elevation:       {:.0} m to {:.0} m",
            stats.min_elevation, stats.max_elevation
        );
    }

    println!("  Total time:      {}", or_dash(stats.total_time, format_duration));
    println!("  Moving time:     {}", or_dash(stats.moving_time, format_duration));
    println!("  Average speed:   {}", or_dash(stats.avg_speed, format_kmh));
    println!("  Max speed:       {}", or_dash(stats.max_speed, format_kmh));

    if !result.climbs.is_empty() {
        println!("  Climbs:");
        for (idx, climb) in result.climbs.iter().enumerate() {
            println!(
                "    {:>2}. at {:>9}: {} at {:.1}% (max {:.1}%), +{:.0} m, {}",
                idx + 1,
                format_km(climb.start_distance),
                format_km(climb.distance),
                climb.avg_grade,
                climb.max_grade,
                climb.elevation_gain,
                category_label(climb.category)
            );
        }
    }

    println!();
}

#[time]
fn write_analysis_to_file(output_file: &Path, result: &AnalysisResult) -> Result<()> {
    info!("Writing analysis file {:?}", output_file);
    let file = File::create(output_file)
        .with_context(|| format!("Failed to create {:?}", output_file))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, result)
        .with_context(|| format!("Failed to write {:?}", output_file))?;
    writer.flush()?;
    Ok(())
}

fn configure_logging() {
    let mut builder = Builder::from_default_env();

    builder.format(|buf, record| {
        let level_style = buf.default_level_style(record.level());
        let level_style = match record.level() {
            log::Level::Error => level_style.fg_color(Some(AnsiColor::Red.into())),
            log::Level::Warn => level_style.fg_color(Some(AnsiColor::Yellow.into())),
            log::Level::Info => level_style.fg_color(Some(AnsiColor::Green.into())),
            log::Level::Debug => level_style.fg_color(Some(AnsiColor::Blue.into())),
            log::Level::Trace => level_style.fg_color(Some(AnsiColor::Magenta.into())),
        };

        let line_number_style = buf
            .default_level_style(record.level())
            .fg_color(Some(AnsiColor::Cyan.into()));

        match (record.file(), record.line()) {
            (Some(file), Some(line)) => writeln!(
                buf,
                "[{} {level_style}{}{level_style:#} {}/{line_number_style}{}{line_number_style:#}] {}",
                buf.timestamp(),
                record.level(),
                file,
                line,
                record.args()
            ),
            (Some(file), None) => writeln!(
                buf,
                "[{} {level_style}{}{level_style:#} {}] {}",
                buf.timestamp(),
                record.level(),
                file,
                record.args()
            ),
            _ => writeln!(
                buf,
                "[{} {level_style}{}{level_style:#}] {}",
                buf.timestamp(),
                record.level(),
                record.args()
            ),
        }
    });

    builder.init();
}
