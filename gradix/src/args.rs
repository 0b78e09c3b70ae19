use std::path::{Path, PathBuf};

use clap::{value_parser, Parser};
use gradix_core::{simplification::metres_to_epsilon, AnalysisConfig, SmoothingLevel};

/// Returns the parsed command line options. Uses the 'wild' crate to do glob
/// expansion on Windows. so that Windows and Linux behave identically.
pub fn parse_args() -> Args {
    Args::parse_from(wild::args())
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(
        short,
        long,
        default_value = "false",
        help = "Overwrite output files even if they already exist"
    )]
    pub force: bool,

    #[arg(
        short,
        long,
        default_value = "medium",
        help = "How much elevation noise to filter out when totalling ascent \
                and descent: off, low (3m), medium (6m) or high (9m)",
        value_parser = value_parser!(SmoothingLevel)
    )]
    pub smoothing: SmoothingLevel,

    #[arg(
        short,
        long,
        default_value = "10",
        help = "Number of trackpoints in the rolling window used to calculate grades",
        value_parser = value_parser!(usize)
    )]
    pub grade_window: usize,

    #[arg(
        short,
        long,
        help = "Simplify the track for display with METRES accuracy instead of \
                choosing a precision from the number of points",
        value_parser = value_parser!(u16).range(1..=1000)
    )]
    pub metres: Option<u16>,

    #[arg(
        short,
        long,
        default_value = "false",
        help = "Write the full analysis to a '.analysis.json' file next to each input file"
    )]
    pub json: bool,

    #[arg(
        help = "List of files to process. Any file that does not have a 'gpx' extension will be ignored."
    )]
    pub files: Vec<PathBuf>,
}

impl Args {
    /// The input files, filtered to those with a 'gpx' extension.
    pub fn files(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|f| {
                f.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("gpx"))
            })
            .cloned()
            .collect()
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            smoothing: self.smoothing,
            grade_window: self.grade_window,
            simplify_tolerance: self.metres.map(metres_to_epsilon),
            ..Default::default()
        }
    }
}

/// Returns the path of the JSON analysis file for an input file, or None if
/// no JSON is wanted or the file exists and may not be overwritten.
pub fn json_output_file(args: &Args, input_file: &Path) -> Option<PathBuf> {
    if !args.json {
        return None;
    }

    let output_file = input_file.with_extension("analysis.json");
    if output_file.exists() && !args.force {
        log::warn!(
            "Analysis file {:?} already exists and --force not specified, skipping",
            output_file
        );
        return None;
    }

    Some(output_file)
}
