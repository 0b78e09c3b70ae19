//! Tunable parameters for the analysis. Everything here is plain data that is
//! passed explicitly into the stages which need it.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Grade at or above which a climb starts, in percent.
pub const CLIMB_MIN_GRADE: f64 = 3.0;
/// Grade below which a climb ends, in percent. Lower than CLIMB_MIN_GRADE
/// so that a grade hovering around the start value does not flap.
pub const CLIMB_END_GRADE: f64 = 2.0;
/// Climbs shorter than this, in metres, are discarded as noise.
pub const CLIMB_MIN_DISTANCE: f64 = 300.0;
/// Number of points in the centred rolling window used for grades.
pub const GRADE_WINDOW_SIZE: usize = 10;
/// Grades are clamped to +/- this many percent.
pub const GRADE_CLAMP: f64 = 30.0;
/// Below this speed, in m/s, you are considered stopped.
pub const STOP_SPEED_THRESHOLD: f64 = 0.5;
/// A route whose start and end are within this many metres is a loop.
pub const LOOP_THRESHOLD_METRES: f64 = 500.0;
/// Simplification tolerance, in degrees, for mid-sized tracks.
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.0001;

/// How aggressively to reject elevation noise when totalling gain and loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingLevel {
    Off,
    Low,
    #[default]
    Medium,
    High,
}

impl SmoothingLevel {
    pub const ALL: [SmoothingLevel; 4] = [
        SmoothingLevel::Off,
        SmoothingLevel::Low,
        SmoothingLevel::Medium,
        SmoothingLevel::High,
    ];

    /// The size of the hysteresis band, in metres, that an elevation change
    /// must reach before it counts towards gain or loss.
    pub fn vertical_threshold_metres(self) -> f64 {
        match self {
            SmoothingLevel::Off => 0.0,
            SmoothingLevel::Low => 3.0,
            SmoothingLevel::Medium => 6.0,
            SmoothingLevel::High => 9.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SmoothingLevel::Off => "off",
            SmoothingLevel::Low => "low",
            SmoothingLevel::Medium => "medium",
            SmoothingLevel::High => "high",
        }
    }
}

impl fmt::Display for SmoothingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SmoothingLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SmoothingLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("Unknown smoothing level '{s}', expected one of off, low, medium, high")
            })
    }
}

/// These are the parameters that control the climb-finding algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimbDetectionParameters {
    /// A climb starts when the grade reaches this, in percent.
    pub min_grade: f64,
    /// A climb ends when the grade drops below this, in percent.
    pub end_grade: f64,
    /// Shorter climbs are discarded, in metres.
    pub min_distance_metres: f64,
}

impl Default for ClimbDetectionParameters {
    fn default() -> Self {
        Self {
            min_grade: CLIMB_MIN_GRADE,
            end_grade: CLIMB_END_GRADE,
            min_distance_metres: CLIMB_MIN_DISTANCE,
        }
    }
}

/// Everything the caller can choose about a single analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    pub smoothing: SmoothingLevel,
    /// Number of points in the rolling grade window.
    pub grade_window: usize,
    /// Simplification tolerance in degrees. None picks one from the
    /// number of points, see [`crate::simplification::adaptive_tolerance`].
    pub simplify_tolerance: Option<f64>,
    pub climbs: ClimbDetectionParameters,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingLevel::default(),
            grade_window: GRADE_WINDOW_SIZE,
            simplify_tolerance: None,
            climbs: ClimbDetectionParameters::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_smoothing(smoothing: SmoothingLevel) -> Self {
        Self {
            smoothing,
            ..Self::default()
        }
    }
}
