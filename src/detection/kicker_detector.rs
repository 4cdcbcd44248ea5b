/// Kicker presence detector
///
/// Combines the Hough line count and the white pixel coverage of the upper
/// half of the frame. The two signals are combined asymmetrically:
///
/// ```text
/// lines >= min_line_count ? (white% > threshold ? present : absent)
///                         : (white% > threshold ? present : absent)
/// ```
///
/// Both branches end in the same coverage test, but they are reported
/// differently so the diagnostics show which path was taken.
use image::GrayImage;

use crate::config::KickerConfig;
use crate::error::InspectionError;
use crate::imaging::{upper_half, white_pixel_percentage, EdgeLineDetector, Region};

/// Why a kicker was reported present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceSignal {
    /// Enough lines, and the coverage check agreed
    LinesConfirmedByCoverage,
    /// Too few lines, coverage alone was enough
    CoverageFallback,
}

/// Why a kicker was reported absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsenceReason {
    /// Enough lines, but too few white pixels
    InsufficientCoverage,
    /// Neither lines nor coverage
    NoSignal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceDecision {
    Present(PresenceSignal),
    Absent(AbsenceReason),
}

/// Thresholds for [`decide_presence`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresenceParams {
    pub min_line_count: usize,
    pub white_pixel_threshold_percentage: f64,
}

impl From<&KickerConfig> for PresenceParams {
    fn from(config: &KickerConfig) -> Self {
        Self {
            min_line_count: config.min_line_count,
            white_pixel_threshold_percentage: config.white_pixel_threshold_percentage,
        }
    }
}

/// Decide presence from the two measured signals
pub fn decide_presence(line_count: usize, white_percentage: f64, params: PresenceParams) -> PresenceDecision {
    let covered = white_percentage > params.white_pixel_threshold_percentage;

    if line_count >= params.min_line_count {
        if covered {
            PresenceDecision::Present(PresenceSignal::LinesConfirmedByCoverage)
        } else {
            PresenceDecision::Absent(AbsenceReason::InsufficientCoverage)
        }
    } else if covered {
        PresenceDecision::Present(PresenceSignal::CoverageFallback)
    } else {
        PresenceDecision::Absent(AbsenceReason::NoSignal)
    }
}

/// Outcome of the presence check, with the buffers needed downstream
#[derive(Debug, Clone)]
pub enum Presence {
    Present {
        signal: PresenceSignal,
        /// Upper half of the frame
        region: Region,
        /// Edge map of `region`
        region_edges: GrayImage,
        /// Edge map of the whole frame
        edges: GrayImage,
    },
    Absent {
        reason: AbsenceReason,
    },
}

#[derive(Debug, Clone)]
pub struct PresenceReport {
    pub line_count: usize,
    /// Foreground share of the upper half (0.0-100.0)
    pub white_percentage: f64,
    pub presence: Presence,
}

impl PresenceReport {
    pub fn is_present(&self) -> bool {
        matches!(self.presence, Presence::Present { .. })
    }

    pub fn decision(&self) -> PresenceDecision {
        match &self.presence {
            Presence::Present { signal, .. } => PresenceDecision::Present(*signal),
            Presence::Absent { reason } => PresenceDecision::Absent(*reason),
        }
    }
}

/// Kicker detector
pub struct KickerDetector {
    edge_detector: EdgeLineDetector,
    params: PresenceParams,
    binarize_threshold: u8,
}

impl KickerDetector {
    /// Create a new kicker detector
    pub fn new(config: &KickerConfig) -> Self {
        Self {
            edge_detector: EdgeLineDetector::new(config),
            params: PresenceParams::from(config),
            binarize_threshold: config.binarize_threshold,
        }
    }

    /// Measure both signals on a grayscale frame and decide presence
    pub fn assess(&self, gray: &GrayImage) -> Result<PresenceReport, InspectionError> {
        let region = upper_half(gray.width(), gray.height());
        let lines = self.edge_detector.detect_lines(gray)?;
        let white_percentage = white_pixel_percentage(gray, region, self.binarize_threshold);

        let decision = decide_presence(lines.line_count, white_percentage, self.params);
        tracing::debug!(
            "Kicker presence: {} lines, {:.2}% white -> {:?}",
            lines.line_count,
            white_percentage,
            decision
        );

        let presence = match decision {
            PresenceDecision::Present(signal) => Presence::Present {
                signal,
                region,
                region_edges: lines.region_edges,
                edges: lines.edges,
            },
            PresenceDecision::Absent(reason) => Presence::Absent { reason },
        };

        Ok(PresenceReport {
            line_count: lines.line_count,
            white_percentage,
            presence,
        })
    }
}
