/// Detection module
///
/// Provides the frame inspections and the kicker pipeline.
///
/// ## Architecture
///
/// ```text
/// KickerPipeline
///   ├── Load (grayscale frame)
///   ├── KickerDetector (lines + coverage in the upper half)
///   └── OrientationClassifier (candidate vs. four references)
///
/// Detector
///   └── DoughballDetector
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// use kicker_vision::config::Config;
/// use kicker_vision::detection::KickerPipeline;
///
/// let config = Config::load()?;
/// let pipeline = KickerPipeline::new(&config);
///
/// let outcome = pipeline.run(Path::new("frame.png"), &config.orientation.references)?;
/// if outcome.is_valid() {
///     println!("Kicker in valid position.");
/// }
/// ```

pub mod detector;
pub mod doughball_detector;
pub mod kicker_detector;
pub mod pipeline;

// Re-export commonly used types
pub use detector::{DetectionContext, DetectionResult, Detector};
pub use doughball_detector::DoughballDetector;
pub use kicker_detector::{
    decide_presence, AbsenceReason, KickerDetector, Presence, PresenceDecision, PresenceParams, PresenceReport,
    PresenceSignal,
};
pub use pipeline::{KickerPipeline, PipelineOutcome};
