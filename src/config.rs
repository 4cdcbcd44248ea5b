use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::orientation::{CandidateSource, OrientationMethod, ReferencePaths};
use crate::similarity::SimilarityWeights;

/// Kicker presence detection tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KickerConfig {
    /// Side of the square Gaussian kernel; sigma follows from the size
    pub blur_kernel_size: i32,

    /// Canny hysteresis thresholds
    pub canny_low: f64,
    pub canny_high: f64,

    /// Minimum accumulator votes for a Hough line
    pub hough_vote_threshold: i32,

    /// Lines needed before the line signal is considered at all
    pub min_line_count: usize,

    /// Binary threshold for coverage (pixel > threshold is white)
    pub binarize_threshold: u8,

    /// White pixel percentage in the upper half that confirms a kicker
    pub white_pixel_threshold_percentage: f64,
}

impl Default for KickerConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            canny_low: 50.0,
            canny_high: 150.0,
            hough_vote_threshold: 100,
            min_line_count: 2,
            binarize_threshold: 127,
            white_pixel_threshold_percentage: 5.0,
        }
    }
}

/// Orientation check against the labelled reference images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// Central vertical band compared between candidate and references
    pub band_width_ratio: f32,
    pub band_height_ratio: f32,

    /// Composite score the best reference must exceed.
    /// Tuned against the unnormalized ORB match score scale.
    pub match_threshold: f64,

    pub weights: SimilarityWeights,

    pub method: OrientationMethod,

    pub candidate_source: CandidateSource,

    pub references: ReferencePaths,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            band_width_ratio: 0.3,
            band_height_ratio: 0.8,
            match_threshold: 10.0,
            weights: SimilarityWeights::default(),
            method: OrientationMethod::Composite,
            candidate_source: CandidateSource::Edges,
            references: ReferencePaths::default(),
        }
    }
}

/// ORB detector parameters (OpenCV defaults)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub max_features: i32,
    pub scale_factor: f32,
    pub levels: i32,
    /// Border (in pixels) where no keypoints are detected
    pub edge_threshold: i32,
    /// Side of the patch the descriptor is sampled from
    pub patch_size: i32,
    pub fast_threshold: i32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_features: 500,
            scale_factor: 1.2,
            levels: 8,
            edge_threshold: 31,
            patch_size: 31,
            fast_threshold: 20,
        }
    }
}

/// Doughball blob detection tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoughballConfig {
    /// Height of the central horizontal band, as a fraction of the frame
    pub band_height_ratio: f32,
    pub binarize_threshold: u8,
    /// Largest blob must be strictly bigger than this (in pixels)
    pub min_blob_area: u32,
}

impl Default for DoughballConfig {
    fn default() -> Self {
        Self {
            band_height_ratio: 0.37,
            binarize_threshold: 127,
            min_blob_area: 300,
        }
    }
}

/// Model artifacts for the frame classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub float_model_path: String,
    pub quantized_model_path: String,
    /// ONNX export of the Keras (.h5) model
    pub keras_model_path: String,
    /// Square input edge expected by all three models
    pub input_size: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            float_model_path: "models/custom_tinyml128.onnx".to_string(),
            quantized_model_path: "models/TINYml_best_quantized_int8.onnx".to_string(),
            keras_model_path: "models/TinyML128Best.onnx".to_string(),
            input_size: 128,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub kicker: KickerConfig,

    #[serde(default)]
    pub orientation: OrientationConfig,

    #[serde(default)]
    pub features: FeatureConfig,

    #[serde(default)]
    pub doughball: DoughballConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl Config {
    /// Load configuration from the app's config directory.
    /// Creates default config if file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let config = Self::load_from(&config_path)?;
            tracing::info!("Loaded config from: {}", config_path.display());
            Ok(config)
        } else {
            // Create default config
            let config = Config::default();
            config.save_to(&config_path)?;
            tracing::info!("Created default config at: {}", config_path.display());
            Ok(config)
        }
    }

    /// Like [`Config::load`], but falls back to defaults on any failure
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Using default configuration: {}", e);
            Config::default()
        })
    }

    /// Load and validate configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_failed = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source,
        };

        let content = fs::read_to_string(path).map_err(|e| load_failed(Box::new(e)))?;
        let config: Config = serde_json::from_str(&content).map_err(|e| load_failed(Box::new(e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let save_failed = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source,
        };

        let json = serde_json::to_string_pretty(self).map_err(|e| save_failed(Box::new(e)))?;
        fs::write(path, json).map_err(|e| save_failed(Box::new(e)))?;

        Ok(())
    }

    /// Reject values that would make a stage meaningless or panic downstream
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratios = [
            ("orientation.band_width_ratio", self.orientation.band_width_ratio),
            ("orientation.band_height_ratio", self.orientation.band_height_ratio),
            ("doughball.band_height_ratio", self.doughball.band_height_ratio),
        ];
        for (name, ratio) in ratios {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be in (0, 1], got {}",
                    name, ratio
                )));
            }
        }

        if self.kicker.canny_low > self.kicker.canny_high {
            return Err(ConfigError::Invalid(format!(
                "kicker.canny_low ({}) exceeds kicker.canny_high ({})",
                self.kicker.canny_low, self.kicker.canny_high
            )));
        }

        if self.kicker.blur_kernel_size <= 0 || self.kicker.blur_kernel_size % 2 == 0 {
            return Err(ConfigError::Invalid(format!(
                "kicker.blur_kernel_size must be a positive odd number, got {}",
                self.kicker.blur_kernel_size
            )));
        }

        if self.features.scale_factor <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "features.scale_factor must be greater than 1, got {}",
                self.features.scale_factor
            )));
        }

        if self.features.max_features <= 0 || self.features.levels <= 0 || self.features.patch_size < 2 {
            return Err(ConfigError::Invalid(
                "features.max_features and features.levels must be positive, features.patch_size at least 2"
                    .to_string(),
            ));
        }

        if self.classifier.input_size == 0 {
            return Err(ConfigError::Invalid("classifier.input_size must be non-zero".to_string()));
        }

        Ok(())
    }

    /// Get the config file path (in app's base directory)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let exe_path = env::current_exe().map_err(|e| ConfigError::LoadFailed {
            path: "<current executable>".to_string(),
            source: Box::new(e),
        })?;
        let exe_dir = exe_path
            .parent()
            .ok_or_else(|| ConfigError::Invalid("Could not determine executable directory".to_string()))?;

        let config_dir = exe_dir.join("config");
        Ok(config_dir.join("config.json"))
    }
}
