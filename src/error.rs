use thiserror::Error;

/// Application-level errors using thiserror for structured error handling.
///
/// These errors represent domain-specific failures that can occur while
/// inspecting a frame. They provide context and can be chained with anyhow.

#[derive(Error, Debug)]
pub enum InspectionError {
    #[error("Failed to load image: {path}")]
    ImageLoad {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to load {label} reference image: {path}")]
    ReferenceLoad {
        label: String,
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Image has no pixels to analyse: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("OpenCV operation failed")]
    Vision(#[from] opencv::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Model choice is not a number: {0}")]
    ChoiceNotANumber(String),

    #[error("Invalid model choice: {0} (expected 1, 2, or 3)")]
    InvalidChoice(String),

    #[error("Image does not exist: {0}")]
    MissingImage(String),

    #[error("Failed to load model from {path}")]
    ModelLoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Model inference failed")]
    InferenceFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Model produced no class scores")]
    EmptyOutput,
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;
