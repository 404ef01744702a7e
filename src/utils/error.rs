use thiserror::Error;

/// Acquisition failures surfaced to the user, classified into the four
/// categories the capture screen knows how to present. Terminal for the
/// capture attempt, never for the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera found on this device")]
    NotFound,

    #[error("camera is in use by another application")]
    Busy,

    #[error("unable to access camera: {0}")]
    Unknown(String),
}

impl CameraError {
    /// Message shown on the capture screen, always paired with the
    /// manual-upload fallback.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Camera permission denied. Please allow access or use upload.",
            Self::NotFound => "No camera found on this device.",
            Self::Busy => "Camera is in use by another app.",
            Self::Unknown(_) => "Unable to access camera. Please try again or upload.",
        }
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Image processing failed: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Camera error: {0}")]
    CameraError(#[from] CameraError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Session error: {message}")]
    SessionError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

impl ScanError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(_) => "Could not reach the analysis service.".to_string(),
            Self::ImageError(_) => "The image could not be read or encoded.".to_string(),
            Self::IoError(e) => format!("File access failed: {}", e),
            Self::SerializationError(_) => "The service returned data in an unexpected shape.".to_string(),
            Self::CameraError(e) => e.user_message().to_string(),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid value for {}: {}", field, reason)
            }
            Self::MissingConfigError { field } => format!("Missing required setting: {}", field),
            Self::SessionError { message } => message.clone(),
            Self::ProcessingError { message } => message.clone(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ApiError(_) => "Check your network connection and the API endpoint.".to_string(),
            Self::ImageError(_) => "Use a JPEG or PNG image and try again.".to_string(),
            Self::IoError(_) => "Verify the file path exists and is readable.".to_string(),
            Self::SerializationError(_) => "Retry the scan; the service response was malformed.".to_string(),
            Self::CameraError(_) => "Retry the camera, or fall back to --image <path>.".to_string(),
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Run with --help to see valid configuration options.".to_string()
            }
            Self::SessionError { .. } => "Select an existing profile before scanning.".to_string(),
            Self::ProcessingError { .. } => "Retry the operation.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
