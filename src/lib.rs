pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use crate::core::analysis::GeminiClient;
pub use crate::core::app::ScanApp;
pub use crate::core::capture::{CaptureSession, NoCamera};
pub use crate::core::router::Router;
pub use crate::core::session::{SessionState, TrendSummary};
pub use utils::error::{CameraError, Result, ScanError};
