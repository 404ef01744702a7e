pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use super::toml_config::DEFAULT_JPEG_QUALITY;
    use crate::core::ConfigProvider;
    use crate::domain::model::Gender;
    use crate::utils::error::Result;
    use crate::utils::validation::{
        validate_non_empty_string, validate_range, validate_required_field, validate_url, Validate,
    };
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "hemoscan")]
    #[command(about = "Camera-to-model hemoglobin screening, one scan per run")]
    pub struct CliConfig {
        /// Analyze this image file instead of grabbing a live camera frame
        #[arg(long)]
        pub image: Option<String>,

        /// Camera index to open when no --image is given (default 0)
        #[arg(long)]
        pub camera_index: Option<u32>,

        #[arg(long, default_value = "https://generativelanguage.googleapis.com")]
        pub api_endpoint: String,

        #[arg(long, default_value = "gemini-2.5-flash")]
        pub model: String,

        /// Inference API key; falls back to the API_KEY environment variable
        #[arg(long)]
        pub api_key: Option<String>,

        /// Request timeout in seconds (no timeout when omitted)
        #[arg(long)]
        pub timeout_seconds: Option<u64>,

        /// JPEG quality for the captured image, 1-100 (default 85)
        #[arg(long)]
        pub jpeg_quality: Option<u8>,

        /// Keep the captured image on the stored result as a data URL
        #[arg(long)]
        pub retain_images: bool,

        /// Load service settings from a TOML file; explicit flags still
        /// override the file's values
        #[arg(long)]
        pub config: Option<String>,

        #[arg(long, default_value = "Default User")]
        pub profile_name: String,

        #[arg(long, default_value = "30")]
        pub profile_age: u32,

        #[arg(long, value_enum, default_value = "other")]
        pub profile_gender: Gender,

        /// Seed two demo scans so the trends view has history
        #[arg(long)]
        pub demo: bool,

        /// Emit JSON-formatted logs instead of the compact console format
        #[arg(long)]
        pub log_json: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_url("api_endpoint", &self.api_endpoint)?;
            validate_non_empty_string("model", &self.model)?;
            if let Some(quality) = self.jpeg_quality {
                validate_range("jpeg_quality", quality, 1, 100)?;
            }
            validate_non_empty_string("profile_name", &self.profile_name)?;
            validate_range("profile_age", self.profile_age, 0, 120)?;

            // A file config brings its own key; flag-driven runs need one here.
            if self.config.is_none() {
                validate_required_field("api_key", &self.api_key)?;
            }
            Ok(())
        }
    }

    impl ConfigProvider for CliConfig {
        fn api_endpoint(&self) -> &str {
            &self.api_endpoint
        }

        fn model_id(&self) -> &str {
            &self.model
        }

        fn api_key(&self) -> &str {
            self.api_key.as_deref().unwrap_or("")
        }

        fn timeout_seconds(&self) -> Option<u64> {
            self.timeout_seconds
        }

        fn jpeg_quality(&self) -> u8 {
            self.jpeg_quality.unwrap_or(DEFAULT_JPEG_QUALITY)
        }

        fn retain_images(&self) -> bool {
            self.retain_images
        }
    }

}
