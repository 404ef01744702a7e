use crate::core::ConfigProvider;
use crate::domain::model::Gender;
use crate::utils::error::{Result, ScanError};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub(crate) const DEFAULT_JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub service: ServiceConfig,
    pub capture: Option<CaptureConfig>,
    pub profile: Option<ProfileConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub model: String,
    /// Supports `${VAR}` environment substitution, e.g. `"${API_KEY}"`.
    pub api_key: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub jpeg_quality: Option<u8>,
    pub camera_index: Option<u32>,
    pub retain_images: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub name: String,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub avatar: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScanError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ScanError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR_NAME}` markers with their environment values.
    /// Unresolved markers stay in place and are caught by validation.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").expect("static pattern");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.capture
            .as_ref()
            .and_then(|c| c.jpeg_quality)
            .unwrap_or(DEFAULT_JPEG_QUALITY)
    }

    pub fn camera_index(&self) -> Option<u32> {
        self.capture.as_ref().and_then(|c| c.camera_index)
    }
}

#[cfg(feature = "cli")]
impl TomlConfig {
    /// Explicit command-line flags win over file values. Flags the user did
    /// not pass leave the file's values in place.
    pub fn apply_flag_overrides(&mut self, cli: &crate::config::CliConfig) {
        if let Some(timeout) = cli.timeout_seconds {
            self.service.timeout_seconds = Some(timeout);
        }

        if cli.jpeg_quality.is_some() || cli.retain_images {
            let capture = self.capture.get_or_insert_with(CaptureConfig::default);
            if let Some(quality) = cli.jpeg_quality {
                capture.jpeg_quality = Some(quality);
            }
            if cli.retain_images {
                capture.retain_images = Some(true);
            }
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_url("service.endpoint", &self.service.endpoint)?;
        validate_non_empty_string("service.model", &self.service.model)?;
        validate_non_empty_string("service.api_key", &self.service.api_key)?;

        if self.service.api_key.starts_with("${") {
            return Err(ScanError::MissingConfigError {
                field: format!(
                    "service.api_key (environment variable {} is unset)",
                    self.service.api_key.trim_start_matches("${").trim_end_matches('}')
                ),
            });
        }

        if let Some(capture) = &self.capture {
            if let Some(quality) = capture.jpeg_quality {
                validate_range("capture.jpeg_quality", quality, 1, 100)?;
            }
        }

        if let Some(profile) = &self.profile {
            validate_non_empty_string("profile.name", &profile.name)?;
            if let Some(age) = profile.age {
                validate_range("profile.age", age, 0, 120)?;
            }
        }
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.service.endpoint
    }

    fn model_id(&self) -> &str {
        &self.service.model
    }

    fn api_key(&self) -> &str {
        &self.service.api_key
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.service.timeout_seconds
    }

    fn jpeg_quality(&self) -> u8 {
        TomlConfig::jpeg_quality(self)
    }

    fn retain_images(&self) -> bool {
        self.capture
            .as_ref()
            .and_then(|c| c.retain_images)
            .unwrap_or(false)
    }
}
