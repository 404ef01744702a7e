use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anemia severity buckets the inference service classifies into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Classification {
    #[default]
    Normal,
    Mild,
    Moderate,
    Severe,
}

impl Classification {
    /// Exact-match label parsing for model output. Unknown labels count as
    /// missing and fall back to the default.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Normal" => Some(Self::Normal),
            "Mild" => Some(Self::Mild),
            "Moderate" => Some(Self::Moderate),
            "Severe" => Some(Self::Severe),
            _ => None,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Normal => "Normal",
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

/// A tracked person whose scans are grouped together. Append-only: profiles
/// are never mutated or deleted once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub avatar: String,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        age: u32,
        gender: Gender,
        avatar: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("user-{}", Uuid::new_v4()),
            name: name.into(),
            age,
            gender,
            avatar: avatar.into(),
        }
    }
}

/// Normalized sub-signals returned alongside the headline estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureScores {
    pub vascular_visibility: f64,
    pub colorimetric_index: f64,
    pub textural_analysis: f64,
    pub spectral_reflectance: f64,
}

impl FeatureScores {
    pub fn uniform(score: f64) -> Self {
        Self {
            vascular_visibility: score,
            colorimetric_index: score,
            textural_analysis: score,
            spectral_reflectance: score,
        }
    }
}

/// One completed analysis attempt and its outputs. Created exactly once per
/// analysis call and never modified afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub id: String,
    /// Owning profile id. The session overwrites this with the active
    /// profile at record time, regardless of what the client produced.
    pub user_id: String,
    /// Capture timestamp, unix milliseconds.
    pub timestamp: i64,
    /// Hemoglobin estimate in g/dL.
    pub hemoglobin: f64,
    pub classification: Classification,
    /// Model confidence, 0..1. A fallback result carries 0.0.
    pub confidence: f64,
    pub features: FeatureScores,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl ScanResult {
    pub fn now_millis() -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Where the current still image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOrigin {
    CameraFrame,
    Upload,
}

/// A single JPEG-encoded still image, the unit handed to the analysis
/// client. Both capture paths (live frame grab and file upload) normalize
/// into this representation.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    jpeg: Vec<u8>,
    origin: CaptureOrigin,
}

impl CapturedImage {
    pub fn new(jpeg: Vec<u8>, origin: CaptureOrigin) -> Self {
        Self { jpeg, origin }
    }

    pub fn jpeg_bytes(&self) -> &[u8] {
        &self.jpeg
    }

    pub fn origin(&self) -> CaptureOrigin {
        self.origin
    }

    pub fn to_base64(&self) -> String {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        STANDARD.encode(&self.jpeg)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.to_base64())
    }
}

/// One raw RGB frame grabbed from a live camera feed, before JPEG encoding.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGB8, row-major, `width * height * 3` bytes.
    pub pixels: Vec<u8>,
}

/// The fixed set of screens the app can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Scan,
    Results,
    Trends,
    Family,
    Settings,
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Home => "home",
            Self::Scan => "scan",
            Self::Results => "results",
            Self::Trends => "trends",
            Self::Family => "family",
            Self::Settings => "settings",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_label_round_trip() {
        assert_eq!(
            Classification::from_label("Moderate"),
            Some(Classification::Moderate)
        );
        assert_eq!(Classification::from_label("moderate"), None);
        assert_eq!(Classification::from_label("N/A"), None);
    }

    #[test]
    fn feature_scores_wire_names_are_camel_case() {
        let json = serde_json::to_value(FeatureScores::uniform(0.5)).unwrap();
        assert!(json.get("vascularVisibility").is_some());
        assert!(json.get("colorimetricIndex").is_some());
        assert!(json.get("texturalAnalysis").is_some());
        assert!(json.get("spectralReflectance").is_some());
    }

    #[test]
    fn captured_image_data_url_prefix() {
        let image = CapturedImage::new(vec![0xff, 0xd8, 0xff], CaptureOrigin::Upload);
        assert!(image.to_data_url().starts_with("data:image/jpeg;base64,"));
    }
}
