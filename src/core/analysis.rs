use crate::core::{Analyzer, CapturedImage, Classification, ConfigProvider, FeatureScores, Result, ScanResult};
use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

/// Fixed instruction sent alongside every image. The reference ranges are
/// informational for the model; the returned classification is trusted
/// as-is and never recomputed locally.
const ANALYSIS_PROMPT: &str = "Analyze this image of a fingernail or palm for hemoglobin estimation. \
Act as a clinical AI.\n\n\
Provide a realistic estimation of hemoglobin levels (g/dL) based on the pallor and vascularity visible.\n\n\
Return a JSON object with:\n\
- hemoglobin: number (e.g. 13.5)\n\
- classification: \"Normal\" | \"Mild\" | \"Moderate\" | \"Severe\"\n\
- confidence: number (0 to 1)\n\
- features: object with vascularVisibility, colorimetricIndex, texturalAnalysis, spectralReflectance (all 0 to 1 floats)\n\n\
Reference ranges:\n\
- Normal: 12.0 - 17.5 g/dL\n\
- Mild Anemia: 10.0 - 11.9 g/dL\n\
- Moderate Anemia: 8.0 - 9.9 g/dL\n\
- Severe Anemia: < 8.0 g/dL";

// Per-field defaults applied when the model returns partial data.
const DEFAULT_HEMOGLOBIN: f64 = 13.0;
const DEFAULT_CONFIDENCE: f64 = 0.85;
const DEFAULT_FEATURE_SCORE: f64 = 0.8;

// Placeholder values for a failed analysis call.
const FALLBACK_HEMOGLOBIN: f64 = 12.5;
const FALLBACK_FEATURE_SCORE: f64 = 0.5;

/// `generateContent` response envelope, reduced to the path we read.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// The structured estimate as the model emits it. Every field is optional;
/// `complete` fills the gaps.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAnalysis {
    hemoglobin: Option<f64>,
    classification: Option<String>,
    confidence: Option<f64>,
    features: Option<RawFeatures>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawFeatures {
    vascular_visibility: Option<f64>,
    colorimetric_index: Option<f64>,
    textural_analysis: Option<f64>,
    spectral_reflectance: Option<f64>,
}

/// Client for the hosted multimodal inference service. One outbound request
/// per image; by contract `analyze` never fails — any transport or parse
/// problem is swallowed into a zero-confidence placeholder result.
pub struct GeminiClient<C: ConfigProvider> {
    config: C,
    client: Client,
}

impl<C: ConfigProvider> GeminiClient<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    async fn request_analysis(&self, image: &CapturedImage) -> Result<RawAnalysis> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_endpoint().trim_end_matches('/'),
            self.config.model_id()
        );

        let body = serde_json::json!({
            "contents": {
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": "image/jpeg",
                            "data": image.to_base64(),
                        }
                    },
                    { "text": ANALYSIS_PROMPT },
                ]
            },
            "generationConfig": {
                "responseMimeType": "application/json",
                // Low temperature for consistent medical analysis
                "temperature": 0.1,
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "hemoglobin": { "type": "NUMBER" },
                        "classification": { "type": "STRING" },
                        "confidence": { "type": "NUMBER" },
                        "features": {
                            "type": "OBJECT",
                            "properties": {
                                "vascularVisibility": { "type": "NUMBER" },
                                "colorimetricIndex": { "type": "NUMBER" },
                                "texturalAnalysis": { "type": "NUMBER" },
                                "spectralReflectance": { "type": "NUMBER" },
                            }
                        }
                    }
                }
            }
        });

        let mut request = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key())])
            .json(&body);

        if let Some(timeout) = self.config.timeout_seconds() {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        tracing::debug!("Making inference request to: {}", url);
        let response = request.send().await?.error_for_status()?;
        tracing::debug!("Inference response status: {}", response.status());

        let payload: GenerateContentResponse = response.json().await?;
        let text = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .find_map(|part| part.text)
            .unwrap_or_else(|| "{}".to_string());

        Ok(serde_json::from_str(&text)?)
    }

    /// Fill per-field defaults for whatever the model left out. Fields that
    /// are present pass through untouched.
    fn complete(&self, raw: RawAnalysis, image: &CapturedImage) -> ScanResult {
        let features = raw.features.unwrap_or_default();
        ScanResult {
            id: format!("scan-{}", Uuid::new_v4()),
            // Overwritten by the session at record time.
            user_id: "unknown".to_string(),
            timestamp: ScanResult::now_millis(),
            hemoglobin: raw.hemoglobin.unwrap_or(DEFAULT_HEMOGLOBIN),
            classification: raw
                .classification
                .as_deref()
                .and_then(Classification::from_label)
                .unwrap_or_default(),
            confidence: raw.confidence.unwrap_or(DEFAULT_CONFIDENCE),
            features: FeatureScores {
                vascular_visibility: features.vascular_visibility.unwrap_or(DEFAULT_FEATURE_SCORE),
                colorimetric_index: features.colorimetric_index.unwrap_or(DEFAULT_FEATURE_SCORE),
                textural_analysis: features.textural_analysis.unwrap_or(DEFAULT_FEATURE_SCORE),
                spectral_reflectance: features
                    .spectral_reflectance
                    .unwrap_or(DEFAULT_FEATURE_SCORE),
            },
            image_data: self.retained_image(image),
        }
    }

    /// Non-diagnostic placeholder produced when the call fails outright.
    fn fallback(&self, image: &CapturedImage) -> ScanResult {
        ScanResult {
            id: format!("err-{}", Uuid::new_v4()),
            user_id: "unknown".to_string(),
            timestamp: ScanResult::now_millis(),
            hemoglobin: FALLBACK_HEMOGLOBIN,
            classification: Classification::Normal,
            confidence: 0.0,
            features: FeatureScores::uniform(FALLBACK_FEATURE_SCORE),
            image_data: self.retained_image(image),
        }
    }

    fn retained_image(&self, image: &CapturedImage) -> Option<String> {
        if self.config.retain_images() {
            Some(image.to_data_url())
        } else {
            None
        }
    }
}

#[async_trait::async_trait]
impl<C: ConfigProvider> Analyzer for GeminiClient<C> {
    async fn analyze(&self, image: &CapturedImage) -> ScanResult {
        match self.request_analysis(image).await {
            Ok(raw) => self.complete(raw, image),
            Err(e) => {
                tracing::error!("❌ AI analysis failed: {}", e);
                tracing::warn!("⚠️ Returning non-diagnostic placeholder result (confidence 0)");
                self.fallback(image)
            }
        }
    }
}
