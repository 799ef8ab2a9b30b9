use serde::{Deserialize, Serialize};

/// Response from the /resolve endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamInfo {
    pub title: String,
    #[serde(default)]
    pub formats: Vec<StreamFormat>,
}

/// One downloadable variant of a stream, as reported by the resolver
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamFormat {
    pub quality: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
    #[serde(rename = "audioBitrate", default)]
    pub audio_bitrate: Option<u32>,
}

/// Configuration for the resolver client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    pub base_url: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: "https://resolve.vibe.app/api/v1".to_string(),
        }
    }
}
