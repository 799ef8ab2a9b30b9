use futures::Stream;
use futures::TryStreamExt;
use reqwest::header::RANGE;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use super::models::{ResolverConfig, StreamFormat, StreamInfo};

/// Quality tag the resolver attaches to its preferred audio-only variant.
const HIGHEST_AUDIO: &str = "highestaudio";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Resolver returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid resolver URL: {0}")]
    InvalidUrl(String),

    #[error("No audio format available")]
    NoAudioFormat,
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Pick the audio-only variant from the resolver's format list: the entry
/// tagged `highestaudio` if present, otherwise the highest audio bitrate.
pub fn choose_audio_format(formats: &[StreamFormat]) -> Result<&StreamFormat> {
    if let Some(format) = formats.iter().find(|f| f.quality == HIGHEST_AUDIO) {
        return Ok(format);
    }

    formats
        .iter()
        .filter(|f| f.audio_bitrate.is_some())
        .max_by_key(|f| f.audio_bitrate)
        .ok_or(ApiError::NoAudioFormat)
}

#[derive(Clone)]
pub struct ResolverClient {
    config: ResolverConfig,
}

impl ResolverClient {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolve a shareable video URL into a title and the set of
    /// downloadable formats.
    pub async fn resolve(&self, video_url: &str) -> Result<StreamInfo> {
        let endpoint = format!("{}/resolve", self.config.base_url);
        let url = Url::parse_with_params(&endpoint, &[("url", video_url)])
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        let client = Client::new();
        let response = client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Resolve request failed: {}", e)))?;

        let info: StreamInfo = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        Ok(info)
    }

    /// Open a monitored, resumable transfer from a resolved stream URL.
    ///
    /// When `resume_from` is non-zero a `Range` request is issued; the
    /// server honoring it with `206 Partial Content` continues the
    /// existing file, any other reply restarts from zero. A `416 Range
    /// Not Satisfiable` (the on-disk file already covers everything the
    /// server has) is retried without the `Range` header rather than
    /// surfaced as an error.
    ///
    /// Returns `(expected_total, resumed_from, stream)` where
    /// `expected_total` is the full file size when the server reports one.
    pub async fn download_stream(
        &self,
        stream_url: &str,
        resume_from: u64,
    ) -> Result<(Option<u64>, u64, impl Stream<Item = Result<bytes::Bytes>>)> {
        let client = Client::new();
        let mut request = client.get(stream_url);
        if resume_from > 0 {
            request = request.header(RANGE, format!("bytes={}-", resume_from));
        }

        let mut response = request.send().await?;
        if resume_from > 0 && response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            response = client.get(stream_url).send().await?;
        }

        let response = response
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Download request failed: {}", e)))?;

        let resumed_from = if response.status() == StatusCode::PARTIAL_CONTENT {
            resume_from
        } else {
            0
        };
        let expected_total = response.content_length().map(|len| len + resumed_from);

        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((expected_total, resumed_from, stream))
    }
}
