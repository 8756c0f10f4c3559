//! Simulated backends for the network-bound tools
//!
//! URL shortening, video lookup and audio conversion have no real backend.
//! Each is a trait so a real implementation can be dropped in later; the
//! `Simulated*` types validate their input, wait a fixed delay standing in
//! for network latency, and return a canned result. Nothing here retries,
//! times out or applies backpressure.

use crate::{extract_domain, replace_extension, validate_url, SimulationConfig, ToolError, UploadedFile};
use async_trait::async_trait;
use futures::FutureExt;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

pub const SHORT_CODE_LENGTH: usize = 6;

/// Observable state of a placeholder task.
#[derive(Debug)]
pub enum TaskState<'a, T> {
    Pending,
    Resolved(&'a Result<T, ToolError>),
}

/// A `Pending → Resolved` placeholder around a spawned operation.
///
/// Dropping the task before it resolves abandons the continuation.
pub struct SimulatedTask<T> {
    handle: Option<JoinHandle<Result<T, ToolError>>>,
    resolved: Option<Result<T, ToolError>>,
}

impl<T: Send + 'static> SimulatedTask<T> {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, ToolError>> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(future)),
            resolved: None,
        }
    }

    pub fn state(&mut self) -> TaskState<'_, T> {
        if self.resolved.is_none() {
            if let Some(handle) = self.handle.as_mut() {
                if handle.is_finished() {
                    if let Some(output) = handle.now_or_never() {
                        self.resolved = Some(flatten_join(output));
                        self.handle = None;
                    }
                }
            }
        }

        match &self.resolved {
            Some(result) => TaskState::Resolved(result),
            None => TaskState::Pending,
        }
    }

    pub fn is_pending(&mut self) -> bool {
        matches!(self.state(), TaskState::Pending)
    }

    /// Suspend until the task resolves.
    pub async fn wait(mut self) -> Result<T, ToolError> {
        if let Some(result) = self.resolved.take() {
            return result;
        }

        match self.handle.take() {
            Some(handle) => flatten_join(handle.await),
            None => Err(ToolError::TaskFailed("task already consumed".to_string())),
        }
    }
}

impl<T> Drop for SimulatedTask<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

fn flatten_join<T>(result: Result<Result<T, ToolError>, tokio::task::JoinError>) -> Result<T, ToolError> {
    result.map_err(|e| ToolError::TaskFailed(e.to_string()))?
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortLink {
    pub original: String,
    pub short: String,
}

#[async_trait]
pub trait UrlShortener: Send + Sync {
    async fn shorten(&self, url: &str) -> Result<ShortLink, ToolError>;
}

#[derive(Debug, Clone)]
pub struct SimulatedUrlShortener {
    config: SimulationConfig,
}

impl SimulatedUrlShortener {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl UrlShortener for SimulatedUrlShortener {
    async fn shorten(&self, url: &str) -> Result<ShortLink, ToolError> {
        let parsed = validate_url(url)?;
        sleep(self.config.shorten_delay).await;

        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SHORT_CODE_LENGTH)
            .map(char::from)
            .collect();
        let base = self.config.short_url_base.trim_end_matches('/');

        debug!("Shortened {} to code {}", parsed, code);
        Ok(ShortLink {
            original: parsed.to_string(),
            short: format!("{base}/{code}"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoFormat {
    pub quality: String,
    pub container: String,
    pub approx_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoInfo {
    pub source_url: String,
    pub title: String,
    pub formats: Vec<VideoFormat>,
}

#[async_trait]
pub trait VideoDownloader: Send + Sync {
    async fn lookup(&self, url: &str) -> Result<VideoInfo, ToolError>;
}

#[derive(Debug, Clone)]
pub struct SimulatedVideoDownloader {
    config: SimulationConfig,
}

impl SimulatedVideoDownloader {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    fn canned_formats() -> Vec<VideoFormat> {
        const MB: u64 = 1024 * 1024;
        [
            ("1080p", "mp4", 150 * MB),
            ("720p", "mp4", 85 * MB),
            ("480p", "mp4", 45 * MB),
            ("audio", "m4a", 5 * MB),
        ]
        .into_iter()
        .map(|(quality, container, approx_size)| VideoFormat {
            quality: quality.to_string(),
            container: container.to_string(),
            approx_size,
        })
        .collect()
    }
}

#[async_trait]
impl VideoDownloader for SimulatedVideoDownloader {
    async fn lookup(&self, url: &str) -> Result<VideoInfo, ToolError> {
        let parsed = validate_url(url)?;
        sleep(self.config.video_delay).await;

        let domain = extract_domain(&parsed).unwrap_or_else(|| "unknown source".to_string());
        Ok(VideoInfo {
            source_url: parsed.to_string(),
            title: format!("Video from {domain}"),
            formats: Self::canned_formats(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
    Ogg,
    Flac,
    Aac,
    M4a,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Flac => "flac",
            AudioFormat::Aac => "aac",
            AudioFormat::M4a => "m4a",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Flac => "audio/flac",
            AudioFormat::Aac => "audio/aac",
            AudioFormat::M4a => "audio/mp4",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp3" => Ok(AudioFormat::Mp3),
            "wav" => Ok(AudioFormat::Wav),
            "ogg" => Ok(AudioFormat::Ogg),
            "flac" => Ok(AudioFormat::Flac),
            "aac" => Ok(AudioFormat::Aac),
            "m4a" => Ok(AudioFormat::M4a),
            _ => Err(ToolError::UnsupportedFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedAudio {
    pub file_name: String,
    pub format: AudioFormat,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait AudioConverter: Send + Sync {
    async fn convert(&self, file: UploadedFile, target: AudioFormat) -> Result<ConvertedAudio, ToolError>;
}

#[derive(Debug, Clone)]
pub struct SimulatedAudioConverter {
    config: SimulationConfig,
}

impl SimulatedAudioConverter {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AudioConverter for SimulatedAudioConverter {
    /// Renames the file for the target format; the bytes are passed through.
    async fn convert(&self, file: UploadedFile, target: AudioFormat) -> Result<ConvertedAudio, ToolError> {
        let top_level = file.mime_type.split('/').next().unwrap_or("");
        if top_level != "audio" && top_level != "video" {
            return Err(ToolError::UnsupportedFormat(file.mime_type));
        }

        sleep(self.config.convert_delay).await;

        Ok(ConvertedAudio {
            file_name: replace_extension(&file.name, target.extension()),
            format: target,
            mime_type: target.mime_type().to_string(),
            bytes: file.bytes,
        })
    }
}
