//! File dropzone
//!
//! Candidates are checked against the configured MIME patterns, size limit
//! and file count. Accepted files keep their bytes in memory, in insertion
//! order, until they are removed or the component is dropped.

use crate::{format_bytes, IntakeConfig, ToolError};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// A file the user is trying to add, not yet validated.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, ToolError> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl From<CandidateFile> for UploadedFile {
    fn from(candidate: CandidateFile) -> Self {
        Self {
            id: Uuid::new_v4(),
            size: candidate.size(),
            name: candidate.name,
            mime_type: candidate.mime_type,
            bytes: candidate.bytes,
        }
    }
}

/// Why a candidate was turned away; one reason per violated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub file_name: String,
    pub reasons: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file_name, self.reasons.join("; "))
    }
}

impl From<ValidationError> for ToolError {
    fn from(err: ValidationError) -> Self {
        ToolError::Validation {
            file_name: err.file_name,
            reasons: err.reasons,
        }
    }
}

#[derive(Debug, Default)]
pub struct IntakeOutcome {
    pub accepted: Vec<UploadedFile>,
    pub rejected: Vec<ValidationError>,
}

/// Whether `mime_type` matches `pattern`.
///
/// Patterns are exact types, `type/*`, or `*/*`. Comparison ignores case
/// and any parameters after `;`.
pub fn mime_matches(pattern: &str, mime_type: &str) -> bool {
    let essence = |s: &str| s.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    let pattern = essence(pattern);
    let mime_type = essence(mime_type);

    if pattern == "*/*" || pattern == "*" {
        return true;
    }

    match pattern.strip_suffix("/*") {
        Some(prefix) => mime_type
            .split_once('/')
            .map(|(top, _)| top == prefix)
            .unwrap_or(false),
        None => pattern == mime_type,
    }
}

type AcceptCallback = Box<dyn FnMut(&[UploadedFile]) + Send>;

pub struct FileIntake {
    config: IntakeConfig,
    files: Vec<UploadedFile>,
    on_accept: Option<AcceptCallback>,
}

impl FileIntake {
    pub fn new(config: IntakeConfig) -> Self {
        Self {
            config,
            files: Vec::new(),
            on_accept: None,
        }
    }

    /// Register the callback that receives each newly accepted batch.
    pub fn on_accept<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&[UploadedFile]) + Send + 'static,
    {
        self.on_accept = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Validate `candidates`, keep the ones that pass and report the rest.
    ///
    /// The returned `accepted` list holds copies of the newly added files;
    /// the callback, if any, sees the same batch exactly once.
    pub fn accept(&mut self, candidates: Vec<CandidateFile>) -> IntakeOutcome {
        let mut outcome = IntakeOutcome::default();

        for candidate in candidates {
            let reasons = self.check(&candidate, self.files.len() + outcome.accepted.len());

            if reasons.is_empty() {
                debug!("Accepted {} ({})", candidate.name, format_bytes(candidate.size()));
                outcome.accepted.push(UploadedFile::from(candidate));
            } else {
                debug!("Rejected {}: {:?}", candidate.name, reasons);
                outcome.rejected.push(ValidationError {
                    file_name: candidate.name,
                    reasons,
                });
            }
        }

        if !outcome.accepted.is_empty() {
            self.files.extend(outcome.accepted.iter().cloned());
            if let Some(callback) = self.on_accept.as_mut() {
                callback(outcome.accepted.as_slice());
            }
        }

        info!(
            "Intake batch: {} accepted, {} rejected, {} held",
            outcome.accepted.len(),
            outcome.rejected.len(),
            self.files.len()
        );

        outcome
    }

    fn check(&self, candidate: &CandidateFile, held: usize) -> Vec<String> {
        let mut reasons = Vec::new();

        if !self
            .config
            .accept
            .iter()
            .any(|pattern| mime_matches(pattern, &candidate.mime_type))
        {
            reasons.push(format!(
                "File type {} is not accepted (allowed: {})",
                candidate.mime_type,
                self.config.accept.join(", ")
            ));
        }

        if candidate.size() > self.config.max_size {
            reasons.push(format!(
                "File is too large: {} (max {})",
                format_bytes(candidate.size()),
                format_bytes(self.config.max_size)
            ));
        }

        if held + 1 > self.config.max_files {
            reasons.push(format!(
                "Too many files (max {})",
                self.config.max_files
            ));
        }

        reasons
    }

    /// Remove the file at `index`, handing back ownership of its bytes.
    pub fn remove(&mut self, index: usize) -> Option<UploadedFile> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    pub fn remove_by_id(&mut self, id: Uuid) -> Option<UploadedFile> {
        let index = self.files.iter().position(|f| f.id == id)?;
        self.remove(index)
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

impl fmt::Debug for FileIntake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileIntake")
            .field("config", &self.config)
            .field("files", &self.files.len())
            .field("has_callback", &self.on_accept.is_some())
            .finish()
    }
}
