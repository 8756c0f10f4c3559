//! Hash and encoding tools
//!
//! Digests are computed with the RustCrypto primitives and rendered as
//! lowercase hex. `simple32` is a 32-bit rolling hash kept as a fast
//! fallback for callers that need no cryptographic guarantee; it is not MD5
//! and is never labelled as such.

use crate::ToolError;
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// Non-cryptographic rolling hash
    Simple32,
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Simple32,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
    ];

    /// Length of the hex digest in characters.
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Simple32 => 8,
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha512 => 128,
        }
    }

    pub fn is_cryptographic(&self) -> bool {
        !matches!(self, HashAlgorithm::Simple32)
    }

    pub fn label(&self) -> &'static str {
        match self {
            HashAlgorithm::Simple32 => "Simple32 (fast fallback)",
            HashAlgorithm::Sha1 => "SHA-1",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashAlgorithm::Simple32 => "simple32",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        };
        f.write_str(name)
    }
}

impl FromStr for HashAlgorithm {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "simple32" => Ok(HashAlgorithm::Simple32),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(ToolError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Compute the digest of `input` and return it as lowercase hex.
///
/// # Examples
///
/// ```rust
/// use toolbench::{digest, HashAlgorithm};
///
/// assert_eq!(digest(HashAlgorithm::Simple32, b""), "00000000");
/// assert_eq!(digest(HashAlgorithm::Sha256, b"abc").len(), 64);
/// ```
pub fn digest(algorithm: HashAlgorithm, input: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Simple32 => format!("{:08x}", simple32(input)),
        HashAlgorithm::Sha1 => hex::encode(Sha1::digest(input)),
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(input)),
        HashAlgorithm::Sha512 => hex::encode(Sha512::digest(input)),
    }
}

/// Digest on the blocking pool so large inputs do not hold up the runtime.
pub async fn digest_async(algorithm: HashAlgorithm, input: Vec<u8>) -> Result<String, ToolError> {
    on_blocking_pool(move || digest(algorithm, &input)).await
}

async fn on_blocking_pool<T, F>(work: F) -> Result<T, ToolError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ToolError::TaskFailed(e.to_string()))
}

/// 32-bit rolling hash: `h = h * 31 + b`, wrapping.
pub fn simple32(input: &[u8]) -> u32 {
    input.iter().fold(0u32, |h, &b| {
        (h << 5).wrapping_sub(h).wrapping_add(u32::from(b))
    })
}

pub fn encode_base64(input: &[u8]) -> String {
    general_purpose::STANDARD.encode(input)
}

pub fn decode_base64(input: &str) -> Result<Vec<u8>, ToolError> {
    Ok(general_purpose::STANDARD.decode(input.trim())?)
}
