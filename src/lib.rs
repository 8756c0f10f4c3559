//! # Toolbench
//!
//! A collection of small, independent utility tools sharing one
//! configuration, error type and logging setup:
//!
//! - **Hash generator**: SHA-1, SHA-256 and SHA-512 digests as lowercase hex,
//!   plus `simple32`, a non-cryptographic 32-bit rolling hash kept as a fast
//!   fallback
//! - **Base64 encoder**: standard alphabet, padded
//! - **Password generator**: uniform sampling over the selected character
//!   classes using the OS random source, with a length-based strength rating
//! - **File dropzone**: MIME pattern, size and count validation over an
//!   in-memory, ordered file list
//! - **Screen recorder**: an `Idle → Recording → Stopped` state machine over a
//!   pluggable display-capture backend
//! - **URL shortener, video downloader, audio converter**: simulated backends
//!   that resolve canned results after a fixed delay
//!
//! Host integration points (notices, ad slots, clipboard) are traits in
//! [`notify`] so every tool can run without a page shell.
//!
//! ## Quick Start
//!
//! ```rust
//! use toolbench::{digest, generate, CharsetFlags, HashAlgorithm, PasswordSpec, Strength};
//!
//! let hex = digest(HashAlgorithm::Sha256, b"hello");
//! assert_eq!(hex.len(), 64);
//!
//! let spec = PasswordSpec::new(16, CharsetFlags::all())?;
//! let password = generate(&spec)?;
//! assert_eq!(Strength::of_length(password.len()), Strength::Strong);
//! # Ok::<(), toolbench::ToolError>(())
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! toolbench hash --algorithm sha512 --text "hello"
//! toolbench password --length 20 --count 3 --no-symbols
//! toolbench intake --accept "image/*" --max-files 2 a.png b.jpg notes.pdf
//! toolbench shorten https://example.com/a/very/long/path
//! ```

/// Configuration and settings for the tools
pub mod config;

/// Error types and error handling utilities
pub mod error;

/// Digest and base64 tools
pub mod hash;

/// Password generation and strength rating
pub mod password;

/// File dropzone validation and storage
pub mod intake;

/// Screen recorder state machine
pub mod recorder;

/// Simulated backends for the network-bound tools
pub mod simulated;

/// Notifier, ad slot and clipboard collaborators
pub mod notify;

/// Command-line interface implementation
pub mod cli;

/// Usage metrics collection
pub mod metrics;

/// Utility functions and helpers
pub mod utils;

#[cfg(test)]
mod tests;

pub use cli::*;
pub use config::*;
pub use error::*;
pub use hash::*;
pub use intake::*;
pub use crate::metrics::*;
pub use notify::*;
pub use password::*;
pub use recorder::*;
pub use simulated::*;
pub use utils::*;
