//! Password generator
//!
//! Builds the character universe from the enabled classes and samples it
//! uniformly with replacement. The default source is the operating system
//! CSPRNG.

use crate::ToolError;
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_PASSWORD_LENGTH: usize = 4;
pub const MAX_PASSWORD_LENGTH: usize = 50;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Enabled character classes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CharsetFlags {
    pub upper: bool,
    pub lower: bool,
    pub digit: bool,
    pub symbol: bool,
}

impl CharsetFlags {
    pub fn all() -> Self {
        Self {
            upper: true,
            lower: true,
            digit: true,
            symbol: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        !(self.upper || self.lower || self.digit || self.symbol)
    }

    /// Concatenated universe in fixed order: upper, lower, digit, symbol.
    pub fn universe(&self) -> Vec<char> {
        let mut chars = String::new();
        if self.upper {
            chars.push_str(UPPERCASE);
        }
        if self.lower {
            chars.push_str(LOWERCASE);
        }
        if self.digit {
            chars.push_str(DIGITS);
        }
        if self.symbol {
            chars.push_str(SYMBOLS);
        }
        chars.chars().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordSpec {
    length: usize,
    charset: CharsetFlags,
}

impl PasswordSpec {
    pub fn new(length: usize, charset: CharsetFlags) -> Result<Self, ToolError> {
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
            return Err(ToolError::InvalidLength {
                length,
                min: MIN_PASSWORD_LENGTH,
                max: MAX_PASSWORD_LENGTH,
            });
        }
        Ok(Self { length, charset })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn charset(&self) -> CharsetFlags {
        self.charset
    }
}

/// Generate a password with the OS random source.
///
/// # Examples
///
/// ```rust
/// use toolbench::{generate, CharsetFlags, PasswordSpec};
///
/// let digits = CharsetFlags { digit: true, ..CharsetFlags::none() };
/// let password = generate(&PasswordSpec::new(12, digits)?)?;
/// assert!(password.chars().all(|c| c.is_ascii_digit()));
/// # Ok::<(), toolbench::ToolError>(())
/// ```
pub fn generate(spec: &PasswordSpec) -> Result<String, ToolError> {
    generate_with_rng(spec, &mut OsRng)
}

pub fn generate_with_rng<R: Rng + ?Sized>(spec: &PasswordSpec, rng: &mut R) -> Result<String, ToolError> {
    let universe = spec.charset.universe();
    if universe.is_empty() {
        return Err(ToolError::EmptyCharset);
    }

    Ok((0..spec.length)
        .map(|_| universe[rng.gen_range(0..universe.len())])
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

impl Strength {
    /// Classification by length alone; the character classes in use are not
    /// considered.
    pub fn of_length(length: usize) -> Self {
        match length {
            0..=7 => Strength::Weak,
            8..=11 => Strength::Medium,
            _ => Strength::Strong,
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strength::Weak => f.write_str("Weak"),
            Strength::Medium => f.write_str("Medium"),
            Strength::Strong => f.write_str("Strong"),
        }
    }
}
