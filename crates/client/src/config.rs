//! Dashboard client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VTU_SESSION_SECRET` - Session codec secret (min 32 chars, high entropy).
//!   There is no built-in fallback: a missing or weak secret stops startup.
//!
//! ## Optional
//! - `VTU_CURRENCY_SYMBOL` - Display symbol for amounts (default: ₦)
//! - `VTU_STORAGE_PATH` - File backing the CLI's storage
//!   (default: .vtu-dashboard/storage.json)
//! - `VTU_SNAPSHOT_TTL_HOURS` - Lifetime of persisted cart and wishlist
//!   snapshots in hours (default: 24)

use std::collections::BTreeMap;
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

use crate::codec::{CodecError, SessionCodec};

const SESSION_SECRET_VAR: &str = "VTU_SESSION_SECRET";
const TTL_VAR: &str = "VTU_SNAPSHOT_TTL_HOURS";
const DEFAULT_CURRENCY_SYMBOL: &str = "₦";
const DEFAULT_STORAGE_PATH: &str = ".vtu-dashboard/storage.json";
const DEFAULT_SNAPSHOT_TTL_HOURS: i64 = 24;
const MS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Shortest accepted session secret, in characters.
const MIN_SECRET_CHARS: usize = 32;
/// Lowest accepted Shannon entropy, in bits per character.
const MIN_SECRET_ENTROPY: f64 = 3.3;

/// Fragments that mark a secret copied from documentation (lowercase).
const PLACEHOLDER_FRAGMENTS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "change-me",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "dummy",
    "default",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Dashboard client configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Secret the session codec key is derived from
    pub session_secret: SecretString,
    /// Currency symbol prefixed to displayed amounts
    pub currency_symbol: String,
    /// File used by `FileStorage`
    pub storage_path: PathBuf,
    /// Lifetime of persisted cart and wishlist snapshots
    pub snapshot_ttl_ms: i64,
}

impl DashboardConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the session secret is missing or fails
    /// validation (length, placeholder detection, entropy check), or if an
    /// optional variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup(SESSION_SECRET_VAR)
            .ok_or_else(|| ConfigError::MissingEnvVar(SESSION_SECRET_VAR.to_string()))?;
        check_session_secret(&secret)
            .map_err(|reason| ConfigError::InsecureSecret(SESSION_SECRET_VAR.to_string(), reason))?;

        let snapshot_ttl_ms = match lookup(TTL_VAR) {
            Some(raw) => parse_ttl_hours(&raw)?,
            None => DEFAULT_SNAPSHOT_TTL_HOURS * MS_PER_HOUR,
        };

        Ok(Self {
            session_secret: SecretString::from(secret),
            currency_symbol: lookup("VTU_CURRENCY_SYMBOL")
                .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()),
            storage_path: lookup("VTU_STORAGE_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from),
            snapshot_ttl_ms,
        })
    }

    /// Build the session codec for this configuration.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::KeyDerivation` if the key cannot be derived.
    pub fn session_codec(&self) -> Result<SessionCodec, CodecError> {
        SessionCodec::new(&self.session_secret)
    }
}

/// Parse the snapshot TTL, in whole hours, into milliseconds.
fn parse_ttl_hours(raw: &str) -> Result<i64, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar(TTL_VAR.to_string(), reason);

    let hours = raw.trim().parse::<i64>().map_err(|e| invalid(e.to_string()))?;
    if hours <= 0 {
        return Err(invalid(format!("must be positive (got {hours})")));
    }
    hours
        .checked_mul(MS_PER_HOUR)
        .ok_or_else(|| invalid(format!("{hours} hours is out of range")))
}

/// Reject secrets that are short, copied from docs, or too repetitive.
///
/// Returns the reason on failure; the secret itself never appears in it.
fn check_session_secret(secret: &str) -> Result<(), String> {
    let chars = secret.chars().count();
    if chars < MIN_SECRET_CHARS {
        return Err(format!(
            "must be at least {MIN_SECRET_CHARS} characters (got {chars})"
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(fragment) = PLACEHOLDER_FRAGMENTS
        .iter()
        .find(|fragment| lower.contains(*fragment))
    {
        return Err(format!("looks like a placeholder (contains '{fragment}')"));
    }

    let entropy = entropy_bits_per_char(secret);
    if entropy < MIN_SECRET_ENTROPY {
        return Err(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_SECRET_ENTROPY:.1}); generate it randomly"
        ));
    }
    Ok(())
}

/// Shannon entropy of the character distribution, in bits per character.
#[allow(clippy::cast_precision_loss)] // secrets are far shorter than 2^52 chars
fn entropy_bits_per_char(s: &str) -> f64 {
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }
    let total = counts.values().sum::<usize>() as f64;

    counts
        .values()
        .map(|&count| count as f64 / total)
        .fold(0.0, |bits, p| p.mul_add(-p.log2(), bits))
}
