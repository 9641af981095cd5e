//! CLI argument parsing, validation, and startup helpers.

use std::sync::Arc;

use clap::Parser;
use tracing::error;
use url::Url;

use crate::registry::{MemoryRegistry, RevocationRegistry, SqliteRegistry};

const MIN_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Gatehouse", about = "Token-based session service")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    pub port: u16,

    /// Path to a SQLite database for the durable revocation registry.
    /// When omitted, revocations live in memory and reset on restart
    #[arg(short, long)]
    pub database: Option<String>,

    /// Path to file containing the session secret. Prefer using the
    /// JWT_SECRET env var instead
    #[arg(long)]
    pub secret_file: Option<String>,

    /// Base URL clients use to reach this service
    #[arg(long, env = "API_BASE_URL", default_value = "http://localhost:3000")]
    pub base_url: String,

    /// Set the Secure flag on auth cookies (requires HTTPS)
    #[arg(long)]
    pub secure_cookies: bool,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

fn secret_from_env(key: &str) -> Option<String> {
    let secret = std::env::var(key).ok()?;
    // Clear the environment variable to prevent leaking.
    // SAFETY: We're single-threaded at this point during startup,
    // and no other code is reading this environment variable.
    unsafe { std::env::remove_var(key) };
    Some(secret)
}

/// Load the session secret from JWT_SECRET, SESSION_SECRET, or a file.
/// Returns None and logs an error if the secret cannot be loaded or is
/// shorter than 32 bytes; the process must not start without it.
pub fn load_session_secret(secret_file: Option<&str>) -> Option<String> {
    let secret = if let Some(secret) = secret_from_env("JWT_SECRET") {
        secret
    } else if let Some(secret) = secret_from_env("SESSION_SECRET") {
        secret
    } else if let Some(path) = secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read session secret file");
                return None;
            }
        }
    } else {
        error!(
            "Session secret is required. Set JWT_SECRET or SESSION_SECRET (recommended) or use --secret-file"
        );
        return None;
    };

    if secret.len() < MIN_SECRET_LENGTH {
        error!(
            "Session secret is shorter than {} bytes. Use a longer secret",
            MIN_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Parse and validate the base URL.
/// Returns None and logs an error if validation fails.
pub fn validate_base_url(base_url: &str) -> Option<Url> {
    let url = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            error!(url = %base_url, error = %e, "Invalid base URL");
            return None;
        }
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        error!(url = %base_url, "Base URL must use http or https");
        return None;
    }

    Some(url)
}

/// Open the revocation registry: SQLite-backed when a database path is
/// given, in-memory otherwise.
pub async fn open_registry(database: Option<&str>) -> Option<Arc<dyn RevocationRegistry>> {
    match database {
        Some(path) => match SqliteRegistry::open(path).await {
            Ok(registry) => Some(Arc::new(registry)),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to open revocation database");
                None
            }
        },
        None => Some(Arc::new(MemoryRegistry::new())),
    }
}
