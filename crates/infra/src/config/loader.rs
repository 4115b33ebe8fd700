//! Configuration loader
//!
//! Loads application configuration from files and environment variables.
//!
//! ## Loading Strategy
//! 1. `GOALPRO_CONFIG` names an explicit config file, otherwise standard
//!    locations are probed
//! 2. No file found means built-in defaults
//! 3. `GOALPRO_*` environment variables override whatever the file set
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `GOALPRO_BIND`: HTTP listen address
//! - `GOALPRO_DB_PATH`: Database file path
//! - `GOALPRO_DB_POOL_SIZE`: Connection pool size
//! - `GOALPRO_GOOGLE_CLIENT_ID` / `GOALPRO_GOOGLE_CLIENT_SECRET`: OAuth client
//! - `GOALPRO_GOOGLE_REDIRECT_URI`: OAuth callback URL registered with Google
//! - `GOALPRO_GOOGLE_WEBHOOK_URL`: Public push-notification URL
//! - `GOALPRO_OAUTH_STATE_SECRET`: HMAC secret for the OAuth `state`
//! - `GOALPRO_OAUTH_STATE_TTL_SECS`: Maximum age of an OAuth `state`
//! - `GOALPRO_SETTINGS_URL`: Page the OAuth callback redirects to
//! - `GOALPRO_ANONYMOUS_USER_ID`: Demo identity (debug builds only)
//! - `GOALPRO_SYNC_QUEUE_CAPACITY`: Sync job queue bound
//! - `GOALPRO_SYNC_JOB_TIMEOUT_SECS`: Per-job timeout for queued syncs
//! - `GOALPRO_AUTO_SYNC_ENABLED`: Whether the auto-sync scheduler runs
//! - `GOALPRO_AUTO_SYNC_CRON`: Auto-sync scheduler cron expression
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}` or `./goalpro.{json,toml}` (current directory)
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use goalpro_domain::{Config, GoalProError, Result};

/// Load configuration: file (or defaults), then environment overrides.
///
/// # Errors
/// Returns `GoalProError::Config` if an explicit file is missing, a file
/// fails to parse, or an override has an invalid value.
pub fn load() -> Result<Config> {
    let mut config = match env_opt("GOALPRO_CONFIG") {
        Some(path) => load_from_file(Some(PathBuf::from(path)))?,
        None => match probe_config_paths() {
            Some(path) => load_from_file(Some(path))?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from defaults plus environment variables only.
///
/// # Errors
/// Returns `GoalProError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Sections and keys absent from the file keep their defaults.
///
/// # Errors
/// Returns `GoalProError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GoalProError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GoalProError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GoalProError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Overlay every `GOALPRO_*` variable that is set onto `config`.
///
/// # Errors
/// Returns `GoalProError::Config` for unparsable numeric values.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(bind) = env_opt("GOALPRO_BIND") {
        config.server.bind = bind;
    }

    if let Some(path) = env_opt("GOALPRO_DB_PATH") {
        config.database.path = path;
    }
    if let Some(size) = env_parse::<u32>("GOALPRO_DB_POOL_SIZE")? {
        config.database.pool_size = size;
    }

    if let Some(client_id) = env_opt("GOALPRO_GOOGLE_CLIENT_ID") {
        config.google.client_id = Some(client_id);
    }
    if let Some(secret) = env_opt("GOALPRO_GOOGLE_CLIENT_SECRET") {
        config.google.client_secret = Some(secret);
    }
    if let Some(redirect) = env_opt("GOALPRO_GOOGLE_REDIRECT_URI") {
        config.google.redirect_uri = redirect;
    }
    if let Some(webhook) = env_opt("GOALPRO_GOOGLE_WEBHOOK_URL") {
        config.google.webhook_url = Some(webhook);
    }

    if let Some(secret) = env_opt("GOALPRO_OAUTH_STATE_SECRET") {
        config.oauth.state_secret = Some(secret);
    }
    if let Some(ttl) = env_parse::<i64>("GOALPRO_OAUTH_STATE_TTL_SECS")? {
        config.oauth.state_ttl_secs = ttl;
    }

    if let Some(url) = env_opt("GOALPRO_SETTINGS_URL") {
        config.app.settings_url = url;
    }
    if let Some(user_id) = env_opt("GOALPRO_ANONYMOUS_USER_ID") {
        config.app.anonymous_user_id = Some(user_id);
    }

    if let Some(capacity) = env_parse::<usize>("GOALPRO_SYNC_QUEUE_CAPACITY")? {
        config.sync.queue_capacity = capacity;
    }
    if let Some(timeout) = env_parse::<u64>("GOALPRO_SYNC_JOB_TIMEOUT_SECS")? {
        config.sync.job_timeout_secs = timeout;
    }
    config.sync.auto_sync_enabled =
        env_bool("GOALPRO_AUTO_SYNC_ENABLED", config.sync.auto_sync_enabled);
    if let Some(cron) = env_opt("GOALPRO_AUTO_SYNC_CRON") {
        config.sync.auto_sync_cron = cron;
    }

    Ok(())
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GoalProError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GoalProError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(GoalProError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("goalpro.json"),
        dir.join("goalpro.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Non-empty environment variable value.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| GoalProError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    env_opt(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
