//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`WallSettings::default()`]
//! 2. If the settings file exists, deep-merge user values over defaults
//! 3. Pull secrets from the file's `secrets` object
//! 4. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::{Network, WallSettings};

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "jackpot-wall.json";

/// Resolve the default settings path (`./jackpot-wall.json`).
pub fn settings_path() -> PathBuf {
    PathBuf::from(DEFAULT_SETTINGS_FILE)
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults plus env overrides. If the
/// file contains invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<WallSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    settings.validate()?;
    Ok(settings)
}

/// Defaults merged with the settings file, without env overrides.
pub fn load_file_layer(path: &Path) -> Result<WallSettings> {
    let defaults = serde_json::to_value(WallSettings::default())?;

    let (merged, secrets) = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut user: Value = serde_json::from_str(&content).map_err(SettingsError::parse(path))?;
        let secrets = match user.as_object_mut().and_then(|o| o.remove("secrets")) {
            Some(raw) => serde_json::from_value(raw).map_err(SettingsError::parse(path))?,
            None => FileSecrets::default(),
        };
        (deep_merge(defaults, user), secrets)
    } else {
        debug!(?path, "settings file not found, using defaults");
        (defaults, FileSecrets::default())
    };

    let mut settings: WallSettings =
        serde_json::from_value(merged).map_err(SettingsError::parse(path))?;
    secrets.apply(&mut settings);
    Ok(settings)
}

/// The `secrets` object of the settings file.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FileSecrets {
    chainhook_secret: Option<String>,
    hiro_api_key: Option<String>,
    talent_api_key: Option<String>,
}

impl FileSecrets {
    fn apply(self, settings: &mut WallSettings) {
        if let Some(v) = non_empty(self.chainhook_secret) {
            settings.chainhook.secret = Some(SecretString::from(v));
        }
        if let Some(v) = non_empty(self.hiro_api_key) {
            settings.upstream.hiro_api_key = Some(SecretString::from(v));
        }
        if let Some(v) = non_empty(self.talent_api_key) {
            settings.upstream.talent_api_key = Some(SecretString::from(v));
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// `lookup` resolves a variable name; the binary passes `std::env::var`,
/// tests pass a map. Invalid values are ignored with a warning.
pub fn apply_env_overrides<F>(settings: &mut WallSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { lookup };

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = env.string("WALL_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = env.u16("WALL_PORT", 1, 65535) {
        settings.server.port = v;
    }

    // ── Chainhook ───────────────────────────────────────────────────
    if let Some(v) = env.string("CHAINHOOK_SECRET") {
        settings.chainhook.secret = Some(SecretString::from(v));
    }
    if let Some(v) = env.string("CHAINHOOK_PRINT_EVENT_TYPE") {
        settings.chainhook.print_event_type = v;
    }

    // ── Network ─────────────────────────────────────────────────────
    // NEXT_PUBLIC_NETWORK is what the dashboard build reads; NETWORK wins.
    for name in ["NEXT_PUBLIC_NETWORK", "NETWORK"] {
        if let Some(v) = env.network(name) {
            settings.network.network = v;
        }
    }
    if let Some(v) = env.string("MAINNET_CONTRACT") {
        settings.network.mainnet_contract = v;
    }
    if let Some(v) = env.string("TESTNET_CONTRACT") {
        settings.network.testnet_contract = v;
    }

    // ── Upstream ────────────────────────────────────────────────────
    if let Some(v) = env.u64("WALL_UPSTREAM_TIMEOUT_MS", 100, 300_000) {
        settings.upstream.timeout_ms = v;
    }
    if let Some(v) = env.string("STACKS_MAINNET_URL") {
        settings.upstream.stacks_mainnet_url = v;
    }
    if let Some(v) = env.string("STACKS_TESTNET_URL") {
        settings.upstream.stacks_testnet_url = v;
    }
    if let Some(v) = env.string("TALENT_API_URL") {
        settings.upstream.talent_url = v;
    }
    if let Some(v) = env.string("HIRO_API_KEY") {
        settings.upstream.hiro_api_key = Some(SecretString::from(v));
    }
    if let Some(v) = env.string("TALENT_PROTOCOL_API_KEY") {
        settings.upstream.talent_api_key = Some(SecretString::from(v));
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn u16(&self, name: &str, min: u16, max: u16) -> Option<u16> {
        let val = self.string(name)?;
        let result = parse_u16_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid u16 env var, ignoring");
        }
        result
    }

    fn u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = self.string(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid u64 env var, ignoring");
        }
        result
    }

    fn network(&self, name: &str) -> Option<Network> {
        let val = self.string(name)?;
        let result = Network::parse(&val);
        if result.is_none() {
            warn!(key = name, value = %val, "unknown network, ignoring");
        }
        result
    }
}
