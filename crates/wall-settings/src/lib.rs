//! # wall-settings
//!
//! Configuration for the Jackpot Wall service, loaded from three layers (in
//! priority order):
//! 1. **Compiled defaults**: [`WallSettings::default()`]
//! 2. **Settings file**: `./jackpot-wall.json` or `--config <path>`
//! 3. **Environment variables**: `CHAINHOOK_SECRET`, `HIRO_API_KEY`, ...
//!
//! Secrets are held as [`secrecy::SecretString`] and never serialized.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_file_layer, load_settings_from_path,
    settings_path,
};
pub use types::*;
