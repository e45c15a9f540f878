//! Versioned settings document shared with the worker.
//!
//! The document lives as `settings.json` in the application root. The
//! control plane rewrites it atomically; the worker only reads it.

mod migrate;
mod store;
mod types;

pub use migrate::{
    backfill, migrate, schema_version, MigrationOutcome, CURRENT_SCHEMA_VERSION,
    SCHEMA_VERSION_KEY,
};
pub use store::{SettingsStore, SAVE_TEMP_PREFIX, SETTINGS_FILE};
pub use types::*;

use serde_json::{json, Value};
use std::path::PathBuf;
use thiserror::Error;

/// Key under `advanced` holding the console URL; derived, never persisted
pub const REMOTE_URL_KEY: &str = "remote_url";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Settings document must be a JSON object")]
    NotAnObject,

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A fresh document at the current schema version
pub fn default_document() -> Value {
    let mut document = serde_json::to_value(Settings::default()).unwrap_or_else(|_| json!({}));
    if let Value::Object(map) = &mut document {
        map.insert(SCHEMA_VERSION_KEY.to_string(), json!(CURRENT_SCHEMA_VERSION));
    }
    document
}

/// Effective control-panel port: `advanced.server_port`, or the compiled default.
pub fn server_port(document: &Value) -> u16 {
    document
        .get("advanced")
        .and_then(|advanced| advanced.get("server_port"))
        .and_then(Value::as_u64)
        .and_then(|port| u16::try_from(port).ok())
        .filter(|port| *port != 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

/// Set the derived `advanced.remote_url` field on an outgoing document.
pub fn inject_remote_url(document: &mut Value, url: &str) {
    let Value::Object(map) = document else {
        return;
    };
    let advanced = map
        .entry("advanced")
        .or_insert_with(|| Value::Object(Default::default()));
    if let Value::Object(advanced) = advanced {
        advanced.insert(REMOTE_URL_KEY.to_string(), Value::String(url.to_string()));
    }
}

/// Drop derived fields from an incoming document before it is persisted.
pub fn strip_derived_fields(document: &mut Value) {
    if let Some(Value::Object(advanced)) = document.get_mut("advanced") {
        advanced.remove(REMOTE_URL_KEY);
    }
}
