//! Schema migration for the settings document.
//!
//! Each step is a pure function lifting a document from version `n` to
//! `n + 1`. Steps run in order starting at the document's recorded version,
//! after which any keys introduced since are backfilled from defaults.

use serde_json::{json, Map, Value};

use super::types::{DEFAULT_SERVER_PORT, DEFAULT_SOUND_FILENAME};

/// Version written by this build
pub const CURRENT_SCHEMA_VERSION: u64 = 3;

/// Key recording the schema version inside the document
pub const SCHEMA_VERSION_KEY: &str = "schema_version";

type MigrationStep = fn(&mut Map<String, Value>);

/// Ordered migration chain, keyed by the version each step starts from
const MIGRATIONS: &[(u64, MigrationStep)] = &[
    (0, ocr_captcha_to_object),
    (1, fold_play_sound),
    (2, server_port_to_integer),
];

/// What `migrate` did to a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub from_version: u64,
    pub to_version: u64,
    /// Whether the document differs from what was loaded
    pub changed: bool,
}

/// Schema version recorded in a document; documents without one are version 0.
pub fn schema_version(document: &Map<String, Value>) -> u64 {
    document
        .get(SCHEMA_VERSION_KEY)
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// Bring a document up to the current schema.
///
/// Documents written by a newer build keep their version; they only get
/// missing keys backfilled.
pub fn migrate(document: &mut Map<String, Value>, defaults: &Map<String, Value>) -> MigrationOutcome {
    let original = document.clone();
    let from_version = schema_version(document);
    let mut version = from_version;

    for (step_from, step) in MIGRATIONS {
        if version == *step_from {
            step(document);
            version += 1;
        }
    }

    backfill(document, defaults);

    if from_version <= CURRENT_SCHEMA_VERSION {
        document.insert(SCHEMA_VERSION_KEY.to_string(), json!(version));
    }

    MigrationOutcome {
        from_version,
        to_version: version,
        changed: *document != original,
    }
}

/// Recursively insert keys present in `defaults` but missing from `target`.
/// Existing values are never replaced and extra keys are kept.
pub fn backfill(target: &mut Map<String, Value>, defaults: &Map<String, Value>) {
    for (key, default_value) in defaults {
        match target.get_mut(key) {
            None => {
                target.insert(key.clone(), default_value.clone());
            }
            Some(Value::Object(nested)) => {
                if let Value::Object(nested_defaults) = default_value {
                    backfill(nested, nested_defaults);
                }
            }
            Some(_) => {}
        }
    }
}

/// 0 -> 1: `ocr_captcha: bool` becomes `ocr_captcha: { enable: bool }`
fn ocr_captcha_to_object(document: &mut Map<String, Value>) {
    if let Some(Value::Bool(enabled)) = document.get("ocr_captcha") {
        let enabled = *enabled;
        document.insert("ocr_captcha".to_string(), json!({ "enable": enabled }));
    }
}

/// 1 -> 2: flat captcha sound keys fold into `advanced.play_sound`
fn fold_play_sound(document: &mut Map<String, Value>) {
    let Some(Value::Object(advanced)) = document.get_mut("advanced") else {
        return;
    };
    if advanced.contains_key("play_sound") {
        return;
    }
    if !advanced.contains_key("play_captcha_sound") && !advanced.contains_key("captcha_sound_filename") {
        return;
    }

    let enabled = advanced
        .remove("play_captcha_sound")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    let filename = advanced
        .remove("captcha_sound_filename")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_SOUND_FILENAME.to_string());

    advanced.insert(
        "play_sound".to_string(),
        json!({ "ticket": enabled, "order": enabled, "filename": filename }),
    );
}

/// 2 -> 3: `advanced.server_port` stored as text becomes a number
fn server_port_to_integer(document: &mut Map<String, Value>) {
    let Some(Value::Object(advanced)) = document.get_mut("advanced") else {
        return;
    };
    if let Some(Value::String(port)) = advanced.get("server_port") {
        let port = port.trim().parse::<u16>().unwrap_or(DEFAULT_SERVER_PORT);
        advanced.insert("server_port".to_string(), json!(port));
    }
}
