//! Raw configuration source readers
//!
//! Every reader takes its input explicitly instead of touching process
//! globals, so assembly is repeatable and safe to drive from parallel tests.
//! The CLI and environment readers are total: malformed input is taken
//! best-effort, never reported as an error.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::config::merge::RawConfigMap;
use crate::config::schema::{
    DATA_DIR_KEY, DEV_KEY, NATS_URL_KEY, NON_FLAG_ARGS_KEY, SERVICE_NAME_KEY,
};
use crate::error::{Error, Result};

/// Endpoint supplied by the dev defaults when no source names one.
pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// Caller-supplied overrides, passed through verbatim. Highest precedence.
pub fn overrides_source(overrides: &HashMap<String, String>) -> RawConfigMap {
    overrides
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect()
}

/// Parse a command line token list into configuration parameters.
///
/// Accepted shapes: `--KEY=VALUE`, `--KEY VALUE` (next token not starting
/// with `--`), and bare `--KEY` as a boolean. Keys are uppercased. Only keys
/// that were actually supplied appear in the map, except `DEV` which is
/// always present. Tokens that belong to no flag collect into
/// `NON_FLAG_ARGS`.
pub fn cli_source(args: &[String]) -> RawConfigMap {
    let mut map = RawConfigMap::new();
    let mut positional = Vec::new();

    let mut tokens = args.iter().peekable();
    while let Some(token) = tokens.next() {
        let Some(flag) = token.strip_prefix("--") else {
            positional.push(Value::String(token.clone()));
            continue;
        };
        if flag.is_empty() {
            continue;
        }

        if let Some((key, value)) = flag.split_once('=') {
            map.insert(key.to_uppercase(), Value::String(value.to_string()));
        } else if let Some(value) = tokens.next_if(|next| !next.starts_with("--")) {
            map.insert(flag.to_uppercase(), Value::String(value.clone()));
        } else {
            map.insert(flag.to_uppercase(), Value::Bool(true));
        }
    }

    // the development flag is the one parameter that is always reported
    map.entry(DEV_KEY).or_insert(Value::Bool(false));

    if !positional.is_empty() {
        map.insert(NON_FLAG_ARGS_KEY.to_string(), Value::Array(positional));
    }

    map
}

/// Read an environment snapshot into configuration parameters.
///
/// Keys are uppercased. Empty-valued entries are dropped so they cannot
/// shadow non-empty values from lower-precedence sources.
pub fn env_source<I>(vars: I) -> RawConfigMap
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut map = RawConfigMap::new();
    for (key, value) in vars {
        if value.is_empty() {
            continue;
        }
        map.insert(key.to_uppercase(), Value::String(value));
    }
    map
}

/// Fallback parameters for development mode: a local endpoint, a stable
/// generated service name and an absolute path to a conventional data
/// directory.
///
/// Fails when the data directory cannot be resolved to an absolute path.
pub fn dev_defaults_source() -> Result<RawConfigMap> {
    let data_dir = std::path::absolute("data").map_err(|source| Error::PathResolution {
        path: "data".to_string(),
        source,
    })?;

    let mut map = RawConfigMap::new();
    map.insert(
        NATS_URL_KEY.to_string(),
        Value::String(DEFAULT_NATS_URL.to_string()),
    );
    map.insert(
        SERVICE_NAME_KEY.to_string(),
        Value::String(format!("dev-{}", std::process::id())),
    );
    map.insert(
        DATA_DIR_KEY.to_string(),
        Value::String(data_dir.to_string_lossy().into_owned()),
    );
    Ok(map)
}

/// Read and parse a JSON config file.
///
/// Fails distinctly on an unreadable file and on unparsable content. When
/// `key` is given, the named top-level member is used instead of the root
/// object and must itself be an object.
pub fn file_source(path: &str, key: Option<&str>) -> Result<RawConfigMap> {
    let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigFileRead {
        path: path.to_string(),
        source,
    })?;

    let parsed: Value =
        serde_json::from_str(&contents).map_err(|err| Error::ConfigFileParse {
            path: path.to_string(),
            reason: err.to_string(),
        })?;

    let Value::Object(mut root) = parsed else {
        return Err(Error::ConfigFileParse {
            path: path.to_string(),
            reason: "top-level value is not an object".to_string(),
        });
    };

    let Some(key) = key else {
        debug!(path, "loaded config file");
        return Ok(root);
    };

    match root.remove(key) {
        Some(Value::Object(section)) => {
            debug!(path, key, "loaded config file section");
            Ok(section)
        }
        Some(_) => Err(Error::ConfigFileParse {
            path: path.to_string(),
            reason: format!("key {key} does not hold an object"),
        }),
        None => Err(Error::ConfigFileParse {
            path: path.to_string(),
            reason: format!("key {key} not found"),
        }),
    }
}
