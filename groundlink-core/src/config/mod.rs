//! Configuration assembly from layered sources

pub mod merge;
pub mod schema;
pub mod sources;
pub mod validate;

pub use merge::{merge_missing, RawConfigMap};
pub use schema::{CustomConfig, ResolvedConfig};

use std::collections::HashMap;

use serde_json::Value;
use tracing::info;

use crate::error::Result;

/// Assemble the service configuration from all sources.
///
/// Fixed precedence, highest first: caller overrides, command line tokens,
/// environment snapshot, development defaults (only when the accumulated
/// `DEV` is true), config file (only when the accumulated `CONFIG_FILE` is a
/// non-empty string). Each source only fills keys the higher-precedence
/// sources left unset.
pub fn assemble_config(
    overrides: &HashMap<String, String>,
    args: &[String],
    vars: &[(String, String)],
) -> Result<ResolvedConfig> {
    let mut raw = RawConfigMap::new();

    merge_missing(&mut raw, sources::overrides_source(overrides));
    merge_missing(&mut raw, sources::cli_source(args));
    merge_missing(&mut raw, sources::env_source(vars.iter().cloned()));

    let dev = raw
        .get(schema::DEV_KEY)
        .and_then(schema::coerce_bool)
        .unwrap_or(false);
    if dev {
        info!("running in development mode, using default values for missing parameters");
        merge_missing(&mut raw, sources::dev_defaults_source()?);
    }

    let config_file = raw
        .get(schema::CONFIG_FILE_KEY)
        .and_then(Value::as_str)
        .map(str::to_owned);
    if let Some(path) = config_file.filter(|path| !path.is_empty()) {
        let config_key = raw
            .get(schema::CONFIG_KEY_KEY)
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .map(str::to_owned);
        let section = sources::file_source(&path, config_key.as_deref())?;
        merge_missing(&mut raw, section);
    }

    validate::assert_minimal_config(&raw)?;

    Ok(schema::decode(raw))
}
