//! Typed service configuration and weak decoding

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::merge::RawConfigMap;

/// Development mode flag, boolean
pub const DEV_KEY: &str = "DEV";
/// URL of the NATS server the service connects to
pub const NATS_URL_KEY: &str = "NATS_URL";
/// Username for the bus handshake, only used together with the password
pub const NATS_USER_KEY: &str = "NATS_USER";
/// Password for the bus handshake, only used together with the username
pub const NATS_PASSWORD_KEY: &str = "NATS_PASSWORD";
/// Path to a JSON config file read during startup
pub const CONFIG_FILE_KEY: &str = "CONFIG_FILE";
/// Optional key selecting a sub-object of the config file
pub const CONFIG_KEY_KEY: &str = "CONFIG_KEY";
/// Name of the service, also reported by the health check
pub const SERVICE_NAME_KEY: &str = "SERVICE_NAME";
/// Directory where the service stores persistent data
pub const DATA_DIR_KEY: &str = "DATA_DIR";
/// Trailing non-flag command line tokens
pub const NON_FLAG_ARGS_KEY: &str = "NON_FLAG_ARGS";

/// Configuration that matched no recognized key, preserved verbatim for
/// downstream consumers.
pub type CustomConfig = Map<String, Value>;

/// The assembled service configuration from all available sources.
///
/// Created once per start and immutable afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedConfig {
    /// Whether the service runs in development mode
    pub dev: bool,
    /// URL the NATS client uses to reach the server
    pub nats_url: String,
    /// Username for credentialed bus authentication
    pub nats_user: Option<String>,
    /// Password for credentialed bus authentication
    pub nats_password: Option<String>,
    /// Path of the config file read during startup, if any
    pub config_file: Option<String>,
    /// Key in the config file's root object that configures this service
    pub config_key: Option<String>,
    /// Name of the service
    pub service_name: String,
    /// Path to the data directory, as configured (not yet absolute)
    pub data_dir: String,
    /// Additional command line tokens passed after all flags
    pub non_flag_args: Vec<String>,
    /// Unrecognized configuration from all sources
    pub custom: CustomConfig,
}

/// Decode the accumulated raw map into a [`ResolvedConfig`].
///
/// Recognized keys are coerced weakly and never fail on absence; everything
/// else lands unchanged in the overflow bag. Required keys have already been
/// proven string-coercible by the minimal-config validation.
pub fn decode(mut raw: RawConfigMap) -> ResolvedConfig {
    let dev = take(&mut raw, DEV_KEY, coerce_bool).unwrap_or(false);
    let nats_url = take(&mut raw, NATS_URL_KEY, coerce_string).unwrap_or_default();
    let nats_user = take(&mut raw, NATS_USER_KEY, coerce_string);
    let nats_password = take(&mut raw, NATS_PASSWORD_KEY, coerce_string);
    let config_file = take(&mut raw, CONFIG_FILE_KEY, coerce_string);
    let config_key = take(&mut raw, CONFIG_KEY_KEY, coerce_string);
    let service_name = take(&mut raw, SERVICE_NAME_KEY, coerce_string).unwrap_or_default();
    let data_dir = take(&mut raw, DATA_DIR_KEY, coerce_string).unwrap_or_default();
    let non_flag_args = take(&mut raw, NON_FLAG_ARGS_KEY, coerce_string_vec).unwrap_or_default();

    ResolvedConfig {
        dev,
        nats_url,
        nats_user,
        nats_password,
        config_file,
        config_key,
        service_name,
        data_dir,
        non_flag_args,
        custom: raw,
    }
}

fn take<T>(
    raw: &mut RawConfigMap,
    key: &str,
    coerce: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    raw.remove(key).and_then(|value| coerce(&value))
}

/// Weakly coerce a JSON value to a string.
pub(crate) fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Weakly coerce a JSON value to a boolean.
pub(crate) fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

/// Weakly coerce a JSON value to a string sequence. A single scalar becomes
/// a one-element sequence.
fn coerce_string_vec(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(items.iter().filter_map(coerce_string).collect()),
        other => coerce_string(other).map(|s| vec![s]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(pairs: &[(&str, Value)]) -> RawConfigMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_decode_recognized_fields() {
        let config = decode(raw(&[
            ("DEV", json!(true)),
            ("NATS_URL", json!("nats://localhost:4222")),
            ("NATS_USER", json!("user")),
            ("NATS_PASSWORD", json!("pass")),
            ("SERVICE_NAME", json!("svc")),
            ("DATA_DIR", json!("/tmp/data")),
            ("NON_FLAG_ARGS", json!(["a", "b"])),
        ]));

        assert!(config.dev);
        assert_eq!(config.nats_url, "nats://localhost:4222");
        assert_eq!(config.nats_user.as_deref(), Some("user"));
        assert_eq!(config.nats_password.as_deref(), Some("pass"));
        assert_eq!(config.service_name, "svc");
        assert_eq!(config.data_dir, "/tmp/data");
        assert_eq!(config.non_flag_args, vec!["a", "b"]);
        assert!(config.custom.is_empty());
    }

    #[test]
    fn test_decode_preserves_unrecognized_keys_unchanged() {
        let config = decode(raw(&[
            ("SERVICE_NAME", json!("svc")),
            ("CUSTOM_FLAG", json!(42)),
            ("NESTED", json!({"a": [1, 2]})),
        ]));

        assert_eq!(config.custom["CUSTOM_FLAG"], json!(42));
        assert_eq!(config.custom["NESTED"], json!({"a": [1, 2]}));
        assert!(!config.custom.contains_key("SERVICE_NAME"));
    }

    #[test]
    fn test_decode_never_fails_on_unset_optionals() {
        let config = decode(RawConfigMap::new());

        assert!(!config.dev);
        assert!(config.nats_user.is_none());
        assert!(config.config_file.is_none());
        assert!(config.non_flag_args.is_empty());
    }

    #[test]
    fn test_weak_string_coercion() {
        assert_eq!(coerce_string(&json!("x")).as_deref(), Some("x"));
        assert_eq!(coerce_string(&json!(true)).as_deref(), Some("true"));
        assert_eq!(coerce_string(&json!(42)).as_deref(), Some("42"));
        assert_eq!(coerce_string(&json!(["x"])), None);
    }

    #[test]
    fn test_weak_bool_coercion() {
        assert_eq!(coerce_bool(&json!(true)), Some(true));
        assert_eq!(coerce_bool(&json!("TRUE")), Some(true));
        assert_eq!(coerce_bool(&json!("0")), Some(false));
        assert_eq!(coerce_bool(&json!(1)), Some(true));
        assert_eq!(coerce_bool(&json!("maybe")), None);
    }

    #[test]
    fn test_single_scalar_becomes_sequence() {
        let config = decode(raw(&[("NON_FLAG_ARGS", json!("only"))]));
        assert_eq!(config.non_flag_args, vec!["only"]);
    }
}
