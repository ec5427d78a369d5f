//! Minimal configuration schema checks

use crate::config::merge::RawConfigMap;
use crate::config::schema::{coerce_string, DATA_DIR_KEY, NATS_URL_KEY, SERVICE_NAME_KEY};
use crate::error::{Error, Result};

/// Keys that every assembled configuration must provide.
pub const REQUIRED_KEYS: [&str; 3] = [NATS_URL_KEY, SERVICE_NAME_KEY, DATA_DIR_KEY];

/// Check that every required key is present and coerces to a non-empty
/// string. Unknown keys are tolerated. The returned error names exactly the
/// keys that are missing.
pub fn assert_minimal_config(raw: &RawConfigMap) -> Result<()> {
    let missing: Vec<String> = REQUIRED_KEYS
        .iter()
        .filter(|key| {
            raw.get(**key)
                .and_then(coerce_string)
                .map_or(true, |value| value.is_empty())
        })
        .map(|key| key.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingConfig(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(pairs: &[(&str, serde_json::Value)]) -> RawConfigMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_complete_minimal_config_passes() {
        let map = raw(&[
            ("NATS_URL", json!("nats://localhost:4222")),
            ("SERVICE_NAME", json!("svc")),
            ("DATA_DIR", json!("/tmp")),
            ("EXTRA", json!({"anything": true})),
        ]);
        assert_minimal_config(&map).unwrap();
    }

    #[test]
    fn test_missing_keys_are_named() {
        let map = raw(&[("NATS_URL", json!("nats://localhost:4222"))]);

        let err = assert_minimal_config(&map).unwrap_err();
        match err {
            Error::MissingConfig(missing) => {
                assert_eq!(missing, vec!["SERVICE_NAME", "DATA_DIR"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_suggests_dev_mode() {
        let err = assert_minimal_config(&RawConfigMap::new()).unwrap_err();
        assert!(err.to_string().contains("--dev"));
        assert!(err.to_string().contains("DATA_DIR"));
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let map = raw(&[
            ("NATS_URL", json!("")),
            ("SERVICE_NAME", json!("svc")),
            ("DATA_DIR", json!("/tmp")),
        ]);

        let err = assert_minimal_config(&map).unwrap_err();
        assert!(err.to_string().contains("NATS_URL"));
    }

    #[test]
    fn test_uncoercible_value_counts_as_missing() {
        let map = raw(&[
            ("NATS_URL", json!(["nats://a"])),
            ("SERVICE_NAME", json!("svc")),
            ("DATA_DIR", json!("/tmp")),
        ]);

        assert!(assert_minimal_config(&map).is_err());
    }
}
