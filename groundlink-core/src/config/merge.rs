//! First-writer-wins merging of raw configuration maps

use serde_json::{Map, Value};

/// Untyped configuration accumulated from all sources, keyed by uppercase
/// parameter name. Values are plain JSON values: the readers produce strings,
/// booleans and string arrays, the file source may contribute arbitrary JSON.
pub type RawConfigMap = Map<String, Value>;

/// Merge `updates` into `base`, leaving existing entries untouched.
///
/// Sources are merged from highest precedence to lowest, so an entry that is
/// already present always wins; later sources only fill gaps. This is the
/// inverse of naive last-write-wins layering.
pub fn merge_missing(base: &mut RawConfigMap, updates: RawConfigMap) {
    for (key, value) in updates {
        base.entry(key).or_insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(pairs: &[(&str, Value)]) -> RawConfigMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_merge_fills_gaps_only() {
        let mut base = map(&[("SERVICE_NAME", json!("a"))]);
        merge_missing(
            &mut base,
            map(&[("SERVICE_NAME", json!("b")), ("DATA_DIR", json!("/tmp"))]),
        );

        assert_eq!(base["SERVICE_NAME"], json!("a"));
        assert_eq!(base["DATA_DIR"], json!("/tmp"));
    }

    #[test]
    fn test_merge_disjoint_sets_is_order_insensitive() {
        let first = map(&[("A", json!("1")), ("B", json!(true))]);
        let second = map(&[("C", json!("3"))]);

        let mut left = RawConfigMap::new();
        merge_missing(&mut left, first.clone());
        merge_missing(&mut left, second.clone());

        let mut right = RawConfigMap::new();
        merge_missing(&mut right, second);
        merge_missing(&mut right, first);

        assert_eq!(left, right);
    }

    #[test]
    fn test_set_key_never_changed_by_later_sources() {
        let mut base = RawConfigMap::new();
        merge_missing(&mut base, map(&[("NATS_URL", json!("nats://first"))]));
        merge_missing(&mut base, map(&[("NATS_URL", json!("nats://second"))]));
        merge_missing(&mut base, map(&[("NATS_URL", json!(false))]));

        assert_eq!(base["NATS_URL"], json!("nats://first"));
    }
}
