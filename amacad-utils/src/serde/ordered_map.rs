//! Module that allows to (de-)serialize a `BTreeMap` with arbitrary keys with `serde`.
//!
//! JSON objects only allow string keys. Maps keyed by composite values (e.g. a `Vec` of parameter
//! values) are therefore written as a sequence of `{"key": ..., "val": ...}` entries, in key
//! order.
//!
//! Example:
//! ```ignore
//! #[derive(Serialize, Deserialize)]
//! struct Table {
//!     #[serde(with = "amacad_utils::serde::ordered_map")]
//!     rows: BTreeMap<Vec<u32>, f64>,
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Helper struct that allows (de-)serialization of a single entry.
#[derive(Deserialize, Serialize)]
struct Entry<K, V> {
    key: K,
    val: V,
}

/// Serialize a BTreeMap as a sequence of entries.
pub fn serialize<K: Serialize, V: Serialize, S: Serializer>(
    map: &BTreeMap<K, V>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(map.iter().map(|(key, val)| Entry { key, val }))
}

/// Deserialize a BTreeMap from a sequence of entries. Later entries overwrite earlier ones with
/// the same key.
pub fn deserialize<'de, K: Deserialize<'de> + Ord, V: Deserialize<'de>, D>(
    deserializer: D,
) -> Result<BTreeMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Entry<K, V>>::deserialize(deserializer).map(|v| {
        v.into_iter()
            .map(|entry: Entry<K, V>| (entry.key, entry.val))
            .collect()
    })
}
