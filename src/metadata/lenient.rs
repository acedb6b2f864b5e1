//! Field-level fallbacks for hand-edited metadata
//!
//! A `.rogueos` file is only malformed when it is not a JSON object. Inside
//! it, a field with an unexpected shape falls back to its default and a map
//! entry that cannot be read is dropped on its own.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Deserialize `T`, falling back to `T::default()` when the value does not fit.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match serde_json::from_value(value.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(%value, error = %e, "Unreadable metadata field; using default");
            T::default()
        }
    })
}

/// Deserialize a name-keyed map entry by entry; unreadable entries are
/// skipped and a non-object yields an empty map.
pub(crate) fn entries<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Object(raw) = Value::deserialize(deserializer)? else {
        warn!("Metadata section is not an object; ignoring it");
        return Ok(BTreeMap::new());
    };
    let mut out = BTreeMap::new();
    for (name, value) in raw {
        match serde_json::from_value(value) {
            Ok(entry) => {
                out.insert(name, entry);
            }
            Err(e) => warn!(entry = %name, error = %e, "Skipping unreadable metadata entry"),
        }
    }
    Ok(out)
}
