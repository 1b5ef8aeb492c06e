//! Layer merging for configuration values
//!
//! Tables merge key by key; arrays and scalars from the later layer replace
//! the earlier value outright. An explicit `null` clears a value.

use serde_json::Value;

/// Overlay `overlay` onto `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let value = match merged.remove(&key) {
                    Some(previous) => deep_merge(previous, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay,
    }
}

/// Fold layers lowest precedence first.
pub fn merge_layers<I>(layers: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    layers.into_iter().fold(Value::Null, deep_merge)
}
