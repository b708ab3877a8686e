//! Recursive configuration merge.
//!
//! Type-provider configuration is always the provider's defaults with the
//! bundle's overrides merged on top: override keys win, nested objects merge
//! recursively, arrays and scalars are replaced wholesale.

use serde_json::Value as JsonValue;

/// Merge `overrides` over `defaults`, recursing into nested objects.
pub fn merge_deep(defaults: &JsonValue, overrides: &JsonValue) -> JsonValue {
    match (defaults, overrides) {
        (JsonValue::Object(base), JsonValue::Object(over)) => {
            let mut merged = base.clone();
            for (key, value) in over {
                let next = match merged.get(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_deep(existing, value)
                    }
                    _ => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            JsonValue::Object(merged)
        }
        // Non-object overrides replace the default entirely.
        _ => overrides.clone(),
    }
}
