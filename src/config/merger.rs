//! Layering of config files.
//!
//! Later layers win at the point of conflict:
//!
//! - mappings merge key by key
//! - sequences and scalars are replaced whole
//! - a `null` removes the key inherited from earlier layers
//! - an empty file (parsed as `null`) contributes nothing

use serde_yaml::{Mapping, Value};

/// Merge `overlay` onto `base`.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in overlay_map {
                if value.is_null() {
                    merged.remove(key);
                    continue;
                }
                let next = match base_map.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Mapping(merged)
        }
        (_, overlay) => overlay.clone(),
    }
}

/// Merge layers in order, first is lowest priority.
pub fn merge_configs(layers: &[Value]) -> Value {
    layers
        .iter()
        .filter(|layer| !layer.is_null())
        .fold(Value::Mapping(Mapping::new()), |acc, layer| {
            deep_merge(&acc, layer)
        })
}
