use crate::formset::{ident, FormsetManager};
use crate::model::ManagementConfig;
use serde_json::{Map, Value as JsonValue};

/// Flat name -> value map the page would POST, management fields included.
///
/// A name carried by several fields maps to the array of their values.
pub fn build_payload(formset: &FormsetManager, management: &ManagementConfig) -> Map<String, JsonValue> {
    let mut out = Map::new();
    for (name, value) in formset.submission() {
        // Repeated names (attributes left on the template index) keep every value in order.
        match out.get_mut(&name) {
            Some(JsonValue::Array(values)) => values.push(JsonValue::String(value)),
            Some(prev) => {
                let first = prev.take();
                *prev = JsonValue::Array(vec![first, JsonValue::String(value)]);
            }
            None => {
                out.insert(name, JsonValue::String(value));
            }
        }
    }
    let ns = formset.namespace();
    if let Some(v) = management.initial_forms {
        out.insert(ident::management_name(ns, "INITIAL_FORMS"), JsonValue::String(v.to_string()));
    }
    if let Some(v) = management.max_num_forms {
        out.insert(ident::management_name(ns, "MAX_NUM_FORMS"), JsonValue::String(v.to_string()));
    }
    out
}

pub fn payload_pretty(formset: &FormsetManager, management: &ManagementConfig) -> String {
    let v = JsonValue::Object(build_payload(formset, management));
    serde_json::to_string_pretty(&v).unwrap_or_else(|_| "{}".to_string())
}
