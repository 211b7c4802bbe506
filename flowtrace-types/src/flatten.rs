//! Flattening a JSON value into dotted-path leaves. Shared by the
//! Parameterizer (body diffing), the ChainDetector (data-flow source
//! discovery), and the DefinitionAssembler (`extractFields`).

use serde_json::Value;

/// Flatten `value` into `(dotted_path, stringified_leaf)` pairs. Object
/// keys join with `.`; array elements join with `.{index}`. Leaves are
/// strings, numbers, and booleans rendered as their plain text form;
/// `null` and empty containers are skipped.
pub fn flatten_json(value: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(value, String::new(), &mut out);
    out
}

fn flatten_into(value: &Value, prefix: String, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(child, path, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let path = if prefix.is_empty() {
                    index.to_string()
                } else {
                    format!("{prefix}.{index}")
                };
                flatten_into(child, path, out);
            }
        }
        Value::Null => {}
        Value::String(s) => out.push((prefix, s.clone())),
        Value::Number(n) => out.push((prefix, n.to_string())),
        Value::Bool(b) => out.push((prefix, b.to_string())),
    }
}

/// Flatten, capped to a maximum nesting depth. Arrays contribute only
/// their first element past the cap (used by `extractFields`, which
/// takes a representative rather than every array member).
pub fn flatten_json_capped(value: &Value, max_depth: usize) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_capped_into(value, String::new(), 0, max_depth, &mut out);
    out
}

fn flatten_capped_into(
    value: &Value,
    prefix: String,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<(String, String)>,
) {
    if depth >= max_depth {
        if let Some(leaf) = scalar_string(value) {
            out.push((prefix, leaf));
        }
        return;
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_capped_into(child, path, depth + 1, max_depth, out);
            }
        }
        Value::Array(items) => {
            if let Some(first) = items.first() {
                let path = if prefix.is_empty() {
                    "0".to_string()
                } else {
                    format!("{prefix}.0")
                };
                flatten_capped_into(first, path, depth + 1, max_depth, out);
            }
        }
        _ => {
            if let Some(leaf) = scalar_string(value) {
                out.push((prefix, leaf));
            }
        }
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_nested_object() {
        let v = json!({"user": {"id": 1, "name": "ada"}});
        let mut flat = flatten_json(&v);
        flat.sort();
        assert_eq!(
            flat,
            vec![
                ("user.id".to_string(), "1".to_string()),
                ("user.name".to_string(), "ada".to_string()),
            ]
        );
    }

    #[test]
    fn flattens_array_with_index_paths() {
        let v = json!({"items": [{"sku": "a"}, {"sku": "b"}]});
        let mut flat = flatten_json(&v);
        flat.sort();
        assert_eq!(
            flat,
            vec![
                ("items.0.sku".to_string(), "a".to_string()),
                ("items.1.sku".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn null_leaves_are_skipped() {
        let v = json!({"a": null, "b": 1});
        assert_eq!(flatten_json(&v), vec![("b".to_string(), "1".to_string())]);
    }

    #[test]
    fn capped_depth_takes_first_array_element_only() {
        let v = json!({"items": [{"sku": "a"}, {"sku": "b"}], "total": 2});
        let mut flat = flatten_json_capped(&v, 3);
        flat.sort();
        assert_eq!(
            flat,
            vec![
                ("items.0.sku".to_string(), "a".to_string()),
                ("total".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn depth_cap_stops_descending_into_objects() {
        let v = json!({"a": {"b": {"c": "deep"}}});
        // at depth 1, "a" is an object with no scalar form of its own
        assert_eq!(flatten_json_capped(&v, 1), Vec::<(String, String)>::new());
    }
}
