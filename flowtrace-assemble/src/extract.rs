//! `extractFields` (spec.md §4.6, step 8): recursively flatten a step's
//! response body to depth 3 and describe each leaf as a candidate field.

use flowtrace_types::{FieldExtraction, NetworkEvent, ParamType};

const MAX_DEPTH: usize = 3;

fn field_name(path: &str) -> String {
    path.rsplit('.').next().unwrap_or(path).to_string()
}

/// Flatten a step's response body into candidate `FieldExtraction`s.
/// Returns an empty list if there's no body or it isn't JSON.
pub fn extract_fields(event: &NetworkEvent) -> Vec<FieldExtraction> {
    let Some(body) = &event.response_body else {
        return vec![];
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return vec![];
    };

    flowtrace_types::flatten_json_capped(&value, MAX_DEPTH)
        .into_iter()
        .map(|(path, leaf)| FieldExtraction {
            name: field_name(&path),
            json_path: path,
            field_type: ParamType::infer([leaf.as_str()]),
            description: "Extracted from the step's response body".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn net(body: Option<&str>) -> NetworkEvent {
        NetworkEvent {
            timestamp: 0,
            method: "GET".to_string(),
            url: "https://api.example.com/x".to_string(),
            request_headers: HashMap::new(),
            request_body: None,
            response_status: 200,
            response_headers: HashMap::new(),
            response_body: body.map(str::to_string),
        }
    }

    #[test]
    fn extracts_leaves_from_nested_body() {
        let event = net(Some(r#"{"user":{"id":42,"name":"ada"}}"#));
        let mut fields = extract_fields(&event);
        fields.sort_by(|a, b| a.json_path.cmp(&b.json_path));
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "id");
        assert_eq!(fields[0].field_type, ParamType::Number);
        assert_eq!(fields[1].name, "name");
        assert_eq!(fields[1].field_type, ParamType::String);
    }

    #[test]
    fn missing_body_yields_no_fields() {
        let event = net(None);
        assert!(extract_fields(&event).is_empty());
    }

    #[test]
    fn non_json_body_yields_no_fields() {
        let event = net(Some("not json"));
        assert!(extract_fields(&event).is_empty());
    }
}
