//! `DomAction` construction (spec.md §4.6, step 6): the replay recipe for
//! a step's user interaction, with fallback selectors in priority order.

use flowtrace_types::{DomAction, DomEvent, ParamLocation, ParameterDef};

const MAX_TEXT_PREVIEW: usize = 100;

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_TEXT_PREVIEW {
        text.to_string()
    } else {
        text.chars().take(MAX_TEXT_PREVIEW).collect()
    }
}

/// Fallback selectors in the fixed priority order spec.md §4.6 names:
/// aria-label, `:contains()`, data-testid, name, id.
fn fallback_selectors(event: &DomEvent) -> Vec<String> {
    let mut out = vec![];
    if let Some(label) = &event.element.aria_label {
        out.push(format!("[aria-label=\"{label}\"]"));
    }
    if let Some(text) = &event.element.inner_text {
        if !text.is_empty() {
            out.push(format!("{}:contains(\"{}\")", event.element.tag, truncate(text)));
        }
    }
    if let Some(testid) = event.element.attrs.get("data-testid") {
        out.push(format!("[data-testid=\"{testid}\"]"));
    }
    if let Some(name) = event.element.attrs.get("name") {
        out.push(format!("[name=\"{name}\"]"));
    }
    if let Some(id) = event.element.attrs.get("id") {
        out.push(format!("#{id}"));
    }
    out
}

/// The parameter (if any) whose observed value matches this DOM event's
/// captured value and is used somewhere in this step's request — the
/// input field this parameter was typed into.
fn parameter_ref(event: &DomEvent, params: &[ParameterDef], step_order: u32) -> Option<String> {
    let value = event.value.as_deref()?;
    params
        .iter()
        .find(|p| {
            p.example == value
                && p.used_in
                    .iter()
                    .any(|u| u.step_order.index() == step_order && !matches!(u.location, ParamLocation::Header))
        })
        .map(|p| p.name.clone())
}

/// Build the `DomAction` for a step from its correlated DOM event.
pub fn build(event: &DomEvent, params: &[ParameterDef], step_order: u32) -> DomAction {
    DomAction {
        kind: event.kind,
        selector: event.primary_selector.clone(),
        fallback_selectors: fallback_selectors(event),
        aria_label: event.element.aria_label.clone(),
        text_content: event.element.inner_text.as_deref().map(truncate),
        value: event.value.clone(),
        parameter_ref: parameter_ref(event, params, step_order),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowtrace_types::{DomEventKind, ElementDescriptor, ParamUsage, StepOrder};
    use std::collections::HashMap;

    fn event(aria: Option<&str>, inner_text: Option<&str>, attrs: &[(&str, &str)], value: Option<&str>) -> DomEvent {
        DomEvent {
            timestamp: 0,
            kind: DomEventKind::Input,
            primary_selector: "#go".to_string(),
            fallback_selectors: vec![],
            element: ElementDescriptor {
                tag: "input".to_string(),
                attrs: attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
                inner_text: inner_text.map(str::to_string),
                aria_label: aria.map(str::to_string),
                form_labels: vec![],
            },
            value: value.map(str::to_string),
        }
    }

    #[test]
    fn fallback_selectors_follow_priority_order() {
        let e = event(Some("Submit"), Some("Go"), &[("data-testid", "go-btn"), ("name", "go"), ("id", "go-id")], None);
        let selectors = fallback_selectors(&e);
        assert_eq!(
            selectors,
            vec![
                "[aria-label=\"Submit\"]".to_string(),
                "input:contains(\"Go\")".to_string(),
                "[data-testid=\"go-btn\"]".to_string(),
                "[name=\"go\"]".to_string(),
                "#go-id".to_string(),
            ]
        );
    }

    #[test]
    fn long_text_is_truncated() {
        let long = "a".repeat(150);
        let e = event(None, Some(&long), &[], None);
        let action = build(&e, &[], 0);
        assert_eq!(action.text_content.unwrap().chars().count(), 100);
    }

    #[test]
    fn parameter_ref_matches_typed_value() {
        let e = event(None, None, &[], Some("42"));
        let params = vec![ParameterDef {
            name: "orderId".to_string(),
            param_type: flowtrace_types::ParamType::Number,
            required: true,
            description: "".to_string(),
            example: "42".to_string(),
            used_in: vec![ParamUsage {
                step_order: StepOrder::new(0),
                location: ParamLocation::Path,
                key: "segment_1".to_string(),
            }],
        }];
        let action = build(&e, &params, 0);
        assert_eq!(action.parameter_ref, Some("orderId".to_string()));
    }
}
