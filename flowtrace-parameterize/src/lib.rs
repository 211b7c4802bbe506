#![deny(missing_docs)]
//! Stage 3 of the analysis pipeline: identify parts of requests that
//! vary across recordings and name them as user-supplied inputs.

mod diff;
mod matching;

pub use matching::{match_steps, reference_steps, ReferenceStep};

use flowtrace_gateway::schema::{DomEventSummary, ParameterizeRequest, VaryingPart};
use flowtrace_gateway::Gateway;
use flowtrace_types::{Correlation, ParamType, ParamUsage, ParameterDef, Session, StepOrder};

/// Run Stage 3 across every session. Returns an empty list when fewer
/// than two sessions are provided, since parameterization is inherently
/// a diff operation (spec.md §4.3).
pub async fn parameterize(
    gateway: &dyn Gateway,
    sessions: &[Session],
    correlations: &[Vec<Correlation>],
    core_indices: &[Vec<usize>],
) -> Vec<ParameterDef> {
    if sessions.len() < 2 {
        return vec![];
    }

    let ref_steps = matching::reference_steps(&correlations[0], &core_indices[0]);
    let matched_steps = matching::match_steps(sessions, correlations, core_indices);

    let mut varying_parts = vec![];
    for (step, matched) in ref_steps.iter().zip(matched_steps.iter()) {
        if matched.len() < 2 {
            continue;
        }
        let order = step.ordinal as u32;
        varying_parts.extend(diff::diff_path_segments(sessions, matched, order));
        varying_parts.extend(diff::diff_query_params(sessions, matched, order));
        varying_parts.extend(diff::diff_body(sessions, matched, order));
        varying_parts.extend(diff::diff_headers(sessions, matched, order));
    }

    if varying_parts.is_empty() {
        return vec![];
    }

    let dom_context = ref_steps
        .iter()
        .map(|step| {
            let event = &sessions[0].dom_events[step.dom_event_index];
            DomEventSummary {
                timestamp: event.timestamp,
                kind: format!("{:?}", event.kind).to_ascii_lowercase(),
                selector: event.primary_selector.clone(),
            }
        })
        .collect();

    let request = ParameterizeRequest {
        varying_parts: varying_parts.clone(),
        dom_context,
    };

    match gateway.parameterize(request).await {
        Ok(response) => response.parameters,
        Err(err) => {
            tracing::warn!(error = %err, "parameterize failed, falling back to mechanical naming");
            varying_parts.into_iter().map(mechanical_parameter).collect()
        }
    }
}

fn mechanical_parameter(part: VaryingPart) -> ParameterDef {
    let example = part.observed_values.first().cloned().unwrap_or_default();
    ParameterDef {
        name: camel_case(&part.key),
        param_type: ParamType::infer(part.observed_values.iter().map(String::as_str)),
        required: true,
        description: format!("Value observed varying at `{}`", part.key),
        example,
        used_in: vec![ParamUsage {
            step_order: StepOrder::new(part.step_order),
            location: part.location,
            key: part.key,
        }],
    }
}

/// Sanitize an arbitrary diff key (`segment_1`, `x-session`,
/// `shipping.zip`) into a camelCase identifier.
fn camel_case(key: &str) -> String {
    let mut result = String::new();
    for (i, part) in key
        .split(|c: char| !c.is_alphanumeric())
        .filter(|p| !p.is_empty())
        .enumerate()
    {
        if i == 0 {
            result.push_str(&part.to_ascii_lowercase());
        } else {
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                result.push(first.to_ascii_uppercase());
                result.push_str(&chars.as_str().to_ascii_lowercase());
            }
        }
    }
    if result.is_empty() {
        "param".to_string()
    } else {
        result
    }
}
