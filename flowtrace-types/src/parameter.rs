//! Parameters — user-supplied inputs identified by cross-session diffing
//! (Stage 3, `flowtrace-parameterize`).

use crate::id::StepOrder;
use serde::{Deserialize, Serialize};

/// The inferred scalar type of a parameter's observed values.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// Every observed value parsed as a number.
    Number,
    /// Every observed value was `"true"`/`"false"` (or JSON `true`/`false`).
    Boolean,
    /// Anything else.
    String,
}

impl ParamType {
    /// Infer a type from a set of observed string values, per spec.md §4.3
    /// ("Naming"): all parseable as numbers → number, all in {true,false} →
    /// boolean, else string.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut any = false;
        let mut all_numeric = true;
        let mut all_boolean = true;
        for v in values {
            any = true;
            if v.parse::<f64>().is_err() {
                all_numeric = false;
            }
            if v != "true" && v != "false" {
                all_boolean = false;
            }
        }
        if !any {
            return Self::String;
        }
        if all_numeric {
            Self::Number
        } else if all_boolean {
            Self::Boolean
        } else {
            Self::String
        }
    }
}

/// Where in a request a parameter's value is substituted.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamLocation {
    /// A path segment (e.g. `/orders/{orderId}`).
    Path,
    /// A query-string parameter.
    Query,
    /// A JSON body field (dotted path).
    Body,
    /// A request header.
    Header,
}

/// One place a parameter's value was observed being used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamUsage {
    /// The step this usage occurs in.
    pub step_order: StepOrder,
    /// Where in the request it appears.
    pub location: ParamLocation,
    /// The key at that location (query key, header name, dotted JSON path,
    /// or `segment_{i}` for path segments).
    pub key: String,
}

/// A user-supplied input to a workflow, identified by diffing two or more
/// recordings of the same workflow (spec.md §4.3). `ParameterDef` in the
/// data model table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    /// camelCase name, e.g. `orderId`.
    pub name: String,
    /// Inferred scalar type.
    #[serde(rename = "type")]
    pub param_type: ParamType,
    /// Whether every matched session supplied a value for this parameter.
    pub required: bool,
    /// Human-readable description (LLM-authored, or mechanical fallback).
    pub description: String,
    /// An example observed value.
    pub example: String,
    /// Every place this same semantic input appears across steps/locations.
    pub used_in: Vec<ParamUsage>,
}

impl ParameterDef {
    /// `usedIn[*].step` references an existing step order — spec.md §3
    /// Invariant 3 / §8 "parameter coverage" property.
    pub fn usages_reference_existing_steps(&self, step_count: usize) -> bool {
        self.used_in
            .iter()
            .all(|u| (u.step_order.index() as usize) < step_count)
    }
}
