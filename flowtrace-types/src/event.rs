//! Raw recorded events — the input to the analysis pipeline.
//!
//! `DomEvent` and `NetworkEvent` are produced by the browser-side recorder
//! (out of scope for this core, see spec.md §1) and consumed read-only.
//! Timestamps share one monotonic-ms clock per session.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What kind of user interaction produced a [`DomEvent`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomEventKind {
    /// A pointer click.
    Click,
    /// A text input changed value while focused (fires on every keystroke
    /// batch, not just on blur).
    Input,
    /// A form control's value was committed (blur, select change).
    Change,
    /// A form was submitted.
    Submit,
    /// The page navigated to a new URL.
    Navigate,
    /// A key was pressed.
    Keydown,
}

impl DomEventKind {
    /// Whether this kind of interaction legitimately triggers a delayed
    /// cascade of follow-up requests (full-page navigations and form
    /// submits), and therefore needs the wider correlation window.
    pub fn triggers_cascade(self) -> bool {
        matches!(self, Self::Navigate | Self::Submit)
    }
}

/// Descriptive attributes of the DOM element an event targeted. Carried
/// alongside selectors so downstream stages (and, eventually, the
/// intelligent-playback loop's deterministic sibling) can fall back to
/// semantic matching when a selector no longer resolves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    /// HTML tag name, lowercased (`"button"`, `"input"`).
    pub tag: String,
    /// A selection of the element's HTML attributes.
    #[serde(default)]
    pub attrs: HashMap<String, String>,
    /// Visible text content, truncated to a short preview.
    pub inner_text: Option<String>,
    /// `aria-label`, if present.
    pub aria_label: Option<String>,
    /// Text of any `<label>` elements associated with this form field.
    #[serde(default)]
    pub form_labels: Vec<String>,
}

/// One user interaction captured by the recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomEvent {
    /// Milliseconds on the session's monotonic clock.
    pub timestamp: i64,
    /// What kind of interaction this was.
    pub kind: DomEventKind,
    /// The selector the recorder considers most stable.
    pub primary_selector: String,
    /// Additional selectors to try if the primary one fails to resolve.
    #[serde(default)]
    pub fallback_selectors: Vec<String>,
    /// Descriptive attributes of the targeted element.
    pub element: ElementDescriptor,
    /// The value entered or selected, if any. MUST be redacted by the
    /// recorder already when the element looks like a secret input
    /// (password fields, etc.) — this core never un-redacts it.
    pub value: Option<String>,
}

/// One HTTP exchange captured by the recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEvent {
    /// Milliseconds on the same monotonic clock as [`DomEvent::timestamp`].
    pub timestamp: i64,
    /// HTTP method, uppercased (`"GET"`, `"POST"`, ...).
    pub method: String,
    /// The request URL, including query string.
    pub url: String,
    /// Request headers. Callers should treat lookups as case-insensitive —
    /// use [`NetworkEvent::header`] rather than indexing the map directly.
    #[serde(default)]
    pub request_headers: HashMap<String, String>,
    /// Request body, if any (bodies may be absent or truncated upstream).
    pub request_body: Option<String>,
    /// HTTP response status code.
    pub response_status: u16,
    /// Response headers.
    #[serde(default)]
    pub response_headers: HashMap<String, String>,
    /// Response body, if any.
    pub response_body: Option<String>,
}

impl NetworkEvent {
    /// Case-insensitive request header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Case-insensitive response header lookup.
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The response `content-type`, stripped of any `; charset=...` suffix.
    pub fn content_type(&self) -> Option<&str> {
        self.response_header("content-type")
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
    }

    /// Host + path (scheme and query stripped), used for cross-session
    /// "same step" matching. Falls back to the raw URL if it doesn't parse.
    pub fn host_path(&self) -> String {
        match url::Url::parse(&self.url) {
            Ok(u) => format!("{}{}", u.host_str().unwrap_or(""), u.path()),
            Err(_) => self.url.clone(),
        }
    }
}
