//! The browser driver's contract with the core: a structured view of the
//! current page, and the result of dispatching one action against it.

use serde::{Deserialize, Serialize};

/// Pixel bounding box of an element, as reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge, in page pixels.
    pub x: f64,
    /// Top edge, in page pixels.
    pub y: f64,
    /// Width, in page pixels.
    pub width: f64,
    /// Height, in page pixels.
    pub height: f64,
}

/// One interactive element on the page. The `index` is the sole handle the
/// decision gateway uses to reference it; callers resolve index → selector
/// before dispatching (spec.md §4.7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveElement {
    /// Position within [`PageSnapshot::elements`].
    pub index: u32,
    /// HTML tag name, lowercased.
    pub tag: String,
    /// Input `type` attribute, if applicable.
    pub element_type: Option<String>,
    /// A selector that uniquely identifies this element at snapshot time.
    pub selector: String,
    /// `aria-label`, if any.
    pub aria_label: Option<String>,
    /// Visible text content.
    pub text_content: Option<String>,
    /// Placeholder text, if any.
    pub placeholder: Option<String>,
    /// `name` attribute, if any.
    pub name: Option<String>,
    /// ARIA role, if any.
    pub role: Option<String>,
    /// Whether the element is currently disabled.
    pub disabled: bool,
    /// Screen-space bounding box.
    pub bounding_box: BoundingBox,
}

/// A form on the page, with its fields referencing [`PageSnapshot::elements`]
/// by index rather than duplicating their descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSummary {
    /// A selector for the `<form>` element itself.
    pub selector: String,
    /// Indices into [`PageSnapshot::elements`] for this form's fields.
    pub field_indices: Vec<u32>,
}

/// One heading on the page, for orienting a generative-mode decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level, 1-6.
    pub level: u8,
    /// Visible text.
    pub text: String,
}

/// A structured view of the current page, captured fresh every loop
/// iteration (spec.md §4.7 "PageSnapshot").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Current page URL.
    pub url: String,
    /// Current page title.
    pub title: String,
    /// Every interactive element the driver found, in DOM order.
    pub elements: Vec<InteractiveElement>,
    /// Forms on the page.
    pub forms: Vec<FormSummary>,
    /// Whether a modal is currently open.
    pub modal_open: bool,
    /// The modal's selector, if `modal_open`.
    pub modal_selector: Option<String>,
    /// Headings on the page, for generative-mode orientation.
    pub headings: Vec<Heading>,
}

impl PageSnapshot {
    /// Resolve a gateway-chosen element index to its selector. Returns
    /// `None` if the index is out of range — the gateway referenced a
    /// stale snapshot, which the loop treats as an action failure.
    pub fn selector_for(&self, index: u32) -> Option<&str> {
        self.elements.get(index as usize).map(|e| e.selector.as_str())
    }
}

/// The outcome of dispatching one action against the live page. Driver
/// failures never throw; they resolve here (spec.md §6 "Browser driver").
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    /// Whether the action succeeded.
    pub success: bool,
    /// A human-readable reason, present iff `!success`.
    pub error: Option<String>,
}

impl ActionResult {
    /// A successful result.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed result with a reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(index: u32, selector: &str) -> InteractiveElement {
        InteractiveElement {
            index,
            tag: "button".to_string(),
            element_type: None,
            selector: selector.to_string(),
            aria_label: None,
            text_content: None,
            placeholder: None,
            name: None,
            role: None,
            disabled: false,
            bounding_box: BoundingBox { x: 0.0, y: 0.0, width: 10.0, height: 10.0 },
        }
    }

    #[test]
    fn selector_for_resolves_by_index() {
        let snap = PageSnapshot {
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            elements: vec![element(0, "#a"), element(1, "#b")],
            forms: vec![],
            modal_open: false,
            modal_selector: None,
            headings: vec![],
        };
        assert_eq!(snap.selector_for(1), Some("#b"));
        assert_eq!(snap.selector_for(5), None);
    }
}
