use std::collections::BTreeSet;

use tracing::debug;

use crate::dom::FormNode;
use crate::values::Values;

/// Result of a single extraction pass over a form subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedForm {
    /// Names that may be mutated, whether or not they currently hold a value.
    pub defined: BTreeSet<String>,
    pub fields: Values,
    /// Submit controls in document order.
    pub buttons: Values,
}

/// Read the submittable state of a form.
///
/// Never fails: controls without a `name` are skipped and controls without a
/// `value` are defined but start empty.
pub fn extract_form<N: FormNode>(form: &N) -> ExtractedForm {
    let mut out = ExtractedForm::default();

    for control in form.descendants(&["input", "button"]) {
        let Some(name) = control.attr("name") else {
            continue;
        };
        match control_type(&control) {
            "submit" => {
                out.buttons.add(name, control.attr("value").unwrap_or(""));
            }
            "radio" | "checkbox" => {
                out.defined.insert(name.to_string());
                if control.attr("checked").is_some() {
                    if let Some(value) = control.attr("value") {
                        out.fields.add(name, value);
                    }
                }
            }
            _ => {
                out.defined.insert(name.to_string());
                if let Some(value) = control.attr("value") {
                    out.fields.add(name, value);
                }
            }
        }
    }

    for select in form.descendants(&["select"]) {
        let Some(name) = select.attr("name") else {
            continue;
        };
        out.defined.insert(name.to_string());
        for option in select.descendants(&["option"]) {
            if option.attr("selected").is_none() {
                continue;
            }
            if let Some(value) = option.attr("value") {
                out.fields.add(name, value);
            }
        }
    }

    for area in form.descendants(&["textarea"]) {
        let Some(name) = area.attr("name") else {
            continue;
        };
        out.defined.insert(name.to_string());
        out.fields.add(name, area.text());
    }

    debug!(
        defined = out.defined.len(),
        fields = out.fields.len(),
        buttons = out.buttons.len(),
        "form extracted"
    );
    out
}

/// Effective control type. A missing `type` means `text` on inputs and
/// `submit` on buttons.
fn control_type<N: FormNode>(control: &N) -> &str {
    match control.attr("type") {
        Some(t) => t,
        None if control.tag() == "button" => "submit",
        None => "text",
    }
}
