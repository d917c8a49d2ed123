use serde::Serialize;

use crate::browsable::{Browsable, Encoding};
use crate::dom::FormNode;
use crate::form::Form;
use crate::values::Values;

/// Owned view of a form's state, for printing.
#[derive(Debug, Clone, Serialize)]
pub struct FormSummary {
    pub method: String,
    pub action: String,
    pub encoding: Encoding,
    /// Defined names in sorted order.
    pub defined: Vec<String>,
    pub fields: Values,
    pub buttons: Values,
}

impl<'s, N: FormNode, B: Browsable + ?Sized> From<&Form<'s, N, B>> for FormSummary {
    fn from(form: &Form<'s, N, B>) -> Self {
        Self {
            method: form.method().to_string(),
            action: form.action().to_string(),
            encoding: form.encoding(),
            defined: form.defined_fields().iter().cloned().collect(),
            fields: form.fields().clone(),
            buttons: form.buttons().clone(),
        }
    }
}

/// Serialize a form summary into a compact, line-oriented text format.
///
/// Example output:
/// ```text
/// form: POST https://example.com/register (url_encoded)
/// ---
/// field "age" = "55"
/// field "gender" [empty]
/// field "music" = "jazz", "fusion"
/// button "submit2" = "submitted2"
/// ```
pub fn to_compact_text(summary: &FormSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "form: {} {} ({})\n",
        summary.method, summary.action, summary.encoding
    ));
    output.push_str("---\n");

    for name in &summary.defined {
        output.push_str(&format!("field \"{name}\""));
        match summary.fields.get_all(name) {
            Some(values) => {
                output.push_str(" = ");
                output.push_str(&quote_list(values));
            }
            None => output.push_str(" [empty]"),
        }
        output.push('\n');
    }

    for (name, values) in summary.buttons.iter() {
        output.push_str(&format!("button \"{name}\" = {}\n", quote_list(values)));
    }

    output
}

fn quote_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")))
        .collect::<Vec<_>>()
        .join(", ")
}
