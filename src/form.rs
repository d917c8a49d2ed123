use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, info};

use crate::browsable::{Browsable, Encoding};
use crate::dom::FormNode;
use crate::extract::extract_form;
use crate::values::Values;

#[derive(Debug, Error)]
pub enum FormError {
    /// No defined input carries this name.
    #[error("No input found with name '{0}'.")]
    ElementNotFound(String),

    /// No submit control carries this name.
    #[error("Form does not contain a button with the name '{0}'.")]
    InvalidFormValue(String),

    #[error("Invalid form action: {0}")]
    Url(#[from] url::ParseError),

    /// Failure reported by the session while sending the request.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// An HTML form's editable state, bound to the session that submits it.
///
/// Fields are read from the DOM once at construction. The DOM is consulted
/// again only for `method`, `action` and `enctype` when the form is sent.
pub struct Form<'s, N: FormNode, B: Browsable + ?Sized> {
    session: &'s B,
    node: N,
    method: String,
    action: String,
    defined: BTreeSet<String>,
    fields: Values,
    buttons: Values,
}

impl<'s, N: FormNode, B: Browsable + ?Sized> Form<'s, N, B> {
    pub fn new(session: &'s B, node: N) -> Self {
        let extracted = extract_form(&node);
        let method = form_method(&node);
        // An unresolvable action is left empty and re-derived, with its
        // error, when the form is sent.
        let action = session
            .resolve_url(&raw_action(session, &node))
            .map(String::from)
            .unwrap_or_default();
        debug!(method = %method, action = %action, "form created");

        Self {
            session,
            node,
            method,
            action,
            defined: extracted.defined,
            fields: extracted.fields,
            buttons: extracted.buttons,
        }
    }

    /// Uppercased form method, `GET` when the attribute is missing.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Absolute action URL. An override that does not resolve is kept as
    /// given and fails when the form is sent.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Override the action, resolved against the session's current page.
    /// An empty string restores the form's own target.
    pub fn set_action(&mut self, url: &str) {
        self.action = if url.is_empty() {
            String::new()
        } else {
            self.session
                .resolve_url(url)
                .map(String::from)
                .unwrap_or_else(|_| url.to_string())
        };
    }

    /// First value of a defined field, `""` when it holds none.
    /// `None` means no such field exists.
    pub fn field(&self, name: &str) -> Option<&str> {
        if self.defined.contains(name) {
            Some(self.fields.get(name).unwrap_or(""))
        } else {
            None
        }
    }

    /// Every value of a defined field.
    pub fn field_values(&self, name: &str) -> Option<&[String]> {
        if self.defined.contains(name) {
            Some(self.fields.get_all(name).unwrap_or(&[]))
        } else {
            None
        }
    }

    pub fn input(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        self.ensure_defined(name)?;
        self.fields.set(name, value);
        Ok(())
    }

    /// Remove a field's values. The name stays defined.
    pub fn delete_field(&mut self, name: &str) -> Result<(), FormError> {
        self.ensure_defined(name)?;
        self.fields.remove(name);
        Ok(())
    }

    pub fn input_slice<S: AsRef<str>>(&mut self, name: &str, values: &[S]) -> Result<(), FormError> {
        self.ensure_defined(name)?;
        let values = values.iter().map(|v| v.as_ref().to_string()).collect();
        self.fields.set_all(name, values);
        Ok(())
    }

    /// Set the checked values of a checkbox or radio group.
    pub fn check_box<S: AsRef<str>>(&mut self, name: &str, values: &[S]) -> Result<(), FormError> {
        self.input_slice(name, values)
    }

    /// Submit by clicking the first button in document order, or without any
    /// button when the form has none.
    pub fn submit(&self) -> Result<(), FormError> {
        match self.buttons.names().next() {
            Some(button) => self.click(button),
            None => self.send(None),
        }
    }

    /// Submit with the named button's first value added to the fields.
    pub fn click(&self, button: &str) -> Result<(), FormError> {
        let value = self
            .buttons
            .get(button)
            .ok_or_else(|| FormError::InvalidFormValue(button.to_string()))?;
        self.send(Some((button, value)))
    }

    /// How the form would be sent given its current DOM attributes.
    pub fn encoding(&self) -> Encoding {
        let method = form_method(&self.node);
        if method == "GET" {
            Encoding::Query
        } else if self.node.attr("enctype") == Some("multipart/form-data") {
            Encoding::Multipart
        } else {
            Encoding::UrlEncoded
        }
    }

    pub fn fields(&self) -> &Values {
        &self.fields
    }

    pub fn buttons(&self) -> &Values {
        &self.buttons
    }

    pub fn defined_fields(&self) -> &BTreeSet<String> {
        &self.defined
    }

    pub fn dom(&self) -> &N {
        &self.node
    }

    fn ensure_defined(&self, name: &str) -> Result<(), FormError> {
        if self.defined.contains(name) {
            Ok(())
        } else {
            Err(FormError::ElementNotFound(name.to_string()))
        }
    }

    fn send(&self, button: Option<(&str, &str)>) -> Result<(), FormError> {
        let action = if self.action.is_empty() {
            raw_action(self.session, &self.node)
        } else {
            self.action.clone()
        };
        let url = self.session.resolve_url(&action)?;

        let mut values = self.fields.clone();
        // An unnamed button is clicked but adds no pair.
        if let Some((name, value)) = button.filter(|(n, _)| !n.is_empty()) {
            values.set(name, value);
        }

        let encoding = self.encoding();
        info!(
            method = encoding.method(),
            url = %url,
            encoding = ?encoding,
            fields = values.len(),
            button = button.map(|(n, _)| n).unwrap_or(""),
            "submitting form"
        );

        match encoding {
            Encoding::Query => self.session.open_form(url.as_str(), &values)?,
            Encoding::Multipart => self.session.post_multipart(url.as_str(), &values)?,
            Encoding::UrlEncoded => self.session.post_form(url.as_str(), &values)?,
        }
        Ok(())
    }
}

fn form_method<N: FormNode>(node: &N) -> String {
    node.attr("method").unwrap_or("GET").to_uppercase()
}

/// Unresolved action: the `action` attribute, else the current document URL.
fn raw_action<N: FormNode, B: Browsable + ?Sized>(session: &B, node: &N) -> String {
    match node.attr("action") {
        Some(action) => action.to_string(),
        None => session.url().to_string(),
    }
}
