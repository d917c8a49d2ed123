use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::values::Values;

/// Browsing session a form submits through.
///
/// Methods take `&self` so a form can hold a shared borrow of its session
/// for its whole lifetime; implementations keep page state behind a `RefCell`.
pub trait Browsable {
    /// Location of the current document.
    fn url(&self) -> Url;

    /// Resolve a possibly relative reference against the current document.
    fn resolve_url(&self, href: &str) -> Result<Url, url::ParseError> {
        self.url().join(href)
    }

    /// GET `url` with `values` as the query string.
    fn open_form(&self, url: &str, values: &Values) -> anyhow::Result<()>;

    /// POST `values` as `application/x-www-form-urlencoded`.
    fn post_form(&self, url: &str, values: &Values) -> anyhow::Result<()>;

    /// POST `values` as `multipart/form-data`.
    fn post_multipart(&self, url: &str, values: &Values) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    Query,
    UrlEncoded,
    Multipart,
}

impl Encoding {
    pub fn method(self) -> &'static str {
        match self {
            Encoding::Query => "GET",
            Encoding::UrlEncoded | Encoding::Multipart => "POST",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::UrlEncoded => write!(f, "url_encoded"),
            Self::Multipart => write!(f, "multipart"),
        }
    }
}

/// One dispatched form request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub method: String,
    pub url: String,
    pub encoding: Encoding,
    pub values: Values,
}

impl Submission {
    pub fn new(encoding: Encoding, url: &str, values: &Values) -> Self {
        Self {
            method: encoding.method().to_string(),
            url: url.to_string(),
            encoding,
            values: values.clone(),
        }
    }

    /// Request URL. For GET submissions the values replace the query string.
    pub fn query_url(&self) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.url)?;
        if self.encoding == Encoding::Query {
            let query = self.values.encode();
            url.set_query(if query.is_empty() { None } else { Some(&query) });
        }
        Ok(url)
    }
}
