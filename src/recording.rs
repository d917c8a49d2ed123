use std::cell::RefCell;

use tracing::debug;
use url::Url;

use crate::browsable::{Browsable, Encoding, Submission};
use crate::values::Values;

/// Session that records submissions instead of sending them.
///
/// Backs the CLI's `--dry-run` mode and stands in for a live session in tests.
/// The document URL never changes, so every form resolves against the same
/// location.
#[derive(Debug)]
pub struct RecordingSession {
    url: Url,
    submissions: RefCell<Vec<Submission>>,
}

impl RecordingSession {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            submissions: RefCell::new(Vec::new()),
        }
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.borrow().clone()
    }

    pub fn last(&self) -> Option<Submission> {
        self.submissions.borrow().last().cloned()
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(&*self.submissions.borrow())?)
    }

    fn record(&self, encoding: Encoding, url: &str, values: &Values) {
        debug!(url = %url, encoding = ?encoding, "recording submission");
        self.submissions
            .borrow_mut()
            .push(Submission::new(encoding, url, values));
    }
}

impl Browsable for RecordingSession {
    fn url(&self) -> Url {
        self.url.clone()
    }

    fn open_form(&self, url: &str, values: &Values) -> anyhow::Result<()> {
        self.record(Encoding::Query, url, values);
        Ok(())
    }

    fn post_form(&self, url: &str, values: &Values) -> anyhow::Result<()> {
        self.record(Encoding::UrlEncoded, url, values);
        Ok(())
    }

    fn post_multipart(&self, url: &str, values: &Values) -> anyhow::Result<()> {
        self.record(Encoding::Multipart, url, values);
        Ok(())
    }
}
