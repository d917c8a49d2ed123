use std::cell::RefCell;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{multipart, Client, RequestBuilder};
use scraper::Html;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};
use url::Url;

use crate::browsable::Browsable;
use crate::config::SessionConfig;
use crate::values::Values;

#[derive(Debug, Clone)]
struct Page {
    url: Url,
    status: u16,
    body: String,
}

/// Blocking HTTP session that tracks the current page.
///
/// Owns its own tokio runtime, so it must not be driven from inside another
/// async runtime.
pub struct HttpSession {
    runtime: Runtime,
    client: Client,
    page: RefCell<Page>,
}

impl HttpSession {
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let runtime = Runtime::new().context("Failed to start tokio runtime")?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            runtime,
            client,
            page: RefCell::new(Page {
                url: Url::parse("about:blank")?,
                status: 0,
                body: String::new(),
            }),
        })
    }

    /// Navigate to `url` and make the response the current page.
    pub fn open(&self, url: &str) -> Result<()> {
        info!(url = %url, "open");
        self.execute(self.client.get(url))
            .with_context(|| format!("Failed to open {url}"))
    }

    /// Use `body` as the current page at `url` without fetching it.
    pub fn set_page(&self, url: Url, body: String) {
        debug!(url = %url, body_len = body.len(), "page set");
        *self.page.borrow_mut() = Page {
            url,
            status: 200,
            body,
        };
    }

    pub fn status(&self) -> u16 {
        self.page.borrow().status
    }

    pub fn body(&self) -> String {
        self.page.borrow().body.clone()
    }

    /// Parse the current page.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.page.borrow().body)
    }

    fn execute(&self, request: RequestBuilder) -> Result<()> {
        let page = self.runtime.block_on(async {
            let response = request.send().await?;
            let url = response.url().clone();
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(Page {
                url,
                status: status.as_u16(),
                body,
            })
        })?;

        if !(200..300).contains(&page.status) {
            warn!(url = %page.url, status = page.status, "non-success response");
        }
        debug!(url = %page.url, status = page.status, body_len = page.body.len(), "page loaded");
        *self.page.borrow_mut() = page;
        Ok(())
    }
}

impl Browsable for HttpSession {
    fn url(&self) -> Url {
        self.page.borrow().url.clone()
    }

    fn open_form(&self, url: &str, values: &Values) -> Result<()> {
        let mut target = Url::parse(url)?;
        let query = values.encode();
        target.set_query(if query.is_empty() { None } else { Some(&query) });
        debug!(url = %target, "GET form");
        self.execute(self.client.get(target))
    }

    fn post_form(&self, url: &str, values: &Values) -> Result<()> {
        debug!(url = %url, fields = values.len(), "POST url-encoded form");
        self.execute(
            self.client
                .post(url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(values.encode()),
        )
    }

    fn post_multipart(&self, url: &str, values: &Values) -> Result<()> {
        debug!(url = %url, fields = values.len(), "POST multipart form");
        let form = values
            .pairs()
            .fold(multipart::Form::new(), |form, (name, value)| {
                form.text(name.to_string(), value.to_string())
            });
        self.execute(self.client.post(url).multipart(form))
    }
}
