// ABOUTME: Blocking HTTP client for the Google Reader compatible API
// ABOUTME: Lists tags and follows stream continuations with paced requests

use crate::model::{Item, StreamContents, TagEntry, TagList};
use crate::pacing::{Pacer, Pacing};
use crate::{Error, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, error, warn};

pub const DEFAULT_API_BASE: &str = "https://bazqux.com";
pub const PAGE_SIZE: usize = 1000;
pub(crate) const USER_AGENT: &str = concat!("bazqux-backup/", env!("CARGO_PKG_VERSION"), " (Rust)");

const TAG_LIST: &str = "/reader/api/0/tag/list";
const STREAM_CONTENTS: &str = "/reader/api/0/stream/contents";
const STARRED_SELECTOR: &str = "user/-/state/com.google/starred";

pub(crate) fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.len() <= max_chars {
        return s.to_string();
    }

    // Find a valid UTF-8 boundary at or before max_chars
    let mut boundary = max_chars;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    if boundary == 0 {
        return String::new();
    }

    format!("{}...", &s[..boundary])
}

/// Which item stream to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamId {
    Label(String),
    Starred,
}

impl StreamId {
    pub fn selector(&self) -> String {
        match self {
            StreamId::Label(name) => format!("user/-/label/{}", urlencoding::encode(name)),
            StreamId::Starred => STARRED_SELECTOR.to_string(),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            StreamId::Label(name) => name,
            StreamId::Starred => "starred",
        }
    }
}

#[derive(Debug, Default)]
pub struct StreamPage {
    pub items: Vec<Item>,
    pub continuation: Option<String>,
}

/// Everything fetched for one stream. `error` is set when a page request
/// failed; `items` still holds the pages received before it.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub items: Vec<Item>,
    pub pages: usize,
    pub error: Option<Error>,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
    pacer: Box<dyn Pacer>,
}

impl ApiClient {
    pub fn new(token: String, base_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        let base_url = base_url.unwrap_or_else(|| DEFAULT_API_BASE.into());

        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            pacer: Box::new(Pacing::default()),
        })
    }

    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    pub fn disable_throttle(self) -> Self {
        self.with_pacer(Pacing::None)
    }

    fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str, url: &str) -> Result<T> {
        debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .header("Authorization", format!("GoogleLogin auth={}", self.token))
            .header("Accept", "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            let preview = truncate_str(&message, 100);
            return Err(Error::Api {
                endpoint: endpoint.into(),
                status: status.as_u16(),
                message: preview,
            });
        }

        let body = response.text()?;
        serde_json::from_str(&body).map_err(|e| {
            error!(endpoint, error = %e, body = %truncate_str(&body, 500), "failed to parse response");
            Error::Parse(e)
        })
    }

    /// Names of all user labels, in API order.
    pub fn list_tags(&self) -> Result<Vec<String>> {
        let url = format!("{}{}?output=json", self.base_url, TAG_LIST);
        let list: TagList = self.get(TAG_LIST, &url)?;

        Ok(list
            .tags
            .iter()
            .filter_map(TagEntry::label_name)
            .map(str::to_string)
            .collect())
    }

    pub fn stream_page(&self, stream: &StreamId, continuation: Option<&str>) -> Result<StreamPage> {
        let mut url = format!(
            "{}{}?output=json&n={}&s={}",
            self.base_url,
            STREAM_CONTENTS,
            PAGE_SIZE,
            stream.selector()
        );
        if let Some(c) = continuation {
            url.push_str("&c=");
            url.push_str(&urlencoding::encode(c));
        }

        let contents: StreamContents = self.get(STREAM_CONTENTS, &url)?;
        Ok(StreamPage {
            items: contents.items,
            continuation: contents.continuation.filter(|c| !c.is_empty()),
        })
    }

    /// Follows continuations until the stream is exhausted or a page fails.
    ///
    /// `on_more` is called with the page's item count whenever another page follows.
    pub fn fetch_stream<F: FnMut(usize)>(&self, stream: &StreamId, mut on_more: F) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();
        let mut continuation: Option<String> = None;

        loop {
            let page = match self.stream_page(stream, continuation.as_deref()) {
                Ok(page) => page,
                Err(e) => {
                    warn!(stream = stream.display_name(), page = outcome.pages, error = %e, "page fetch failed");
                    outcome.error = Some(e);
                    break;
                }
            };

            let fetched = page.items.len();
            outcome.items.extend(page.items);
            outcome.pages += 1;
            debug!(stream = stream.display_name(), page = outcome.pages, fetched, "page fetched");

            match page.continuation {
                Some(next) => {
                    on_more(fetched);
                    self.pacer.pause(outcome.pages - 1);
                    continuation = Some(next);
                }
                None => break,
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_short() {
        assert_eq!(truncate_str("hello", 100), "hello");
    }

    #[test]
    fn test_truncate_str_long() {
        let result = truncate_str("hello world", 7);
        assert!(result.starts_with("hello"));
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncate_str_utf8() {
        let text = "Hello 世界 World";
        let result = truncate_str(text, 7);
        assert_eq!(result, "Hello ...");
    }

    #[test]
    fn test_selector_label_is_encoded() {
        assert_eq!(StreamId::Label("Tech".into()).selector(), "user/-/label/Tech");
        assert_eq!(
            StreamId::Label("Slow Reads".into()).selector(),
            "user/-/label/Slow%20Reads"
        );
    }

    #[test]
    fn test_selector_starred() {
        assert_eq!(StreamId::Starred.selector(), "user/-/state/com.google/starred");
        assert_eq!(StreamId::Starred.display_name(), "starred");
    }

    #[test]
    fn test_api_client_new() {
        let client = ApiClient::new("test_token".into(), None).unwrap();
        assert_eq!(client.base_url, "https://bazqux.com");
        assert_eq!(client.token, "test_token");
    }

    #[test]
    fn test_api_client_custom_base_trims_slash() {
        let client = ApiClient::new("token".into(), Some("http://127.0.0.1:8080/".into())).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:8080");
    }
}
