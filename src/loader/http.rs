//! Remote map source over HTTP (blocking).

use super::{LoadError, MapSource, RetrievalKey};

/// Fetches `{base_url}/{map_id}/{difficulty}.json`.
pub struct HttpSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn url_for(&self, key: &RetrievalKey) -> String {
        format!("{}/{}", self.base_url, key.path())
    }
}

impl MapSource for HttpSource {
    fn fetch(&self, key: &RetrievalKey) -> Result<String, LoadError> {
        let url = self.url_for(key);
        let response = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| LoadError::Fetch(format!("{url}: {e}")))?;
        response
            .text()
            .map_err(|e| LoadError::Fetch(format!("{url}: {e}")))
    }
}
