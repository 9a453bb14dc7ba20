//! HTTP plumbing for [`super::ApiService`]: URL assembly, status mapping,
//! and the single retry for idempotent requests.

use std::time::Duration;

use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub(super) type Query = Vec<(&'static str, String)>;

#[derive(Debug, Clone)]
pub(super) struct HttpBackend {
    pub(super) client: reqwest::Client,
    pub(super) base_url: String,
}

impl HttpBackend {
    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Raw GET; the caller inspects the status
    pub(super) async fn get(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        timeout: Duration,
    ) -> Result<reqwest::Response> {
        let url = self.url(path);
        debug!(url = %url, query = ?query, "GET upstream");

        self.client
            .get(&url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(Error::from)
    }

    /// GET and decode JSON, retrying once on 5xx or connection failure
    pub(super) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        timeout: Duration,
    ) -> Result<T> {
        match self.get_json_once(path, query, timeout).await {
            Err(e) if e.is_retryable() => {
                warn!(path = %path, error = %e, "Upstream GET failed, retrying once");
                self.get_json_once(path, query, timeout).await
            }
            other => other,
        }
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        timeout: Duration,
    ) -> Result<T> {
        let response = self.get(path, query, timeout).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }
        response.json::<T>().await.map_err(Error::from)
    }

    /// POST a multipart body. Never retried: a duplicate tip is worse than
    /// a failed one.
    pub(super) async fn post_multipart(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        form: Form,
        timeout: Duration,
    ) -> Result<()> {
        let url = self.url(path);
        debug!(url = %url, "POST upstream (multipart)");

        let response = self
            .client
            .post(&url)
            .query(query)
            .multipart(form)
            .timeout(timeout)
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Upstream rejected POST");
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
