//! HTTP adapter for the Strapi REST API.
//!
//! Every call carries the API token as a bearer header. Non-success statuses
//! surface as [`StrapiError::UnexpectedStatus`] with the response body, except
//! a 404 on a single-document read, which is reported as `Ok(None)`.

use std::time::Duration;

use async_trait::async_trait;
use cobipedia_core::AppConfig;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::{json, Value};

use crate::error::StrapiError;
use crate::store::ContentStore;
use crate::types::{DocumentResponse, ListResponse, Page, Query};

const USER_AGENT: &str = "cobipedia-sync/0.1";

/// Client for a Strapi instance's `/api` surface.
///
/// Use [`StrapiClient::from_config`] in the binary or [`StrapiClient::new`]
/// to point at a mock server in tests.
pub struct StrapiClient {
    client: Client,
    token: String,
    base_url: Url,
}

impl StrapiClient {
    /// Creates a client for `base_url`.
    ///
    /// No request timeout is applied unless `timeout_secs` is set.
    ///
    /// # Errors
    ///
    /// Returns [`StrapiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`StrapiError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute http(s) URL.
    pub fn new(
        base_url: &str,
        token: &str,
        timeout_secs: Option<u64>,
    ) -> Result<Self, StrapiError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| StrapiError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(StrapiError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(Self {
            client,
            token: token.to_owned(),
            base_url: parsed,
        })
    }

    /// Creates a client from the host URL, token and timeout in `config`.
    ///
    /// # Errors
    ///
    /// See [`StrapiClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, StrapiError> {
        Self::new(
            &config.strapi_url,
            &config.strapi_token,
            config.http_timeout_secs,
        )
    }

    /// Builds `<base>/api/<content_type>[/<document_id>]?<query>`, with the
    /// document id and every query value percent-encoded.
    fn endpoint_url(
        &self,
        content_type: &str,
        document_id: Option<&str>,
        pairs: &[(String, String)],
    ) -> Result<Url, StrapiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|()| StrapiError::InvalidBaseUrl {
                        base_url: self.base_url.to_string(),
                        reason: "URL cannot be used as a base".to_string(),
                    })?;
            segments.pop_if_empty().push("api").push(content_type);
            if let Some(id) = document_id {
                segments.push(id);
            }
        }
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Sends an authenticated request and returns the status with the raw
    /// body, failing on any non-success status other than those in `allow`.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        allow: &[StatusCode],
    ) -> Result<(StatusCode, String), StrapiError> {
        tracing::debug!(%method, %url, "strapi request");

        let mut request = self
            .client
            .request(method, url.clone())
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() && !allow.contains(&status) {
            return Err(StrapiError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body: text,
            });
        }
        Ok((status, text))
    }

    fn parse_document(text: &str, context: &str) -> Result<Value, StrapiError> {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let envelope: DocumentResponse =
            serde_json::from_str(text).map_err(|e| StrapiError::Deserialize {
                context: context.to_string(),
                source: e,
            })?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl ContentStore for StrapiClient {
    async fn find_many(&self, content_type: &str, query: &Query) -> Result<Page, StrapiError> {
        let url = self.endpoint_url(content_type, None, &query.to_pairs())?;
        let context = url.to_string();
        let (_, text) = self.send(Method::GET, url, None, &[]).await?;

        let response: ListResponse =
            serde_json::from_str(&text).map_err(|e| StrapiError::Deserialize { context, source: e })?;
        Ok(response.into_page(query))
    }

    async fn find_one(
        &self,
        content_type: &str,
        document_id: &str,
        query: &Query,
    ) -> Result<Option<Value>, StrapiError> {
        let url = self.endpoint_url(content_type, Some(document_id), &query.to_pairs())?;
        let context = url.to_string();
        let (status, text) = self
            .send(Method::GET, url, None, &[StatusCode::NOT_FOUND])
            .await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let document = Self::parse_document(&text, &context)?;
        Ok(Some(document).filter(|d| !d.is_null()))
    }

    async fn create(
        &self,
        content_type: &str,
        locale: Option<&str>,
        data: Value,
    ) -> Result<Value, StrapiError> {
        let pairs = locale_pairs(locale);
        let url = self.endpoint_url(content_type, None, &pairs)?;
        let context = url.to_string();
        let body = json!({ "data": data });
        let (_, text) = self.send(Method::POST, url, Some(&body), &[]).await?;
        Self::parse_document(&text, &context)
    }

    async fn update(
        &self,
        content_type: &str,
        document_id: &str,
        locale: Option<&str>,
        data: Value,
    ) -> Result<Value, StrapiError> {
        let pairs = locale_pairs(locale);
        let url = self.endpoint_url(content_type, Some(document_id), &pairs)?;
        let context = url.to_string();
        let body = json!({ "data": data });
        let (_, text) = self.send(Method::PUT, url, Some(&body), &[]).await?;
        Self::parse_document(&text, &context)
    }

    async fn delete(&self, content_type: &str, document_id: &str) -> Result<(), StrapiError> {
        let url = self.endpoint_url(content_type, Some(document_id), &[])?;
        self.send(Method::DELETE, url, None, &[]).await?;
        Ok(())
    }
}

fn locale_pairs(locale: Option<&str>) -> Vec<(String, String)> {
    locale
        .map(|l| vec![("locale".to_string(), l.to_string())])
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
