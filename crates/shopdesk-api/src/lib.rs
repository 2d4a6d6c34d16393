// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Blocking client for the shop backend's REST API.

mod auth;
mod customers;
pub mod error;
mod products;
pub mod session;
mod tickets;
mod warranty;

pub use customers::BulkOutcome;
pub use error::{ApiError, is_foreign_key_violation, user_message};
pub use products::{ProductDeletion, ProductSave};
pub use tickets::Technician;
pub use session::{Session, SessionStore};

use anyhow::{Context, Result, bail};
use reqwest::Method;
use reqwest::blocking::Client as HttpClient;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shopdesk_app::unwrap_data;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    token: Option<String>,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let base_url = Url::parse(trimmed)
            .with_context(|| format!("api.base_url {trimmed:?} is not a URL -- use http://host:port"))?;
        if base_url.cannot_be_a_base() {
            bail!("api.base_url {trimmed:?} cannot carry paths -- use http://host:port");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            token: None,
            http,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.set_token(token);
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|token| !token.trim().is_empty());
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// `segments` are percent-encoded one by one, so a category such as
    /// `SMART WATCH` stays a single path segment.
    pub(crate) fn endpoint(&self, segments: &[&str], params: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| anyhow::anyhow!("api.base_url cannot carry paths"))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }

    fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Value> {
        debug!(%method, %url, "api request");
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .map_err(|error| ApiError::connection(self.base_url(), &error))?;

        let status = response.status();
        let text = response.text().map_err(|error| ApiError::Decode {
            what: format!("{method} {} body", url.path()),
            reason: error.to_string(),
        })?;
        if !status.is_success() {
            warn!(%method, %url, status = status.as_u16(), "api request failed");
            return Err(ApiError::from_response(status, &text).into());
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|error| {
            ApiError::Decode {
                what: format!("{method} {}", url.path()),
                reason: error.to_string(),
            }
            .into()
        })
    }

    pub(crate) fn get_value(&self, segments: &[&str], params: &[(&str, String)]) -> Result<Value> {
        let url = self.endpoint(segments, params)?;
        self.execute::<Value>(Method::GET, url, None)
    }

    pub(crate) fn send_value<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Value> {
        let url = self.endpoint(segments, &[])?;
        self.execute(method, url, body)
    }

    /// Sends without a body.
    pub(crate) fn send_empty(&self, method: Method, segments: &[&str]) -> Result<Value> {
        self.send_value::<Value>(method, segments, None)
    }
}

/// Decodes the payload inside the `{status, message, data}` wrapper.
pub(crate) fn decode_data<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T> {
    serde_json::from_value(unwrap_data(value).clone()).map_err(|error| {
        ApiError::Decode {
            what: what.to_owned(),
            reason: error.to_string(),
        }
        .into()
    })
}
