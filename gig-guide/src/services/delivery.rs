// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Client for the CMS delivery API.

use crate::models::content::{ContentItem, ItemEnvelope, ItemsEnvelope};
use crate::models::search::{ItemsQuery, DEFAULT_DEPTH};
use crate::services::logging::redact_secret;
use anyhow::{anyhow, Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DELIVERY_API_URL: &str = "https://deliver.kontent.ai";
pub const PREVIEW_API_URL: &str = "https://preview-deliver.kontent.ai";

const SOURCE_TRACKING_HEADER: &str = "X-KC-SOURCE";
const WAIT_FOR_NEW_CONTENT_HEADER: &str = "X-KC-Wait-For-Loading-New-Content";

/// Upper bound on followed `next_page` links for one listing.
const MAX_PAGES: usize = 100;

/// Errors returned by the delivery API collaborator
#[derive(Debug, Error)]
pub enum CmsError {
    #[error("Delivery API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Delivery API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Content item '{0}' not found")]
    NotFound(String),

    #[error("Failed to parse delivery API response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid delivery API URL: {0}")]
    Url(#[from] url::ParseError),
}

/// PEM client certificate material for mutual TLS towards the delivery API.
#[derive(Debug, Clone)]
pub struct ClientIdentityConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    /// Extra root certificate to trust
    pub ca_path: Option<PathBuf>,
}

/// Configuration for the delivery API client
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub environment_id: String,
    pub preview_api_key: Option<String>,
    pub delivery_url: String,
    pub preview_url: String,
    pub client_identity: Option<ClientIdentityConfig>,
    pub app_name: String,
    pub app_version: String,
    pub timeout: Duration,
}

impl DeliveryConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Support the legacy NEXT_PUBLIC_ name for existing deployments
        let environment_id = var("KONTENT_ENVIRONMENT_ID")
            .or_else(|| var("NEXT_PUBLIC_KONTENT_ENVIRONMENT_ID"))
            .ok_or_else(|| anyhow!("KONTENT_ENVIRONMENT_ID environment variable is not set"))?;

        let client_identity = match (var("KONTENT_CLIENT_CERT"), var("KONTENT_CLIENT_KEY")) {
            (Some(cert), Some(key)) => Some(ClientIdentityConfig {
                cert_path: cert.into(),
                key_path: key.into(),
                ca_path: var("KONTENT_CA_CERT").map(PathBuf::from),
            }),
            (None, None) => None,
            _ => {
                return Err(anyhow!(
                    "KONTENT_CLIENT_CERT and KONTENT_CLIENT_KEY must be set together"
                ))
            }
        };

        let timeout_secs: u64 = var("KONTENT_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("KONTENT_TIMEOUT_SECS must be a valid number")?;

        Ok(Self {
            environment_id,
            preview_api_key: var("KONTENT_PREVIEW_API_KEY"),
            delivery_url: var("KONTENT_DELIVERY_URL").unwrap_or_else(|| DELIVERY_API_URL.to_string()),
            preview_url: var("KONTENT_PREVIEW_URL").unwrap_or_else(|| PREVIEW_API_URL.to_string()),
            client_identity,
            app_name: var("APP_NAME").unwrap_or_else(|| "n/a".to_string()),
            app_version: var("APP_VERSION").unwrap_or_else(|| "n/a".to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Configuration for the public API of one environment, everything else default.
    pub fn for_environment(environment_id: &str) -> Self {
        Self {
            environment_id: environment_id.to_string(),
            preview_api_key: None,
            delivery_url: DELIVERY_API_URL.to_string(),
            preview_url: PREVIEW_API_URL.to_string(),
            client_identity: None,
            app_name: "n/a".to_string(),
            app_version: "n/a".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Read-only access to CMS content.
pub trait ContentSource: Send + Sync {
    /// All items matching the query, across every page of the listing.
    fn fetch_items<'a>(
        &'a self,
        query: &'a ItemsQuery,
    ) -> BoxFuture<'a, Result<Vec<ContentItem>, CmsError>>;

    /// One item by codename.
    fn fetch_item<'a>(
        &'a self,
        codename: &'a str,
        preview: bool,
    ) -> BoxFuture<'a, Result<ContentItem, CmsError>>;
}

/// Error body returned by the delivery API
#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// HTTP client for the delivery API
pub struct DeliveryClient {
    http: reqwest::Client,
    config: DeliveryConfig,
}

impl DeliveryClient {
    pub fn new(config: DeliveryConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            SOURCE_TRACKING_HEADER,
            HeaderValue::from_str(&format!("{};{}", config.app_name, config.app_version))
                .context("APP_NAME and APP_VERSION must be valid header values")?,
        );

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout);

        if let Some(identity) = &config.client_identity {
            let cert = std::fs::read(&identity.cert_path).with_context(|| {
                format!("Failed to read client certificate {:?}", identity.cert_path)
            })?;
            let key = std::fs::read(&identity.key_path)
                .with_context(|| format!("Failed to read client key {:?}", identity.key_path))?;
            builder = builder.identity(
                reqwest::Identity::from_pkcs8_pem(&cert, &key)
                    .context("Invalid client certificate or key")?,
            );

            if let Some(ca_path) = &identity.ca_path {
                let ca = std::fs::read(ca_path)
                    .with_context(|| format!("Failed to read CA certificate {:?}", ca_path))?;
                builder = builder.add_root_certificate(
                    reqwest::Certificate::from_pem(&ca).context("Invalid CA certificate")?,
                );
            }
        }

        let http = builder.build().context("Failed to build HTTP client")?;

        tracing::info!(
            environment_id = %config.environment_id,
            preview_key = %config.preview_api_key.as_deref().map(redact_secret).unwrap_or_default(),
            client_identity = config.client_identity.is_some(),
            "Delivery client configured"
        );

        Ok(Self { http, config })
    }

    /// Base URL and bearer token for a request. Preview without a key falls
    /// back to the public API.
    fn endpoint(&self, preview: bool) -> (&str, Option<&str>) {
        match (preview, self.config.preview_api_key.as_deref()) {
            (true, Some(key)) => (self.config.preview_url.as_str(), Some(key)),
            (true, None) => {
                tracing::warn!("Preview requested but no preview API key is configured");
                (self.config.delivery_url.as_str(), None)
            }
            (false, _) => (self.config.delivery_url.as_str(), None),
        }
    }

    fn items_url(&self, base: &str, query: &ItemsQuery) -> Result<Url, CmsError> {
        let mut url = Url::parse(&format!(
            "{}/{}/items",
            base.trim_end_matches('/'),
            self.config.environment_id
        ))?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(content_type) = &query.content_type {
                pairs.append_pair("system.type", content_type);
            }
            for (element, value) in &query.equals {
                pairs.append_pair(element, value);
            }
            pairs.append_pair("depth", &query.depth.to_string());
        }
        Ok(url)
    }

    fn item_url(&self, base: &str, codename: &str) -> Result<Url, CmsError> {
        let mut url = Url::parse(&format!(
            "{}/{}/items/",
            base.trim_end_matches('/'),
            self.config.environment_id
        ))?;
        url = url.join(&urlencode_segment(codename))?;
        url.query_pairs_mut()
            .append_pair("depth", &DEFAULT_DEPTH.to_string());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        token: Option<&str>,
        not_found: &str,
    ) -> Result<T, CmsError> {
        tracing::debug!(url = %url, preview = token.is_some(), "Delivery API request");

        let mut request = self
            .http
            .get(url)
            .header(WAIT_FOR_NEW_CONTENT_HEADER, "true");
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(CmsError::NotFound(not_found.to_string()));
        }
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Err(CmsError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch every page of an item listing.
    pub async fn items(&self, query: &ItemsQuery) -> Result<Vec<ContentItem>, CmsError> {
        let (base, token) = self.endpoint(query.preview);
        let mut url = self.items_url(base, query)?;
        let mut items = Vec::new();

        for page in 1..=MAX_PAGES {
            let envelope: ItemsEnvelope = self.get_json(url, token, "items").await?;
            let next_page = envelope.pagination.next_page.clone();
            items.extend(envelope.into_items());

            if next_page.is_empty() {
                break;
            }
            if page == MAX_PAGES {
                tracing::warn!(pages = MAX_PAGES, "Stopped following delivery API pagination");
                break;
            }
            url = Url::parse(&next_page)?;
        }

        tracing::debug!(count = items.len(), content_type = ?query.content_type, "Fetched items");
        Ok(items)
    }

    /// Fetch a single item by codename.
    pub async fn item(&self, codename: &str, preview: bool) -> Result<ContentItem, CmsError> {
        let (base, token) = self.endpoint(preview);
        let url = self.item_url(base, codename)?;
        let envelope: ItemEnvelope = self.get_json(url, token, codename).await?;
        Ok(envelope.into_item())
    }
}

impl ContentSource for DeliveryClient {
    fn fetch_items<'a>(
        &'a self,
        query: &'a ItemsQuery,
    ) -> BoxFuture<'a, Result<Vec<ContentItem>, CmsError>> {
        self.items(query).boxed()
    }

    fn fetch_item<'a>(
        &'a self,
        codename: &'a str,
        preview: bool,
    ) -> BoxFuture<'a, Result<ContentItem, CmsError>> {
        self.item(codename, preview).boxed()
    }
}

/// Percent-encode a single path segment.
fn urlencode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_requires_environment_id() {
        let err = DeliveryConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("KONTENT_ENVIRONMENT_ID"));
    }

    #[test]
    fn test_config_rejects_blank_environment_id() {
        assert!(DeliveryConfig::from_lookup(lookup(&[("KONTENT_ENVIRONMENT_ID", "  ")])).is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = DeliveryConfig::from_lookup(lookup(&[("KONTENT_ENVIRONMENT_ID", "env-1")]))
            .expect("valid config");
        assert_eq!(config.environment_id, "env-1");
        assert_eq!(config.delivery_url, DELIVERY_API_URL);
        assert_eq!(config.preview_url, PREVIEW_API_URL);
        assert!(config.preview_api_key.is_none());
        assert!(config.client_identity.is_none());
        assert_eq!(config.app_name, "n/a");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_config_legacy_environment_variable() {
        let config = DeliveryConfig::from_lookup(lookup(&[(
            "NEXT_PUBLIC_KONTENT_ENVIRONMENT_ID",
            "legacy",
        )]))
        .expect("valid config");
        assert_eq!(config.environment_id, "legacy");
    }

    #[test]
    fn test_config_client_identity_needs_both_parts() {
        let result = DeliveryConfig::from_lookup(lookup(&[
            ("KONTENT_ENVIRONMENT_ID", "env-1"),
            ("KONTENT_CLIENT_CERT", "/etc/certs/client.pem"),
        ]));
        assert!(result.is_err());

        let config = DeliveryConfig::from_lookup(lookup(&[
            ("KONTENT_ENVIRONMENT_ID", "env-1"),
            ("KONTENT_CLIENT_CERT", "/etc/certs/client.pem"),
            ("KONTENT_CLIENT_KEY", "/etc/certs/client.key"),
        ]))
        .expect("valid config");
        let identity = config.client_identity.expect("identity configured");
        assert_eq!(identity.key_path, PathBuf::from("/etc/certs/client.key"));
        assert!(identity.ca_path.is_none());
    }

    #[test]
    fn test_config_invalid_timeout() {
        let result = DeliveryConfig::from_lookup(lookup(&[
            ("KONTENT_ENVIRONMENT_ID", "env-1"),
            ("KONTENT_TIMEOUT_SECS", "soon"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_items_url_includes_filters() {
        let client = DeliveryClient::new(DeliveryConfig::for_environment("env-1")).unwrap();
        let query = ItemsQuery::of_type("venue").with_equals("elements.venue_slug", "the roxy");
        let url = client.items_url(DELIVERY_API_URL, &query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://deliver.kontent.ai/env-1/items?system.type=venue&elements.venue_slug=the+roxy&depth=5"
        );
    }

    #[test]
    fn test_item_url_encodes_codename() {
        let client = DeliveryClient::new(DeliveryConfig::for_environment("env-1")).unwrap();
        let url = client.item_url(PREVIEW_API_URL, "odd name/x").unwrap();
        assert_eq!(
            url.as_str(),
            "https://preview-deliver.kontent.ai/env-1/items/odd%20name%2Fx?depth=5"
        );
    }

    #[test]
    fn test_preview_without_key_uses_public_api() {
        let client = DeliveryClient::new(DeliveryConfig::for_environment("env-1")).unwrap();
        assert_eq!(client.endpoint(true), (DELIVERY_API_URL, None));
    }

    #[test]
    fn test_preview_with_key_uses_preview_api() {
        let mut config = DeliveryConfig::for_environment("env-1");
        config.preview_api_key = Some("secret".to_string());
        let client = DeliveryClient::new(config).unwrap();
        assert_eq!(client.endpoint(true), (PREVIEW_API_URL, Some("secret")));
        assert_eq!(client.endpoint(false), (DELIVERY_API_URL, None));
    }
}
