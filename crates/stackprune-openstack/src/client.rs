//! REST transport
//!
//! A [`Session`] validates a pre-issued token against Keystone and keeps the
//! service catalog that comes with it. [`ServiceClient`]s are resolved from
//! that catalog, one per service, and carry the token on every request.

use crate::error::{OpenStackError, Result};
use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use stackprune_cloud::{ServiceError, ServiceResult};

const TOKEN_HEADER: &str = "X-Auth-Token";
const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Options for locating endpoints in the catalog
#[derive(Debug, Clone)]
pub struct EndpointOptions {
    /// `public`, `internal` or `admin`
    pub interface: String,
    pub region: Option<String>,
}

impl Default for EndpointOptions {
    fn default() -> Self {
        Self {
            interface: "public".to_string(),
            region: None,
        }
    }
}

/// An authenticated view of one cloud
#[derive(Debug, Clone)]
pub struct Session {
    http: reqwest::Client,
    token: String,
    user_id: String,
    catalog: Vec<CatalogEntry>,
    options: EndpointOptions,
}

impl Session {
    /// Validate `token` and fetch the service catalog
    pub async fn connect(auth_url: &str, token: &str, options: EndpointOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stackprune/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let url = tokens_url(auth_url)?;

        tracing::debug!("Validating token against {}", url);
        let response = http
            .get(url)
            .header(TOKEN_HEADER, token)
            .header(SUBJECT_TOKEN_HEADER, token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenStackError::Authentication(format!(
                "{} ({})",
                error_message(&body),
                status
            )));
        }

        let validated: TokenResponse = response.json().await?;
        tracing::info!(
            "Authenticated as user {} ({} services in catalog)",
            validated.token.user.id,
            validated.token.catalog.len()
        );

        Ok(Self {
            http,
            token: token.to_string(),
            user_id: validated.token.user.id,
            catalog: validated.token.catalog,
            options,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Client for the first of `service_types` present in the catalog
    pub fn service(&self, service_types: &[&str]) -> ServiceResult<ServiceClient> {
        let url = find_endpoint(&self.catalog, service_types, &self.options).ok_or_else(|| {
            ServiceError::EndpointNotFound(service_types.first().copied().unwrap_or("").to_string())
        })?;
        ServiceClient::new(self.http.clone(), &self.token, &url)
    }
}

/// Keystone v3 token endpoint for a given auth URL
fn tokens_url(auth_url: &str) -> Result<Url> {
    let mut url = Url::parse(auth_url).map_err(|e| OpenStackError::InvalidAuthUrl {
        url: auth_url.to_string(),
        reason: e.to_string(),
    })?;
    let has_version = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .is_some_and(|last| last == "v3");
    {
        let mut segments = url.path_segments_mut().map_err(|_| OpenStackError::InvalidAuthUrl {
            url: auth_url.to_string(),
            reason: "cannot be a base URL".to_string(),
        })?;
        segments.pop_if_empty();
        if !has_version {
            segments.push("v3");
        }
        segments.extend(["auth", "tokens"]);
    }
    Ok(url)
}

// ============ Catalog ============

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: TokenBody,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    user: TokenUser,
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEndpoint {
    pub interface: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_id: Option<String>,
    pub url: String,
}

impl CatalogEndpoint {
    fn in_region(&self, region: &str) -> bool {
        self.region_id.as_deref() == Some(region) || self.region.as_deref() == Some(region)
    }
}

pub fn find_endpoint(
    catalog: &[CatalogEntry],
    service_types: &[&str],
    options: &EndpointOptions,
) -> Option<String> {
    service_types.iter().find_map(|wanted| {
        catalog
            .iter()
            .filter(|entry| entry.service_type == *wanted)
            .flat_map(|entry| entry.endpoints.iter())
            .find(|ep| {
                ep.interface == options.interface
                    && options.region.as_deref().is_none_or(|r| ep.in_region(r))
            })
            .map(|ep| ep.url.clone())
    })
}

// ============ Service client ============

/// Token-carrying client bound to one service endpoint
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    token: String,
    base: Url,
    microversion: Option<(&'static str, String)>,
}

impl ServiceClient {
    pub fn new(http: reqwest::Client, token: &str, base: &str) -> ServiceResult<Self> {
        let base = Url::parse(base).map_err(|e| ServiceError::Decode(format!("endpoint {base}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ServiceError::Decode(format!("endpoint {base} cannot be a base URL")));
        }
        Ok(Self {
            http,
            token: token.to_string(),
            base,
            microversion: None,
        })
    }

    /// Append an API version segment unless the catalog URL already carries it
    pub fn versioned(mut self, version: &str) -> Self {
        let present = self
            .base
            .path_segments()
            .is_some_and(|mut segments| segments.any(|s| s == version));
        if !present {
            if let Ok(mut segments) = self.base.path_segments_mut() {
                segments.pop_if_empty().push(version);
            }
        }
        self
    }

    /// Send `header: value` on every request, e.g. a compute microversion
    pub fn with_microversion(mut self, header: &'static str, value: impl Into<String>) -> Self {
        self.microversion = Some((header, value.into()));
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Endpoint URL with `segments` appended, each percent-encoded
    pub fn url<I, S>(&self, segments: I) -> Url
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.as_ref());
            }
        }
        url
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut builder = self.http.request(method, url).header(TOKEN_HEADER, &self.token);
        if let Some((header, value)) = &self.microversion {
            builder = builder.header(*header, value);
        }
        builder
    }

    /// Send a request, turning non-2xx statuses into [`ServiceError`]s
    pub async fn send(&self, builder: RequestBuilder, what: &str) -> ServiceResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify(status, what, &body))
    }

    pub async fn get_json(&self, url: Url, what: &str) -> ServiceResult<serde_json::Value> {
        let response = self.send(self.request(Method::GET, url), what).await?;
        response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(format!("{what}: {e}")))
    }

    pub async fn head(&self, url: Url, what: &str) -> ServiceResult<HeaderMap> {
        let response = self.send(self.request(Method::HEAD, url), what).await?;
        Ok(response.headers().clone())
    }

    pub async fn delete(&self, url: Url, what: &str) -> ServiceResult<()> {
        self.send(self.request(Method::DELETE, url), what).await?;
        Ok(())
    }

    pub async fn put_json(&self, url: Url, body: &serde_json::Value, what: &str) -> ServiceResult<()> {
        self.send(self.request(Method::PUT, url).json(body), what).await?;
        Ok(())
    }
}

/// Map an unsuccessful status onto the collaborator error classes
pub fn classify(status: StatusCode, what: &str, body: &str) -> ServiceError {
    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(what.to_string()),
        StatusCode::FORBIDDEN => ServiceError::Forbidden(format!("{what}: {}", error_message(body))),
        _ => ServiceError::Api {
            status: status.as_u16(),
            message: format!("{what}: {}", error_message(body)),
        },
    }
}

/// Best-effort human message out of an OpenStack error body
///
/// Services wrap it differently (`{"NeutronError": {"message": ..}}`,
/// `{"itemNotFound": {"message": ..}}`, `{"faultstring": ..}`, plain text).
pub fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let direct = ["message", "faultstring", "error_message"]
            .iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()));
        let nested = || {
            value.as_object().and_then(|obj| {
                obj.values()
                    .find_map(|inner| inner.get("message").and_then(|m| m.as_str()))
            })
        };
        if let Some(message) = direct.or_else(nested) {
            return message.to_string();
        }
    }
    let text = body.trim();
    if text.is_empty() {
        return "no details".to_string();
    }
    text.chars().take(200).collect()
}
