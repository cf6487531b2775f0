// # HTTP Address Resolver
//
// This crate looks up the host's public IP address from an IP-echo service.
//
// ## Protocol
//
// One `GET` per lookup against a service that answers with JSON:
//
// ```json
// {"ip": "203.0.113.5"}
// ```
//
// The default service is `https://api.ipify.org?format=json`.
//
// ## Constraints
//
// - ✅ Bounded request timeout (10 seconds by default)
// - ❌ NO retry logic (a failed cycle is retried by the next timer tick)
// - ❌ NO caching (every call is a fresh lookup)
// - ❌ NO address validation beyond reading the `ip` string field

use async_trait::async_trait;
use ipwatch_core::config::{DEFAULT_LOOKUP_TIMEOUT_SECS, DEFAULT_LOOKUP_URL, ResolverConfig};
use ipwatch_core::error::ResolutionError;
use ipwatch_core::traits::AddressResolver;
use serde::Deserialize;
use std::time::Duration;

/// Expected body of the IP-echo service
#[derive(Debug, Deserialize)]
struct EchoResponse {
    ip: String,
}

/// HTTP-based public address resolver
#[derive(Debug, Clone)]
pub struct HttpAddressResolver {
    /// URL to fetch the address from
    url: String,

    /// HTTP client (carries the request timeout)
    client: reqwest::Client,
}

impl HttpAddressResolver {
    /// Create a resolver with the default 10 second timeout
    ///
    /// # Parameters
    ///
    /// - `url`: IP-echo endpoint (e.g., "https://api.ipify.org?format=json")
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS))
    }

    /// Create with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Create from the watcher configuration
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::with_timeout(&config.url, Duration::from_secs(config.timeout_secs))
    }

    /// The lookup endpoint
    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_error(e: reqwest::Error) -> ResolutionError {
        if e.is_timeout() {
            ResolutionError::Timeout
        } else {
            ResolutionError::NetworkUnavailable(e.to_string())
        }
    }
}

impl Default for HttpAddressResolver {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_URL)
    }
}

#[async_trait]
impl AddressResolver for HttpAddressResolver {
    async fn resolve(&self) -> Result<String, ResolutionError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(Self::request_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("IP lookup at {} returned {}", self.url, status);
            return Err(ResolutionError::ServiceError {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(Self::request_error)?;

        let parsed: EchoResponse = serde_json::from_str(&body).map_err(|e| {
            ResolutionError::MalformedResponse(format!("expected {{\"ip\": \"...\"}}: {}", e))
        })?;

        tracing::trace!("IP lookup returned {}", parsed.ip);
        Ok(parsed.ip)
    }

    fn resolver_name(&self) -> &'static str {
        "http"
    }
}
