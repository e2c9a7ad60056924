//! HTTP client for the component registry.
//!
//! [`RegistryClient`] issues one authenticated GET per name and reduces the
//! response to a [`FetchReply`]. It never retries and never sleeps; both are
//! the engine's job.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use super::error::FetchError;
use super::retry::resolve_rate_limit_wait;
use crate::config::{ConfigError, Credential, SyncConfig};
use crate::names::Name;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("registry-sync/", env!("CARGO_PKG_VERSION"));

/// Classified registry response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchReply {
    /// HTTP 200 with the full body text.
    Body(String),
    /// HTTP 429 with the server's wait hint, if one could be read.
    RateLimited {
        /// Wait suggested by the body or Retry-After header.
        suggested_wait: Option<Duration>,
    },
    /// HTTP 401.
    Unauthorized,
    /// Any other status.
    Status(u16),
}

/// Authenticated client bound to one registry base URL.
///
/// Created once per run and reused for every name, so connections are pooled.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: Url,
    credential: Credential,
}

impl RegistryClient {
    /// Builds the client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the underlying client cannot be built.
    pub fn new(config: &SyncConfig) -> Result<Self, ConfigError> {
        let policy = config.policy();
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .timeout(policy.request_timeout)
            .connect_timeout(policy.connect_timeout.min(policy.request_timeout))
            .build()
            .map_err(|source| ConfigError::HttpClient { source })?;
        Ok(Self {
            client,
            base_url: config.base_url().clone(),
            credential: config.credential().clone(),
        })
    }

    /// Returns `{base_url}/{name}` with the name as a single encoded segment.
    #[must_use]
    pub fn endpoint(&self, name: &Name) -> Url {
        let mut url = self.base_url.clone();
        // SyncConfig only admits base URLs that can take path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name.as_str());
        }
        url
    }

    /// Fetches one component.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failures (connect, timeout, body
    /// read). HTTP error statuses are not errors; they come back as
    /// [`FetchReply`] variants.
    #[instrument(skip(self), fields(name = %name))]
    pub async fn fetch(&self, name: &Name) -> Result<FetchReply, FetchError> {
        let url = self.endpoint(name);
        debug!(url = %url, "sending request");

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(self.credential.expose())
            .send()
            .await
            .map_err(|e| FetchError::network(url.as_str(), e))?;

        let status = response.status();
        debug!(status = status.as_u16(), "response received");

        match status {
            StatusCode::OK => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| FetchError::network(url.as_str(), e))?;
                Ok(FetchReply::Body(body))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let header = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned);
                // An unreadable 429 body only loses the hint.
                let body = response.text().await.unwrap_or_default();
                Ok(FetchReply::RateLimited {
                    suggested_wait: resolve_rate_limit_wait(&body, header.as_deref()),
                })
            }
            StatusCode::UNAUTHORIZED => Ok(FetchReply::Unauthorized),
            other => Ok(FetchReply::Status(other.as_u16())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SyncPolicy;

    fn client_for(base: &str) -> RegistryClient {
        let config = SyncConfig::new(
            base,
            Credential::new("token").unwrap(),
            "out",
            SyncPolicy::default(),
        )
        .unwrap();
        RegistryClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_appends_name_segment() {
        let client = client_for("https://www.shadcnblocks.com/r");
        let name = Name::parse("hero1").unwrap();
        assert_eq!(
            client.endpoint(&name).as_str(),
            "https://www.shadcnblocks.com/r/hero1"
        );
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let client = client_for("https://www.shadcnblocks.com/r/");
        let name = Name::parse("about6").unwrap();
        assert_eq!(
            client.endpoint(&name).as_str(),
            "https://www.shadcnblocks.com/r/about6"
        );
    }

    #[test]
    fn test_endpoint_on_bare_host() {
        let client = client_for("http://127.0.0.1:9000");
        let name = Name::parse("a").unwrap();
        assert_eq!(
            client.endpoint(&name).as_str(),
            "http://127.0.0.1:9000/a"
        );
    }

    #[test]
    fn test_endpoint_percent_encodes_name() {
        let client = client_for("https://example.com/r");
        let name = Name::parse("hero 1?x").unwrap();
        assert_eq!(
            client.endpoint(&name).as_str(),
            "https://example.com/r/hero%201%3Fx"
        );
    }

    #[test]
    fn test_user_agent_names_tool() {
        assert!(USER_AGENT.starts_with("registry-sync/"));
    }
}
