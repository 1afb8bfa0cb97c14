//! # Core Configuration Module
//!
//! Provides configuration management for the KinesteX core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`KinestexConfig`] holding the static credentials, the base URLs of the
//! content API and the embedded web app, the HTTP bridge, and the timings the
//! message bridge uses. It enforces fail-fast validation so a misconfigured
//! host finds out at startup rather than on the first request.
//!
//! ## Required
//!
//! - API key, company name and user id (non-empty)
//! - `HttpClient` - injected by the host, or the reqwest default when the
//!   `desktop-shims` feature is enabled
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::KinestexConfig;
//!
//! let config = KinestexConfig::builder()
//!     .credentials("api-key", "MyCompany", "user-42")
//!     .default_lang("es")
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! Missing credentials surface as [`Error::Config`]; a missing HTTP bridge
//! surfaces as [`Error::CapabilityMissing`] with a message that explains how
//! to provide one.

use crate::error::{Error, Result};
use crate::logging::redact_if_sensitive;
use bridge_traits::HttpClient;
use std::sync::Arc;
use std::time::Duration;

/// Default base URL of the embedded KinesteX web app.
pub const DEFAULT_VIEW_BASE_URL: &str = "https://kinestex.vercel.app";

/// Default base URL of the content REST API.
pub const DEFAULT_CONTENT_BASE_URL: &str = "https://admin.kinestex.com/api/v1";

/// Default language sent with every content request.
pub const DEFAULT_LANG: &str = "en";

/// Timings used by bridge sessions.
///
/// The debounce values mirror the web app's own loading animation; the
/// teardown delay gives the page time to process the cleanup script before
/// the view is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeTimings {
    /// Delay between `kinestex_loaded` and clearing the loading flag
    pub loading_debounce: Duration,
    /// Delay between `kinestex_loaded` and hiding the loading overlay
    pub overlay_debounce: Duration,
    /// Delay between navigating to the blank page and releasing the view
    pub teardown_delay: Duration,
    /// Default deadline for `wait_until_ready`
    pub ready_timeout: Duration,
    /// Poll interval for `wait_until_ready`
    pub ready_poll_interval: Duration,
}

impl Default for BridgeTimings {
    fn default() -> Self {
        Self {
            loading_debounce: Duration::from_millis(200),
            overlay_debounce: Duration::from_millis(350),
            teardown_delay: Duration::from_millis(200),
            ready_timeout: Duration::from_secs(5),
            ready_poll_interval: Duration::from_millis(50),
        }
    }
}

/// Static credentials identifying the integrating company and user.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub company_name: String,
    pub user_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &redact_if_sensitive("api_key", &self.api_key))
            .field("company_name", &self.company_name)
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Core configuration for the KinesteX SDK.
///
/// Use [`KinestexConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct KinestexConfig {
    pub credentials: Credentials,

    /// Base URL of the embedded web app
    pub view_base_url: String,

    /// Base URL of the content REST API
    pub content_base_url: String,

    /// Language for content requests that do not specify one
    pub default_lang: String,

    /// HTTP client for content requests
    pub http_client: Arc<dyn HttpClient>,

    /// Optional per-request timeout applied to content requests
    pub request_timeout: Option<Duration>,

    pub timings: BridgeTimings,
}

impl std::fmt::Debug for KinestexConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KinestexConfig")
            .field("credentials", &self.credentials)
            .field("view_base_url", &self.view_base_url)
            .field("content_base_url", &self.content_base_url)
            .field("default_lang", &self.default_lang)
            .field("http_client", &"HttpClient { ... }")
            .field("request_timeout", &self.request_timeout)
            .field("timings", &self.timings)
            .finish()
    }
}

impl KinestexConfig {
    /// Creates a new builder for constructing a `KinestexConfig`.
    pub fn builder() -> KinestexConfigBuilder {
        KinestexConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Credentials are non-empty
    /// - Base URLs are http(s) URLs
    /// - Language is non-empty
    /// - Ready poll interval is non-zero and no longer than the ready timeout
    pub fn validate(&self) -> Result<()> {
        let creds = &self.credentials;
        for (name, value) in [
            ("API key", &creds.api_key),
            ("Company name", &creds.company_name),
            ("User id", &creds.user_id),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} cannot be empty", name)));
            }
        }

        for (name, url) in [
            ("View base URL", &self.view_base_url),
            ("Content base URL", &self.content_base_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(Error::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        if self.default_lang.trim().is_empty() {
            return Err(Error::Config("Default language cannot be empty".to_string()));
        }

        if self.timings.ready_poll_interval.is_zero() {
            return Err(Error::Config(
                "Ready poll interval must be greater than zero".to_string(),
            ));
        }

        if self.timings.ready_poll_interval > self.timings.ready_timeout {
            return Err(Error::Config(
                "Ready poll interval cannot exceed the ready timeout".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for content requests. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Mobile: inject a client backed by URLSession/OkHttp."
            .to_string(),
    })
}

/// Builder for constructing [`KinestexConfig`] instances.
#[derive(Default)]
pub struct KinestexConfigBuilder {
    api_key: Option<String>,
    company_name: Option<String>,
    user_id: Option<String>,
    view_base_url: Option<String>,
    content_base_url: Option<String>,
    default_lang: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    request_timeout: Option<Duration>,
    timings: BridgeTimings,
}

impl KinestexConfigBuilder {
    /// Sets all three credentials at once.
    pub fn credentials(
        self,
        api_key: impl Into<String>,
        company_name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        self.api_key(api_key)
            .company_name(company_name)
            .user_id(user_id)
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn company_name(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = Some(company_name.into());
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Overrides the embedded web app base URL. A trailing `/` is trimmed.
    pub fn view_base_url(mut self, url: impl Into<String>) -> Self {
        self.view_base_url = Some(url.into());
        self
    }

    /// Overrides the content API base URL. A trailing `/` is trimmed.
    pub fn content_base_url(mut self, url: impl Into<String>) -> Self {
        self.content_base_url = Some(url.into());
        self
    }

    pub fn default_lang(mut self, lang: impl Into<String>) -> Self {
        self.default_lang = Some(lang.into());
        self
    }

    /// Injects the HTTP client used for content requests.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use core_runtime::config::KinestexConfig;
    /// use std::sync::Arc;
    ///
    /// let config = KinestexConfig::builder()
    ///     .credentials("key", "company", "user")
    ///     .http_client(Arc::new(MyHttpClient))
    ///     .build()?;
    /// ```
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn timings(mut self, timings: BridgeTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] when a credential is missing or a value is invalid
    /// - [`Error::CapabilityMissing`] when no `HttpClient` was injected and no
    ///   platform default exists
    pub fn build(self) -> Result<KinestexConfig> {
        let api_key = self.api_key.ok_or_else(|| {
            Error::Config("API key is required. Use .api_key() to set it.".to_string())
        })?;

        let company_name = self.company_name.ok_or_else(|| {
            Error::Config("Company name is required. Use .company_name() to set it.".to_string())
        })?;

        let user_id = self.user_id.ok_or_else(|| {
            Error::Config("User id is required. Use .user_id() to set it.".to_string())
        })?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let config = KinestexConfig {
            credentials: Credentials {
                api_key,
                company_name,
                user_id,
            },
            view_base_url: trim_base(self.view_base_url, DEFAULT_VIEW_BASE_URL),
            content_base_url: trim_base(self.content_base_url, DEFAULT_CONTENT_BASE_URL),
            default_lang: self.default_lang.unwrap_or_else(|| DEFAULT_LANG.to_string()),
            http_client,
            request_timeout: self.request_timeout,
            timings: self.timings,
        };

        config.validate()?;

        Ok(config)
    }
}

fn trim_base(url: Option<String>, default: &str) -> String {
    url.unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{BridgeError, HttpRequest, HttpResponse};

    struct MockHttpClient;

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(
            &self,
            _request: HttpRequest,
        ) -> std::result::Result<HttpResponse, BridgeError> {
            Err(BridgeError::NotAvailable("mock".to_string()))
        }
    }

    fn builder() -> KinestexConfigBuilder {
        KinestexConfig::builder()
            .credentials("key", "Acme", "user-1")
            .http_client(Arc::new(MockHttpClient))
    }

    #[test]
    fn test_builder_applies_defaults() {
        let config = builder().build().unwrap();

        assert_eq!(config.view_base_url, DEFAULT_VIEW_BASE_URL);
        assert_eq!(config.content_base_url, DEFAULT_CONTENT_BASE_URL);
        assert_eq!(config.default_lang, "en");
        assert_eq!(config.timings, BridgeTimings::default());
        assert_eq!(config.timings.loading_debounce, Duration::from_millis(200));
        assert_eq!(config.timings.overlay_debounce, Duration::from_millis(350));
        assert_eq!(config.timings.ready_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_builder_requires_api_key() {
        let result = KinestexConfig::builder()
            .company_name("Acme")
            .user_id("user-1")
            .http_client(Arc::new(MockHttpClient))
            .build();

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("API key is required"));
    }

    #[test]
    fn test_validate_rejects_blank_credentials() {
        let result = KinestexConfig::builder()
            .credentials("key", "  ", "user-1")
            .http_client(Arc::new(MockHttpClient))
            .build();

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Company name cannot be empty"));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = builder()
            .view_base_url("https://staging.kinestex.app/")
            .content_base_url("http://localhost:8080/api/v1/")
            .build()
            .unwrap();

        assert_eq!(config.view_base_url, "https://staging.kinestex.app");
        assert_eq!(config.content_base_url, "http://localhost:8080/api/v1");
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let result = builder().content_base_url("ftp://example.com").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let timings = BridgeTimings {
            ready_poll_interval: Duration::ZERO,
            ..BridgeTimings::default()
        };
        assert!(builder().timings(timings).build().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = builder().build().unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("\"key\""));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_http_client_is_capability_error() {
        let result = KinestexConfig::builder()
            .credentials("key", "Acme", "user-1")
            .build();

        assert!(matches!(
            result,
            Err(Error::CapabilityMissing { ref capability, .. }) if capability == "HttpClient"
        ));
    }

    #[cfg(feature = "desktop-shims")]
    #[tokio::test]
    async fn test_build_with_desktop_default_client() {
        let config = KinestexConfig::builder()
            .credentials("key", "Acme", "user-1")
            .build();
        assert!(config.is_ok());
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = builder().build().unwrap();
        let cloned = config.clone();
        assert_eq!(cloned.credentials, config.credentials);
    }
}
