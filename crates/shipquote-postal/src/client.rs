//! HTTP client for a ViaCEP-compatible postal-code lookup service.
//!
//! Resolution is display enrichment only: callers are expected to treat any
//! [`PostalError`] as "no locality" and keep quoting.

use std::time::Duration;

use reqwest::{Client, Url};
use shipquote_core::{Destination, PostalCode};

use crate::error::PostalError;
use crate::retry::{retry_with_backoff, worst_case_backoff_ms};
use crate::types::AddressResponse;

const DEFAULT_BASE_URL: &str = "https://viacep.com.br/ws/";
const DEFAULT_BACKOFF_BASE_MS: u64 = 250;

/// Client for the postal-code lookup service.
///
/// Use [`PostalClient::new`] for production or [`PostalClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct PostalClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PostalClient {
    /// Creates a client pointed at the public ViaCEP service.
    ///
    /// # Errors
    ///
    /// Returns [`PostalError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self, PostalError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout, max_retries)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`PostalError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PostalError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        base_url: &str,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, PostalError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent("shipquote/0.1 (shipping-estimates)")
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PostalError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            timeout,
            max_retries,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        })
    }

    /// Overrides the base back-off delay between retries.
    #[must_use]
    pub fn with_backoff_base_ms(mut self, backoff_base_ms: u64) -> Self {
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Upper bound on how long [`resolve`](Self::resolve) can take: every
    /// attempt running to its request timeout, plus the longest back-off
    /// between them.
    #[must_use]
    pub fn lookup_budget(&self) -> Duration {
        let attempts = self.max_retries.saturating_add(1);
        self.timeout
            .saturating_mul(attempts)
            .saturating_add(Duration::from_millis(worst_case_backoff_ms(
                self.max_retries,
                self.backoff_base_ms,
            )))
    }

    /// Resolves a postal code to its locality and state.
    ///
    /// Transient failures are retried up to `max_retries` times.
    ///
    /// # Errors
    ///
    /// - [`PostalError::NotFound`] if the service does not know the code.
    /// - [`PostalError::Incomplete`] if locality or state is missing.
    /// - [`PostalError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PostalError::Deserialize`] if the body is not the expected JSON.
    pub async fn resolve(&self, postal_code: &PostalCode) -> Result<Destination, PostalError> {
        let url = self.build_url(postal_code)?;
        let url = &url;
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, move || {
            self.request_address(url)
        })
        .await?;

        if body.is_not_found() {
            return Err(PostalError::NotFound(postal_code.to_string()));
        }
        let (locality, state) = body
            .locality_and_state()
            .ok_or_else(|| PostalError::Incomplete(postal_code.to_string()))?;

        tracing::debug!(%postal_code, locality, state, "resolved postal code");
        Ok(Destination {
            postal_code: postal_code.clone(),
            locality: locality.to_owned(),
            state: state.to_ascii_uppercase(),
        })
    }

    fn build_url(&self, postal_code: &PostalCode) -> Result<Url, PostalError> {
        self.base_url
            .join(&format!("{}/json/", postal_code.digits()))
            .map_err(|e| PostalError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn request_address(&self, url: &Url) -> Result<AddressResponse, PostalError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PostalError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}
