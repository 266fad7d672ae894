use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::callbacks::Callbacks;
use crate::conditions::Conditions;
use crate::config::ClientConfig;
use crate::error::{Error, Result, format_status_error};
use crate::poller::{self, PollHandle, TimeUnit};
use crate::units::Units;
use crate::util::{language_tag, redact_key};

/// Blocking client for the current-conditions endpoint.
///
/// Cheap to clone; clones share the HTTP connection pool and the frozen
/// [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    http: HttpClient,
}

impl Client {
    /// Creates a client with metric units and English output.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::new(api_key))
    }

    pub fn with_options(
        api_key: impl Into<String>,
        units: Units,
        language: &str,
        language_variant: &str,
    ) -> Result<Self> {
        Self::from_config(
            ClientConfig::new(api_key)
                .with_units(units)
                .with_language(language)
                .with_language_variant(language_variant),
        )
    }

    /// Creates a client whose API key is the first line of `path`.
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(ClientConfig::from_key_file(path)?)
    }

    pub fn from_key_file_with_options(
        path: impl AsRef<Path>,
        units: Units,
        language: &str,
        language_variant: &str,
    ) -> Result<Self> {
        Self::from_config(
            ClientConfig::from_key_file(path)?
                .with_units(units)
                .with_language(language)
                .with_language_variant(language_variant),
        )
    }

    /// Creates a client using environment variables and/or a key file.
    ///
    /// This is equivalent to `Client::from_config(ClientConfig::load(None, None, None)?)`.
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::load(None, None, None)?)
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("wunderground-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("wunderground-rs")),
        );

        let mut builder = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true);

        if !config.verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Request URL for `location` (`"lat,lon"` or `"region/city"`).
    pub fn conditions_url(&self, location: &str) -> Result<String> {
        let location = location.trim().trim_matches('/');
        if location.is_empty() {
            return Err(Error::Config("location must not be empty".into()));
        }

        let cfg = &self.config;
        Ok(format!(
            "{}/api/{}/conditions/q/{}.json?units={}&language={}",
            cfg.url.trim_end_matches('/'),
            cfg.api_key.trim(),
            location,
            cfg.units.code(),
            language_tag(&cfg.language, &cfg.language_variant)
        ))
    }

    /// Performs one GET and returns the body unparsed.
    ///
    /// Non-2xx answers are reported as [`Error::Status`].
    pub fn fetch_raw(&self, location: &str) -> Result<Vec<u8>> {
        let url = self.conditions_url(location)?;
        let redacted = redact_key(&url, self.config.api_key.trim());
        debug!(url = %redacted, "fetching current conditions");

        let resp = self
            .http
            .get(&url)
            .send()
            .map_err(|e| Error::transport(&redacted, e.without_url()))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .map_err(|e| Error::transport(&redacted, e.without_url()))?;

        if !status.is_success() {
            warn!(%status, url = %redacted, "weather API returned an error status");
            let text = String::from_utf8_lossy(&body);
            return Err(Error::Status {
                status,
                message: format_status_error(status, &redacted, &text),
                url: redacted,
            });
        }

        debug!(%status, bytes = body.len(), "current conditions received");
        Ok(body.to_vec())
    }

    pub fn fetch_conditions(&self, location: &str) -> Result<Conditions> {
        let body = self.fetch_raw(location)?;
        Ok(Conditions::from_slice(&body)?)
    }

    /// One fetch-parse-dispatch cycle. Nothing is dispatched unless the
    /// whole document parses.
    pub fn fetch_and_dispatch<U>(&self, callbacks: &Callbacks<U>, location: &str) -> Result<()> {
        let conditions = self.fetch_conditions(location)?;
        let invoked = callbacks.dispatch(&conditions);
        debug!(location, invoked, "dispatched current conditions");
        Ok(())
    }

    /// Starts a background thread repeating [`Client::fetch_and_dispatch`]
    /// every `interval` until the returned handle is stopped.
    ///
    /// Returns as soon as the thread is spawned. Failed cycles are logged and
    /// skipped.
    pub fn start_poll<U>(
        &self,
        callbacks: Arc<Callbacks<U>>,
        location: &str,
        interval: Duration,
    ) -> Result<PollHandle>
    where
        U: Send + Sync + 'static,
    {
        poller::spawn(self.clone(), callbacks, location, interval)
    }

    pub fn poll_every<U>(
        &self,
        callbacks: Arc<Callbacks<U>>,
        location: &str,
        unit: TimeUnit,
        multiplier: u32,
    ) -> Result<PollHandle>
    where
        U: Send + Sync + 'static,
    {
        self.start_poll(callbacks, location, unit.interval(multiplier))
    }

    pub fn poll_minutely<U>(
        &self,
        callbacks: Arc<Callbacks<U>>,
        location: &str,
    ) -> Result<PollHandle>
    where
        U: Send + Sync + 'static,
    {
        self.start_poll(callbacks, location, poller::minutely())
    }

    pub fn poll_hourly<U>(
        &self,
        callbacks: Arc<Callbacks<U>>,
        location: &str,
    ) -> Result<PollHandle>
    where
        U: Send + Sync + 'static,
    {
        self.start_poll(callbacks, location, poller::hourly())
    }

    pub fn poll_daily<U>(
        &self,
        callbacks: Arc<Callbacks<U>>,
        location: &str,
    ) -> Result<PollHandle>
    where
        U: Send + Sync + 'static,
    {
        self.start_poll(callbacks, location, poller::daily())
    }
}
