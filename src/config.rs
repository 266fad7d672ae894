use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::units::Units;

pub const DEFAULT_URL: &str = "https://api.wunderground.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LANGUAGE: &str = "en";

const KEY_FILE_NAME: &str = ".wunderground_key";

/// Credentials and formatting preferences used to build every request.
///
/// Frozen once handed to [`crate::Client`]; pollers share it read-only.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base API URL, typically `https://api.wunderground.com`.
    pub url: String,
    pub api_key: String,
    pub units: Units,
    /// Two-letter language code, e.g. `en`.
    pub language: String,
    /// Optional region variant, e.g. `US` for `en-US`. Empty for none.
    pub language_variant: String,
    /// Upper bound for one request, connect to last body byte.
    pub timeout: Duration,
    /// Whether to verify TLS certificates.
    pub verify: bool,
    /// Whether to honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            api_key: api_key.into(),
            units: Units::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            language_variant: String::new(),
            timeout: DEFAULT_TIMEOUT,
            verify: true,
            use_system_proxy: true,
        }
    }

    /// Builds a config whose API key is the first line of `path`.
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(read_key_file(path.as_ref())?))
    }

    /// Loads configuration using (in order of precedence):
    /// - explicit `api_key`/`url` arguments
    /// - environment variables `WUNDERGROUND_API_KEY` / `WUNDERGROUND_URL`
    /// - key file from `WUNDERGROUND_KEY_FILE`, `./.wunderground_key` or `~/.wunderground_key`
    ///
    /// `WUNDERGROUND_UNITS` and `WUNDERGROUND_LANGUAGE` (e.g. `de-DE`) are applied
    /// when set.
    pub fn load(
        api_key: Option<String>,
        url: Option<String>,
        verify: Option<bool>,
    ) -> Result<Self> {
        let api_key = resolve_api_key(
            api_key,
            std::env::var("WUNDERGROUND_API_KEY").ok(),
            &key_file_candidates(),
        )?;

        let mut cfg = Self::new(api_key);
        if let Some(url) = url.or_else(|| std::env::var("WUNDERGROUND_URL").ok()) {
            cfg.url = url;
        }
        if let Ok(units) = std::env::var("WUNDERGROUND_UNITS") {
            cfg.units = Units::try_from(units.as_str())?;
        }
        if let Ok(tag) = std::env::var("WUNDERGROUND_LANGUAGE") {
            let (language, variant) = split_language_tag(&tag);
            cfg.language = language.to_string();
            cfg.language_variant = variant.to_string();
        }
        cfg.verify = verify.unwrap_or(true);

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_language_variant(mut self, variant: impl Into<String>) -> Self {
        self.language_variant = variant.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_system_proxy(mut self, use_system_proxy: bool) -> Self {
        self.use_system_proxy = use_system_proxy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(Error::Config("api_key must not be empty".into()));
        }
        if key.contains(|c: char| c.is_whitespace() || c == '/') {
            return Err(Error::Config(
                "api_key must not contain whitespace or '/'".into(),
            ));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "url must start with http:// or https:// (got '{}')",
                self.url
            )));
        }
        if self.language.is_empty() || !self.language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::Config(format!(
                "language must be a non-empty alphabetic code (got '{}')",
                self.language
            )));
        }
        if !self.language_variant.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::Config(format!(
                "language_variant must be alphanumeric (got '{}')",
                self.language_variant
            )));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("api_key", &"***")
            .field("units", &self.units)
            .field("language", &self.language)
            .field("language_variant", &self.language_variant)
            .field("timeout", &self.timeout)
            .field("verify", &self.verify)
            .field("use_system_proxy", &self.use_system_proxy)
            .finish()
    }
}

/// Reads the API key from the first line of `path`, without its line ending.
pub fn read_key_file(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::KeyFile {
        path: path.to_path_buf(),
        source,
    })?;

    let key = text.lines().next().unwrap_or("").trim();
    if key.is_empty() {
        return Err(Error::Config(format!(
            "API key file {} is empty",
            path.display()
        )));
    }
    Ok(key.to_string())
}

fn resolve_api_key(
    explicit: Option<String>,
    from_env: Option<String>,
    candidates: &[PathBuf],
) -> Result<String> {
    if let Some(key) = explicit.or(from_env).filter(|k| !k.trim().is_empty()) {
        return Ok(key.trim().to_string());
    }

    for path in candidates {
        if path.exists() {
            return read_key_file(path);
        }
    }

    if candidates.is_empty() {
        return Err(Error::Config(
            "missing API key (set WUNDERGROUND_API_KEY or create .wunderground_key)".into(),
        ));
    }
    Err(Error::Config(format!(
        "missing API key (set WUNDERGROUND_API_KEY or put the key in one of: {})",
        candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

fn key_file_candidates() -> Vec<PathBuf> {
    // 1) WUNDERGROUND_KEY_FILE (explicit)
    // 2) ./.wunderground_key
    // 3) ~/.wunderground_key
    if let Ok(p) = std::env::var("WUNDERGROUND_KEY_FILE") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(KEY_FILE_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(KEY_FILE_NAME));
    }
    v
}

fn split_language_tag(tag: &str) -> (&str, &str) {
    let tag = tag.trim();
    tag.split_once(['-', '_']).unwrap_or((tag, ""))
}
