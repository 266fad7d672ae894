use reqwest::StatusCode;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid construction parameters.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read API key file {}", path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request never produced an HTTP response.
    #[error("{kind} for url ({url})")]
    Transport {
        kind: TransportErrorKind,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status {
        status: StatusCode,
        url: String,
        message: String,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to spawn poll thread")]
    Spawn(#[source] std::io::Error),

    #[error("poll thread panicked while dispatching callbacks")]
    PollerPanicked,
}

impl Error {
    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            Error::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        Error::Transport {
            kind: TransportErrorKind::classify(&source),
            url: url.to_string(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    ConnectionFailed,
    Tls,
}

impl TransportErrorKind {
    fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return TransportErrorKind::Timeout;
        }

        let mut source = std::error::Error::source(err);
        while let Some(e) = source {
            if is_tls_error(e) {
                return TransportErrorKind::Tls;
            }
            source = std::error::Error::source(e);
        }

        TransportErrorKind::ConnectionFailed
    }
}

// rustls failures reach us either directly or wrapped in the io::Error the
// TLS stream returned during the handshake.
fn is_tls_error(e: &(dyn std::error::Error + 'static)) -> bool {
    if e.is::<rustls::Error>() {
        return true;
    }
    e.downcast_ref::<std::io::Error>()
        .and_then(std::io::Error::get_ref)
        .is_some_and(|inner| inner.is::<rustls::Error>())
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransportErrorKind::Timeout => "request timed out",
            TransportErrorKind::ConnectionFailed => "connection failed",
            TransportErrorKind::Tls => "TLS verification failed",
        })
    }
}

/// Whole-document decode failures. Individual fields that cannot be read are
/// reported as absent instead.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed JSON payload: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("payload has no `current_observations` object")]
    MissingObservations,

    /// The API answered with its own error object instead of observations.
    #[error("API error ({kind}): {description}")]
    Api { kind: String, description: String },
}

#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct ApiErrorResponse {
    // Legacy endpoints: {"response": {"error": {"type": ..., "description": ...}}}
    #[serde(default)]
    response: Option<LegacyEnvelope>,
    // Newer endpoints: {"errors": [{"error": {"code": ..., "message": ...}}]}
    #[serde(default)]
    errors: Vec<ErrorEntry>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct LegacyEnvelope {
    #[serde(default)]
    error: Option<LegacyError>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct LegacyError {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiErrorResponse {
    /// `(kind, description)` of the first error the payload carries.
    pub(crate) fn summary(&self) -> Option<(String, String)> {
        if let Some(e) = self.response.as_ref().and_then(|r| r.error.as_ref()) {
            return Some((
                e.kind.clone().unwrap_or_default(),
                e.description.clone().unwrap_or_default(),
            ));
        }

        if let Some(e) = self.errors.iter().find_map(|entry| entry.error.as_ref()) {
            return Some((
                e.code.clone().unwrap_or_default(),
                e.message.clone().unwrap_or_default(),
            ));
        }

        self.message.clone().map(|m| (String::new(), m))
    }
}

pub(crate) fn format_status_error(status: StatusCode, url: &str, body: &str) -> String {
    let (kind, description) = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|e| e.summary())
        .unwrap_or_default();
    let server = if description.is_empty() {
        body.trim().chars().take(200).collect::<String>()
    } else if kind.is_empty() {
        description
    } else {
        format!("{description} ({kind})")
    };

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return format!(
            "Weather API authentication failed (HTTP {}).\n\
             - Check that the API key is valid and has not expired\n\
             - Check that the key is enabled for the current-conditions endpoint\n\n\
             Server message: {}\nrequest: {}",
            status.as_u16(),
            server,
            url
        );
    }

    if status == StatusCode::NOT_FOUND {
        return format!(
            "Weather API endpoint not found (HTTP 404).\n\
             - The configured base URL may be wrong (default: https://api.wunderground.com)\n\
             - The location must be \"lat,lon\" or \"region/city\"\n\n\
             Server message: {}\nrequest: {}",
            server, url
        );
    }

    format!(
        "API request failed: HTTP {} for url ({})\n{}",
        status.as_u16(),
        url,
        server
    )
}
