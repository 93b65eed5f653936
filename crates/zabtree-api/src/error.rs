use thiserror::Error;

/// Top-level error type for the `zabtree-api` crate.
///
/// Covers every failure mode of the JSON-RPC surface: authentication,
/// transport, RPC-level errors, and payload decoding. `zabtree-core` maps
/// these into domain errors with node context attached.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, disabled account, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A call that needs a session token was made before `login()`.
    #[error("Not logged in -- call login() first")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-2xx HTTP status from the API endpoint.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── JSON-RPC ────────────────────────────────────────────────────
    /// Error object returned in the JSON-RPC envelope.
    #[error("{method} failed ({code}): {message}{}", detail_suffix(.data.as_deref()))]
    Rpc {
        method: String,
        code: i64,
        message: String,
        data: Option<String>,
    },

    /// The envelope carried neither `result` nor `error`, or the result
    /// was missing an expected field.
    #[error("Unexpected response to {method}: {message}")]
    UnexpectedResponse { method: String, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

fn detail_suffix(data: Option<&str>) -> String {
    data.map(|d| format!(" -- {d}")).unwrap_or_default()
}

impl Error {
    /// Returns `true` if this error indicates the session token is no
    /// longer accepted and logging in again might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Self::Authentication { .. } | Self::NotAuthenticated | Self::Http { status: 401, .. } => {
                true
            }
            Self::Rpc { message, data, .. } => {
                let text = data.as_deref().unwrap_or(message);
                text.contains("re-login") || text.contains("Not authorised")
            }
            _ => false,
        }
    }

    /// Returns `true` if this is a transient transport error.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_display_includes_data() {
        let err = Error::Rpc {
            method: "service.create".into(),
            code: -32602,
            message: "Invalid params.".into(),
            data: Some("Service \"web\" already exists.".into()),
        };
        assert_eq!(
            err.to_string(),
            "service.create failed (-32602): Invalid params. -- Service \"web\" already exists."
        );
    }

    #[test]
    fn session_terminated_counts_as_expired() {
        let err = Error::Rpc {
            method: "service.get".into(),
            code: -32602,
            message: "Invalid params.".into(),
            data: Some("Session terminated, re-login, please.".into()),
        };
        assert!(err.is_auth_expired());
        assert!(!err.is_transient());
    }
}
