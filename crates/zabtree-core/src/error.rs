// ── Core error types ──
//
// Errors surfaced by the engine. Wire-level failures from zabtree-api are
// translated through `From<zabtree_api::Error>`; failures of a single
// remote step are wrapped in `RemoteOperation` with the node they were
// acting on.

use std::fmt;

use thiserror::Error;

/// Remote step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListTriggers,
    ListServices,
    CreateService,
    DeleteDependencies,
    DeleteService,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ListTriggers => "list triggers",
            Self::ListServices => "list services",
            Self::CreateService => "create service",
            Self::DeleteDependencies => "delete service dependencies",
            Self::DeleteService => "delete service",
        })
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to Zabbix at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Engine errors ────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Failed to {operation}{}: {source}", node_context(.name.as_deref(), .parent.as_deref()))]
    RemoteOperation {
        operation: Operation,
        name: Option<String>,
        parent: Option<String>,
        #[source]
        source: Box<CoreError>,
    },

    #[error(
        "Purge stalled: {remaining} service(s) still present after {cycles} cycle(s)"
    )]
    PurgeStalled { cycles: u32, remaining: usize },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// JSON-RPC error code, if the server sent one.
        code: Option<i64>,
        status: Option<u16>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

fn node_context(name: Option<&str>, parent: Option<&str>) -> String {
    match (name, parent) {
        (Some(n), Some(p)) => format!(" '{n}' (parent {p})"),
        (Some(n), None) => format!(" '{n}'"),
        (None, Some(p)) => format!(" (parent {p})"),
        (None, None) => String::new(),
    }
}

impl CoreError {
    /// Wrap `source` as the failure of `operation` on the named node.
    pub fn remote(
        operation: Operation,
        name: Option<&str>,
        parent: Option<&str>,
        source: CoreError,
    ) -> Self {
        Self::RemoteOperation {
            operation,
            name: name.map(str::to_owned),
            parent: parent.map(str::to_owned),
            source: Box::new(source),
        }
    }

    /// The innermost error, skipping `RemoteOperation` wrappers.
    pub fn root_cause(&self) -> &CoreError {
        match self {
            Self::RemoteOperation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<zabtree_api::Error> for CoreError {
    fn from(err: zabtree_api::Error) -> Self {
        match err {
            zabtree_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            zabtree_api::Error::NotAuthenticated => CoreError::AuthenticationFailed {
                message: "No session -- login required".into(),
            },
            zabtree_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            zabtree_api::Error::InvalidUrl(e) => CoreError::Validation {
                message: format!("Invalid URL: {e}"),
            },
            zabtree_api::Error::Http { status, message } => CoreError::Api {
                message: format!("HTTP {status}: {message}"),
                code: None,
                status: Some(status),
            },
            zabtree_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            err @ zabtree_api::Error::Rpc { .. } if err.is_auth_expired() => {
                CoreError::AuthenticationFailed {
                    message: err.to_string(),
                }
            }
            zabtree_api::Error::Rpc {
                method,
                code,
                message,
                data,
            } => CoreError::Api {
                message: match data {
                    Some(d) => format!("{method}: {message} {d}"),
                    None => format!("{method}: {message}"),
                },
                code: Some(code),
                status: None,
            },
            zabtree_api::Error::UnexpectedResponse { method, message } => {
                CoreError::Internal(format!("Unexpected response to {method}: {message}"))
            }
            zabtree_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
