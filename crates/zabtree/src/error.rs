//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use zabtree_config::ConfigError;
use zabtree_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const STALLED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Zabbix at {url}")]
    #[diagnostic(
        code(zabtree::connection_failed),
        help(
            "Check that the frontend is reachable and the URL points at it.\n\
             URL: {url}\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(zabtree::auth_failed),
        help(
            "Verify the user name and password.\n\
             Store a new password with: zabtree config set-password\n\
             Behind HTTP basic auth? Add --http-auth."
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(zabtree::no_credentials),
        help(
            "Pass --user with -p (prompt) or --passfile FILE,\n\
             set ZABTREE_PASSWORD, or run: zabtree config init"
        )
    )]
    NoCredentials { profile: String },

    // ── Remote operations ────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(zabtree::remote_operation))]
    Remote {
        message: String,
        /// Exit code of the underlying failure.
        exit: i32,
    },

    #[error("Purge stalled: {remaining} service(s) still present after {cycles} cycle(s)")]
    #[diagnostic(
        code(zabtree::purge_stalled),
        help(
            "The server did not remove child services with their parents.\n\
             Run purge again, or raise --max-stalled."
        )
    )]
    PurgeStalled { cycles: u32, remaining: usize },

    #[error("API error: {message}")]
    #[diagnostic(code(zabtree::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(zabtree::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(zabtree::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: zabtree config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(zabtree::no_config),
        help(
            "Pass --server, or create a profile with: zabtree config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Profile '{name}' already exists")]
    #[diagnostic(
        code(zabtree::conflict),
        help("Use --yes (-y) to overwrite it.")
    )]
    Conflict { name: String },

    #[error(transparent)]
    #[diagnostic(code(zabtree::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(zabtree::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(zabtree::timeout),
        help("Increase timeout with --timeout or check frontend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(zabtree::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(zabtree::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(zabtree::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::PurgeStalled { .. } => exit_code::STALLED,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Remote { exit, .. } => *exit,
            Self::NoCredentials { .. }
            | Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            other => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            err @ CoreError::RemoteOperation { .. } => {
                CliError::Remote {
                    exit: root_exit_code(&err),
                    message: err.to_string(),
                }
            }

            CoreError::PurgeStalled { cycles, remaining } => {
                CliError::PurgeStalled { cycles, remaining }
            }

            CoreError::Api { message, .. } => CliError::ApiError { message },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

/// Exit code for the innermost cause of a wrapped remote failure.
fn root_exit_code(err: &CoreError) -> i32 {
    match err.root_cause() {
        CoreError::ConnectionFailed { .. } => exit_code::CONNECTION,
        CoreError::AuthenticationFailed { .. } => exit_code::AUTH,
        CoreError::Timeout { .. } => exit_code::TIMEOUT,
        _ => exit_code::GENERAL,
    }
}

#[cfg(test)]
mod tests {
    use zabtree_core::Operation;

    use super::*;

    #[test]
    fn remote_failures_keep_context_and_root_exit_code() {
        let err = CoreError::remote(
            Operation::CreateService,
            Some("web01 - Web 01"),
            Some("12"),
            CoreError::Timeout { timeout_secs: 30 },
        );
        let cli: CliError = err.into();
        assert_eq!(cli.exit_code(), exit_code::TIMEOUT);
        assert!(cli.to_string().contains("'web01 - Web 01' (parent 12)"));
    }

    #[test]
    fn exit_codes() {
        let stalled: CliError = CoreError::PurgeStalled {
            cycles: 3,
            remaining: 2,
        }
        .into();
        assert_eq!(stalled.exit_code(), exit_code::STALLED);

        let auth: CliError = CoreError::AuthenticationFailed {
            message: "bad password".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let creds: CliError = ConfigError::NoCredentials {
            profile: "default".into(),
        }
        .into();
        assert_eq!(creds.exit_code(), exit_code::USAGE);

        let conn: CliError = CoreError::ConnectionFailed {
            url: "https://zabbix.example.com".into(),
            reason: "refused".into(),
        }
        .into();
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);
    }
}
