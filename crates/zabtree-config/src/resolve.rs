// ── Profile → core configuration ──

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use url::Url;

use zabtree_core::{
    AuthCredentials, ConnectionConfig, CoreError, Severity, SyncOptions, TlsVerification,
    TreePrefix,
};

use crate::credentials::resolve_password;
use crate::{ConfigError, Profile};

/// Frontend URLs must look like `http(s)://host.domain.tld...`.
static SERVER_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://\w{2,30}\.\w{2,30}\.[\w.]*").expect("server URL pattern is valid")
});

/// Check a frontend URL and parse it.
pub fn validate_server(server: &str) -> Result<Url, ConfigError> {
    if !SERVER_URL.is_match(server) {
        return Err(ConfigError::Validation {
            field: "server".into(),
            reason: format!("'{server}' does not look like http(s)://host.domain.tld[/path]"),
        });
    }
    Url::parse(server).map_err(|e| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL '{server}': {e}"),
    })
}

/// Profile user, falling back to `ZABTREE_USER`.
pub fn resolve_user(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .user
        .clone()
        .or_else(|| std::env::var("ZABTREE_USER").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Resolve `AuthCredentials`; `http_auth` selects basic auth.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, ConfigError> {
    let user = resolve_user(profile, profile_name)?;
    let password = resolve_password(profile, profile_name)?;
    Ok(if profile.http_auth {
        AuthCredentials::HttpBasic { user, password }
    } else {
        AuthCredentials::Password { user, password }
    })
}

/// TLS mode for a profile. Without explicit settings certificates are not
/// verified.
pub fn tls_for_profile(profile: &Profile) -> TlsVerification {
    match (profile.insecure, &profile.ca_cert) {
        (Some(true), _) | (None, None) => TlsVerification::DangerAcceptInvalid,
        (_, Some(ca_path)) => TlsVerification::CustomCa(ca_path.clone()),
        (Some(false), None) => TlsVerification::SystemDefaults,
    }
}

/// Build a `ConnectionConfig` from a profile, no CLI flag overrides.
pub fn profile_to_connection_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ConnectionConfig, ConfigError> {
    let url = validate_server(&profile.server)?;
    let auth = resolve_auth(profile, profile_name)?;

    Ok(ConnectionConfig {
        url,
        auth,
        tls: tls_for_profile(profile),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(30)),
    })
}

/// Build `SyncOptions` from a profile's tree settings.
pub fn profile_to_sync_options(profile: &Profile) -> Result<SyncOptions, ConfigError> {
    let mut options = SyncOptions {
        hostgroup: profile.hostgroup.clone(),
        description_filter: profile.filter.clone(),
        prefix: TreePrefix::new(
            profile.root.clone(),
            profile.branch.clone(),
            profile.node.clone(),
        )
        .map_err(|e| ConfigError::Validation {
            field: "prefix".into(),
            reason: match e {
                CoreError::Validation { message } => message,
                other => other.to_string(),
            },
        })?,
        ..SyncOptions::default()
    };

    if let Some(sla) = profile.sla {
        if !(0.0..=100.0).contains(&sla) {
            return Err(ConfigError::Validation {
                field: "sla".into(),
                reason: format!("{sla} is not a percentage"),
            });
        }
        options.service.sla_target = sla;
    }

    if let Some(priority) = profile.priority {
        options.min_severity =
            Severity::from_code(priority).ok_or_else(|| ConfigError::Validation {
                field: "priority".into(),
                reason: format!("expected 0-5, got {priority}"),
            })?;
    }

    Ok(options)
}
