// ── Runtime configuration ──
//
// These types describe how to reach Zabbix and what tree to build. They
// carry credential data and engine options but never touch disk; the CLI
// builds them from profiles and flags and hands them in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;
use crate::model::{ServiceDefaults, Severity, TriggerQuery};

/// How to authenticate with the Zabbix frontend.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// `user.login` with name and password.
    Password { user: String, password: SecretString },
    /// Frontend behind HTTP basic auth.
    HttpBasic { user: String, password: SecretString },
}

impl AuthCredentials {
    pub fn user(&self) -> &str {
        match self {
            Self::Password { user, .. } | Self::HttpBasic { user, .. } => user,
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for one Zabbix server.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Frontend URL (e.g. `https://zabbix.example.com/zabbix`).
    pub url: Url,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

/// Optional structural chain above the host-group nodes.
///
/// Each level requires the one above it: a branch without a root, or a
/// node without a branch, is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreePrefix {
    root: Option<String>,
    branch: Option<String>,
    node: Option<String>,
}

impl TreePrefix {
    pub fn new(
        root: Option<String>,
        branch: Option<String>,
        node: Option<String>,
    ) -> Result<Self, CoreError> {
        let blank = |s: Option<&str>| s.is_some_and(|v| v.trim().is_empty());
        if blank(root.as_deref()) || blank(branch.as_deref()) || blank(node.as_deref()) {
            return Err(CoreError::Validation {
                message: "prefix names must not be empty".into(),
            });
        }
        if branch.is_some() && root.is_none() {
            return Err(CoreError::Validation {
                message: "a branch requires a root".into(),
            });
        }
        if node.is_some() && branch.is_none() {
            return Err(CoreError::Validation {
                message: "a node requires a branch".into(),
            });
        }
        Ok(Self { root, branch, node })
    }

    /// Names from the top down; empty when no prefix is configured.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        [&self.root, &self.branch, &self.node]
            .into_iter()
            .map_while(|level| level.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

/// Borrowed view of the options the projector needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionOptions<'a> {
    /// When set, every leaf is attributed to this single group.
    pub hostgroup: Option<&'a str>,
    /// Only triggers whose raw description contains this text are kept.
    pub description_filter: Option<&'a str>,
}

/// What tree to build and how.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub hostgroup: Option<String>,
    pub description_filter: Option<String>,
    pub min_severity: Severity,
    pub monitored_only: bool,
    pub prefix: TreePrefix,
    pub service: ServiceDefaults,
    /// Consecutive purge cycles without progress before giving up.
    pub max_stalled_cycles: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            hostgroup: None,
            description_filter: None,
            min_severity: Severity::Disaster,
            monitored_only: true,
            prefix: TreePrefix::default(),
            service: ServiceDefaults::default(),
            max_stalled_cycles: 3,
        }
    }
}

impl SyncOptions {
    pub fn projection(&self) -> ProjectionOptions<'_> {
        ProjectionOptions {
            hostgroup: self.hostgroup.as_deref(),
            description_filter: self.description_filter.as_deref(),
        }
    }

    pub fn trigger_query(&self) -> TriggerQuery {
        TriggerQuery {
            min_severity: self.min_severity,
            monitored_only: self.monitored_only,
            group: self.hostgroup.clone(),
        }
    }
}
