// ── Controller abstraction ──
//
// Session lifecycle for one Zabbix frontend: builds the HTTP client,
// authenticates, runs engine operations against the live session, and
// logs out.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use zabtree_api::transport::{TlsMode, TransportConfig};
use zabtree_api::{Credentials, ZabbixClient};

use crate::config::{AuthCredentials, ConnectionConfig, SyncOptions, TlsVerification};
use crate::error::CoreError;
use crate::reconcile::{PurgeReport, ReconcileReport, Reconciler};
use crate::store::ServiceTreeCache;

/// Entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Call
/// [`connect()`](Self::connect) before running operations, or use
/// [`oneshot()`](Self::oneshot).
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ConnectionConfig,
    client: Mutex<Option<ZabbixClient>>,
    api_version: Mutex<Option<String>>,
}

impl Controller {
    /// Create a controller. Does NOT connect.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                config,
                client: Mutex::new(None),
                api_version: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Build the client and log in.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;
        let transport = build_transport(config);

        let mut client =
            ZabbixClient::new(&config.url, &transport).map_err(|e| CoreError::ConnectionFailed {
                url: config.url.to_string(),
                reason: e.to_string(),
            })?;

        client
            .login(&credentials(&config.auth))
            .await
            .map_err(|e| self.contextualize(e.into()))?;

        // Informational only; some frontends restrict it.
        match client.api_version().await {
            Ok(version) => {
                info!(%version, endpoint = %client.endpoint(), "connected to Zabbix API");
                *self.inner.api_version.lock().await = Some(version);
            }
            Err(e) => debug!(error = %e, "API version unavailable"),
        }

        *self.inner.client.lock().await = Some(client);
        Ok(())
    }

    /// Log out and drop the session. Logout failures are only logged.
    pub async fn disconnect(&self) {
        let client = self.inner.client.lock().await.take();
        if let Some(mut client) = client {
            if let Err(e) = client.logout().await {
                warn!(error = %e, "logout failed");
            }
        }
        debug!("disconnected");
    }

    /// Frontend API version reported at connect time.
    pub async fn api_version(&self) -> Option<String> {
        self.inner.api_version.lock().await.clone()
    }

    // ── Operations ───────────────────────────────────────────────

    /// Create missing service nodes for the current trigger inventory.
    pub async fn populate(&self, options: &SyncOptions) -> Result<ReconcileReport, CoreError> {
        let guard = self.inner.client.lock().await;
        let client = guard.as_ref().ok_or_else(not_connected)?;
        Reconciler::new(client, options)
            .populate()
            .await
            .map_err(|e| self.contextualize(e))
    }

    /// Delete every service node.
    pub async fn purge(&self, options: &SyncOptions) -> Result<PurgeReport, CoreError> {
        let guard = self.inner.client.lock().await;
        let client = guard.as_ref().ok_or_else(not_connected)?;
        Reconciler::new(client, options)
            .purge()
            .await
            .map_err(|e| self.contextualize(e))
    }

    /// Current service tree.
    pub async fn service_tree(&self) -> Result<ServiceTreeCache, CoreError> {
        let guard = self.inner.client.lock().await;
        let client = guard.as_ref().ok_or_else(not_connected)?;
        let mut cache = ServiceTreeCache::new();
        cache
            .load(client)
            .await
            .map_err(|e| self.contextualize(e))?;
        Ok(cache)
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    pub async fn oneshot<F, Fut, T>(config: ConnectionConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let controller = Controller::new(config);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    /// Fill in details the transport layer does not know.
    fn contextualize(&self, err: CoreError) -> CoreError {
        let config = &self.inner.config;
        match err {
            CoreError::Timeout { timeout_secs: 0 } => CoreError::Timeout {
                timeout_secs: config.timeout.as_secs(),
            },
            CoreError::ConnectionFailed { url, reason } if url.is_empty() => {
                CoreError::ConnectionFailed {
                    url: config.url.to_string(),
                    reason,
                }
            }
            CoreError::RemoteOperation {
                operation,
                name,
                parent,
                source,
            } => CoreError::RemoteOperation {
                operation,
                name,
                parent,
                source: Box::new(self.contextualize(*source)),
            },
            other => other,
        }
    }
}

fn not_connected() -> CoreError {
    CoreError::Internal("controller is not connected".into())
}

fn credentials(auth: &AuthCredentials) -> Credentials {
    match auth {
        AuthCredentials::Password { user, password } => Credentials::Password {
            user: user.clone(),
            password: password.clone(),
        },
        AuthCredentials::HttpBasic { user, password } => Credentials::HttpBasic {
            user: user.clone(),
            password: password.clone(),
        },
    }
}

fn build_transport(config: &ConnectionConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: if config.timeout.is_zero() {
            Duration::from_secs(30)
        } else {
            config.timeout
        },
    }
}
