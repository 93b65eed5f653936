// Zabbix JSON-RPC client
//
// Wraps `reqwest::Client` with endpoint normalization, the JSON-RPC 2.0
// envelope, session-token injection, and optional HTTP basic auth.
// Endpoint families (services, triggers) are implemented as inherent
// methods in separate files to keep this module focused on transport.

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{RpcRequest, RpcResponse};
use crate::transport::TransportConfig;

/// Path of the JSON-RPC endpoint below the frontend root.
pub const API_PATH: &str = "api_jsonrpc.php";

/// Methods Zabbix rejects when an `auth` member is present.
const UNAUTHENTICATED_METHODS: &[&str] = &["user.login", "apiinfo.version"];

/// Raw client for the Zabbix JSON-RPC API.
///
/// Handles the `{ jsonrpc, method, params, id, auth }` envelope and strips
/// the `{ result | error }` response wrapper before the caller sees it.
pub struct ZabbixClient {
    http: reqwest::Client,
    endpoint: Url,
    /// Session token from `user.login`, attached as `auth` to every call.
    token: Option<SecretString>,
    /// HTTP basic credentials for frontends behind a web-server auth layer.
    basic_auth: Option<(String, SecretString)>,
    request_id: AtomicU64,
}

impl ZabbixClient {
    /// Create a client for the frontend at `server` (e.g.
    /// `https://zabbix.example.com`). The JSON-RPC path is appended unless
    /// the URL already points at it.
    pub fn new(server: &Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, server))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, server: &Url) -> Self {
        Self {
            http,
            endpoint: endpoint_for(server),
            token: None,
            basic_auth: None,
            request_id: AtomicU64::new(1),
        }
    }

    /// The resolved JSON-RPC endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Whether a session token is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn set_token(&mut self, token: Option<SecretString>) {
        self.token = token;
    }

    pub(crate) fn set_basic_auth(&mut self, user: &str, password: &SecretString) {
        debug!(user, "enabling HTTP basic auth");
        self.basic_auth = Some((user.to_owned(), password.clone()));
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Issue one JSON-RPC call and return the unwrapped `result`.
    pub(crate) async fn call<P, T>(&self, method: &str, params: P) -> Result<T, Error>
    where
        P: Serialize + Send,
        T: DeserializeOwned,
    {
        let auth = if UNAUTHENTICATED_METHODS.contains(&method) {
            None
        } else {
            Some(
                self.token
                    .as_ref()
                    .ok_or(Error::NotAuthenticated)?
                    .expose_secret(),
            )
        };

        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
            auth,
        };

        debug!(method, id, "POST {}", self.endpoint);

        let mut builder = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json-rpc")
            .json(&request);
        if let Some((user, password)) = &self.basic_auth {
            builder = builder.basic_auth(user, Some(password.expose_secret()));
        }

        let resp = builder.send().await.map_err(Error::Transport)?;
        self.parse_envelope(method, resp).await
    }

    /// Parse the `{ result | error }` envelope.
    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        method: &str,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "frontend rejected the request (HTTP 401)".into(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(method, body = preview(&body), "response body");

        let envelope: RpcResponse<T> = serde_json::from_str(&body).map_err(|e| {
            Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            }
        })?;

        if let Some(err) = envelope.error {
            return Err(Error::Rpc {
                method: method.to_owned(),
                code: err.code,
                data: err.data_text(),
                message: err.message,
            });
        }

        envelope.result.ok_or_else(|| Error::UnexpectedResponse {
            method: method.to_owned(),
            message: "envelope has neither result nor error".into(),
        })
    }
}

/// Append the JSON-RPC path to a frontend URL.
fn endpoint_for(server: &Url) -> Url {
    if server.path().ends_with(API_PATH) {
        return server.clone();
    }
    let mut url = server.clone();
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/{API_PATH}"));
    url
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appended_to_root() {
        let url = Url::parse("https://zabbix.example.com").unwrap();
        assert_eq!(
            endpoint_for(&url).as_str(),
            "https://zabbix.example.com/api_jsonrpc.php"
        );
    }

    #[test]
    fn endpoint_appended_to_subpath() {
        let url = Url::parse("https://monitor.example.com/zabbix/").unwrap();
        assert_eq!(
            endpoint_for(&url).as_str(),
            "https://monitor.example.com/zabbix/api_jsonrpc.php"
        );
    }

    #[test]
    fn endpoint_kept_when_already_present() {
        let url = Url::parse("https://zabbix.example.com/api_jsonrpc.php").unwrap();
        assert_eq!(endpoint_for(&url), url);
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        assert!(preview(&body).len() <= 200);
    }
}
