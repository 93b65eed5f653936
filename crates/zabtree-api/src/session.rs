// Session management
//
// `user.login` exchanges credentials for a token that the client attaches
// to every later call; `user.logout` invalidates it server-side.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::auth::Credentials;
use crate::client::ZabbixClient;
use crate::error::Error;

impl ZabbixClient {
    /// Authenticate and store the session token.
    ///
    /// With [`Credentials::HttpBasic`] the credentials are also sent as an
    /// `Authorization` header on every request, and `user.login` is called
    /// with the user name and an empty password.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), Error> {
        let (user, password) = match credentials {
            Credentials::Password { user, password } => (user.as_str(), password.expose_secret()),
            Credentials::HttpBasic { user, password } => {
                self.set_basic_auth(user, password);
                (user.as_str(), "")
            }
        };

        debug!(user, endpoint = %self.endpoint(), "logging in");

        let token: String = self
            .call("user.login", json!({ "user": user, "password": password }))
            .await
            .map_err(|e| match e {
                Error::Rpc { message, data, .. } => Error::Authentication {
                    message: data.unwrap_or(message),
                },
                other => other,
            })?;

        self.set_token(Some(SecretString::from(token)));
        debug!("login successful");
        Ok(())
    }

    /// End the current session. A client without a session is a no-op.
    pub async fn logout(&mut self) -> Result<(), Error> {
        if !self.is_authenticated() {
            return Ok(());
        }
        debug!("logging out");
        let _: serde_json::Value = self.call("user.logout", json!([])).await?;
        self.set_token(None);
        Ok(())
    }

    /// Frontend API version (`apiinfo.version`), available without login.
    pub async fn api_version(&self) -> Result<String, Error> {
        self.call("apiinfo.version", json!([])).await
    }
}
