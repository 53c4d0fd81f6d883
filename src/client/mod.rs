//! Client for the stock ledger service.
//!
//! [`StockClient`] is the transport. The components built on it mirror the
//! operations a front-end offers: [`session::SessionContext`] carries the
//! identity, [`query::InventoryQuery`] reads, [`intake::ProductIntake`] and
//! [`sale::SaleTransaction`] write, and [`dashboard::Dashboard`] ties them
//! together with a re-fetch after every committed mutation.
//!
//! Nothing is retried automatically. Every call is one request.

/// Re-fetching view over stock and sales
pub mod dashboard;
/// Stock intake
pub mod intake;
/// Stock and sales reads
pub mod query;
/// Recording sales
pub mod sale;
/// Authenticated identity
pub mod session;

use crate::{
    errors::{Error, Result},
    models::ErrorBody,
};
use reqwest::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};

/// HTTP transport to the service's `/api` root.
#[derive(Debug, Clone)]
pub struct StockClient {
    http: Client,
    base_url: String,
}

impl StockClient {
    /// Client for the service at `base_url` (e.g. `http://localhost:7500/api`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Client reusing an existing `reqwest` client (timeouts, TLS, proxies).
    #[must_use]
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// The API root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends an authenticated GET and decodes the JSON answer.
    pub(crate) async fn get<T>(&self, path: &str, credential: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = self.http.get(self.url(path)).bearer_auth(credential);
        let (_, value) = Self::send(request, path).await?;
        Ok(value)
    }

    /// Sends an authenticated JSON POST; returns the status with the decoded answer.
    pub(crate) async fn post<B, T>(&self, path: &str, credential: &str, body: &B) -> Result<(u16, T)>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .http
            .post(self.url(path))
            .bearer_auth(credential)
            .json(body);
        Self::send(request, path).await
    }

    async fn send<T>(request: RequestBuilder, path: &str) -> Result<(u16, T)>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to send request to {}: {}", path, e);
            Error::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            let value = response.json::<T>().await?;
            return Ok((status.as_u16(), value));
        }

        let bytes = response.bytes().await?;
        match serde_json::from_slice::<ErrorBody>(&bytes) {
            Ok(body) => {
                tracing::debug!(path, status = status.as_u16(), error = %body.error, "Request rejected");
                Err(body.into_error(status.as_u16()))
            }
            Err(_) => Err(Error::Transport {
                status: Some(status.as_u16()),
                message: format!("{} {}", status, String::from_utf8_lossy(&bytes).trim()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::CurrentUser;
    use crate::test_utils::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = StockClient::new("http://localhost:7500/api/");
        assert_eq!(client.base_url(), "http://localhost:7500/api");
        assert_eq!(client.url("/products"), "http://localhost:7500/api/products");
    }

    #[tokio::test]
    async fn test_structured_failures_become_typed_errors() -> Result<()> {
        let (base_url, _db) = spawn_test_server().await?;
        let client = StockClient::new(base_url);

        let result: Result<CurrentUser> = client.get("/auth/me", "wrong-token").await;
        assert!(matches!(result.unwrap_err(), Error::Unauthorized));

        let me: CurrentUser = client.get("/auth/me", ADMIN_TOKEN).await?;
        assert_eq!(me.name, "Amira");

        Ok(())
    }

    #[tokio::test]
    async fn test_unstructured_failure_is_transport() -> Result<()> {
        let (base_url, _db) = spawn_test_server().await?;
        let client = StockClient::new(base_url);

        let result: Result<serde_json::Value> = client.get("/no-such-route", ADMIN_TOKEN).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Transport {
                status: Some(404),
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport() {
        // Port 9 (discard) is not served in the test environment
        let client = StockClient::new("http://127.0.0.1:9/api");
        let result: Result<serde_json::Value> = client.get("/products", ADMIN_TOKEN).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Transport { status: None, .. }
        ));
    }
}
