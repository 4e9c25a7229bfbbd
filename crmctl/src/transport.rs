//! HTTP transport with token attachment and error normalisation.
//!
//! Thin wrapper over a shared `reqwest::Client` that mirrors what the
//! browser console's request interceptors do:
//!
//! - attaches `Authorization: Bearer <token>` whenever a token is persisted,
//! - unwraps successful responses straight to their JSON payload,
//! - on HTTP 401 clears the persisted session, surfaces an expiry notice
//!   and returns [`Error::SessionExpired`],
//! - on any other failure surfaces the server-provided message or a generic
//!   one.

use crate::config::ApiConfig;
use crate::errors::{Error, Result};
use crate::notify::Notify;
use crate::storage::{SessionStore, TOKEN_KEY};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

/// Error payload shape used by the backend for non-2xx responses.
#[derive(Debug, serde::Deserialize)]
struct ServerError {
    message: String,
}

#[derive(Clone)]
pub struct Transport {
    client: Client,
    base_url: Url,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notify>,
}

/// Makes sure a url has a trailing slash.
///
/// `Url::join` drops the last path segment of a base without one, so
/// joining "/api" with "users" yields "/users". Call this before `.join`.
fn ensure_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut new_url = url.clone();
        let mut path = new_url.path().to_string();
        path.push('/');
        new_url.set_path(&path);
        new_url
    }
}

impl Transport {
    pub fn new(config: &ApiConfig, store: Arc<dyn SessionStore>, notifier: Arc<dyn Notify>) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            store,
            notifier,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        ensure_slash(&self.base_url)
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Internal {
                operation: format!("construct URL for {path}: {e}"),
            })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        self.execute(self.client.get(url)).await
    }

    pub async fn get_query<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path)?;
        self.execute(self.client.get(url).query(query)).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path)?;
        self.execute(self.client.post(url).json(body)).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path)?;
        self.execute(self.client.put(url).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        // DELETE bodies carry nothing useful, drop them after the status check
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let body = response.text().await?;

        match serde_json::from_str(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                tracing::error!("Failed to parse response body as JSON: {e}");
                tracing::debug!("Response body was: {body}");
                Err(e.into())
            }
        }
    }

    /// Attach the bearer token, send, and normalise failure statuses.
    async fn send(&self, mut request: RequestBuilder) -> Result<Response> {
        if let Some(token) = self.store.get(TOKEN_KEY)?
            && !token.is_empty()
        {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Request failed before a response arrived");
                self.notifier.error("Request failed, please try again later");
                return Err(e.into());
            }
        };

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            // Token no longer accepted: tear the persisted session down so
            // the next navigation lands on the login page.
            self.store.clear_session()?;
            self.notifier.error("Session expired, please log in again");
            return Err(Error::SessionExpired);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ServerError>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| format!("Request failed ({status})"));

            tracing::warn!(status = status.as_u16(), message = %message, "Server returned an error");
            self.notifier.error(&message);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}
