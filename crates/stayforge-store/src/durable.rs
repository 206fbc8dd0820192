//! REST key-value backend client.
//!
//! Speaks the Redis-over-REST protocol: commands are posted to a single
//! endpoint as JSON arrays (`["SET", key, value, "EX", secs]`) with bearer
//! authentication, and responses come back as `{"result": …}` or
//! `{"error": …}`. Every call carries a bounded request timeout so a slow
//! backend degrades into the fallback path instead of stalling the request.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::store_trait::TimedKeyValueStore;

/// Response envelope of the REST key-value service.
#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for a network-reachable, Redis-compatible REST store.
pub struct DurableStore {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl DurableStore {
    /// Create a client for the backend at `base_url`.
    ///
    /// `request_timeout` bounds every call; a timeout surfaces as
    /// [`StoreError::Backend`] and is absorbed by the fallback layer.
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| {
                StoreError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            base_url: base_url.into(),
            token,
            client,
        })
    }

    /// Execute one command against the backend and return its result value.
    async fn command(&self, cmd: &[&str]) -> Result<Value> {
        log::debug!("Key-value command: {}", cmd[0]);

        let mut request = self.client.post(&self.base_url).json(&cmd);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            StoreError::Backend(format!(
                "Key-value request to '{}' failed: {}",
                self.base_url, e
            ))
        })?;

        if !response.status().is_success() {
            return Err(StoreError::Backend(format!(
                "Key-value backend at '{}' returned status {}",
                self.base_url,
                response.status()
            )));
        }

        let body: CommandResponse = response.json().await.map_err(|e| {
            StoreError::Backend(format!(
                "Failed to parse key-value response from '{}': {}",
                self.base_url, e
            ))
        })?;

        if let Some(error) = body.error {
            return Err(StoreError::BackendResponse(error));
        }

        Ok(body.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl TimedKeyValueStore for DurableStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.command(&["GET", key]).await? {
            Value::Null => Ok(None),
            Value::String(value) => Ok(Some(value)),
            other => Err(StoreError::BackendResponse(format!(
                "Unexpected GET result type: {}",
                other
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        match ttl {
            Some(ttl) => {
                // The protocol takes whole seconds; never send EX 0
                let secs = ttl.as_secs().max(1).to_string();
                self.command(&["SET", key, value, "EX", secs.as_str()])
                    .await?;
            }
            None => {
                self.command(&["SET", key, value]).await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.command(&["DEL", key]).await?;
        Ok(())
    }

    async fn delete_older_than(&self, _prefix: &str, _cutoff_ms: i64) -> Result<u64> {
        // Every write carries a TTL, so expiry is self-cleaning on this side;
        // there is nothing for the sweep to do here.
        log::debug!("Durable backend relies on TTL expiry; no sweep performed");
        Ok(0)
    }

    async fn flush_all(&self) -> Result<()> {
        self.command(&["FLUSHALL"]).await?;
        Ok(())
    }
}
