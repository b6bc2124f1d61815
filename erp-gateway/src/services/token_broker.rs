//! Client-credentials token broker for the external backend API.
//!
//! The current token is persisted in the key-value store so every request
//! handler (and every gateway instance sharing Redis) reuses it until it is
//! within [`EXPIRY_BUFFER_MS`] of expiring. Overlapping refreshes are not
//! coordinated; the last one to finish overwrites the stored token.

use crate::config::IdentitySettings;
use crate::models::token::{EXPIRY_BUFFER_MS, StoredToken, TokenResponse};
use anyhow::{Result, anyhow};
use chrono::Utc;
use reqwest::Client;
use secrecy::ExposeSecret;
use service_core::observability::TracedClientExt;
use service_core::store::KeyValueStore;
use std::sync::Arc;
use std::time::Duration;

pub struct TokenBroker {
    client: Client,
    settings: IdentitySettings,
    store: Arc<dyn KeyValueStore>,
}

impl TokenBroker {
    pub fn new(settings: IdentitySettings, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            client: Client::new(),
            settings,
            store,
        }
    }

    pub fn storage_key(&self) -> String {
        format!("oauth_token:{}", self.settings.provider)
    }

    /// A bearer token valid for at least the expiry buffer, or `None` when
    /// the identity provider cannot be reached or rejects the credentials.
    pub async fn get_token(&self) -> Option<String> {
        let now = Utc::now().timestamp_millis();

        if let Some(token) = self.stored().await {
            if token.is_usable_at(now) {
                tracing::debug!(provider = %self.settings.provider, "Using cached access token");
                return Some(token.access_token);
            }
        }

        match self.fetch().await {
            Ok(token) => {
                self.persist(&token).await;
                Some(token.access_token)
            }
            Err(e) => {
                tracing::error!(
                    provider = %self.settings.provider,
                    token_url = %self.settings.token_url,
                    error = %e,
                    "Failed to obtain access token"
                );
                None
            }
        }
    }

    /// Drop the stored token, e.g. after the backend rejected it.
    pub async fn invalidate(&self) {
        if let Err(e) = self.store.delete(&self.storage_key()).await {
            tracing::warn!(provider = %self.settings.provider, error = %e, "Failed to invalidate token");
        }
    }

    async fn stored(&self) -> Option<StoredToken> {
        let raw = match self.store.get(&self.storage_key()).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(provider = %self.settings.provider, error = %e, "Failed to read stored token");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(provider = %self.settings.provider, error = %e, "Ignoring malformed stored token");
                None
            }
        }
    }

    async fn fetch(&self) -> Result<StoredToken> {
        let mut form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.expose_secret().as_str()),
        ];
        if let Some(scope) = &self.settings.scope {
            form.push(("scope", scope.as_str()));
        }

        let response = self
            .client
            .traced_post(&self.settings.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| anyhow!("Token request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Token endpoint returned {}: {}", status, body));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Invalid token response: {}", e))?;

        if body.expires_in <= 0 {
            return Err(anyhow!("Token endpoint returned expires_in {}", body.expires_in));
        }
        let expires_at = body
            .expires_in
            .checked_mul(1000)
            .and_then(|ms| Utc::now().timestamp_millis().checked_add(ms))
            .ok_or_else(|| anyhow!("Token lifetime out of range: {}s", body.expires_in))?;

        tracing::info!(
            provider = %self.settings.provider,
            expires_in = body.expires_in,
            "Obtained new access token"
        );

        Ok(StoredToken {
            access_token: body.access_token,
            refresh_token: body.refresh_token.unwrap_or_default(),
            expires_at,
        })
    }

    async fn persist(&self, token: &StoredToken) {
        let json = match serde_json::to_string(token) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize access token");
                return;
            }
        };

        // Let the store evict the entry once it can no longer be handed out
        let lifetime_ms = token
            .expires_at
            .saturating_sub(Utc::now().timestamp_millis())
            .saturating_sub(EXPIRY_BUFFER_MS);
        let ttl = Duration::from_millis(lifetime_ms.max(1) as u64);

        if let Err(e) = self.store.set(&self.storage_key(), &json, Some(ttl)).await {
            tracing::warn!(provider = %self.settings.provider, error = %e, "Failed to persist access token");
        }
    }
}
