use crate::config::BackendSettings;
use crate::models::access::CachedAuth;
use crate::models::category::FlatCategory;
use crate::services::token_broker::TokenBroker;
use anyhow::anyhow;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use service_core::observability::TracedClientExt;
use std::sync::Arc;

/// Authenticated reads from the external backend API.
pub struct BackendClient {
    client: Client,
    settings: BackendSettings,
    broker: Arc<TokenBroker>,
}

impl BackendClient {
    pub fn new(settings: BackendSettings, broker: Arc<TokenBroker>) -> Self {
        Self {
            client: Client::new(),
            settings,
            broker,
        }
    }

    /// GET `path` with a brokered bearer token.
    ///
    /// Fails with `Unauthorized` before any backend call when no token can be
    /// obtained.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = format!("{}{}", self.settings.url, path);
        self.get_url(&url).await
    }

    async fn get_url<T: DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let token = self.broker.get_token().await.ok_or_else(|| {
            AppError::Unauthorized(anyhow!("Unable to authenticate with backend"))
        })?;

        let response = self
            .client
            .traced_get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send GET request to {}: {}", url, e);
                AppError::BadGateway(format!("Backend request failed: {}", e))
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // Token revoked early; next call fetches a fresh one
            self.broker.invalidate().await;
            return Err(AppError::BadGateway(
                "Backend rejected gateway credentials".to_string(),
            ));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(anyhow!("{} not found", url)));
        }
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Backend returned error status");
            return Err(AppError::BadGateway(format!("Backend returned {}", status)));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to decode backend response");
            AppError::BadGateway(format!("Invalid backend response: {}", e))
        })
    }

    pub async fn fetch_categories(&self) -> Result<Vec<FlatCategory>, AppError> {
        self.get_json(&self.settings.categories_path).await
    }

    pub async fn fetch_access(&self, user_id: &str) -> Result<CachedAuth, AppError> {
        let url = access_url(&self.settings, user_id)?;
        self.get_url(url.as_str()).await
    }
}

/// Expand `access_path` with `user_id` encoded as a single path segment.
fn access_url(settings: &BackendSettings, user_id: &str) -> Result<Url, AppError> {
    let mut url = Url::parse(&settings.url)
        .map_err(|e| AppError::ConfigError(anyhow!("Invalid backend url: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| AppError::ConfigError(anyhow!("Backend url cannot carry a path")))?
        .pop_if_empty()
        .extend(
            settings
                .access_path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(|s| if s == "{user_id}" { user_id } else { s }),
        );

    Ok(url)
}
