use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use jobhawk_core::config::HhConfig;
use jobhawk_core::types::{Credential, CredentialRefresher, UserId};
use jobhawk_store::CredentialStore;

use crate::types::TokenGrant;

/// Refreshes an expired hh.ru credential using the stored refresh token
/// and persists the rotated pair.
///
/// Any failure — no stored credential, provider rejection, transport —
/// yields `None`, which the engine reads as "skip this user this sweep".
pub struct HhRefresher {
    client: reqwest::Client,
    config: HhConfig,
    store: Arc<CredentialStore>,
}

impl HhRefresher {
    pub fn new(config: &HhConfig, store: Arc<CredentialStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: config.clone(),
            store,
        }
    }

    async fn request_grant(&self, refresh_token: &str) -> crate::error::Result<TokenGrant> {
        let url = format!("{}/oauth/token", self.config.oauth_base_url);
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let resp = self
            .client
            .post(&url)
            .header("User-Agent", &self.config.user_agent)
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(crate::error::HhError::Api {
                status: status.as_u16(),
                message,
            });
        }

        resp.json::<TokenGrant>()
            .await
            .map_err(|e| crate::error::HhError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CredentialRefresher for HhRefresher {
    async fn refresh(&self, user_id: UserId) -> Option<Credential> {
        let current = match self.store.get(user_id) {
            Ok(Some(cred)) => cred,
            Ok(None) => {
                debug!(user_id, "no stored credential to refresh from");
                return None;
            }
            Err(e) => {
                warn!(user_id, "credential lookup failed: {e}");
                return None;
            }
        };

        let grant = match self.request_grant(&current.refresh_token).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(user_id, "token refresh rejected: {e}");
                return None;
            }
        };

        let refresh_token = grant
            .refresh_token
            .unwrap_or_else(|| current.refresh_token.clone());

        if let Err(e) = self
            .store
            .save(user_id, &grant.access_token, &refresh_token, grant.expires_in)
        {
            warn!(user_id, "failed to persist refreshed credential: {e}");
            return None;
        }

        info!(user_id, expires_in = grant.expires_in, "credential refreshed");
        Some(Credential {
            user_id,
            access_token: grant.access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(grant.expires_in),
        })
    }
}
