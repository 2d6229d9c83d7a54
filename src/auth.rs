//!
//! src/auth.rs  Andrew Belles  Oct 4th, 2025
//!
//! Access tokens for the bigquery api. Uses Application Default Credentials
//! through gcp_auth unless a static token was configured
//!

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::LoaderError;

pub const BIGQUERY_SCOPES: &[&str] = &["https://www.googleapis.com/auth/bigquery"];

#[derive(Clone)]
pub enum WarehouseAuth {
    /// Resolved lazily: GOOGLE_APPLICATION_CREDENTIALS, gcloud config, then
    /// the metadata server
    ApplicationDefault(Arc<RwLock<Option<Arc<dyn gcp_auth::TokenProvider>>>>),
    Static(String)
}

impl std::fmt::Debug for WarehouseAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarehouseAuth::ApplicationDefault(_) => f.write_str("ApplicationDefault"),
            WarehouseAuth::Static(_) => f.write_str("Static(<redacted>)")
        }
    }
}

impl WarehouseAuth {
    pub fn from_config(access_token: Option<&str>) -> Self {
        match access_token {
            Some(token) => WarehouseAuth::Static(token.to_string()),
            None => WarehouseAuth::ApplicationDefault(Arc::new(RwLock::new(None)))
        }
    }

    async fn provider(
        slot: &RwLock<Option<Arc<dyn gcp_auth::TokenProvider>>>
    ) -> Result<Arc<dyn gcp_auth::TokenProvider>, LoaderError> {
        if let Some(provider) = slot.read().await.as_ref() {
            return Ok(provider.clone());
        }

        let mut guard = slot.write().await;
        if let Some(provider) = guard.as_ref() {
            return Ok(provider.clone());
        }
        let provider = gcp_auth::provider()
            .await
            .map_err(|e| LoaderError::Auth(format!("init gcp credentials: {e}")))?;
        *guard = Some(provider.clone());
        Ok(provider)
    }

    pub async fn token(&self) -> Result<String, LoaderError> {
        match self {
            WarehouseAuth::Static(token) => Ok(token.clone()),
            WarehouseAuth::ApplicationDefault(slot) => {
                let provider = Self::provider(slot).await?;
                let token = provider.token(BIGQUERY_SCOPES)
                    .await
                    .map_err(|e| LoaderError::Auth(format!("gcp token: {e}")))?;
                Ok(token.as_str().to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_is_returned_as_is() {
        let auth = WarehouseAuth::from_config(Some("ya29.abc"));
        assert_eq!(auth.token().await.unwrap(), "ya29.abc");
    }

    #[test]
    fn debug_hides_static_token() {
        let auth = WarehouseAuth::from_config(Some("ya29.secret"));
        assert!(!format!("{auth:?}").contains("secret"));
        assert!(matches!(WarehouseAuth::from_config(None), WarehouseAuth::ApplicationDefault(_)));
    }

    #[test]
    fn scope_is_bigquery() {
        assert!(BIGQUERY_SCOPES.contains(&"https://www.googleapis.com/auth/bigquery"));
    }
}
