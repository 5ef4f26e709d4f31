use async_trait::async_trait;

use crate::error::Result;

/// Session/identity seam supplying the caller's id and a bearer credential.
///
/// The token is fetched fresh per call: credentials may rotate, so nothing
/// in the crate caches it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn user_id(&self) -> Option<String>;
    async fn bearer_token(&self) -> Result<String>;
}

/// Fixed identity, for tests and single-user tools.
pub struct StaticIdentity {
    user_id: String,
    token: String,
}

impl StaticIdentity {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    fn user_id(&self) -> Option<String> {
        Some(self.user_id.clone())
    }

    async fn bearer_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_identity_hands_out_its_token() {
        let identity = StaticIdentity::new("user-1", "tok-abc");
        assert_eq!(identity.user_id().as_deref(), Some("user-1"));
        assert_eq!(identity.bearer_token().await.unwrap(), "tok-abc");
    }
}
