//! # Identity Verification
//!
//! Every API call names the acting user by external id. Handlers never read
//! that claim directly: it goes through an [`IdentityVerifier`], so a verifier
//! that checks the chat platform's signed init data can replace the trusting
//! one without touching the web layer.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::Result;
use crate::validation;

/// An external id that a verifier has accepted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerifiedIdentity {
    external_id: String,
}

impl VerifiedIdentity {
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn into_external_id(self) -> String {
        self.external_id
    }
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync + Debug {
    /// Accept or reject a claimed external id. A missing or blank claim is
    /// always a client-input error.
    async fn verify(&self, claimed: Option<&str>) -> Result<VerifiedIdentity>;
}

pub type SharedVerifier = Arc<dyn IdentityVerifier>;

/// Accepts any non-blank identity as given.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrustingVerifier;

#[async_trait]
impl IdentityVerifier for TrustingVerifier {
    async fn verify(&self, claimed: Option<&str>) -> Result<VerifiedIdentity> {
        let external_id = validation::validate_external_id(claimed)?;
        Ok(VerifiedIdentity { external_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TodoError;

    #[tokio::test]
    async fn test_trusting_verifier_accepts_any_identity() {
        let verified = TrustingVerifier.verify(Some(" 777 ")).await.unwrap();
        assert_eq!(verified.external_id(), "777");
    }

    #[tokio::test]
    async fn test_missing_identity_is_rejected() {
        for claim in [None, Some(""), Some("   ")] {
            let err = TrustingVerifier.verify(claim).await.unwrap_err();
            assert_eq!(err, TodoError::InvalidInput("externalId required".to_string()));
        }
    }
}
