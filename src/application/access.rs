//! Shared-secret gate in front of the post management surface.

use subtle::ConstantTimeEq;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Unauthorized")]
    Unauthorized,
}

#[derive(Clone)]
pub struct AccessGate {
    secret: String,
}

impl AccessGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Accept only an exact, non-empty match of the configured secret.
    pub fn check(&self, candidate: Option<&str>) -> Result<(), AccessError> {
        let Some(candidate) = candidate else {
            return Err(AccessError::Unauthorized);
        };
        if candidate.is_empty() || self.secret.is_empty() {
            return Err(AccessError::Unauthorized);
        }

        if bool::from(candidate.as_bytes().ct_eq(self.secret.as_bytes())) {
            Ok(())
        } else {
            Err(AccessError::Unauthorized)
        }
    }

    pub fn allows(&self, candidate: Option<&str>) -> bool {
        self.check(candidate).is_ok()
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate").finish_non_exhaustive()
    }
}
