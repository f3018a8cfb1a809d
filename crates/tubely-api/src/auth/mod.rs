//! Caller identity
//!
//! Uploads are authorised by a bearer token. `IdentityVerifier` is the seam the
//! upload pipeline depends on; `JwtVerifier` is the production implementation.

pub mod jwt;

use tubely_core::AppError;
use uuid::Uuid;

pub use jwt::{get_bearer_token, make_jwt, validate_jwt, JwtClaims, TOKEN_ISSUER};

/// Resolves a bearer token to the id of the user it was issued to.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Uuid, AppError>;
}

/// HS256 verifier backed by the process-wide signing secret.
pub struct JwtVerifier {
    secret: String,
}

impl JwtVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl IdentityVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        validate_jwt(token, &self.secret)
    }
}
