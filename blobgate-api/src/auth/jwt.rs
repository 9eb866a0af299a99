// Copyright 2026 Blobgate Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! JWT bearer token validation.

use blobgate_core::Principal;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::debug;

use super::AuthError;

/// Long-form object identifier claim emitted by some identity providers.
pub const OBJECT_IDENTIFIER_CLAIM: &str =
    "http://schemas.microsoft.com/identity/claims/objectidentifier";

/// Claims read from an access token. Everything else is ignored.
#[derive(Debug, Deserialize)]
struct AccessClaims {
    oid: Option<String>,
    #[serde(rename = "http://schemas.microsoft.com/identity/claims/objectidentifier")]
    object_identifier: Option<String>,
    scp: Option<String>,
    scope: Option<String>,
}

impl AccessClaims {
    fn into_principal(self) -> Principal {
        let scopes = self
            .scp
            .or(self.scope)
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        Principal::new(self.oid.or(self.object_identifier), scopes)
    }
}

/// Validates bearer tokens and turns them into [`Principal`]s.
///
/// Supports HS256 (shared secret) and RS256 (PEM public key). Expiry is
/// always enforced; audience and issuer only when configured.
#[derive(Clone)]
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    /// Validator for HS256 tokens signed with `secret`.
    ///
    /// # Example
    ///
    /// ```
    /// use blobgate_api::auth::TokenValidator;
    ///
    /// let validator = TokenValidator::hs256(b"test-secret-at-least-32-bytes-long")
    ///     .with_audiences(&["api://blobgate".to_string()]);
    /// assert!(validator.validate("not-a-token").is_err());
    /// ```
    pub fn hs256(secret: &[u8]) -> Self {
        Self::with_key(DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    /// Validator for RS256 tokens, verified with a PEM-encoded public key.
    pub fn rs256_pem(pem: &[u8]) -> Result<Self, AuthError> {
        let key = DecodingKey::from_rsa_pem(pem).map_err(|e| AuthError::InvalidKey(e.to_string()))?;
        Ok(Self::with_key(key, Algorithm::RS256))
    }

    fn with_key(decoding_key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;
        Self {
            decoding_key,
            validation,
        }
    }

    /// Accepts only tokens whose `aud` matches one of `audiences`.
    ///
    /// An empty list leaves audience unchecked.
    pub fn with_audiences(mut self, audiences: &[String]) -> Self {
        if !audiences.is_empty() {
            self.validation.set_audience(audiences);
            self.validation.validate_aud = true;
        }
        self
    }

    /// Accepts only tokens issued by `issuer`.
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    /// Verifies `token` and extracts its subject and scopes.
    ///
    /// A token without a subject still validates; callers decide whether
    /// that is acceptable.
    pub fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            AuthError::InvalidToken(e.to_string())
        })?;
        Ok(data.claims.into_principal())
    }
}
