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

//! Bearer token authentication.

pub mod jwt;

pub use jwt::{TokenValidator, OBJECT_IDENTIFIER_CLAIM};

use thiserror::Error;

/// Reasons a request is refused before reaching a handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header.
    #[error("Missing bearer token.")]
    MissingToken,

    /// Header present but not `Bearer <token>`.
    #[error("Authorization header must be in format: Bearer <token>")]
    MalformedHeader,

    /// Signature, expiry, audience or issuer check failed.
    #[error("Invalid or expired token.")]
    InvalidToken(String),

    /// Token lacks the required scope.
    #[error("Token is missing the required scope '{0}'.")]
    MissingScope(String),

    /// Token carries no subject (`oid`) claim.
    #[error("Token has no subject claim.")]
    MissingSubject,

    /// Verification key could not be loaded.
    #[error("Invalid token verification key: {0}")]
    InvalidKey(String),
}

impl AuthError {
    /// Value for the `WWW-Authenticate` response header.
    pub fn challenge(&self) -> String {
        match self {
            AuthError::MissingToken => "Bearer".to_string(),
            AuthError::MissingScope(scope) => {
                format!("Bearer error=\"insufficient_scope\", scope=\"{scope}\"")
            }
            _ => "Bearer error=\"invalid_token\"".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge() {
        assert_eq!(AuthError::MissingToken.challenge(), "Bearer");
        assert_eq!(
            AuthError::MissingScope("Files.Manage".to_string()).challenge(),
            "Bearer error=\"insufficient_scope\", scope=\"Files.Manage\""
        );
        assert_eq!(
            AuthError::InvalidToken("ExpiredSignature".to_string()).challenge(),
            "Bearer error=\"invalid_token\""
        );
    }
}
