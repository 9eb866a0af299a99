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

//! Bearer token authorization for the file routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::server::AppState;

/// Authenticates the request and attaches its [`blobgate_core::Principal`].
///
/// Rejects with 401 when the `Authorization: Bearer` header is missing or
/// malformed, the token does not validate, the required scope is absent, or
/// the token has no subject claim. Handlers read the principal with
/// `Extension<Principal>`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = match authenticate(&state, &request) {
        Ok(principal) => principal,
        Err(e) => {
            warn!(
                "Rejected {} {}: {}",
                request.method(),
                request.uri().path(),
                e
            );
            return ApiError::from(e).into_response();
        }
    };

    debug!("Authenticated subject {}", principal.subject_label());
    request.extensions_mut().insert(principal);
    next.run(request).await
}

fn authenticate(state: &AppState, request: &Request) -> Result<blobgate_core::Principal, AuthError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let token = bearer_token(auth_header).ok_or(AuthError::MalformedHeader)?;
    let principal = state.token_validator.validate(token)?;

    if !principal.has_scope(&state.required_scope) {
        return Err(AuthError::MissingScope(state.required_scope.clone()));
    }
    if principal.subject().is_none() {
        return Err(AuthError::MissingSubject);
    }
    Ok(principal)
}

/// Extracts the token from `Bearer <token>`. The scheme is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
