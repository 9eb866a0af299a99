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

//! Authenticated identities and container resolution.

use crate::types::ContainerName;

/// Scope every file operation requires.
pub const FILES_MANAGE_SCOPE: &str = "Files.Manage";

/// Subject used to resolve a container when the principal carries none.
///
/// The HTTP layer rejects tokens without a subject claim, so this is only
/// reachable when the service is driven directly.
pub const ANONYMOUS_SUBJECT: &str = "anonymous";

/// Label logged for a principal without a subject.
pub const UNKNOWN_SUBJECT: &str = "unknown";

/// Identity produced by the authentication layer. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    subject: Option<String>,
    scopes: Vec<String>,
}

impl Principal {
    /// Creates a principal from its subject claim and granted scopes.
    pub fn new(subject: Option<String>, scopes: Vec<String>) -> Self {
        let subject = subject.filter(|s| !s.trim().is_empty());
        Self { subject, scopes }
    }

    /// Convenience constructor for a subject holding [`FILES_MANAGE_SCOPE`].
    pub fn with_subject(subject: impl Into<String>) -> Self {
        Self::new(Some(subject.into()), vec![FILES_MANAGE_SCOPE.to_string()])
    }

    /// Subject claim (`oid`), if present.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Subject for log lines; `"unknown"` when absent.
    pub fn subject_label(&self) -> &str {
        self.subject.as_deref().unwrap_or(UNKNOWN_SUBJECT)
    }

    /// Returns true if `scope` was granted. Scope names are case-sensitive.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    /// Resolves the container this principal owns.
    ///
    /// Falls back to the [`ANONYMOUS_SUBJECT`] container when no subject is
    /// present. Pure and deterministic.
    pub fn container(&self) -> ContainerName {
        ContainerName::for_subject(self.subject.as_deref().unwrap_or(ANONYMOUS_SUBJECT))
    }
}

/// Free-function form of [`Principal::container`].
pub fn resolve_container(principal: &Principal) -> ContainerName {
    principal.container()
}
