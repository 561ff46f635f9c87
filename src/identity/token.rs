// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Issued authentication token.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Duration, FixedOffset, Utc};

use super::catalog::ServiceCatalog;
use super::protocol;

/// An authentication token together with its catalog and scope.
///
/// Tokens are never modified: a refresh produces a new `Token`.
#[derive(Clone)]
pub struct Token {
    value: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    server_expires_at: Option<DateTime<FixedOffset>>,
    catalog: ServiceCatalog,
    project: Option<protocol::IdAndName>,
    user: Option<protocol::IdAndName>,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut hasher = DefaultHasher::new();
        self.value.hash(&mut hasher);
        write!(
            f,
            "Token {{ value: hash({}), expires_at: {}, catalog: {:?} }}",
            hasher.finish(),
            self.expires_at,
            self.catalog
        )
    }
}

impl Token {
    /// Create a token issued at `issued_at` and valid for `ttl`.
    pub fn new<S: Into<String>>(
        value: S,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        catalog: ServiceCatalog,
    ) -> Token {
        Token {
            value: value.into(),
            issued_at,
            expires_at: issued_at + ttl,
            server_expires_at: None,
            catalog,
            project: None,
            user: None,
        }
    }

    /// Create a token from an Identity API response body.
    pub(crate) fn from_response<S: Into<String>>(
        value: S,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        body: protocol::Token,
    ) -> Token {
        Token {
            server_expires_at: Some(body.expires_at),
            project: body.project,
            user: body.user,
            ..Token::new(value, issued_at, ttl, ServiceCatalog::new(body.catalog))
        }
    }

    /// Token value to pass in the `X-Auth-Token` header.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// When the token was received.
    #[inline]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// When the token stops being used: issue time plus the session TTL.
    #[inline]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Expiration time claimed by the Identity service.
    ///
    /// Informational only, validity is decided by [expires_at](#method.expires_at).
    #[inline]
    pub fn server_expires_at(&self) -> Option<DateTime<FixedOffset>> {
        self.server_expires_at
    }

    /// Service catalog granted with the token.
    #[inline]
    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    /// ID of the project the token is scoped to.
    #[inline]
    pub fn project_id(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.id.as_str())
    }

    /// Name of the project the token is scoped to.
    #[inline]
    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.name.as_str())
    }

    /// ID of the authenticated user.
    #[inline]
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    /// Name of the authenticated user.
    #[inline]
    pub fn user_name(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.name.as_str())
    }

    /// Whether the token can be used at the given moment.
    #[inline]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Whether the token can be used right now.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}
