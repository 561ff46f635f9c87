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

//! Password authentication.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::{debug, error, trace};
use reqwest::{Method, Url};
use static_assertions::assert_impl_all;

use super::protocol;
use super::{Credentials, Token, INVALID_SUBJECT_HEADER, MISSING_SUBJECT_HEADER};
use crate::auth::AuthMethod;
use crate::transport::{RawResponse, Transport};
use crate::{Error, ErrorKind, Result};

/// Password authentication using Identity API V3.
///
/// For any Identity authentication you need to know `auth_url`, which is an authentication endpoint
/// of the Identity service. For the Password authentication you also need:
/// 1. User name and password.
/// 2. Domain of the user.
/// 3. Name of the project to use.
/// 4. Domain of the project.
///
/// ```rust,no_run
/// # async fn example() -> osclient::Result<()> {
/// let auth = osclient::identity::Password::new(
///     "https://cloud.local/identity",
///     "admin",
///     "pa$$w0rd",
///     "Default"
/// )?
/// .with_project_scope("project1", "Default");
///
/// let session = osclient::Session::new(auth, chrono::Duration::seconds(3600));
/// let token = session.ensure_token().await?;
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct Password {
    body: protocol::AuthRoot,
    token_endpoint: Url,
}

assert_impl_all!(Password: Send, Sync);

impl Password {
    /// Create a password authentication.
    pub fn new<U, S1, S2, S3>(
        auth_url: U,
        user_name: S1,
        password: S2,
        user_domain_name: S3,
    ) -> Result<Password>
    where
        U: AsRef<str>,
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        let identity = protocol::Identity::password(user_name, password, user_domain_name);
        Ok(Password {
            body: protocol::AuthRoot::new(identity, None),
            token_endpoint: token_endpoint(auth_url.as_ref())?,
        })
    }

    /// Create a project-scoped password authentication from credentials.
    pub fn from_credentials<U: AsRef<str>>(auth_url: U, credentials: &Credentials) -> Result<Password> {
        Ok(Password::new(
            auth_url,
            credentials.username.clone(),
            credentials.password.clone(),
            credentials.user_domain_name.clone(),
        )?
        .with_project_scope(
            credentials.project_name.clone(),
            credentials.project_domain_name.clone(),
        ))
    }

    /// Scope authentication to the given project.
    pub fn set_project_scope<S1, S2>(&mut self, project_name: S1, domain_name: S2)
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        self.body.auth.scope = Some(protocol::ProjectScope::new(project_name, domain_name));
    }

    /// Scope authentication to the given project.
    ///
    /// A convenience wrapper around `set_project_scope`.
    #[inline]
    pub fn with_project_scope<S1, S2>(mut self, project_name: S1, domain_name: S2) -> Password
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        self.set_project_scope(project_name, domain_name);
        self
    }

    /// User name.
    #[inline]
    pub fn user(&self) -> &str {
        &self.body.auth.identity.password.user.name
    }

    /// Project name (if project scoped).
    #[inline]
    pub fn project(&self) -> Option<&str> {
        self.body
            .auth
            .scope
            .as_ref()
            .map(|s| s.project.name.as_str())
    }

    /// URL that tokens are requested from.
    #[inline]
    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }
}

#[async_trait]
impl AuthMethod for Password {
    async fn issue(&self, transport: &Transport, ttl: Duration) -> Result<Token> {
        debug!(
            "Requesting a token for user {} from {}",
            self.user(),
            self.token_endpoint
        );
        let issued_at = Utc::now();
        let request = transport
            .request(Method::POST, self.token_endpoint.clone())
            .json(&self.body);
        let resp = transport
            .send(request)
            .await
            .and_then(RawResponse::check)
            .map_err(Error::into_auth_failure)?;
        token_from_response(resp, issued_at, ttl)
    }
}

fn token_endpoint(auth_url: &str) -> Result<Url> {
    let mut auth_url = Url::parse(auth_url)
        .map_err(|e| Error::new(ErrorKind::InvalidInput, format!("Invalid auth_url: {}", e)))?;

    let _ = auth_url
        .path_segments_mut()
        .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid auth_url: wrong schema?"))?
        .pop_if_empty();

    let segments: &[&str] = if auth_url.path().ends_with("/v3") {
        &["auth", "tokens"]
    } else {
        &["v3", "auth", "tokens"]
    };
    let _ = auth_url
        .path_segments_mut()
        .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid auth_url: wrong schema?"))?
        .extend(segments);
    Ok(auth_url)
}

fn token_from_response(
    resp: RawResponse,
    issued_at: chrono::DateTime<Utc>,
    ttl: Duration,
) -> Result<Token> {
    let value = match resp.headers().get("x-subject-token") {
        Some(hdr) => match hdr.to_str() {
            Ok(s) => Ok(s.to_string()),
            Err(e) => {
                error!(
                    "Invalid X-Subject-Token {:?} received from {}: {}",
                    hdr,
                    resp.url(),
                    e
                );
                Err(Error::new(ErrorKind::InvalidResponse, INVALID_SUBJECT_HEADER))
            }
        },
        None => {
            error!("No X-Subject-Token header received from {}", resp.url());
            Err(Error::new(ErrorKind::InvalidResponse, MISSING_SUBJECT_HEADER))
        }
    }?;

    let root: protocol::TokenRoot = resp.json()?;
    debug!(
        "Received a token expiring at {} (the server claims {})",
        issued_at + ttl,
        root.token.expires_at
    );
    trace!("Received catalog: {:?}", root.token.catalog);
    Ok(Token::from_response(value, issued_at, ttl, root.token))
}
