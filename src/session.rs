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

//! Session structure definition.
//!
//! The Session object owns the authentication method and the HTTP transport. It caches the
//! current token, reissues it once it expires and resolves service endpoints from the catalog
//! granted with the token.

use std::ops::Deref;

use chrono::{Duration, Utc};
use log::{debug, trace};
use reqwest::RequestBuilder;
use static_assertions::assert_impl_all;
use tokio::sync::RwLock;

use super::auth::AuthMethod;
use super::config::Config;
use super::identity::{Password, Token};
use super::transport::{RawResponse, Transport};
use super::{EndpointFilters, InterfaceType, Result};

/// Default token TTL in seconds.
pub const DEFAULT_TOKEN_TTL: i64 = 3600;

/// An OpenStack API session.
///
/// A session is meant to be created once and shared (usually via `Arc`) between all clients
/// built on top of it. It is safe to use from concurrent tasks: at most one token issuance
/// happens per expiration.
#[derive(Debug)]
pub struct Session {
    auth: Box<dyn AuthMethod>,
    transport: Transport,
    ttl: Duration,
    filters: EndpointFilters,
    cached_token: RwLock<Option<Token>>,
}

assert_impl_all!(Session: Send, Sync);

impl Session {
    /// Create a new session with a given authentication method and token TTL.
    pub fn new<A: AuthMethod + 'static>(auth: A, ttl: Duration) -> Session {
        Session {
            auth: Box::new(auth),
            transport: Transport::new(),
            ttl,
            filters: EndpointFilters::default(),
            cached_token: RwLock::new(None),
        }
    }

    /// Create a password-authenticated session from a configuration.
    pub fn from_config(config: &Config) -> Result<Session> {
        let auth = Password::from_credentials(&config.auth_url, &config.credentials)?;
        Ok(Session::new(auth, config.token_ttl)
            .with_endpoint_filters(EndpointFilters::new(
                Some(config.interface),
                config.credentials.region_name.clone(),
            )))
    }

    /// Create a session from environment variables.
    ///
    /// See [Config::from_env](struct.Config.html#method.from_env) for the variables used.
    #[inline]
    pub fn from_env() -> Result<Session> {
        Session::from_config(&Config::from_env()?)
    }

    /// Convert this session into one using the given transport.
    #[inline]
    pub fn with_transport(mut self, transport: Transport) -> Session {
        self.transport = transport;
        self
    }

    /// Convert this session into one using the given endpoint filters by default.
    #[inline]
    pub fn with_endpoint_filters(mut self, filters: EndpointFilters) -> Session {
        self.filters = filters;
        self
    }

    /// Convert this session into one using the given endpoint interface by default.
    #[inline]
    pub fn with_endpoint_interface(mut self, interface: InterfaceType) -> Session {
        self.filters.interface = Some(interface);
        self
    }

    /// Convert this session into one using the given region by default.
    #[inline]
    pub fn with_region<S: Into<String>>(mut self, region: S) -> Session {
        self.filters = self.filters.with_region(region);
        self
    }

    /// Default endpoint filters.
    #[inline]
    pub fn endpoint_filters(&self) -> &EndpointFilters {
        &self.filters
    }

    /// Token TTL used to compute expiration.
    #[inline]
    pub fn token_ttl(&self) -> Duration {
        self.ttl
    }

    /// HTTP transport in use.
    #[inline]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Get a valid token value, issuing a new token if needed.
    pub async fn ensure_token(&self) -> Result<String> {
        let token = self.cached_token().await?;
        Ok(token.value().to_string())
    }

    /// Get a copy of the current valid token, issuing a new token if needed.
    #[inline]
    pub async fn token(&self) -> Result<Token> {
        self.cached_token().await
    }

    /// Issue a new token, replacing the cached one.
    ///
    /// Callers racing with each other share one new token.
    pub async fn issue_token(&self) -> Result<Token> {
        let seen = self.cached_token.read().await.clone();
        self.replace_token(seen.as_ref()).await
    }

    /// Add the `X-Auth-Token` header to a request.
    pub async fn authenticate(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.ensure_token().await?;
        Ok(request.header("x-auth-token", token))
    }

    /// Authenticate and send a request without checking the response status.
    pub async fn send(&self, request: RequestBuilder) -> Result<RawResponse> {
        let request = self.authenticate(request).await?;
        self.transport.send(request).await
    }

    /// Find the base URL of a service.
    ///
    /// An empty `region` matches any region, `None` interface matches any interface.
    /// The URL is returned without a trailing slash.
    pub async fn resolve_endpoint(
        &self,
        service_type: &str,
        interface: Option<InterfaceType>,
        region: &str,
    ) -> Result<String> {
        let filters = EndpointFilters::new(interface, region);
        debug!(
            "Requesting a catalog endpoint for service '{}', filters {:?}",
            service_type, filters
        );

        let mut token = self.cached_token().await?;
        if token.catalog().is_empty() {
            debug!("The cached token has no catalog, requesting a new token");
            token = self.replace_token(Some(&token)).await?;
        }
        token.catalog().find_endpoint(service_type, &filters)
    }

    /// Find the base URL of a service using the default endpoint filters.
    pub async fn get_endpoint(&self, service_type: &str) -> Result<String> {
        let region = self.filters.region.as_deref().unwrap_or("");
        self.resolve_endpoint(service_type, self.filters.interface, region)
            .await
    }

    async fn cached_token(&self) -> Result<Token> {
        // This is executed every request at least once, so it's important to start with a read
        // lock. We expect to hit this branch most of the time.
        if let Some(token) = alive_token(&self.cached_token.read().await) {
            return Ok(token);
        }

        let mut lock = self.cached_token.write().await;
        // Another task may have updated the token while we were waiting for the write lock.
        if let Some(token) = alive_token(&lock) {
            return Ok(token);
        }

        self.store_new_token(&mut lock).await
    }

    /// Replace the token `seen` by the caller, unless another task has already done it.
    async fn replace_token(&self, seen: Option<&Token>) -> Result<Token> {
        let mut lock = self.cached_token.write().await;
        if let Some(current) = alive_token(&lock) {
            if seen.map_or(true, |seen| !same_token(seen, &current)) {
                trace!("The token has been replaced while waiting for the lock");
                return Ok(current);
            }
        }

        self.store_new_token(&mut lock).await
    }

    async fn store_new_token(&self, slot: &mut Option<Token>) -> Result<Token> {
        let token = self.auth.issue(&self.transport, self.ttl).await?;
        debug!("Cached a new token expiring at {}", token.expires_at());
        *slot = Some(token.clone());
        Ok(token)
    }
}

#[inline]
fn same_token(left: &Token, right: &Token) -> bool {
    left.issued_at() == right.issued_at() && left.value() == right.value()
}

#[inline]
fn alive_token(token: &impl Deref<Target = Option<Token>>) -> Option<Token> {
    match token.deref() {
        Some(value) if value.is_valid_at(Utc::now()) => {
            trace!("Token is valid until {}", value.expires_at());
            Some(value.clone())
        }
        _ => None,
    }
}

#[cfg(test)]
pub mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use reqwest::StatusCode;

    use super::Session;
    use crate::auth::AuthMethod;
    use crate::identity::protocol::{CatalogRecord, Endpoint};
    use crate::identity::{ServiceCatalog, Token};
    use crate::transport::Transport;
    use crate::{Error, ErrorKind, InterfaceType, Result};

    #[derive(Debug, Default)]
    struct FakeAuth {
        issued: AtomicUsize,
        empty_catalog_first: bool,
        fail: bool,
    }

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::new(vec![CatalogRecord {
            service_type: String::from("compute"),
            name: String::from("nova"),
            id: String::from("svc"),
            endpoints: vec![
                Endpoint {
                    url: String::from("http://a/v2/"),
                    interface: String::from("public"),
                    region: String::from("RegionOne"),
                    region_id: String::from("RegionOne"),
                    id: String::from("e1"),
                },
                Endpoint {
                    url: String::from("http://b/v2"),
                    interface: String::from("internal"),
                    region: String::from("RegionTwo"),
                    region_id: String::from("RegionTwo"),
                    id: String::from("e2"),
                },
            ],
        }])
    }

    #[async_trait]
    impl AuthMethod for FakeAuth {
        async fn issue(&self, _transport: &Transport, ttl: Duration) -> Result<Token> {
            let count = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            if self.fail {
                return Err(
                    Error::from_status(StatusCode::UNAUTHORIZED, None).into_auth_failure()
                );
            }
            let cat = if self.empty_catalog_first && count == 1 {
                ServiceCatalog::default()
            } else {
                catalog()
            };
            Ok(Token::new(format!("token-{}", count), Utc::now(), ttl, cat))
        }
    }

    fn session(auth: FakeAuth, ttl: i64) -> (Arc<Session>, Arc<FakeAuth>) {
        let auth = Arc::new(auth);
        let session = Session::new(SharedAuth(auth.clone()), Duration::seconds(ttl));
        (Arc::new(session), auth)
    }

    #[derive(Debug)]
    struct SharedAuth(Arc<FakeAuth>);

    #[async_trait]
    impl AuthMethod for SharedAuth {
        async fn issue(&self, transport: &Transport, ttl: Duration) -> Result<Token> {
            self.0.issue(transport, ttl).await
        }
    }

    #[tokio::test]
    async fn test_token_cached() {
        let (s, auth) = session(FakeAuth::default(), 3600);
        for _ in 0..5 {
            assert_eq!(s.ensure_token().await.unwrap(), "token-1");
        }
        assert_eq!(auth.issued.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_token_reissued() {
        let (s, auth) = session(FakeAuth::default(), 0);
        assert_eq!(s.ensure_token().await.unwrap(), "token-1");
        assert_eq!(s.ensure_token().await.unwrap(), "token-2");
        assert_eq!(auth.issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_issue_token_forces() {
        let (s, auth) = session(FakeAuth::default(), 3600);
        assert_eq!(s.ensure_token().await.unwrap(), "token-1");
        assert_eq!(s.issue_token().await.unwrap().value(), "token-2");
        assert_eq!(s.ensure_token().await.unwrap(), "token-2");
        assert_eq!(auth.issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_issue_once() {
        let (s, auth) = session(FakeAuth::default(), 3600);
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let s = s.clone();
                tokio::spawn(async move { s.ensure_token().await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "token-1");
        }
        assert_eq!(auth.issued.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_issue_failure_propagated() {
        let (s, auth) = session(
            FakeAuth {
                fail: true,
                ..FakeAuth::default()
            },
            3600,
        );
        let err = s.ensure_token().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        let _ = s.ensure_token().await.unwrap_err();
        assert_eq!(auth.issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_authenticate_sets_header() {
        let (s, _) = session(FakeAuth::default(), 3600);
        let builder = s.transport().client().get("http://127.0.0.1/servers");
        let request = s.authenticate(builder).await.unwrap().build().unwrap();
        assert_eq!(request.headers()["x-auth-token"], "token-1");
    }

    #[tokio::test]
    async fn test_resolve_endpoint() {
        let (s, _) = session(FakeAuth::default(), 3600);
        let url = s
            .resolve_endpoint("compute", Some(InterfaceType::Public), "RegionOne")
            .await
            .unwrap();
        assert_eq!(url, "http://a/v2");

        let url = s.resolve_endpoint("compute", None, "RegionTwo").await.unwrap();
        assert_eq!(url, "http://b/v2");

        let err = s
            .resolve_endpoint("compute", Some(InterfaceType::Admin), "")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EndpointNotFound);

        let err = s.resolve_endpoint("network", None, "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EndpointNotFound);
    }

    #[tokio::test]
    async fn test_resolve_endpoint_with_empty_catalog_reissues() {
        let (s, auth) = session(
            FakeAuth {
                empty_catalog_first: true,
                ..FakeAuth::default()
            },
            3600,
        );
        assert_eq!(s.ensure_token().await.unwrap(), "token-1");
        let url = s.resolve_endpoint("compute", None, "").await.unwrap();
        assert_eq!(url, "http://a/v2");
        assert_eq!(auth.issued.load(Ordering::SeqCst), 2);
        assert_eq!(s.ensure_token().await.unwrap(), "token-2");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_resolve_with_empty_catalog_reissues_once() {
        let (s, auth) = session(
            FakeAuth {
                empty_catalog_first: true,
                ..FakeAuth::default()
            },
            3600,
        );
        assert_eq!(s.ensure_token().await.unwrap(), "token-1");
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let s = s.clone();
                tokio::spawn(async move { s.resolve_endpoint("compute", None, "").await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "http://a/v2");
        }
        assert_eq!(auth.issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_replacing_stale_token_reuses_new_one() {
        let (s, auth) = session(FakeAuth::default(), 3600);
        let old = s.token().await.unwrap();
        assert_eq!(s.issue_token().await.unwrap().value(), "token-2");
        let token = s.replace_token(Some(&old)).await.unwrap();
        assert_eq!(token.value(), "token-2");
        assert_eq!(auth.issued.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_endpoint_uses_defaults() {
        let (s, _) = session(FakeAuth::default(), 3600);
        let s = Arc::try_unwrap(s)
            .unwrap()
            .with_endpoint_interface(InterfaceType::Internal)
            .with_region("RegionTwo");
        assert_eq!(s.get_endpoint("compute").await.unwrap(), "http://b/v2");

        let s = s.with_region("RegionOne");
        let err = s.get_endpoint("compute").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EndpointNotFound);
    }
}
