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

//! Generic resource client: list, show, create and delete over one service.

use std::sync::Arc;

use futures::future;
use log::{debug, trace, warn};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::session::Session;
use super::transport::RawResponse;
use super::utils::{self, Query};
use super::{Error, ErrorKind, Result};

/// A client for one service, bound to its base URL.
///
/// The base URL is resolved from the service catalog once, when the client is created.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    session: Arc<Session>,
    service_type: String,
    base_url: String,
}

/// Outcome of a bulk operation.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    /// IDs processed successfully.
    pub succeeded: Vec<String>,
    /// IDs that failed together with their errors.
    pub failed: Vec<(String, Error)>,
}

impl BulkOutcome {
    /// Whether every item succeeded.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl ResourceClient {
    /// Create a client for the given service type using the session's endpoint filters.
    pub async fn new(session: Arc<Session>, service_type: &str) -> Result<ResourceClient> {
        ResourceClient::new_with_version(session, service_type, None).await
    }

    /// Create a client, appending a version suffix to the endpoint if it is missing.
    pub async fn new_with_version(
        session: Arc<Session>,
        service_type: &str,
        version: Option<&str>,
    ) -> Result<ResourceClient> {
        let endpoint = session.get_endpoint(service_type).await?;
        let base_url = utils::with_version(endpoint, version);
        debug!("Using {} for service {}", base_url, service_type);
        Ok(ResourceClient::from_endpoint(session, service_type, base_url))
    }

    /// Create a client with a known base URL, bypassing the service catalog.
    pub fn from_endpoint<S1, S2>(session: Arc<Session>, service_type: S1, base_url: S2) -> ResourceClient
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let base_url: String = base_url.into();
        ResourceClient {
            session,
            service_type: service_type.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL of the service.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Service type this client was created for.
    #[inline]
    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    /// Session in use.
    #[inline]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// List resources: `GET {base}/{resource}` with query parameters.
    pub async fn list<T: DeserializeOwned>(&self, resource: &str, query: &Query) -> Result<T> {
        let pairs = query.pairs()?;
        let url = self.url(resource, None)?;
        trace!("Listing {} with {:?}", url, pairs);
        let request = self.session.transport().request(Method::GET, url).query(pairs);
        self.send(request).await?.json()
    }

    /// Show a resource: `GET {base}/{resource}/{id}`.
    pub async fn show<T: DeserializeOwned>(&self, resource: &str, id: &str) -> Result<T> {
        let url = self.url(resource, Some(id))?;
        trace!("Fetching {}", url);
        let request = self.session.transport().request(Method::GET, url);
        self.send(request).await?.json()
    }

    /// Create a resource: `POST {base}/{resource}`.
    pub async fn create<B, T>(&self, resource: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(resource, None)?;
        trace!("Creating a resource at {}", url);
        let request = self.session.transport().request(Method::POST, url).json(body);
        self.send(request).await?.json()
    }

    /// Delete a resource: `DELETE {base}/{resource}/{id}`.
    pub async fn delete(&self, resource: &str, id: &str) -> Result<()> {
        let url = self.url(resource, Some(id))?;
        trace!("Deleting {}", url);
        let request = self.session.transport().request(Method::DELETE, url);
        let _ = self.send(request).await?;
        debug!("Successfully requested deletion of {} {}", resource, id);
        Ok(())
    }

    /// Delete many resources concurrently.
    ///
    /// A failure does not stop other deletions.
    pub async fn delete_many<I, S>(&self, resource: &str, ids: I) -> BulkOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let results = future::join_all(ids.iter().map(|id| self.delete(resource, id))).await;

        let mut outcome = BulkOutcome::default();
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(()) => outcome.succeeded.push(id),
                Err(err) => {
                    warn!("Failed to delete {} {}: {}", resource, id, err);
                    outcome.failed.push((id, err));
                }
            }
        }
        outcome
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<RawResponse> {
        self.session.send(request).await?.check()
    }

    fn url(&self, resource: &str, id: Option<&str>) -> Result<Url> {
        let mut segments: Vec<&str> = resource.split('/').collect();
        if let Some(id) = id {
            if id.is_empty() {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("Empty ID provided for {}", resource),
                ));
            }
            segments.push(id);
        }
        utils::extend_url(&self.base_url, &segments)
    }
}
