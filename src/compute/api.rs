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

//! Compute API client.

use std::sync::Arc;

use log::trace;

use super::protocol::*;
use crate::client::{BulkOutcome, ResourceClient};
use crate::session::Session;
use crate::utils::{self, Query};
use crate::Result;

const SERVICE_TYPE: &str = "compute";

/// Query keys supported when listing servers.
pub const SERVER_QUERY_KEYS: &[&str] = &[
    "all_tenants",
    "changes-since",
    "flavor",
    "host",
    "image",
    "ip",
    "name",
    "project_id",
    "status",
];

/// Query keys supported when listing flavors.
pub const FLAVOR_QUERY_KEYS: &[&str] = &["is_public", "minDisk", "minRam"];

/// Compute API client.
#[derive(Debug, Clone)]
pub struct ComputeClient {
    inner: ResourceClient,
}

impl ComputeClient {
    /// Create a client, resolving the compute endpoint from the catalog.
    pub async fn new(session: Arc<Session>) -> Result<ComputeClient> {
        Ok(ComputeClient::from_client(
            ResourceClient::new(session, SERVICE_TYPE).await?,
        ))
    }

    /// Wrap an existing resource client.
    #[inline]
    pub fn from_client(inner: ResourceClient) -> ComputeClient {
        ComputeClient { inner }
    }

    /// Underlying resource client.
    #[inline]
    pub fn resource_client(&self) -> &ResourceClient {
        &self.inner
    }

    /// An empty query for listing servers.
    #[inline]
    pub fn server_query() -> Query {
        Query::with_keys(SERVER_QUERY_KEYS)
    }

    /// An empty query for listing flavors.
    #[inline]
    pub fn flavor_query() -> Query {
        Query::with_keys(FLAVOR_QUERY_KEYS)
    }

    /// List servers with details.
    pub async fn list_servers(&self, query: &Query) -> Result<Vec<Server>> {
        trace!("Listing servers with {:?}", query);
        let root: ServersRoot = self.inner.list("servers/detail", query).await?;
        trace!("Received servers: {:?}", root.servers);
        Ok(root.servers)
    }

    /// Get a server by its ID or, failing that, by its name.
    pub async fn get_server<S: AsRef<str>>(&self, id_or_name: S) -> Result<Server> {
        let s = id_or_name.as_ref();
        match self.get_server_by_id(s).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_not_found() => self.get_server_by_name(s).await,
            Err(err) => Err(err),
        }
    }

    /// Get a server by its ID.
    pub async fn get_server_by_id<S: AsRef<str>>(&self, id: S) -> Result<Server> {
        trace!("Fetching server {}", id.as_ref());
        let root: ServerRoot = self.inner.show("servers", id.as_ref()).await?;
        trace!("Received {:?}", root.server);
        Ok(root.server)
    }

    /// Get a server by its name.
    pub async fn get_server_by_name<S: AsRef<str>>(&self, name: S) -> Result<Server> {
        let name = name.as_ref();
        trace!("Get server by name {}", name);
        // The name filter is a regular expression matched by the server.
        let query = ComputeClient::server_query().with("name", format!("^{}$", regex::escape(name)));
        let root: ServersRoot = self.inner.list("servers/detail", &query).await?;
        utils::one(
            root.servers.into_iter().filter(|s| s.name == name).collect(),
            "Server with given name or ID not found",
            "Too many servers found with given name",
        )
    }

    /// Delete a server.
    pub async fn delete_server<S: AsRef<str>>(&self, id: S) -> Result<()> {
        self.inner.delete("servers", id.as_ref()).await
    }

    /// Delete many servers concurrently.
    pub async fn delete_servers<I, S>(&self, ids: I) -> BulkOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.delete_many("servers", ids).await
    }

    /// List flavors with details.
    pub async fn list_flavors(&self, query: &Query) -> Result<Vec<Flavor>> {
        trace!("Listing flavors with {:?}", query);
        let root: FlavorsRoot = self.inner.list("flavors/detail", query).await?;
        Ok(root.flavors)
    }

    /// Get a flavor by its ID or, failing that, by its name.
    pub async fn get_flavor<S: AsRef<str>>(&self, id_or_name: S) -> Result<Flavor> {
        let s = id_or_name.as_ref();
        match self.inner.show::<FlavorRoot>("flavors", s).await {
            Ok(root) => Ok(root.flavor),
            Err(err) if err.is_not_found() => {
                trace!("Get flavor by name {}", s);
                let flavors = self.list_flavors(&ComputeClient::flavor_query()).await?;
                utils::one(
                    flavors.into_iter().filter(|f| f.name == s).collect(),
                    "Flavor with given name or ID not found",
                    "Too many flavors found with given name",
                )
            }
            Err(err) => Err(err),
        }
    }
}
