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

//! Network API client.

use std::sync::Arc;

use log::{debug, trace};

use super::protocol::*;
use crate::client::ResourceClient;
use crate::session::Session;
use crate::utils::{self, Query};
use crate::Result;

const SERVICE_TYPE: &str = "network";
const VERSION: &str = "v2.0";

/// Query keys supported when listing networks.
pub const NETWORK_QUERY_KEYS: &[&str] = &[
    "admin_state_up",
    "name",
    "project_id",
    "router:external",
    "shared",
    "status",
];

/// Query keys supported when listing ports.
pub const PORT_QUERY_KEYS: &[&str] = &[
    "device_id",
    "device_owner",
    "mac_address",
    "name",
    "network_id",
    "project_id",
    "status",
];

/// Network API client.
#[derive(Debug, Clone)]
pub struct NetworkClient {
    inner: ResourceClient,
}

impl NetworkClient {
    /// Create a client, resolving the network endpoint from the catalog.
    pub async fn new(session: Arc<Session>) -> Result<NetworkClient> {
        Ok(NetworkClient::from_client(
            ResourceClient::new_with_version(session, SERVICE_TYPE, Some(VERSION)).await?,
        ))
    }

    /// Wrap an existing resource client.
    #[inline]
    pub fn from_client(inner: ResourceClient) -> NetworkClient {
        NetworkClient { inner }
    }

    /// Underlying resource client.
    #[inline]
    pub fn resource_client(&self) -> &ResourceClient {
        &self.inner
    }

    /// An empty query for listing networks.
    #[inline]
    pub fn network_query() -> Query {
        Query::with_keys(NETWORK_QUERY_KEYS)
    }

    /// An empty query for listing ports.
    #[inline]
    pub fn port_query() -> Query {
        Query::with_keys(PORT_QUERY_KEYS)
    }

    /// List networks.
    pub async fn list_networks(&self, query: &Query) -> Result<Vec<Network>> {
        trace!("Listing networks with {:?}", query);
        let root: NetworksRoot = self.inner.list("networks", query).await?;
        trace!("Received networks: {:?}", root.networks);
        Ok(root.networks)
    }

    /// Get a network by its ID or, failing that, by its name.
    pub async fn get_network<S: AsRef<str>>(&self, id_or_name: S) -> Result<Network> {
        let s = id_or_name.as_ref();
        match self.inner.show::<NetworkRoot>("networks", s).await {
            Ok(root) => Ok(root.network),
            Err(err) if err.is_not_found() => {
                trace!("Get network by name {}", s);
                let query = NetworkClient::network_query().with("name", s);
                let root: NetworksRoot = self.inner.list("networks", &query).await?;
                utils::one(
                    root.networks,
                    "Network with given name or ID not found",
                    "Too many networks found with given name",
                )
            }
            Err(err) => Err(err),
        }
    }

    /// Create a network.
    pub async fn create_network(&self, request: &NewNetwork) -> Result<Network> {
        debug!("Creating a new network with {:?}", request);
        let root: NetworkRoot = self
            .inner
            .create("networks", &NewNetworkRoot { network: request })
            .await?;
        debug!("Created network {:?}", root.network);
        Ok(root.network)
    }

    /// Delete a network.
    pub async fn delete_network<S: AsRef<str>>(&self, id: S) -> Result<()> {
        self.inner.delete("networks", id.as_ref()).await
    }

    /// List ports.
    pub async fn list_ports(&self, query: &Query) -> Result<Vec<Port>> {
        trace!("Listing ports with {:?}", query);
        let root: PortsRoot = self.inner.list("ports", query).await?;
        trace!("Received ports: {:?}", root.ports);
        Ok(root.ports)
    }

    /// Get a port by its ID.
    pub async fn get_port<S: AsRef<str>>(&self, id: S) -> Result<Port> {
        let root: PortRoot = self.inner.show("ports", id.as_ref()).await?;
        Ok(root.port)
    }

    /// Delete a port.
    pub async fn delete_port<S: AsRef<str>>(&self, id: S) -> Result<()> {
        self.inner.delete("ports", id.as_ref()).await
    }
}
