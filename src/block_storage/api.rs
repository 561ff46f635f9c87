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

//! Block Storage API client.

use std::sync::Arc;

use log::{debug, trace};

use super::protocol::*;
use crate::client::{BulkOutcome, ResourceClient};
use crate::session::Session;
use crate::utils::{self, Query};
use crate::{ErrorKind, Result};

// Tried in order, older clouds only register "volumev2".
const SERVICE_TYPES: &[&str] = &["volumev3", "volumev2", "block-storage"];

/// Query keys supported when listing volumes.
pub const VOLUME_QUERY_KEYS: &[&str] = &["all_tenants", "name", "project_id", "status"];

/// Block Storage API client.
#[derive(Debug, Clone)]
pub struct BlockStorageClient {
    inner: ResourceClient,
}

impl BlockStorageClient {
    /// Create a client, resolving the block storage endpoint from the catalog.
    pub async fn new(session: Arc<Session>) -> Result<BlockStorageClient> {
        let mut last_error = None;
        for service_type in SERVICE_TYPES {
            match ResourceClient::new(session.clone(), service_type).await {
                Ok(inner) => return Ok(BlockStorageClient::from_client(inner)),
                Err(err) if err.kind() == ErrorKind::EndpointNotFound => {
                    debug!("No {} service in the catalog", service_type);
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        // SERVICE_TYPES is not empty, so an error was recorded.
        Err(last_error.unwrap_or_else(|| crate::Error::new_endpoint_not_found("block-storage")))
    }

    /// Wrap an existing resource client.
    #[inline]
    pub fn from_client(inner: ResourceClient) -> BlockStorageClient {
        BlockStorageClient { inner }
    }

    /// Underlying resource client.
    #[inline]
    pub fn resource_client(&self) -> &ResourceClient {
        &self.inner
    }

    /// An empty query for listing volumes.
    #[inline]
    pub fn volume_query() -> Query {
        Query::with_keys(VOLUME_QUERY_KEYS)
    }

    /// List volumes with details.
    pub async fn list_volumes(&self, query: &Query) -> Result<Vec<Volume>> {
        trace!("Listing volumes with {:?}", query);
        let root: VolumesRoot = self.inner.list("volumes/detail", query).await?;
        trace!("Received volumes: {:?}", root.volumes);
        Ok(root.volumes)
    }

    /// Get a volume by its ID or, failing that, by its name.
    pub async fn get_volume<S: AsRef<str>>(&self, id_or_name: S) -> Result<Volume> {
        let s = id_or_name.as_ref();
        match self.get_volume_by_id(s).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_not_found() => self.get_volume_by_name(s).await,
            Err(err) => Err(err),
        }
    }

    /// Get a volume by its ID.
    pub async fn get_volume_by_id<S: AsRef<str>>(&self, id: S) -> Result<Volume> {
        trace!("Fetching volume {}", id.as_ref());
        let root: VolumeRoot = self.inner.show("volumes", id.as_ref()).await?;
        trace!("Received {:?}", root.volume);
        Ok(root.volume)
    }

    /// Get a volume by its name.
    pub async fn get_volume_by_name<S: AsRef<str>>(&self, name: S) -> Result<Volume> {
        trace!("Get volume by name {}", name.as_ref());
        let query = BlockStorageClient::volume_query().with("name", name.as_ref());
        let root: VolumesRoot = self.inner.list("volumes/detail", &query).await?;
        utils::one(
            root.volumes,
            "Volume with given name or ID not found",
            "Too many volumes found with given name",
        )
    }

    /// Create a volume.
    pub async fn create_volume(&self, request: &NewVolume) -> Result<Volume> {
        debug!("Creating a new volume with {:?}", request);
        let root: VolumeRoot = self
            .inner
            .create("volumes", &NewVolumeRoot { volume: request })
            .await?;
        debug!("Created volume {:?}", root.volume);
        Ok(root.volume)
    }

    /// Delete a volume.
    pub async fn delete_volume<S: AsRef<str>>(&self, id: S) -> Result<()> {
        self.inner.delete("volumes", id.as_ref()).await
    }

    /// Delete many volumes concurrently.
    pub async fn delete_volumes<I, S>(&self, ids: I) -> BulkOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.delete_many("volumes", ids).await
    }
}
