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

//! Image API client.

use std::sync::Arc;

use log::trace;

use super::protocol::*;
use crate::client::ResourceClient;
use crate::session::Session;
use crate::utils::{self, Query};
use crate::Result;

const SERVICE_TYPE: &str = "image";
const VERSION: &str = "v2";

/// Query keys supported when listing images.
pub const IMAGE_QUERY_KEYS: &[&str] = &[
    "container_format",
    "disk_format",
    "name",
    "owner",
    "status",
    "tag",
    "visibility",
];

/// Image API client.
#[derive(Debug, Clone)]
pub struct ImageClient {
    inner: ResourceClient,
}

impl ImageClient {
    /// Create a client, resolving the image endpoint from the catalog.
    pub async fn new(session: Arc<Session>) -> Result<ImageClient> {
        Ok(ImageClient::from_client(
            ResourceClient::new_with_version(session, SERVICE_TYPE, Some(VERSION)).await?,
        ))
    }

    /// Wrap an existing resource client.
    #[inline]
    pub fn from_client(inner: ResourceClient) -> ImageClient {
        ImageClient { inner }
    }

    /// Underlying resource client.
    #[inline]
    pub fn resource_client(&self) -> &ResourceClient {
        &self.inner
    }

    /// An empty query for listing images.
    #[inline]
    pub fn image_query() -> Query {
        Query::with_keys(IMAGE_QUERY_KEYS)
    }

    /// List images.
    pub async fn list_images(&self, query: &Query) -> Result<Vec<Image>> {
        trace!("Listing images with {:?}", query);
        let root: ImagesRoot = self.inner.list("images", query).await?;
        trace!("Received images: {:?}", root.images);
        Ok(root.images)
    }

    /// Get an image by its ID or, failing that, by its name.
    pub async fn get_image<S: AsRef<str>>(&self, id_or_name: S) -> Result<Image> {
        let s = id_or_name.as_ref();
        match self.get_image_by_id(s).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_not_found() => self.get_image_by_name(s).await,
            Err(err) => Err(err),
        }
    }

    /// Get an image by its ID.
    ///
    /// The Image API returns images without a wrapping key.
    pub async fn get_image_by_id<S: AsRef<str>>(&self, id: S) -> Result<Image> {
        trace!("Fetching image {}", id.as_ref());
        let image: Image = self.inner.show("images", id.as_ref()).await?;
        trace!("Received {:?}", image);
        Ok(image)
    }

    /// Get an image by its name.
    pub async fn get_image_by_name<S: AsRef<str>>(&self, name: S) -> Result<Image> {
        trace!("Get image by name {}", name.as_ref());
        let query = ImageClient::image_query().with("name", name.as_ref());
        let root: ImagesRoot = self.inner.list("images", &query).await?;
        utils::one(
            root.images,
            "Image with given name or ID not found",
            "Too many images found with given name",
        )
    }

    /// Delete an image.
    pub async fn delete_image<S: AsRef<str>>(&self, id: S) -> Result<()> {
        self.inner.delete("images", id.as_ref()).await
    }
}
