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

//! Cloud API.

use std::sync::Arc;

#[cfg(feature = "block-storage")]
use super::block_storage::BlockStorageClient;
#[cfg(feature = "compute")]
use super::compute::ComputeClient;
#[cfg(feature = "image")]
use super::image::ImageClient;
#[cfg(feature = "network")]
use super::network::NetworkClient;
use super::{AuthMethod, Config, Result, Session};

/// OpenStack cloud API.
///
/// Holds one shared [Session](struct.Session.html) and hands out service clients
/// bound to it. All clients created from the same `Cloud` share the cached token.
#[derive(Debug, Clone)]
pub struct Cloud {
    session: Arc<Session>,
}

impl Cloud {
    /// Create a new cloud object with a given authentication method and token TTL.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// async fn cloud() -> osclient::Result<osclient::Cloud> {
    ///     let auth = osclient::identity::Password::new(
    ///             "https://cloud.example.com",
    ///             "user1", "pa$$word", "Default")?
    ///         .with_project_scope("project1", "Default");
    ///     Ok(osclient::Cloud::new(auth, chrono::Duration::hours(1)))
    /// }
    /// ```
    pub fn new<A: AuthMethod + 'static>(auth: A, ttl: chrono::Duration) -> Cloud {
        Cloud::from_session(Session::new(auth, ttl))
    }

    /// Create a cloud object from a configuration.
    pub fn from_config(config: &Config) -> Result<Cloud> {
        Ok(Cloud::from_session(Session::from_config(config)?))
    }

    /// Create a cloud object from the `OS_*` environment variables.
    pub fn from_env() -> Result<Cloud> {
        Ok(Cloud::from_session(Session::from_env()?))
    }

    /// Create a cloud object from an existing session.
    #[inline]
    pub fn from_session(session: Session) -> Cloud {
        Cloud {
            session: Arc::new(session),
        }
    }

    /// Shared session.
    #[inline]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Compute API client.
    #[cfg(feature = "compute")]
    pub async fn compute(&self) -> Result<ComputeClient> {
        ComputeClient::new(self.session.clone()).await
    }

    /// Image API client.
    #[cfg(feature = "image")]
    pub async fn image(&self) -> Result<ImageClient> {
        ImageClient::new(self.session.clone()).await
    }

    /// Block Storage API client.
    #[cfg(feature = "block-storage")]
    pub async fn block_storage(&self) -> Result<BlockStorageClient> {
        BlockStorageClient::new(self.session.clone()).await
    }

    /// Network API client.
    #[cfg(feature = "network")]
    pub async fn network(&self) -> Result<NetworkClient> {
        NetworkClient::new(self.session.clone()).await
    }
}
