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

//! Authentication methods.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::Duration;

use super::identity::Token;
use super::transport::Transport;
use super::Result;

/// Trait for an authentication method.
///
/// An authentication method only knows how to obtain a new token. Caching, expiration
/// and concurrency are handled by the [Session](../struct.Session.html).
#[async_trait]
pub trait AuthMethod: Debug + Send + Sync {
    /// Issue a new token that stays valid for `ttl`.
    async fn issue(&self, transport: &Transport, ttl: Duration) -> Result<Token>;
}
