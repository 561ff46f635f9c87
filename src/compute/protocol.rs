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

//! JSON structures and protocol bits for the Compute API.

#![allow(missing_docs)]

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::Deserializer;
use serde_derive::Deserialize;

/// A reference to another resource.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Ref {
    pub id: String,
}

/// A virtual server.
#[derive(Clone, Debug, Deserialize)]
pub struct Server {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub addresses: HashMap<String, Vec<ServerAddress>>,
    #[serde(rename = "created", default)]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(rename = "updated", default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub flavor: Option<ServerFlavor>,
    // Empty string when booted from a volume.
    #[serde(default, deserialize_with = "image_ref")]
    pub image: Option<Ref>,
    #[serde(default)]
    pub key_name: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(rename = "tenant_id", default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerAddress {
    pub addr: String,
    #[serde(default)]
    pub version: Option<u8>,
    #[serde(rename = "OS-EXT-IPS:type", default)]
    pub addr_type: Option<String>,
}

/// Flavor as embedded into a server: a reference or (since 2.47) a summary.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerFlavor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub vcpus: Option<u32>,
    #[serde(default)]
    pub ram: Option<u64>,
    #[serde(default)]
    pub disk: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerRoot {
    pub server: Server,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServersRoot {
    pub servers: Vec<Server>,
}

/// A server flavor.
#[derive(Clone, Debug, Deserialize)]
pub struct Flavor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub vcpus: u32,
    #[serde(default)]
    pub ram: u64,
    #[serde(default)]
    pub disk: u64,
    #[serde(rename = "OS-FLV-EXT-DATA:ephemeral", default)]
    pub ephemeral: u64,
    #[serde(rename = "os-flavor-access:is_public", default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FlavorRoot {
    pub flavor: Flavor,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FlavorsRoot {
    pub flavors: Vec<Flavor>,
}

fn default_true() -> bool {
    true
}

fn image_ref<'de, D>(deserializer: D) -> Result<Option<Ref>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    #[allow(dead_code)]
    enum MaybeRef {
        Ref(Ref),
        Other(serde_json::Value),
    }

    Ok(match <Option<MaybeRef> as serde::Deserialize>::deserialize(deserializer)? {
        Some(MaybeRef::Ref(r)) => Some(r),
        _ => None,
    })
}
