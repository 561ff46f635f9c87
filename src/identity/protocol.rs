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

//! JSON structures and protocol bits for the Identity V3 API.

#![allow(missing_docs)]

use chrono::{DateTime, FixedOffset};
use serde::Deserializer;
use serde_derive::{Deserialize, Serialize};

pub const PASSWORD_METHOD: &str = "password";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Domain {
    pub name: String,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct UserAndPassword {
    pub name: String,
    pub password: String,
    pub domain: Domain,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PasswordAuth {
    pub user: UserAndPassword,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Identity {
    pub methods: Vec<String>,
    pub password: PasswordAuth,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Project {
    pub name: String,
    pub domain: Domain,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ProjectScope {
    pub project: Project,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Auth {
    pub identity: Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ProjectScope>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AuthRoot {
    pub auth: Auth,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub interface: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CatalogRecord {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub endpoints: Vec<Endpoint>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct IdAndName {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Token {
    pub expires_at: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub catalog: Vec<CatalogRecord>,
    #[serde(default)]
    pub project: Option<IdAndName>,
    #[serde(default)]
    pub user: Option<IdAndName>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TokenRoot {
    pub token: Token,
}

// Keystone sends explicit nulls for some optional fields, e.g. endpoints without a region.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    Ok(<Option<T> as serde::Deserialize>::deserialize(deserializer)?.unwrap_or_default())
}

impl std::fmt::Debug for UserAndPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("UserAndPassword")
            .field("name", &self.name)
            .field("password", &"***")
            .field("domain", &self.domain)
            .finish()
    }
}

impl Identity {
    pub fn password<S1, S2, S3>(user_name: S1, password: S2, domain_name: S3) -> Identity
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Identity {
            methods: vec![String::from(PASSWORD_METHOD)],
            password: PasswordAuth {
                user: UserAndPassword {
                    name: user_name.into(),
                    password: password.into(),
                    domain: Domain {
                        name: domain_name.into(),
                    },
                },
            },
        }
    }
}

impl ProjectScope {
    pub fn new<S1, S2>(project_name: S1, domain_name: S2) -> ProjectScope
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        ProjectScope {
            project: Project {
                name: project_name.into(),
                domain: Domain {
                    name: domain_name.into(),
                },
            },
        }
    }
}

impl AuthRoot {
    pub fn new(identity: Identity, scope: Option<ProjectScope>) -> AuthRoot {
        AuthRoot {
            auth: Auth { identity, scope },
        }
    }
}
