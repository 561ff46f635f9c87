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

//! Authentication using Identity API v3.
//!
//! Currently supports [Password](struct.Password.html) authentication scoped to a project.
//! Identity API v2 is not and will not be supported.

mod catalog;
mod password;
pub mod protocol;
mod token;

pub use self::catalog::{resolve, ServiceCatalog};
pub use self::password::Password;
pub use self::token::Token;

const MISSING_SUBJECT_HEADER: &str = "Missing X-Subject-Token header";
const INVALID_SUBJECT_HEADER: &str = "Invalid X-Subject-Token header";

/// Default domain for users and projects.
pub const DEFAULT_DOMAIN: &str = "Default";

/// Default region name.
pub const DEFAULT_REGION: &str = "RegionOne";

/// User credentials and the project to scope tokens to.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name.
    pub username: String,
    /// User password.
    pub password: String,
    /// Name of the user's domain.
    pub user_domain_name: String,
    /// Name of the project to scope to.
    pub project_name: String,
    /// Name of the project's domain.
    pub project_domain_name: String,
    /// Region name.
    pub region_name: String,
}

impl Credentials {
    /// Create credentials with the default domains and region.
    pub fn new<S1, S2, S3>(username: S1, password: S2, project_name: S3) -> Credentials
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Credentials {
            username: username.into(),
            password: password.into(),
            user_domain_name: String::from(DEFAULT_DOMAIN),
            project_name: project_name.into(),
            project_domain_name: String::from(DEFAULT_DOMAIN),
            region_name: String::from(DEFAULT_REGION),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("user_domain_name", &self.user_domain_name)
            .field("project_name", &self.project_name)
            .field("project_domain_name", &self.project_domain_name)
            .field("region_name", &self.region_name)
            .finish()
    }
}
