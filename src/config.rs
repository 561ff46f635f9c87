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

//! Configuration from environment variables.

use std::env;

use chrono::Duration;
use log::debug;

use super::identity::{Credentials, DEFAULT_DOMAIN, DEFAULT_REGION};
use super::session::DEFAULT_TOKEN_TTL;
use super::{Error, ErrorKind, InterfaceType, Result};

/// Session configuration: where and how to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// URL of the Identity service.
    pub auth_url: String,
    /// Credentials and region.
    pub credentials: Credentials,
    /// Endpoint interface to use.
    pub interface: InterfaceType,
    /// How long a token is used after it was issued.
    pub token_ttl: Duration,
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidConfig,
            format!("Environment variable {} is required", name),
        )
    })
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.is_empty())
}

impl Config {
    /// Create a configuration from environment variables.
    ///
    /// The following variables are used:
    /// * `OS_AUTH_URL`, `OS_USERNAME`, `OS_PASSWORD`, `OS_PROJECT_NAME` (required);
    /// * `OS_USER_DOMAIN_NAME`, `OS_PROJECT_DOMAIN_NAME` (default `Default`);
    /// * `OS_REGION_NAME` (default `RegionOne`);
    /// * `OS_INTERFACE` (default `public`);
    /// * `OS_TOKEN_EXPIRE_SECOND` (default 3600).
    #[inline]
    pub fn from_env() -> Result<Config> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    /// Create a configuration using the provided variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_url = required(&lookup, "OS_AUTH_URL")?;
        let credentials = Credentials {
            username: required(&lookup, "OS_USERNAME")?,
            password: required(&lookup, "OS_PASSWORD")?,
            user_domain_name: optional(&lookup, "OS_USER_DOMAIN_NAME")
                .unwrap_or_else(|| String::from(DEFAULT_DOMAIN)),
            project_name: required(&lookup, "OS_PROJECT_NAME")?,
            project_domain_name: optional(&lookup, "OS_PROJECT_DOMAIN_NAME")
                .unwrap_or_else(|| String::from(DEFAULT_DOMAIN)),
            region_name: optional(&lookup, "OS_REGION_NAME")
                .unwrap_or_else(|| String::from(DEFAULT_REGION)),
        };

        let interface = match optional(&lookup, "OS_INTERFACE") {
            Some(value) => value.parse().map_err(|_| {
                Error::new(
                    ErrorKind::InvalidConfig,
                    format!("Invalid OS_INTERFACE value {}", value),
                )
            })?,
            None => InterfaceType::default(),
        };

        let ttl = match optional(&lookup, "OS_TOKEN_EXPIRE_SECOND") {
            Some(value) => match value.trim().parse::<i64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(Error::new(
                        ErrorKind::InvalidConfig,
                        format!(
                            "OS_TOKEN_EXPIRE_SECOND must be a positive number of seconds, got {}",
                            value
                        ),
                    ))
                }
            },
            None => DEFAULT_TOKEN_TTL,
        };

        debug!(
            "Using {} as user {} in region {}, token TTL {}s",
            auth_url, credentials.username, credentials.region_name, ttl
        );
        Ok(Config {
            auth_url,
            credentials,
            interface,
            token_ttl: Duration::seconds(ttl),
        })
    }
}
