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

//! Endpoint selection criteria.

use std::fmt;
use std::str::FromStr;

use super::{Error, ErrorKind};

/// Interface type: public, internal or admin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum InterfaceType {
    /// Public interface (used by default).
    #[default]
    Public,
    /// Internal interface.
    Internal,
    /// Administrator interface.
    Admin,
}

/// Filters narrowing down an endpoint in the service catalog.
///
/// A filter left as `None` matches any value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EndpointFilters {
    /// Endpoint interface to use.
    pub interface: Option<InterfaceType>,
    /// Cloud region.
    pub region: Option<String>,
}

impl InterfaceType {
    /// Name of the interface as it appears in the service catalog.
    pub fn as_str(self) -> &'static str {
        match self {
            InterfaceType::Public => "public",
            InterfaceType::Internal => "internal",
            InterfaceType::Admin => "admin",
        }
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterfaceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<InterfaceType, Error> {
        match s {
            "public" | "publicURL" => Ok(InterfaceType::Public),
            "internal" | "internalURL" => Ok(InterfaceType::Internal),
            "admin" | "adminURL" => Ok(InterfaceType::Admin),
            other => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Invalid endpoint interface {}", other),
            )),
        }
    }
}

impl EndpointFilters {
    /// Create filters from an interface and a region.
    ///
    /// Empty strings are treated as wildcards.
    pub fn new<S: Into<String>>(interface: Option<InterfaceType>, region: S) -> EndpointFilters {
        let region = region.into();
        EndpointFilters {
            interface,
            region: if region.is_empty() { None } else { Some(region) },
        }
    }

    /// Set the interface to use.
    #[inline]
    pub fn with_interface(mut self, interface: InterfaceType) -> Self {
        self.interface = Some(interface);
        self
    }

    /// Set the region to use.
    #[inline]
    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        let region = region.into();
        self.region = if region.is_empty() { None } else { Some(region) };
        self
    }

    /// Check whether an endpoint with the given interface and region passes the filters.
    pub fn check(&self, interface: &str, region: &str) -> bool {
        let interface_ok = match self.interface {
            Some(expected) => expected.as_str() == interface,
            None => true,
        };
        let region_ok = match self.region {
            Some(ref expected) => expected == region,
            None => true,
        };
        interface_ok && region_ok
    }
}
