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

//! Abstraction over a service catalog.

use log::{debug, error, trace};
use reqwest::Url;

use super::protocol;
use crate::{EndpointFilters, Error, ErrorKind, Result};

/// A service catalog granted together with a token.
///
/// The catalog is a read-only snapshot: a new token brings a new catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceCatalog {
    inner: Vec<protocol::CatalogRecord>,
}

/// Find the base URL of a service in a list of catalog records.
///
/// Records are matched by `service_type`, endpoints by interface and region. Empty
/// `service_type` or empty filters match anything. The first surviving endpoint in
/// catalog order wins; its URL is returned without a trailing slash.
pub fn resolve(
    records: &[protocol::CatalogRecord],
    service_type: &str,
    filters: &EndpointFilters,
) -> Result<String> {
    let endpoint = records
        .iter()
        .filter(|rec| service_type.is_empty() || rec.service_type == service_type)
        .flat_map(|rec| rec.endpoints.iter())
        .find(|endp| filters.check(&endp.interface, &endp.region))
        .ok_or_else(|| Error::new_endpoint_not_found(service_type))?;
    debug!("Received {:?} for {}", endpoint, service_type);

    // A broken first match is reported, later endpoints are not tried.
    if let Err(e) = Url::parse(&endpoint.url) {
        error!(
            "Invalid URL {} received from service catalog for service \
             '{}', filters {:?}: {}",
            endpoint.url, service_type, filters, e
        );
        return Err(Error::new(
            ErrorKind::InvalidResponse,
            format!("Invalid URL {} for {} - {}", endpoint.url, service_type, e),
        ));
    }

    Ok(endpoint.url.trim_end_matches('/').to_string())
}

impl ServiceCatalog {
    pub(crate) fn new(catalog: Vec<protocol::CatalogRecord>) -> ServiceCatalog {
        trace!("Building a service catalog from {:?}", catalog);
        ServiceCatalog { inner: catalog }
    }

    /// Whether the catalog has no services at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Service types present in the catalog, in catalog order.
    pub fn service_types(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(|rec| rec.service_type.as_str())
    }

    /// Find an endpoint in the catalog.
    #[inline]
    pub fn find_endpoint(&self, service_type: &str, filters: &EndpointFilters) -> Result<String> {
        resolve(&self.inner, service_type, filters)
    }
}
