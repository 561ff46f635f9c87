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

//! OpenStack client session in Rust.
//!
//! The goal of this project is to provide a simple asynchronous API for working with
//! OpenStack clouds: authenticate once, share the token between all service clients and
//! find service endpoints in the catalog.
//!
//! # Usage
//!
//! Start with [Cloud](struct.Cloud.html), created from the `OS_*` environment variables
//! or from an explicit [Config](struct.Config.html):
//!
//! ```rust,no_run
//! async fn list_servers() -> osclient::Result<()> {
//!     let cloud = osclient::Cloud::from_env()?;
//!     let compute = cloud.compute().await?;
//!     for server in compute.list_servers(&osclient::compute::ComputeClient::server_query()).await? {
//!         println!("{} {}", server.id, server.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! * Password authentication with [Identity API v3](identity/index.html)
//! * Token caching shared between concurrent tasks
//! * Endpoint resolution by service type, interface and region
//! * Basic [compute](compute/index.html), [image](image/index.html),
//!   [block storage](block_storage/index.html) and [network](network/index.html) clients

#![crate_name = "osclient"]
#![crate_type = "lib"]
// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler. Add more warnings here as you discover them.
// Taken from https://github.com/rust-unofficial/patterns/
#![deny(
    dead_code,
    improper_ctypes,
    missing_debug_implementations,
    missing_docs,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    trivial_casts,
    trivial_numeric_casts,
    unconditional_recursion,
    unsafe_code,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_extern_crates,
    unused_import_braces,
    unused_parens,
    while_true
)]

mod auth;
#[cfg(feature = "block-storage")]
pub mod block_storage;
mod client;
mod cloud;
#[cfg(feature = "compute")]
pub mod compute;
mod config;
mod endpointfilters;
mod error;
pub mod identity;
#[cfg(feature = "image")]
pub mod image;
#[cfg(feature = "network")]
pub mod network;
mod session;
mod transport;
mod utils;

pub use crate::auth::AuthMethod;
pub use crate::client::{BulkOutcome, ResourceClient};
pub use crate::cloud::Cloud;
pub use crate::config::Config;
pub use crate::endpointfilters::{EndpointFilters, InterfaceType};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::session::{Session, DEFAULT_TOKEN_TTL};
pub use crate::transport::{RawResponse, Transport};
pub use crate::utils::{Query, COMMON_QUERY_KEYS};
