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

//! Compute API: servers and flavors.

mod api;
mod protocol;

pub use self::api::{ComputeClient, FLAVOR_QUERY_KEYS, SERVER_QUERY_KEYS};
pub use self::protocol::{Flavor, Ref, Server, ServerAddress, ServerFlavor};
