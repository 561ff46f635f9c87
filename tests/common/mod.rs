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

//! Mock cloud used by integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Once};

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "gAAAAABk-test-token";

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// A catalog entry: service type and the path of its public endpoint on the mock server.
pub fn catalog(uri: &str, services: &[(&str, &str)]) -> Value {
    Value::Array(
        services
            .iter()
            .map(|(service_type, endpoint_path)| {
                json!({
                    "type": service_type,
                    "name": service_type,
                    "id": format!("{}-id", service_type),
                    "endpoints": [
                        {
                            "url": format!("{}/internal{}", uri, endpoint_path),
                            "interface": "internal",
                            "region": "RegionOne",
                            "region_id": "RegionOne",
                            "id": format!("{}-internal", service_type)
                        },
                        {
                            "url": format!("{}{}/", uri, endpoint_path),
                            "interface": "public",
                            "region": "RegionOne",
                            "region_id": "RegionOne",
                            "id": format!("{}-public", service_type)
                        }
                    ]
                })
            })
            .collect(),
    )
}

pub fn token_response(catalog: Value) -> ResponseTemplate {
    ResponseTemplate::new(201)
        .insert_header("X-Subject-Token", TOKEN)
        .set_body_json(json!({
            "token": {
                "methods": ["password"],
                "expires_at": "2099-01-01T00:00:00.000000Z",
                "issued_at": "2024-01-01T00:00:00.000000Z",
                "project": {"id": "p-1", "name": "demo", "domain": {"id": "default", "name": "Default"}},
                "user": {"id": "u-1", "name": "admin", "domain": {"id": "default", "name": "Default"}},
                "catalog": catalog
            }
        }))
}

/// Mount an Identity endpoint that expects exactly `times` token requests.
pub async fn mount_identity(server: &MockServer, services: &[(&str, &str)], times: u64) {
    Mock::given(method("POST"))
        .and(path("/v3/auth/tokens"))
        .and(body_partial_json(json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {"user": {"name": "admin", "password": "secret"}}
                },
                "scope": {"project": {"name": "demo", "domain": {"name": "Default"}}}
            }
        })))
        .respond_with(token_response(catalog(&server.uri(), services)))
        .expect(times)
        .mount(server)
        .await;
}

pub fn config(server: &MockServer, extra: &[(&str, &str)]) -> osclient::Config {
    let mut vars: HashMap<String, String> = [
        ("OS_AUTH_URL", server.uri()),
        ("OS_USERNAME", String::from("admin")),
        ("OS_PASSWORD", String::from("secret")),
        ("OS_PROJECT_NAME", String::from("demo")),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    for (k, v) in extra {
        let _ = vars.insert(k.to_string(), v.to_string());
    }
    osclient::Config::from_lookup(|name| vars.get(name).cloned()).expect("Invalid configuration")
}

pub fn cloud(server: &MockServer) -> osclient::Cloud {
    init_logging();
    osclient::Cloud::from_config(&config(server, &[])).expect("Cannot create a cloud")
}

pub fn session(server: &MockServer, extra: &[(&str, &str)]) -> Arc<osclient::Session> {
    init_logging();
    Arc::new(osclient::Session::from_config(&config(server, extra)).expect("Cannot create a session"))
}
