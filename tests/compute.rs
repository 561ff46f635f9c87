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

use osclient::compute::ComputeClient;
use osclient::{ErrorKind, Query};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

const SERVICES: &[(&str, &str)] = &[("compute", "/compute/v2.1")];

fn server_body(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "status": "ACTIVE",
        "tenant_id": "p-1",
        "user_id": "u-1",
        "image": "",
        "flavor": {"id": "f-1"},
        "addresses": {
            "private": [{"addr": "10.0.0.5", "version": 4, "OS-EXT-IPS:type": "fixed"}]
        },
        "metadata": {},
        "links": []
    })
}

#[tokio::test]
async fn test_list_servers() {
    let server = MockServer::start().await;
    common::mount_identity(&server, SERVICES, 1).await;
    Mock::given(method("GET"))
        .and(path("/compute/v2.1/servers/detail"))
        .and(query_param("status", "ACTIVE"))
        .and(query_param("limit", "2"))
        .and(header("x-auth-token", common::TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "servers": [server_body("s-1", "vm1"), server_body("s-2", "vm2")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cloud = common::cloud(&server);
    let compute = cloud.compute().await.expect("Cannot create a compute client");
    assert_eq!(
        compute.resource_client().base_url(),
        format!("{}/compute/v2.1", server.uri())
    );

    let query = ComputeClient::server_query()
        .with("status", "ACTIVE")
        .with("limit", 2)
        .with("marker", "");
    let servers = compute.list_servers(&query).await.expect("Cannot list servers");
    assert_eq!(servers.len(), 2);
    assert_eq!(servers[0].id, "s-1");
    assert_eq!(servers[1].name, "vm2");
    assert!(servers[0].image.is_none());
    assert_eq!(servers[0].project_id.as_deref(), Some("p-1"));
    assert_eq!(servers[0].addresses["private"][0].addr, "10.0.0.5");
}

#[tokio::test]
async fn test_unknown_query_key() {
    let server = MockServer::start().await;
    common::mount_identity(&server, SERVICES, 1).await;

    let cloud = common::cloud(&server);
    let compute = cloud.compute().await.unwrap();
    let query = ComputeClient::server_query().with("colour", "blue");
    let err = compute.list_servers(&query).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_show_not_found() {
    let server = MockServer::start().await;
    common::mount_identity(&server, SERVICES, 1).await;
    Mock::given(method("GET"))
        .and(path("/compute/v2.1/servers/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "itemNotFound": {"code": 404, "message": "Instance missing could not be found."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cloud = common::cloud(&server);
    let compute = cloud.compute().await.unwrap();
    let err = compute.get_server_by_id("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
    assert!(err.message().unwrap().contains("could not be found"));
}

#[tokio::test]
async fn test_get_server_by_name_fallback() {
    let server = MockServer::start().await;
    common::mount_identity(&server, SERVICES, 1).await;
    Mock::given(method("GET"))
        .and(path("/compute/v2.1/servers/vm1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/compute/v2.1/servers/detail"))
        .and(query_param("name", "^vm1$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "servers": [server_body("s-1", "vm1")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cloud = common::cloud(&server);
    let compute = cloud.compute().await.unwrap();
    let found = compute.get_server("vm1").await.expect("Cannot find server");
    assert_eq!(found.id, "s-1");
}

#[tokio::test]
async fn test_get_server_by_name_ambiguous() {
    let server = MockServer::start().await;
    common::mount_identity(&server, SERVICES, 1).await;
    Mock::given(method("GET"))
        .and(path("/compute/v2.1/servers/detail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "servers": [server_body("s-1", "vm"), server_body("s-2", "vm")]
        })))
        .mount(&server)
        .await;

    let cloud = common::cloud(&server);
    let compute = cloud.compute().await.unwrap();
    let err = compute.get_server_by_name("vm").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TooManyItems);
}

#[tokio::test]
async fn test_get_server_by_name_with_special_characters() {
    let server = MockServer::start().await;
    common::mount_identity(&server, SERVICES, 1).await;
    Mock::given(method("GET"))
        .and(path("/compute/v2.1/servers/web.1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    // A server-side regex match may still be loose, so return a near miss too.
    Mock::given(method("GET"))
        .and(path("/compute/v2.1/servers/detail"))
        .and(query_param("name", r"^web\.1$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "servers": [server_body("s-1", "web.1"), server_body("s-2", "webX1")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cloud = common::cloud(&server);
    let compute = cloud.compute().await.unwrap();
    let found = compute.get_server("web.1").await.expect("Cannot find server");
    assert_eq!(found.id, "s-1");
}

#[tokio::test]
async fn test_delete_servers_partial_failure() {
    let server = MockServer::start().await;
    common::mount_identity(&server, SERVICES, 1).await;
    for (id, status) in [("s-1", 204u16), ("s-2", 404), ("s-3", 204)] {
        Mock::given(method("DELETE"))
            .and(path(format!("/compute/v2.1/servers/{}", id)))
            .and(header("x-auth-token", common::TOKEN))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&server)
            .await;
    }

    let cloud = common::cloud(&server);
    let compute = cloud.compute().await.unwrap();
    let outcome = compute.delete_servers(vec!["s-1", "s-2", "s-3"]).await;
    assert!(!outcome.is_success());
    assert_eq!(outcome.succeeded, vec!["s-1".to_string(), "s-3".to_string()]);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].0, "s-2");
    assert_eq!(outcome.failed[0].1.kind(), ErrorKind::ResourceNotFound);
}

#[tokio::test]
async fn test_delete_empty_id() {
    let server = MockServer::start().await;
    common::mount_identity(&server, SERVICES, 1).await;

    let cloud = common::cloud(&server);
    let compute = cloud.compute().await.unwrap();
    let err = compute.delete_server("").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_get_flavor_by_name() {
    let server = MockServer::start().await;
    common::mount_identity(&server, SERVICES, 1).await;
    Mock::given(method("GET"))
        .and(path("/compute/v2.1/flavors/m1.small"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/compute/v2.1/flavors/detail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "flavors": [
                {"id": "1", "name": "m1.tiny", "vcpus": 1, "ram": 512, "disk": 1},
                {"id": "2", "name": "m1.small", "vcpus": 1, "ram": 2048, "disk": 20,
                 "os-flavor-access:is_public": false}
            ]
        })))
        .mount(&server)
        .await;

    let cloud = common::cloud(&server);
    let compute = cloud.compute().await.unwrap();
    let flavor = compute.get_flavor("m1.small").await.unwrap();
    assert_eq!(flavor.id, "2");
    assert_eq!(flavor.ram, 2048);
    assert!(!flavor.is_public);
}

#[tokio::test]
async fn test_generic_resource_client() {
    let server = MockServer::start().await;
    common::mount_identity(&server, SERVICES, 1).await;
    Mock::given(method("GET"))
        .and(path("/compute/v2.1/os-keypairs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"keypairs": []})))
        .expect(1)
        .mount(&server)
        .await;

    let session = common::session(&server, &[]);
    let client = osclient::ResourceClient::new(session, "compute").await.unwrap();
    let value: serde_json::Value = client.list("os-keypairs", &Query::new()).await.unwrap();
    assert_eq!(value, json!({"keypairs": []}));
}
