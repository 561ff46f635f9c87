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

//! HTTP transport: sending requests and classifying responses.

use log::{debug, trace};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::{Error, ErrorKind, Result};

/// A thin wrapper around an HTTP client.
///
/// Transport-level success means that a response was received, not that the request
/// succeeded: use [RawResponse::check](struct.RawResponse.html#method.check) for that.
#[derive(Debug, Clone, Default)]
pub struct Transport {
    client: Client,
}

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Transport {
    /// Create a transport with a default HTTP client.
    #[inline]
    pub fn new() -> Transport {
        Transport::with_client(Client::new())
    }

    /// Create a transport using the provided HTTP client.
    #[inline]
    pub fn with_client(client: Client) -> Transport {
        Transport { client }
    }

    /// Underlying HTTP client.
    #[inline]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Start building a request.
    #[inline]
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send a request and read the whole response body.
    pub async fn send(&self, request: RequestBuilder) -> Result<RawResponse> {
        let resp = request.send().await?;
        let url = resp.url().clone();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?.to_vec();
        debug!("Received HTTP {} from {}", status, url);
        trace!("Response body from {}: {} byte(s)", url, body.len());
        Ok(RawResponse {
            url,
            status,
            headers,
            body,
        })
    }
}

impl RawResponse {
    /// URL the response came from.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP status.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw response body.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Response body as text (lossy).
    #[inline]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Turn a response with status 400 or higher into an error.
    ///
    /// The error keeps the status and carries the raw body as its message.
    pub fn check(self) -> Result<RawResponse> {
        if self.status.is_client_error() || self.status.is_server_error() {
            debug!(
                "Request to {} failed with HTTP {}: {}",
                self.url,
                self.status,
                self.text()
            );
            Err(Error::from_status(self.status, Some(self.text())))
        } else {
            Ok(self)
        }
    }

    /// Decode the JSON body.
    ///
    /// Unknown fields are ignored.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            Error::new(
                ErrorKind::InvalidResponse,
                format!("Cannot decode response from {}: {}", self.url, e),
            )
        })
    }
}
