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

//! Various utilities.

use std::fmt::Display;

use reqwest::Url;

use super::{Error, ErrorKind, Result};

/// Query keys accepted for every collection.
pub const COMMON_QUERY_KEYS: &[&str] = &["limit", "marker", "sort_key", "sort_dir"];

/// Query parameters for listing resources.
///
/// Parameters with empty values are omitted, so an empty filter matches anything.
/// If created with [with_keys](#method.with_keys), only the given keys (and
/// [COMMON_QUERY_KEYS](constant.COMMON_QUERY_KEYS.html)) are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    known: Option<&'static [&'static str]>,
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Create a query accepting any keys.
    #[inline]
    pub fn new() -> Query {
        Query::default()
    }

    /// Create a query accepting only the given keys.
    #[inline]
    pub fn with_keys(known: &'static [&'static str]) -> Query {
        Query {
            known: Some(known),
            pairs: Vec::new(),
        }
    }

    /// Add a parameter, skipping empty values.
    pub fn push<K: Into<String>, V: Display>(&mut self, key: K, value: V) {
        let value = value.to_string();
        if !value.is_empty() {
            self.pairs.push((key.into(), value));
        }
    }

    /// Add a parameter if it is present.
    #[inline]
    pub fn push_opt<K: Into<String>, V: Display>(&mut self, key: K, value: Option<V>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// Add a parameter, skipping empty values.
    #[inline]
    pub fn with<K: Into<String>, V: Display>(mut self, key: K, value: V) -> Query {
        self.push(key, value);
        self
    }

    /// Whether the query has no parameters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Whether a parameter with the given key is set.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Validated parameters.
    pub fn pairs(&self) -> Result<&[(String, String)]> {
        if let Some(known) = self.known {
            if let Some((key, _)) = self
                .pairs
                .iter()
                .find(|(k, _)| !known.contains(&k.as_str()) && !COMMON_QUERY_KEYS.contains(&k.as_str()))
            {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("Unsupported query parameter {}", key),
                ));
            }
        }
        Ok(&self.pairs)
    }
}

/// Build a URL by appending path segments to a base URL.
pub(crate) fn extend_url(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| Error::new(ErrorKind::InvalidInput, format!("Invalid URL {}: {}", base, e)))?;
    let _ = url
        .path_segments_mut()
        .map_err(|_| Error::new(ErrorKind::InvalidInput, format!("Cannot extend URL {}", base)))?
        .pop_if_empty()
        .extend(segments.iter().filter(|s| !s.is_empty()));
    Ok(url)
}

/// Append a version suffix to an endpoint unless it already ends with it.
pub(crate) fn with_version(endpoint: String, version: Option<&str>) -> String {
    match version {
        Some(v) if !endpoint.ends_with(&format!("/{}", v)) => format!("{}/{}", endpoint, v),
        _ => endpoint,
    }
}

/// Get one and only one item from a list.
#[cfg_attr(
    not(any(
        feature = "block-storage",
        feature = "compute",
        feature = "image",
        feature = "network"
    )),
    allow(dead_code)
)]
pub(crate) fn one<T, S1, S2>(
    collection: Vec<T>,
    not_found_msg: S1,
    too_many_msg: S2,
) -> Result<T>
where
    S1: Into<String>,
    S2: Into<String>,
{
    let mut iter = collection.into_iter();
    match (iter.next(), iter.next()) {
        (Some(item), None) => Ok(item),
        (None, _) => Err(Error::new(ErrorKind::ResourceNotFound, not_found_msg)),
        (Some(_), Some(_)) => Err(Error::new(ErrorKind::TooManyItems, too_many_msg)),
    }
}

#[cfg(test)]
pub mod test {
    use super::{extend_url, one, with_version, Query};
    use crate::ErrorKind;

    const SERVER_KEYS: &[&str] = &["name", "status"];

    #[test]
    fn test_query_omits_empty() {
        let mut q = Query::new().with("name", "").with("status", "ACTIVE");
        q.push_opt("host", None::<String>);
        q.push_opt("limit", Some(10));
        assert_eq!(
            q.pairs().unwrap(),
            &[
                (String::from("status"), String::from("ACTIVE")),
                (String::from("limit"), String::from("10")),
            ]
        );
        assert!(q.contains_key("limit"));
        assert!(!q.contains_key("name"));
    }

    #[test]
    fn test_query_known_keys() {
        let q = Query::with_keys(SERVER_KEYS)
            .with("name", "vm1")
            .with("marker", "abcd");
        assert_eq!(q.pairs().unwrap().len(), 2);

        let q = Query::with_keys(SERVER_KEYS).with("flavor", "m1.small");
        let err = q.pairs().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("flavor"));

        let q = Query::with_keys(SERVER_KEYS).with("flavor", "");
        assert!(q.pairs().unwrap().is_empty());
    }

    #[test]
    fn test_extend_url() {
        let url = extend_url("http://127.0.0.1/v2.1", &["servers", "detail"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1/v2.1/servers/detail");

        let url = extend_url("http://127.0.0.1/v2.1/", &["servers", "", "detail"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1/v2.1/servers/detail");

        let url = extend_url("http://127.0.0.1/v2.1", &["servers", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1/v2.1/servers/a%2Fb");

        let url = extend_url("http://127.0.0.1:8774", &["servers", "a b"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8774/servers/a%20b");

        assert!(extend_url("not a url", &["servers"]).is_err());
    }

    #[test]
    fn test_with_version() {
        assert_eq!(
            with_version(String::from("http://n:9696"), Some("v2.0")),
            "http://n:9696/v2.0"
        );
        assert_eq!(
            with_version(String::from("http://n:9696/v2.0"), Some("v2.0")),
            "http://n:9696/v2.0"
        );
        assert_eq!(with_version(String::from("http://c/v2.1"), None), "http://c/v2.1");
    }

    #[test]
    fn test_one() {
        assert_eq!(one(vec![1], "none", "many").unwrap(), 1);
        assert_eq!(
            one(Vec::<u8>::new(), "none", "many").unwrap_err().kind(),
            ErrorKind::ResourceNotFound
        );
        assert_eq!(
            one(vec![1, 2], "none", "many").unwrap_err().kind(),
            ErrorKind::TooManyItems
        );
    }
}
