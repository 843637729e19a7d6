//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use url::form_urlencoded;

/// An incoming HTTP request after routing.
pub struct Request {
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(
        uri: &http::Uri,
        headers: &http::HeaderMap,
        body: Bytes,
        params: HashMap<String, String>,
    ) -> Self {
        let query = uri
            .query()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        // Non-UTF-8 header values are not addressable by name; drop them.
        let headers = headers
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
            .collect();
        Self { path: uri.path().to_owned(), query, headers, body, params }
    }

    pub fn path(&self) -> &str { &self.path }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter, percent-decoded.
    ///
    /// For a route `/dishes/details/{id}`, `req.param("id")` on
    /// `/dishes/details/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a query-string value, form-decoded.
    ///
    /// When a key repeats, the first occurrence wins. An absent key is
    /// `None`, which is distinct from a present but empty value.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
