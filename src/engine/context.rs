//! Per-request rewrite context.
//!
//! Owned exclusively by the task handling one request. Conditions read from
//! it, actions write to it, and the hosting middleware applies whatever is
//! left in it once the pipeline returns.

use axum::http::{HeaderMap, Method, Request, StatusCode};
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Captured groups from the most recent successful pattern match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastMatch {
    groups: Vec<Option<String>>,
    named: HashMap<String, String>,
}

impl LastMatch {
    /// Snapshot numbered and named groups out of a regex match.
    pub fn from_captures(regex: &Regex, caps: &Captures<'_>) -> Self {
        let groups = caps
            .iter()
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();

        let named = regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();

        Self { groups, named }
    }

    /// Numbered group; 0 is the whole match.
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index)?.as_deref()
    }

    pub fn named(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Mutable state for one request passing through the rule pipeline.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    method: Method,
    original_url: String,
    location: String,
    request_headers: HeaderMap,
    status: Option<StatusCode>,
    response_headers: Vec<(String, String)>,
    properties: HashMap<String, String>,
    last_match: Option<LastMatch>,
}

impl RewriteContext {
    /// Create a context for `method` and a request URL (path and query).
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            method,
            location: url.clone(),
            original_url: url,
            request_headers: HeaderMap::new(),
            status: None,
            response_headers: Vec::new(),
            properties: HashMap::new(),
            last_match: None,
        }
    }

    /// Build a context from an incoming request, ignoring its body.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let url = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.uri().path().to_string());

        Self::new(req.method().clone(), url).with_headers(req.headers().clone())
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.request_headers = headers;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The URL the request arrived with.
    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    /// The current (possibly rewritten) URL.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn is_rewritten(&self) -> bool {
        self.location != self.original_url
    }

    /// First value of a request header, if present and valid UTF-8.
    pub fn request_header(&self, name: &str) -> Option<&str> {
        self.request_headers.get(name)?.to_str().ok()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Response headers queued by actions, in the order they were added.
    pub fn response_headers(&self) -> &[(String, String)] {
        &self.response_headers
    }

    pub fn add_response_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.response_headers.push((name.into(), value.into()));
    }

    /// Replace every queued value of `name` with a single value.
    pub fn set_response_header(&mut self, name: &str, value: impl Into<String>) {
        self.response_headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        self.response_headers.push((name.to_string(), value.into()));
    }

    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    pub fn last_match(&self) -> Option<&LastMatch> {
        self.last_match.as_ref()
    }

    pub fn set_last_match(&mut self, last_match: LastMatch) {
        self.last_match = Some(last_match);
    }

    /// Clear captures at a top-level rule boundary.
    pub fn reset_last_match(&mut self) {
        self.last_match = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_request() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("http://example.com/api/items?page=2")
            .header("X-Custom", "custom-value")
            .body(())
            .unwrap();

        let ctx = RewriteContext::from_request(&req);
        assert_eq!(ctx.method(), &Method::POST);
        assert_eq!(ctx.original_url(), "/api/items?page=2");
        assert_eq!(ctx.location(), "/api/items?page=2");
        assert_eq!(ctx.request_header("x-custom"), Some("custom-value"));
        assert!(!ctx.is_rewritten());
    }

    #[test]
    fn test_last_match_groups() {
        let regex = Regex::new(r"^/(?P<section>\w+)/(\d+)$").unwrap();
        let caps = regex.captures("/users/42").unwrap();
        let m = LastMatch::from_captures(&regex, &caps);

        assert_eq!(m.group(0), Some("/users/42"));
        assert_eq!(m.group(1), Some("users"));
        assert_eq!(m.group(2), Some("42"));
        assert_eq!(m.group(3), None);
        assert_eq!(m.named("section"), Some("users"));
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn test_set_response_header_replaces() {
        let mut ctx = RewriteContext::new(Method::GET, "/");
        ctx.add_response_header("X-Trace", "a");
        ctx.add_response_header("location", "/first");
        ctx.set_response_header("Location", "/second");

        assert_eq!(ctx.response_headers().len(), 2);
        assert_eq!(ctx.response_header("LOCATION"), Some("/second"));
        assert_eq!(ctx.response_header("x-trace"), Some("a"));
    }
}
