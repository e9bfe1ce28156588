//! Ordered cookie jar with merge semantics
//!
//! The platform sets tracking cookies on every response, including
//! failures, and rotates the CSRF cookie mid-flow. Refreshing the jar must
//! therefore always be a merge keyed by (name, domain, path), never a
//! replace: concurrent flows would otherwise drop cookies set by another
//! step.

use reqwest::header::{HeaderMap, SET_COOKIE};
use serde::{Deserialize, Serialize};
use url::Url;

/// A single cookie entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Cookie domain
    pub domain: String,
    /// Cookie path
    pub path: String,
}

impl Cookie {
    /// Create a new cookie
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: path.into(),
        }
    }

    fn key_matches(&self, other: &Cookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }
}

/// Ordered set of cookies keyed by (name, domain, path)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    /// Create an empty jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cookies in the jar
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Whether the jar is empty
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Get the value of the first cookie with the given name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    /// Iterate over the cookies in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    /// Consume the jar, yielding its cookies in insertion order
    pub fn into_cookies(self) -> Vec<Cookie> {
        self.cookies
    }

    /// Insert or update a cookie, preserving insertion order on update
    pub fn set(&mut self, cookie: Cookie) {
        match self.cookies.iter_mut().find(|c| c.key_matches(&cookie)) {
            Some(existing) => existing.value = cookie.value,
            None => self.cookies.push(cookie),
        }
    }

    /// Merge another set of cookies into the jar (union by key)
    pub fn merge(&mut self, cookies: impl IntoIterator<Item = Cookie>) {
        for cookie in cookies {
            self.set(cookie);
        }
    }

    /// Merge all `Set-Cookie` headers of a response into the jar
    pub fn merge_from_headers(&mut self, headers: &HeaderMap, url: &Url) {
        for header in headers.get_all(SET_COOKIE) {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            match parse_set_cookie(raw, url) {
                Some(ParsedCookie::Set(cookie)) => self.set(cookie),
                Some(ParsedCookie::Remove(cookie)) => self.remove_exact(&cookie),
                None => {}
            }
        }
    }

    /// Remove every cookie with one of the given names, regardless of
    /// domain and path
    pub fn clear_names(&mut self, names: &[&str]) {
        self.cookies.retain(|c| !names.contains(&c.name.as_str()));
    }

    /// Serialize the jar into a `Cookie` header value
    pub fn header_value(&self) -> String {
        self.cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn remove_exact(&mut self, cookie: &Cookie) {
        self.cookies.retain(|c| !c.key_matches(cookie));
    }
}

enum ParsedCookie {
    Set(Cookie),
    Remove(Cookie),
}

/// Parse a single `Set-Cookie` header value
fn parse_set_cookie(raw: &str, url: &Url) -> Option<ParsedCookie> {
    let mut parts = raw.split(';').map(str::trim);

    let pair = parts.next()?;
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let value = value.trim().trim_matches('"');

    let mut domain = url.host_str().unwrap_or_default().to_string();
    let mut path = "/".to_string();
    let mut expired = false;

    for attr in parts {
        let (key, attr_value) = match attr.split_once('=') {
            Some((k, v)) => (k.trim().to_ascii_lowercase(), v.trim()),
            None => (attr.trim().to_ascii_lowercase(), ""),
        };
        match key.as_str() {
            "domain" => domain = attr_value.trim_start_matches('.').to_string(),
            "path" => path = attr_value.to_string(),
            "max-age" => {
                if attr_value.parse::<i64>().is_ok_and(|age| age <= 0) {
                    expired = true;
                }
            }
            _ => {}
        }
    }

    let cookie = Cookie::new(name, value, domain, path);
    if expired || value.is_empty() {
        Some(ParsedCookie::Remove(cookie))
    } else {
        Some(ParsedCookie::Set(cookie))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn api_url() -> Url {
        Url::parse("https://api.twitter.com/1.1/guest/activate.json").unwrap()
    }

    fn headers_with(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(SET_COOKIE, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_parse_and_merge_set_cookie() {
        let mut jar = CookieJar::new();
        jar.merge_from_headers(
            &headers_with(&["guest_id=v1%3A123; Domain=.twitter.com; Path=/; Secure"]),
            &api_url(),
        );

        assert_eq!(jar.get("guest_id"), Some("v1%3A123"));
        let cookie = jar.iter().next().unwrap();
        assert_eq!(cookie.domain, "twitter.com");
        assert_eq!(cookie.path, "/");
    }

    #[test]
    fn test_merge_is_union_not_replace() {
        let mut jar = CookieJar::new();
        jar.merge_from_headers(&headers_with(&["first=1; Path=/"]), &api_url());
        jar.merge_from_headers(&headers_with(&["second=2; Path=/"]), &api_url());

        assert_eq!(jar.len(), 2);
        assert_eq!(jar.get("first"), Some("1"));
        assert_eq!(jar.get("second"), Some("2"));
    }

    #[test]
    fn test_merge_updates_existing_value_in_place() {
        let mut jar = CookieJar::new();
        jar.merge_from_headers(&headers_with(&["ct0=old; Path=/", "lang=en; Path=/"]), &api_url());
        jar.merge_from_headers(&headers_with(&["ct0=rotated; Path=/"]), &api_url());

        assert_eq!(jar.get("ct0"), Some("rotated"));
        // Order preserved: ct0 stays first.
        assert_eq!(jar.iter().next().unwrap().name, "ct0");
        assert_eq!(jar.len(), 2);
    }

    #[test]
    fn test_disjoint_merges_union() {
        let mut jar = CookieJar::new();
        jar.merge([Cookie::new("a", "1", "twitter.com", "/")]);
        jar.merge([Cookie::new("b", "2", "twitter.com", "/")]);

        assert_eq!(jar.len(), 2);
        assert_eq!(jar.get("a"), Some("1"));
        assert_eq!(jar.get("b"), Some("2"));
    }

    #[test]
    fn test_max_age_zero_removes_cookie() {
        let mut jar = CookieJar::new();
        jar.merge_from_headers(&headers_with(&["twid=u%3D1; Path=/"]), &api_url());
        jar.merge_from_headers(&headers_with(&["twid=gone; Path=/; Max-Age=0"]), &api_url());

        assert_eq!(jar.get("twid"), None);
    }

    #[test]
    fn test_clear_names() {
        let mut jar = CookieJar::new();
        jar.merge([
            Cookie::new("ct0", "csrf", "twitter.com", "/"),
            Cookie::new("twid", "u=1", "twitter.com", "/"),
            Cookie::new("guest_id", "v1", "twitter.com", "/"),
        ]);

        jar.clear_names(&["ct0", "twid"]);
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.get("guest_id"), Some("v1"));
    }

    #[test]
    fn test_header_value_serialization() {
        let mut jar = CookieJar::new();
        jar.merge([
            Cookie::new("a", "1", "twitter.com", "/"),
            Cookie::new("b", "2", "twitter.com", "/"),
        ]);

        assert_eq!(jar.header_value(), "a=1; b=2");
    }

    #[test]
    fn test_same_name_different_domain_coexist() {
        let mut jar = CookieJar::new();
        jar.merge([
            Cookie::new("lang", "en", "twitter.com", "/"),
            Cookie::new("lang", "ja", "api.twitter.com", "/"),
        ]);
        assert_eq!(jar.len(), 2);
    }
}
