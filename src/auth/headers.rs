//! Header assembly for authenticated API calls
//!
//! Derives the CSRF token from the cookie jar and installs the
//! authorization, guest-token, and cookie headers every outbound call
//! needs, along with the fixed browser-identification headers the
//! platform expects. Installation is idempotent: headers are inserted,
//! not appended, so repeated calls only overwrite.
//!
//! CSRF tokens can be rotated by the platform within a login flow, so
//! callers must re-install headers from the current jar before every
//! request rather than caching an assembled set.

use crate::session::Session;
use crate::{Error, Result};
use reqwest::header::{AUTHORIZATION, COOKIE, HeaderMap, HeaderName, HeaderValue};

/// Name of the session cookie the CSRF header is derived from
pub const CSRF_COOKIE: &str = "ct0";

/// CSRF header echoed back on mutating requests
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Guest token header for pre-login calls
pub const GUEST_TOKEN_HEADER: &str = "x-guest-token";

/// Fixed browser-identification headers sent on every call
const BROWSER_HEADERS: [(&str, &str); 4] = [
    ("x-twitter-active-user", "yes"),
    ("x-twitter-auth-type", "OAuth2Session"),
    ("x-twitter-client-language", "en"),
    ("accept-language", "en-US,en;q=0.9"),
];

/// Install authorization, cookie, CSRF, and browser headers from the
/// current session state
pub fn install(session: &Session, headers: &mut HeaderMap) -> Result<()> {
    let bearer = format!("Bearer {}", session.bearer_token());
    headers.insert(AUTHORIZATION, parse_value(&bearer)?);

    if let Some(guest_token) = &session.guest_token {
        headers.insert(
            HeaderName::from_static(GUEST_TOKEN_HEADER),
            parse_value(guest_token)?,
        );
    }

    if !session.cookies.is_empty() {
        headers.insert(COOKIE, parse_value(&session.cookies.header_value())?);
    }

    if let Some(csrf) = session.cookies.get(CSRF_COOKIE) {
        headers.insert(HeaderName::from_static(CSRF_HEADER), parse_value(csrf)?);
    }

    for (name, value) in BROWSER_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    Ok(())
}

fn parse_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::session(format!("Invalid header value: {}", e)))
}
