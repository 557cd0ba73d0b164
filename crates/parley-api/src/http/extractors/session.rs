//! Session cookie extractor.
//!
//! The client is identified by one opaque `parley_session` cookie holding a
//! v4 token. The token keys the server-side [`SessionBindings`] map; it
//! carries no other meaning and is minted fresh when absent or unparseable.
//! Handlers that mint a token set the cookie on their response via
//! [`ClientSession::set_cookie`].
//!
//! [`SessionBindings`]: parley_core::chat::SessionBindings

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "parley_session";

/// The caller's session token, extracted from the request cookie or minted.
#[derive(Debug, Clone, Copy)]
pub struct ClientSession {
    pub token: Uuid,
    /// Whether the token was minted for this request (cookie must be set).
    pub is_new: bool,
}

impl ClientSession {
    /// Parse the session cookie out of the request headers, minting a fresh
    /// token if the cookie is missing or not a UUID.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let token = headers
            .get(COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_session_cookie);

        match token {
            Some(token) => Self {
                token,
                is_new: false,
            },
            None => Self {
                token: Uuid::new_v4(),
                is_new: true,
            },
        }
    }

    /// Add the `Set-Cookie` header to `headers` if the token is new.
    pub fn set_cookie(&self, headers: &mut HeaderMap) {
        if !self.is_new {
            return;
        }
        let cookie = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.token
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.insert(SET_COOKIE, value);
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientSession::from_headers(&parts.headers))
    }
}

/// Find the session token in a `Cookie` header value.
fn parse_session_cookie(header: &str) -> Option<Uuid> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE {
            value.parse().ok()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_cookie_mints_token() {
        let session = ClientSession::from_headers(&HeaderMap::new());
        assert!(session.is_new);
    }

    #[test]
    fn test_existing_cookie_is_reused() {
        let token = Uuid::new_v4();
        let headers = headers_with_cookie(&format!("{SESSION_COOKIE}={token}"));

        let session = ClientSession::from_headers(&headers);
        assert!(!session.is_new);
        assert_eq!(session.token, token);
    }

    #[test]
    fn test_cookie_found_among_others() {
        let token = Uuid::new_v4();
        let headers =
            headers_with_cookie(&format!("theme=dark; {SESSION_COOKIE}={token}; lang=en"));

        let session = ClientSession::from_headers(&headers);
        assert_eq!(session.token, token);
    }

    #[test]
    fn test_garbage_cookie_mints_token() {
        let headers = headers_with_cookie(&format!("{SESSION_COOKIE}=not-a-uuid"));
        let session = ClientSession::from_headers(&headers);
        assert!(session.is_new);
    }

    #[test]
    fn test_set_cookie_only_when_new() {
        let mut headers = HeaderMap::new();
        let existing = ClientSession {
            token: Uuid::new_v4(),
            is_new: false,
        };
        existing.set_cookie(&mut headers);
        assert!(headers.get(SET_COOKIE).is_none());

        let minted = ClientSession {
            token: Uuid::new_v4(),
            is_new: true,
        };
        minted.set_cookie(&mut headers);
        let value = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(value.starts_with(SESSION_COOKIE));
        assert!(value.contains("HttpOnly"));
    }
}
