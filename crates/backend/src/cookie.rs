//! The session cookie cell.

use reqwest::header::{HeaderMap, SET_COOKIE};
use std::sync::{Mutex, PoisonError};

/// Holds the cookie replayed on every backend request.
///
/// Whenever a response carries `set-cookie`, the whole cookie is replaced
/// by the `name=value` parts of those headers, joined with `;`.
#[derive(Debug, Default)]
pub struct SessionCookie(Mutex<Option<String>>);

impl SessionCookie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set(&self, cookie: impl Into<String>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(cookie.into());
    }

    /// Replace the cookie from a response's `set-cookie` headers.
    ///
    /// Returns whether anything was stored.
    pub fn update_from(&self, headers: &HeaderMap) -> bool {
        let parts: Vec<&str> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .collect();

        if parts.is_empty() {
            return false;
        }
        self.set(parts.join(";"));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn starts_empty() {
        assert!(SessionCookie::new().get().is_none());
    }

    #[test]
    fn joins_name_value_pairs_and_drops_attributes() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("PHPSESSID=abc; path=/; HttpOnly"));
        headers.append(SET_COOKIE, HeaderValue::from_static("lang=fr; Secure"));

        let cookie = SessionCookie::new();
        assert!(cookie.update_from(&headers));
        assert_eq!(cookie.get().as_deref(), Some("PHPSESSID=abc;lang=fr"));
    }

    #[test]
    fn later_set_cookie_replaces_everything() {
        let cookie = SessionCookie::new();
        cookie.set("PHPSESSID=old;lang=fr");

        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("PHPSESSID=new; path=/"));
        cookie.update_from(&headers);
        assert_eq!(cookie.get().as_deref(), Some("PHPSESSID=new"));
    }

    #[test]
    fn responses_without_set_cookie_leave_it_alone() {
        let cookie = SessionCookie::new();
        cookie.set("PHPSESSID=abc");
        assert!(!cookie.update_from(&HeaderMap::new()));
        assert_eq!(cookie.get().as_deref(), Some("PHPSESSID=abc"));
    }
}
