use crate::constants::{CSRF_COOKIE_KEY, SESSION_COOKIE_KEY};
use chrono::{DateTime, Utc};
use cookie::{Cookie as RawCookie, Expiration};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One cookie as persisted across runs. The snapshot shape
/// (key/value/domain/path/expires) is the stable on-disk contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCookie {
    pub key: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub expires: Option<DateTime<Utc>>,
}

/// Accumulates every cookie the vendor sets over a session's lifetime.
/// Later `Set-Cookie` values replace earlier ones with the same key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<StoredCookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cookies(cookies: Vec<StoredCookie>) -> Self {
        let mut jar = Self::new();
        for cookie in cookies {
            jar.store(cookie);
        }
        jar
    }

    pub fn store(&mut self, cookie: StoredCookie) {
        match self.cookies.iter_mut().find(|c| c.key == cookie.key) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
    }

    /// Parses one `Set-Cookie` header value into the jar. Malformed values
    /// are logged and skipped; the vendor occasionally emits fragments.
    pub fn ingest_set_cookie(&mut self, header_value: &str) {
        match RawCookie::parse(header_value.to_string()) {
            Ok(raw) => {
                let expires = match raw.expires() {
                    Some(Expiration::DateTime(odt)) => {
                        DateTime::<Utc>::from_timestamp(odt.unix_timestamp(), 0)
                    }
                    _ => None,
                };
                self.store(StoredCookie {
                    key: raw.name().to_string(),
                    value: raw.value().to_string(),
                    domain: raw.domain().map(str::to_string),
                    path: raw.path().map(str::to_string),
                    expires,
                });
            }
            Err(e) => warn!("Skipping malformed Set-Cookie value: {e}"),
        }
    }

    pub fn get(&self, key: &str) -> Option<&StoredCookie> {
        self.cookies.iter().find(|c| c.key == key)
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.get(CSRF_COOKIE_KEY).map(|c| c.value.as_str())
    }

    /// True once the vendor has issued a logged-in session cookie.
    pub fn has_session_cookie(&self) -> bool {
        self.get(SESSION_COOKIE_KEY)
            .map(|c| !c.value.is_empty())
            .unwrap_or(false)
    }

    /// Renders the jar as a `Cookie` request header value.
    pub fn header_value(&self) -> String {
        self.cookies
            .iter()
            .map(|c| format!("{}={}", c.key, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn cookies(&self) -> &[StoredCookie] {
        &self.cookies
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}
