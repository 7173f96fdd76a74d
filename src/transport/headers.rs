use crate::constants::{AJAX_HEADER_KEY, APP_ID_HEADER_KEY, CSRF_HEADER_KEY, WEB_APP_ID};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

/// Mobile user agents the client presents. One is picked per account and
/// never changes, so repeated runs show the vendor a stable fingerprint.
const USER_AGENT_POOL: [&str; 4] = [
    "Mozilla/5.0 (iPhone; CPU iPhone OS 9_1 like Mac OS X) AppleWebKit/601.1.46 (KHTML, like Gecko) Version/9.0 Mobile/13B143 Safari/601.1",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 12_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/12.1.2 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 9; SM-G960F) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.157 Mobile Safari/537.36",
    "Mozilla/5.0 (iPad; CPU OS 12_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148",
];

/// Deterministic per-account user agent: the username digest indexes the
/// pool, so the same account always presents the same string.
pub(crate) fn user_agent_for(username: &str) -> &'static str {
    let digest = md5::compute(username.as_bytes());
    USER_AGENT_POOL[digest.0[0] as usize % USER_AGENT_POOL.len()]
}

/// Header set attached to every dispatched request. The CSRF header is
/// omitted while the token is still unknown (the anonymous bootstrap GET).
pub(crate) fn base_headers(
    base_url: &str,
    user_agent: &str,
    language: &str,
    csrf_token: &str,
    cookie_header: &str,
) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, "user-agent", user_agent);
    insert(&mut headers, "accept-language", language);
    insert(&mut headers, "referer", base_url);
    insert(&mut headers, AJAX_HEADER_KEY, "1");
    insert(&mut headers, APP_ID_HEADER_KEY, WEB_APP_ID);
    if !csrf_token.is_empty() {
        insert(&mut headers, CSRF_HEADER_KEY, csrf_token);
    }
    if !cookie_header.is_empty() {
        insert(&mut headers, "cookie", cookie_header);
    }
    headers
}

fn insert(headers: &mut HeaderMap, key: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(HeaderName::from_static(key), v);
        }
        Err(_) => debug!("Dropping header {key}: value not representable"),
    }
}
