use crate::config::PasswordFormat;
use chrono::Utc;

/// Prefix the vendor's web login expects on wrapped password submissions.
const WRAPPER_TAG: &str = "#PWD_INSTAGRAM_BROWSER";
const WRAPPER_VERSION: u8 = 0;

/// Encodes a password for the login form. `Wrapped` produces the vendor's
/// timestamped wrapper value; `Plain` passes the password through untouched.
/// The wrapper is a vendor quirk, not a security control.
pub fn encode_password(password: &str, format: PasswordFormat) -> String {
    match format {
        PasswordFormat::Plain => password.to_string(),
        PasswordFormat::Wrapped => wrap_password(password, Utc::now().timestamp()),
    }
}

fn wrap_password(password: &str, timestamp: i64) -> String {
    format!("{WRAPPER_TAG}:{WRAPPER_VERSION}:{timestamp}:{password}")
}

#[cfg(test)]
mod tests_password {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_passthrough() {
        assert_eq!(
            encode_password("hunter2", PasswordFormat::Plain),
            "hunter2"
        );
    }

    #[test]
    fn test_wrapped_layout() {
        let wrapped = wrap_password("hunter2", 1700000000);
        assert_eq!(wrapped, "#PWD_INSTAGRAM_BROWSER:0:1700000000:hunter2");
    }

    #[test]
    fn test_wrapped_keeps_colons_in_password() {
        let wrapped = wrap_password("a:b:c", 1700000000);
        let mut parts = wrapped.splitn(4, ':');
        assert_eq!(parts.next(), Some("#PWD_INSTAGRAM_BROWSER"));
        assert_eq!(parts.next(), Some("0"));
        assert_eq!(parts.next(), Some("1700000000"));
        assert_eq!(parts.next(), Some("a:b:c"));
    }
}
