use crate::constants::{BASE_URL, DEFAULT_LANGUAGE, DEFAULT_TIMEOUT_SECS};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;
use tracing::error;

#[derive(Debug, Deserialize, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// How the password travels over the login POST. The vendor has alternated
/// between plain submission and a timestamped wrapper across its own
/// revisions, so this stays a switch rather than a constant.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PasswordFormat {
    Plain,
    Wrapped,
}

impl FromStr for PasswordFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(PasswordFormat::Plain),
            "wrapped" => Ok(PasswordFormat::Wrapped),
            other => Err(format!("unknown password format: {other}")),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub rest_api: RestApiConfig,
    pub client: ClientOptions,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RestApiConfig {
    pub base_url: String,
    pub timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientOptions {
    pub language: String,
    pub proxy: Option<String>,
    pub password_format: PasswordFormat,
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"username\":\"{}\",\"password\":\"[REDACTED]\"}}",
            self.username
        )
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"credentials\":{},\"rest_api\":{},\"client\":{}}}",
            self.credentials, self.rest_api, self.client
        )
    }
}

impl fmt::Display for RestApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"base_url\":\"{}\",\"timeout\":{}}}",
            self.base_url, self.timeout
        )
    }
}

impl fmt::Display for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"language\":\"{}\",\"proxy\":{},\"password_format\":\"{:?}\"}}",
            self.language,
            self.proxy
                .as_ref()
                .map_or("null".to_string(), |p| format!("\"{p}\"")),
            self.password_format
        )
    }
}

pub fn get_env_or_default<T: FromStr>(env_var: &str, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    match env::var(env_var) {
        Ok(val) => val.parse::<T>().unwrap_or_else(|_| {
            error!("Failed to parse {}: {}, using default", env_var, val);
            default
        }),
        Err(_) => default,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Config {
            credentials: Credentials {
                username: get_env_or_default("INSTAGRAM_USERNAME", String::from("")),
                password: get_env_or_default("INSTAGRAM_PASSWORD", String::from("")),
            },
            rest_api: RestApiConfig {
                base_url: get_env_or_default("INSTAGRAM_BASE_URL", String::from(BASE_URL)),
                timeout: get_env_or_default("INSTAGRAM_TIMEOUT", DEFAULT_TIMEOUT_SECS),
            },
            client: ClientOptions {
                language: get_env_or_default(
                    "INSTAGRAM_LANGUAGE",
                    String::from(DEFAULT_LANGUAGE),
                ),
                proxy: env::var("INSTAGRAM_PROXY").ok(),
                password_format: get_env_or_default(
                    "INSTAGRAM_PASSWORD_FORMAT",
                    PasswordFormat::Wrapped,
                ),
            },
        }
    }

    /// Convenience for callers that supply credentials directly instead of
    /// through the environment.
    pub fn with_credentials(username: &str, password: &str) -> Self {
        let mut config = Self::new();
        config.credentials.username = username.to_string();
        config.credentials.password = password.to_string();
        config
    }
}


#[cfg(test)]
mod tests_display {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    #[test]
    fn test_credentials_display_redacts_password() {
        let credentials = Credentials {
            username: "user123".to_string(),
            password: "pass123".to_string(),
        };

        let display_output = credentials.to_string();
        let expected_json = json!({
            "username": "user123",
            "password": "[REDACTED]"
        });

        assert_json_eq!(
            serde_json::from_str::<serde_json::Value>(&display_output).unwrap(),
            expected_json
        );
        assert!(!display_output.contains("pass123"));
    }

    #[test]
    fn test_config_display() {
        let config = Config {
            credentials: Credentials {
                username: "user123".to_string(),
                password: "pass123".to_string(),
            },
            rest_api: RestApiConfig {
                base_url: "https://mock.instagram.test".to_string(),
                timeout: 30,
            },
            client: ClientOptions {
                language: "en-US".to_string(),
                proxy: None,
                password_format: PasswordFormat::Wrapped,
            },
        };

        let expected_json = json!({
            "credentials": {
                "username": "user123",
                "password": "[REDACTED]"
            },
            "rest_api": {
                "base_url": "https://mock.instagram.test",
                "timeout": 30
            },
            "client": {
                "language": "en-US",
                "proxy": null,
                "password_format": "Wrapped"
            }
        });

        assert_json_eq!(
            serde_json::from_str::<serde_json::Value>(&config.to_string()).unwrap(),
            expected_json
        );
    }
}
