use crate::config::Config;
use crate::constants::{LOGIN_PATH, LOGOUT_PATH, ROOT_PATH};
use crate::error::{AuthError, HttpError};
use crate::presentation::password::encode_password;
use crate::session::challenge::ChallengeNegotiator;
use crate::session::cookies::{CookieJar, StoredCookie};
use crate::session::login_response::LoginResponse;
use crate::transport::headers::user_agent_for;
use crate::transport::http_client::{InstagramHttpClient, RequestDispatcher};
use crate::transport::model::ApiRequest;
use crate::transport::signature::{first_match, CSRF_BODY_EXTRACTORS};
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Shared state of one logged-in (or logging-in) client. Ordinary requests
/// only read the jar and token, so an authenticated context can serve
/// concurrent dispatches; the signature seed cache has its own async lock
/// for the refresh path.
#[derive(Debug)]
pub struct SessionContext {
    jar: RwLock<CookieJar>,
    csrf_token: RwLock<String>,
    pub(crate) signature_seed: Mutex<Option<String>>,
    user_agent: &'static str,
    language: String,
}

impl SessionContext {
    pub(crate) fn anonymous(username: &str, language: &str) -> Self {
        Self {
            jar: RwLock::new(CookieJar::new()),
            csrf_token: RwLock::new(String::new()),
            signature_seed: Mutex::new(None),
            user_agent: user_agent_for(username),
            language: language.to_string(),
        }
    }

    pub(crate) fn from_jar(
        jar: CookieJar,
        username: &str,
        language: &str,
    ) -> Result<Self, AuthError> {
        let csrf = jar
            .csrf_token()
            .ok_or(AuthError::MissingCsrfCookie)?
            .to_string();
        Ok(Self {
            jar: RwLock::new(jar),
            csrf_token: RwLock::new(csrf),
            signature_seed: Mutex::new(None),
            user_agent: user_agent_for(username),
            language: language.to_string(),
        })
    }

    pub fn csrf_token(&self) -> String {
        self.csrf_token.read().unwrap().clone()
    }

    pub(crate) fn set_csrf_token(&self, token: &str) {
        *self.csrf_token.write().unwrap() = token.to_string();
    }

    pub(crate) fn cookie_header(&self) -> String {
        self.jar.read().unwrap().header_value()
    }

    pub(crate) fn ingest_set_cookies<'a>(&self, values: impl Iterator<Item = &'a str>) {
        let mut jar = self.jar.write().unwrap();
        for value in values {
            jar.ingest_set_cookie(value);
        }
    }

    pub(crate) fn jar_csrf(&self) -> Option<String> {
        self.jar.read().unwrap().csrf_token().map(str::to_string)
    }

    pub fn is_authenticated(&self) -> bool {
        self.jar.read().unwrap().has_session_cookie()
    }

    /// Stable snapshot of the jar for persistence; feeding it back through
    /// [`SessionManager::restore_session`] reproduces this context.
    pub fn cookie_snapshot(&self) -> Vec<StoredCookie> {
        self.jar.read().unwrap().cookies().to_vec()
    }

    pub(crate) fn user_agent(&self) -> &str {
        self.user_agent
    }

    pub(crate) fn language(&self) -> &str {
        &self.language
    }
}

/// Owns credentials and produces authenticated [`SessionContext`]s.
///
/// `authenticate` mutates shared session state (jar, CSRF token) and is
/// serialized per manager instance; requests against a returned context
/// may run in parallel.
#[derive(Debug)]
pub struct SessionManager {
    config: Config,
    client: Arc<InstagramHttpClient>,
    auth_lock: Mutex<()>,
    pending_challenge: StdMutex<Option<Arc<SessionContext>>>,
}

impl SessionManager {
    pub fn new(config: Config) -> Result<Self, HttpError> {
        let client = Arc::new(InstagramHttpClient::new(&config)?);
        Ok(Self::from_parts(config, client))
    }

    pub fn from_parts(config: Config, client: Arc<InstagramHttpClient>) -> Self {
        Self {
            config,
            client,
            auth_lock: Mutex::new(()),
            pending_challenge: StdMutex::new(None),
        }
    }

    pub fn client(&self) -> Arc<InstagramHttpClient> {
        Arc::clone(&self.client)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Full login: seed an anonymous CSRF token, post credentials, then
    /// rebuild the token from the authenticated cookies.
    #[instrument(skip(self))]
    pub async fn authenticate(&self) -> Result<Arc<SessionContext>, AuthError> {
        let _serialized = self.auth_lock.lock().await;

        let username = self.config.credentials.username.clone();
        let context = Arc::new(SessionContext::anonymous(
            &username,
            &self.config.client.language,
        ));

        // Anonymous bootstrap; the vendor has served the token both as a
        // cookie and inside the page body, so both locations are checked.
        let root = self
            .client
            .execute(&context, ApiRequest::get(ROOT_PATH))
            .await?;
        let anonymous_token = context
            .jar_csrf()
            .or_else(|| first_match(CSRF_BODY_EXTRACTORS, root.text()))
            .ok_or(AuthError::MissingCsrfCookie)?;
        context.set_csrf_token(&anonymous_token);
        debug!("Anonymous csrf token seeded");

        let password = encode_password(
            &self.config.credentials.password,
            self.config.client.password_format,
        );
        let login_request = ApiRequest::post(LOGIN_PATH).with_form(vec![
            ("username".to_string(), username),
            ("password".to_string(), password),
        ]);
        let response = self.client.execute(&context, login_request).await?;
        let login: LoginResponse = response.json()?;

        if login.is_checkpoint() {
            let challenge_url = login
                .checkpoint_url
                .unwrap_or_else(|| "/challenge/".to_string());
            warn!("Login parked behind checkpoint: {challenge_url}");
            *self.pending_challenge.lock().unwrap() = Some(Arc::clone(&context));
            return Err(AuthError::ChallengeRequired(challenge_url));
        }

        self.finalize_login(&context)?;
        debug!("Authentication successful");
        Ok(context)
    }

    /// Shared tail of login and challenge resolution: the session cookie
    /// must exist and the authenticated CSRF token replaces the anonymous one.
    pub(crate) fn finalize_login(&self, context: &SessionContext) -> Result<(), AuthError> {
        if !context.is_authenticated() {
            return Err(AuthError::InvalidCredentials);
        }
        let token = context.jar_csrf().ok_or(AuthError::MissingCsrfCookie)?;
        context.set_csrf_token(&token);
        Ok(())
    }

    /// Rebuilds a context from a persisted cookie snapshot. No network
    /// call; fails if the snapshot carries no CSRF cookie.
    pub fn restore_session(
        &self,
        cookies: Vec<StoredCookie>,
    ) -> Result<Arc<SessionContext>, AuthError> {
        let jar = CookieJar::from_cookies(cookies);
        let context = SessionContext::from_jar(
            jar,
            &self.config.credentials.username,
            &self.config.client.language,
        )?;
        Ok(Arc::new(context))
    }

    /// Negotiator for the checkpoint raised by the last `authenticate`
    /// call. Reuses that attempt's cookies when available so the vendor
    /// sees one continuous flow.
    pub fn challenge_negotiator(&self) -> ChallengeNegotiator {
        let context = self.pending_challenge.lock().unwrap().take().unwrap_or_else(|| {
            Arc::new(SessionContext::anonymous(
                &self.config.credentials.username,
                &self.config.client.language,
            ))
        });
        ChallengeNegotiator::new(Arc::clone(&self.client), context)
    }

    #[instrument(skip(self, context))]
    pub async fn logout(&self, context: &SessionContext) -> Result<(), HttpError> {
        self.client
            .execute(context, ApiRequest::get(LOGOUT_PATH))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests_session_manager {
    use super::*;
    use crate::utils::logger::setup_logger;
    use mockito::{Matcher, Server};

    fn test_config(server_url: &str) -> Config {
        let mut config = Config::with_credentials("test_user", "test_password");
        config.rest_api.base_url = server_url.to_string();
        config
    }

    fn mock_root(server: &mut Server) -> mockito::Mock {
        server
            .mock("GET", "/")
            .with_status(200)
            .with_header("set-cookie", "csrftoken=anon-token; Path=/")
            .with_body(r#"<html>{"rollout_hash":"seed-1"}</html>"#)
            .create()
    }

    #[tokio::test]
    async fn test_authenticate_success_rotates_csrf() {
        setup_logger();
        let mut server = Server::new_async().await;
        let root = mock_root(&mut server);
        let login = server
            .mock("POST", "/accounts/login/ajax/")
            .match_header("x-csrftoken", "anon-token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("username".into(), "test_user".into()),
                Matcher::Regex("password=".to_string()),
            ]))
            .with_status(200)
            .with_header("set-cookie", "csrftoken=auth-token; Path=/")
            .with_header("set-cookie", "sessionid=session-1; Path=/")
            .with_body(r#"{"authenticated":true,"user":true,"userId":"1","status":"ok"}"#)
            .create();

        let manager = SessionManager::new(test_config(&server.url())).unwrap();
        let context = manager.authenticate().await.unwrap();

        assert_eq!(context.csrf_token(), "auth-token");
        assert_ne!(context.csrf_token(), "anon-token");
        assert!(context.is_authenticated());

        root.assert();
        login.assert();
    }

    #[tokio::test]
    async fn test_authenticate_invalid_credentials() {
        setup_logger();
        let mut server = Server::new_async().await;
        let _root = mock_root(&mut server);
        let _login = server
            .mock("POST", "/accounts/login/ajax/")
            .with_status(200)
            .with_body(r#"{"authenticated":false,"user":true,"status":"ok"}"#)
            .create();

        let manager = SessionManager::new(test_config(&server.url())).unwrap();
        let result = manager.authenticate().await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_checkpoint_required() {
        setup_logger();
        let mut server = Server::new_async().await;
        let _root = mock_root(&mut server);
        let _login = server
            .mock("POST", "/accounts/login/ajax/")
            .with_status(400)
            .with_body(
                r#"{"message":"checkpoint_required","checkpoint_url":"/challenge/1/abc/","status":"fail"}"#,
            )
            .create();

        let manager = SessionManager::new(test_config(&server.url())).unwrap();
        let result = manager.authenticate().await;

        match result {
            Err(AuthError::ChallengeRequired(url)) => assert_eq!(url, "/challenge/1/abc/"),
            other => panic!("expected ChallengeRequired, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_authenticate_csrf_from_body_fallback() {
        setup_logger();
        let mut server = Server::new_async().await;
        // No csrf cookie on the root response; the token only appears in
        // the embedded config blob.
        let _root = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"{"config":{"viewer":null,"csrf_token":"body-token"}}"#)
            .create();
        let login = server
            .mock("POST", "/accounts/login/ajax/")
            .match_header("x-csrftoken", "body-token")
            .with_status(200)
            .with_header("set-cookie", "csrftoken=auth-token; Path=/")
            .with_header("set-cookie", "sessionid=session-1; Path=/")
            .with_body(r#"{"authenticated":true,"status":"ok"}"#)
            .create();

        let manager = SessionManager::new(test_config(&server.url())).unwrap();
        let context = manager.authenticate().await.unwrap();
        assert_eq!(context.csrf_token(), "auth-token");
        login.assert();
    }

    #[tokio::test]
    async fn test_restore_session_is_idempotent() {
        setup_logger();
        let server = Server::new_async().await;
        let manager = SessionManager::new(test_config(&server.url())).unwrap();

        let cookies = vec![
            StoredCookie {
                key: "csrftoken".to_string(),
                value: "restored-token".to_string(),
                domain: Some("instagram.com".to_string()),
                path: Some("/".to_string()),
                expires: None,
            },
            StoredCookie {
                key: "sessionid".to_string(),
                value: "restored-session".to_string(),
                domain: None,
                path: None,
                expires: None,
            },
        ];

        let first = manager.restore_session(cookies.clone()).unwrap();
        let second = manager.restore_session(cookies).unwrap();

        assert_eq!(first.csrf_token(), second.csrf_token());
        assert_eq!(first.cookie_snapshot(), second.cookie_snapshot());
        assert!(first.is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_session_without_csrf_cookie() {
        setup_logger();
        let server = Server::new_async().await;
        let manager = SessionManager::new(test_config(&server.url())).unwrap();

        let result = manager.restore_session(vec![StoredCookie {
            key: "sessionid".to_string(),
            value: "s".to_string(),
            domain: None,
            path: None,
            expires: None,
        }]);

        assert!(matches!(result, Err(AuthError::MissingCsrfCookie)));
    }

    #[tokio::test]
    async fn test_snapshot_restore_round_trip() {
        setup_logger();
        let mut server = Server::new_async().await;
        let _root = mock_root(&mut server);
        let _login = server
            .mock("POST", "/accounts/login/ajax/")
            .with_status(200)
            .with_header("set-cookie", "csrftoken=auth-token; Path=/")
            .with_header("set-cookie", "sessionid=session-1; Path=/")
            .with_body(r#"{"authenticated":true,"status":"ok"}"#)
            .create();

        let manager = SessionManager::new(test_config(&server.url())).unwrap();
        let context = manager.authenticate().await.unwrap();

        let snapshot = context.cookie_snapshot();
        let restored = manager.restore_session(snapshot.clone()).unwrap();

        assert_eq!(restored.cookie_snapshot(), snapshot);
        assert_eq!(restored.csrf_token(), context.csrf_token());
    }

    #[tokio::test]
    async fn test_logout() {
        setup_logger();
        let mut server = Server::new_async().await;
        let logout = server
            .mock("GET", "/accounts/logout/ajax/")
            .with_status(200)
            .with_body(r#"{"status":"ok"}"#)
            .create();

        let manager = SessionManager::new(test_config(&server.url())).unwrap();
        let context = manager
            .restore_session(vec![StoredCookie {
                key: "csrftoken".to_string(),
                value: "t".to_string(),
                domain: None,
                path: None,
                expires: None,
            }])
            .unwrap();

        manager.logout(&context).await.unwrap();
        logout.assert();
    }
}
