use crate::config::Config;
use crate::constants::{GIS_HEADER_KEY, ROOT_PATH};
use crate::error::HttpError;
use crate::session::session::SessionContext;
use crate::transport::headers::base_headers;
use crate::transport::model::{ApiRequest, MultipartPart, PartBody};
use crate::transport::signature::{compute_gis, first_match, SEED_EXTRACTORS};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Decoded outcome of one dispatched call. The raw text is kept so callers
/// can extract tokens from non-JSON bodies and keep vendor fragments for
/// diagnostics.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    text: String,
}

impl ApiResponse {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        Ok(serde_json::from_str(&self.text)?)
    }

    pub fn value(&self) -> Result<Value, HttpError> {
        Ok(serde_json::from_str(&self.text)?)
    }
}

/// Issues one logical call using a session context. Implemented by the
/// reqwest-backed client; services stay generic over it so tests can swap
/// the wire.
#[async_trait]
pub trait RequestDispatcher: Send + Sync {
    async fn execute(
        &self,
        context: &SessionContext,
        request: ApiRequest,
    ) -> Result<ApiResponse, HttpError>;
}

/// reqwest-backed dispatcher. Attaches the session cookie jar, CSRF
/// header, per-account user agent and, for signed endpoints, the derived
/// `x-instagram-gis` header with a single refresh-and-retry on staleness.
#[derive(Debug)]
pub struct InstagramHttpClient {
    client: Client,
    base_url: String,
}

impl InstagramHttpClient {
    pub fn new(config: &Config) -> Result<Self, HttpError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.rest_api.timeout));
        if let Some(proxy) = &config.client.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            base_url: config.rest_api.base_url.clone(),
        })
    }

    async fn send_once(
        &self,
        context: &SessionContext,
        request: &ApiRequest,
        gis: Option<&str>,
    ) -> Result<Response, HttpError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!("Dispatching {} {}", request.method, url);

        let mut builder = self.client.request(request.method.clone(), &url).headers(
            base_headers(
                &self.base_url,
                context.user_agent(),
                context.language(),
                &context.csrf_token(),
                &context.cookie_header(),
            ),
        );
        if let Some(gis) = gis {
            builder = builder.header(GIS_HEADER_KEY, gis);
        }
        for (key, value) in &request.extra_headers {
            builder = builder.header(key, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }
        if let Some(json) = &request.json {
            builder = builder.json(json);
        }
        if let Some(parts) = &request.multipart {
            builder = builder.multipart(build_multipart(parts)?);
        }

        Ok(builder.send().await?)
    }

    /// Classifies the status, folds the response cookies into the jar and
    /// reads the body.
    async fn finish(
        &self,
        context: &SessionContext,
        response: Response,
    ) -> Result<ApiResponse, HttpError> {
        let status = response.status();

        let set_cookies: Vec<String> = response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect();
        context.ingest_set_cookies(set_cookies.iter().map(String::as_str));

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(HttpError::RateLimited);
        }
        if status.is_server_error() {
            return Err(HttpError::ServerError(status));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(HttpError::Unauthorized);
        }

        let text = response.text().await?;
        Ok(ApiResponse { status, text })
    }

    /// Returns the cached signature seed, fetching it from the root page
    /// on first use. Serialized on the context so concurrent first calls
    /// produce one fetch.
    async fn ensure_seed(&self, context: &SessionContext) -> Result<String, HttpError> {
        let mut cached = context.signature_seed.lock().await;
        if let Some(seed) = cached.as_ref() {
            return Ok(seed.clone());
        }
        let seed = self.fetch_seed(context).await?;
        *cached = Some(seed.clone());
        Ok(seed)
    }

    /// Replaces a seed the vendor rejected. If another task already
    /// refreshed while this one waited on the lock, that value is reused
    /// instead of refetching.
    async fn refresh_seed(
        &self,
        context: &SessionContext,
        stale: &str,
    ) -> Result<String, HttpError> {
        let mut cached = context.signature_seed.lock().await;
        if let Some(seed) = cached.as_ref() {
            if seed != stale {
                return Ok(seed.clone());
            }
        }
        warn!("Signature seed rejected; refetching once");
        let seed = self.fetch_seed(context).await?;
        *cached = Some(seed.clone());
        Ok(seed)
    }

    async fn fetch_seed(&self, context: &SessionContext) -> Result<String, HttpError> {
        let request = ApiRequest::get(ROOT_PATH);
        let response = self.send_once(context, &request, None).await?;
        let page = self.finish(context, response).await?;
        first_match(SEED_EXTRACTORS, page.text()).ok_or_else(|| {
            HttpError::UnexpectedShape("signature seed not found in root page".to_string())
        })
    }
}

#[async_trait]
impl RequestDispatcher for InstagramHttpClient {
    #[instrument(skip(self, context, request), fields(path = %request.path))]
    async fn execute(
        &self,
        context: &SessionContext,
        request: ApiRequest,
    ) -> Result<ApiResponse, HttpError> {
        if !request.signed {
            let response = self.send_once(context, &request, None).await?;
            return self.finish(context, response).await;
        }

        let seed = self.ensure_seed(context).await?;
        let response = self
            .send_once(context, &request, Some(&compute_gis(&seed, &request.path)))
            .await?;

        if response.status() != StatusCode::FORBIDDEN {
            return self.finish(context, response).await;
        }

        // Stale signature: refresh the seed and retry exactly once. A
        // second rejection is surfaced, not retried.
        let fresh = self.refresh_seed(context, &seed).await?;
        let retry = self
            .send_once(context, &request, Some(&compute_gis(&fresh, &request.path)))
            .await?;
        self.finish(context, retry).await
    }
}

fn build_multipart(parts: &[MultipartPart]) -> Result<reqwest::multipart::Form, HttpError> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        form = match &part.body {
            PartBody::Text(value) => form.text(part.name.clone(), value.clone()),
            PartBody::Bytes {
                data,
                file_name,
                mime,
            } => {
                let piece = reqwest::multipart::Part::bytes(data.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)?;
                form.part(part.name.clone(), piece)
            }
        };
    }
    Ok(form)
}
