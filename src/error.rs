use reqwest::StatusCode;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Failures raised while establishing or restoring a session.
#[derive(Debug)]
pub enum AuthError {
    /// The login endpoint rejected the credentials (no session cookie issued).
    InvalidCredentials,
    /// Login was parked behind a checkpoint; the negotiator must resolve
    /// the carried challenge URL before a session can exist.
    ChallengeRequired(String),
    /// Too many invalid verification codes; the whole login must restart.
    ChallengeExhausted,
    /// A verification code was rejected by the vendor.
    InvalidCode,
    /// A persisted cookie jar carried no CSRF cookie to rebuild the context from.
    MissingCsrfCookie,
    /// The underlying request failed before the vendor could answer.
    Network(HttpError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "invalid credentials"),
            AuthError::ChallengeRequired(url) => write!(f, "challenge required: {url}"),
            AuthError::ChallengeExhausted => write!(f, "challenge attempts exhausted"),
            AuthError::InvalidCode => write!(f, "invalid verification code"),
            AuthError::MissingCsrfCookie => write!(f, "cookie jar has no csrf cookie"),
            AuthError::Network(e) => write!(f, "network error during auth: {e}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<HttpError> for AuthError {
    fn from(e: HttpError) -> Self {
        AuthError::Network(e)
    }
}

/// Failures raised by a single dispatched request.
#[derive(Debug)]
pub enum HttpError {
    Network(reqwest::Error),
    Timeout,
    RateLimited,
    ServerError(StatusCode),
    /// Rejected on an authenticated endpoint; distinct from
    /// [`AuthError::InvalidCredentials`] so callers can tell "session
    /// expired" apart from "never logged in".
    Unauthorized,
    /// The body decoded, but not into the shape this endpoint promises.
    UnexpectedShape(String),
    Decode(serde_json::Error),
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::Network(e) => write!(f, "network error: {e}"),
            HttpError::Timeout => write!(f, "request timed out"),
            HttpError::RateLimited => write!(f, "rate limited"),
            HttpError::ServerError(s) => write!(f, "server error: {s}"),
            HttpError::Unauthorized => write!(f, "unauthorized"),
            HttpError::UnexpectedShape(msg) => write!(f, "unexpected response shape: {msg}"),
            HttpError::Decode(e) => write!(f, "decode error: {e}"),
        }
    }
}

impl std::error::Error for HttpError {}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpError::Timeout
        } else {
            HttpError::Network(e)
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(e: serde_json::Error) -> Self {
        HttpError::Decode(e)
    }
}

/// Failures raised by the two-phase media upload.
#[derive(Debug)]
pub enum UploadError {
    /// The local media could not be read or packed into the request.
    EncodingFailed(String),
    /// The vendor refused the upload or its configure step; the raw body
    /// fragment is kept for diagnosis.
    VendorRejected { status: StatusCode, fragment: String },
    Network(HttpError),
}

impl Display for UploadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::EncodingFailed(msg) => write!(f, "upload encoding failed: {msg}"),
            UploadError::VendorRejected { status, fragment } => {
                write!(f, "upload rejected ({status}): {fragment}")
            }
            UploadError::Network(e) => write!(f, "network error during upload: {e}"),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<HttpError> for UploadError {
    fn from(e: HttpError) -> Self {
        UploadError::Network(e)
    }
}

/// Failures raised while persisting or reloading session state.
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "io error: {e}"),
            StorageError::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}
