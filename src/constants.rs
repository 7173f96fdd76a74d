pub(crate) const BASE_URL: &str = "https://www.instagram.com";

pub(crate) const CSRF_COOKIE_KEY: &str = "csrftoken";
pub(crate) const SESSION_COOKIE_KEY: &str = "sessionid";

pub(crate) const CSRF_HEADER_KEY: &str = "x-csrftoken";
pub(crate) const AJAX_HEADER_KEY: &str = "x-instagram-ajax";
pub(crate) const GIS_HEADER_KEY: &str = "x-instagram-gis";
pub(crate) const APP_ID_HEADER_KEY: &str = "x-ig-app-id";

pub(crate) const WEB_APP_ID: &str = "936619743392459";

pub(crate) const ROOT_PATH: &str = "/";
pub(crate) const LOGIN_PATH: &str = "/accounts/login/ajax/";
pub(crate) const LOGOUT_PATH: &str = "/accounts/logout/ajax/";
pub(crate) const GRAPHQL_PATH: &str = "/graphql/query/";

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_LANGUAGE: &str = "en-US";

/// Vendor-enforced bounds for GraphQL page sizes; out-of-range requests
/// are clamped, not rejected.
pub(crate) const MIN_PAGE_SIZE: u32 = 12;
pub(crate) const MAX_PAGE_SIZE: u32 = 50;

/// Invalid verification codes tolerated before a checkpoint becomes terminal.
pub(crate) const CHALLENGE_MAX_ATTEMPTS: u8 = 3;

// GraphQL query hashes. Opaque per-query values minted by the vendor;
// they rotate across web app deployments.
pub(crate) const FOLLOWERS_QUERY_HASH: &str = "c76146de99bb02f6415203be841dd25a";
pub(crate) const FOLLOWING_QUERY_HASH: &str = "d04b0a864b4b54837c0d870b0e77e076";
pub(crate) const HASHTAG_MEDIA_QUERY_HASH: &str = "174a5243287c5f3a7de741089750ab3b";
pub(crate) const USER_MEDIA_QUERY_HASH: &str = "42323d64886122307be10013ad2dcc44";
pub(crate) const MEDIA_COMMENTS_QUERY_HASH: &str = "33ba35852cb50da46f5b5e889df7d159";
