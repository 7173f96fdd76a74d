pub mod challenge;
pub mod cookies;
pub mod login_response;
pub mod session;
