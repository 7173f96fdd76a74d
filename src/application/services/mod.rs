pub mod account_service;
pub mod friendship_service;
pub mod media_service;
pub mod upload_service;
