//! Client for Instagram's private web endpoints.
//!
//! A [`session::session::SessionManager`] authenticates (or restores a
//! persisted cookie snapshot) and hands out a session context; every
//! further call goes through the transport dispatcher, with the
//! `application::services` modules providing typed endpoint wrappers and
//! `transport::pagination` the cursor-based walk over edge/node feeds.

pub mod config;

pub mod application;

pub mod presentation;

pub mod session;

pub mod storage;

pub mod transport;

pub mod utils;

pub mod error;

pub(crate) mod constants;
