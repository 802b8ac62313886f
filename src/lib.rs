//! rest-jpg library crate.
//!
//! An image hosting REST service: users register with a password, upload and
//! download JPEG images, and grant scoped bearer tokens to registered OAuth
//! clients. Every response is an XML document.

pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod storage;
pub mod templates;
