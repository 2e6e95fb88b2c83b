//! HTTP request handlers.
//!
//! - [`auth`]: JSON signup, login and token validation (token deployment)
//! - [`pages`]: server-rendered pages and form login/signup/logout (session deployment)
//! - [`scores`]: score submission and listing, shared by both deployments
//! - [`static_assets`]: embedded front-end with SPA fallback (token deployment)
//!
//! Handlers return [`crate::errors::Error`], which renders as `{"error": "..."}` with the matching
//! status code.

pub mod auth;
pub mod pages;
pub mod scores;
pub mod static_assets;
