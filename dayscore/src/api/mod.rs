//! HTTP surface: route handlers and the request/response models they exchange.
//!
//! - **[`handlers`]**: Axum handlers for both deployments
//! - **[`extractors`]**: body and query extractors that reject with the JSON error body
//! - **[`models`]**: request validation and response bodies
//!
//! Which handlers are mounted depends on [`crate::config::AuthMode`], see [`crate::build_router`].

pub mod extractors;
pub mod handlers;
pub mod models;
