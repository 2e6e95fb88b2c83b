//! API request and response data models.
//!
//! These structures define the public HTTP contract. They are distinct from the database models in
//! [`crate::db::models`] and carry the per-endpoint validation: raw payloads deserialize into loose
//! structs, which `validate` into the typed values the business logic accepts.
//!
//! - [`auth`]: signup, login and token validation payloads
//! - [`scores`]: score submissions, window queries and listings
//! - [`users`]: the authenticated user

pub mod auth;
pub mod scores;
pub mod users;
