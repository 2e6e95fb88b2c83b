//! Database record structures and request types.
//!
//! Each submodule holds the row type for one table (deriving [`sqlx::FromRow`]) together with
//! the create/filter request types its repository accepts.

pub mod scores;
pub mod sessions;
pub mod users;
