//! Repository implementations for database access.
//!
//! Each repository wraps a borrowed SQLx connection (or transaction, which derefs to one) and
//! provides strongly-typed operations returning models from [`crate::db::models`].
//!
//! # Available Repositories
//!
//! - [`Users`]: account creation and lookup by id or username
//! - [`Scores`]: daily score insert, upsert and date-window listing
//! - [`Sessions`]: server-side sessions for cookie authentication
//!
//! # Common Pattern
//!
//! ```ignore
//! use dayscore::db::handlers::{Users, Repository};
//!
//! async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = pool.acquire().await?;
//!     let mut repo = Users::new(&mut conn);
//!
//!     if let Some(user) = repo.get_user_by_username("alice").await? {
//!         println!("Found user: {}", user.id);
//!     }
//!     Ok(())
//! }
//! ```

pub mod repository;
pub mod scores;
pub mod sessions;
pub mod users;

pub use repository::Repository;
pub use scores::Scores;
pub use sessions::Sessions;
pub use users::Users;
