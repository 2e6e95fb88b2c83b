//! Accounts, passwords and credentials.
//!
//! Two credential schemes implement [`authenticator::Authenticator`]:
//!
//! - [`session::SessionAuthenticator`]: random cookie value, digest stored in `sessions`, expired
//!   rows removed on lookup
//! - [`token::TokenAuthenticator`]: stateless HS256 JWT carrying the username
//!
//! Handlers take [`authenticator::Identity`] or [`crate::api::models::users::CurrentUser`] as
//! extractors (see [`current_user`]) and never see which scheme is active.
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use dayscore::api::models::users::CurrentUser;
//!
//! async fn protected_handler(current_user: CurrentUser) -> String {
//!     format!("Hello, {}!", current_user.username)
//! }
//! ```

pub mod accounts;
pub mod authenticator;
pub mod current_user;
pub mod password;
pub mod session;
pub mod token;
