//! Database repository for cookie sessions.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::sessions::{SessionCreateDBRequest, SessionDBResponse},
};
use crate::types::abbrev_secret;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::instrument;

const SESSION_COLUMNS: &str = "id, user_id, created_at, expires_at";

pub struct Sessions<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Sessions<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Delete a session. Returns whether a row was removed.
    #[instrument(skip(self, id), fields(session = %abbrev_secret(id)), err)]
    pub async fn revoke(&mut self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every session that expired at or before `now`. Returns the number of rows removed.
    #[instrument(skip(self), err)]
    pub async fn delete_expired(&mut self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Sessions<'c> {
    type CreateRequest = SessionCreateDBRequest;
    type Response = SessionDBResponse;
    type Id = String;

    #[instrument(skip(self, request), fields(user_id = request.user_id, session = %abbrev_secret(&request.id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let session = sqlx::query_as::<_, SessionDBResponse>(&format!(
            "INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?) RETURNING {SESSION_COLUMNS}"
        ))
        .bind(&request.id)
        .bind(request.user_id)
        .bind(Utc::now())
        .bind(request.expires_at)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(session)
    }

    #[instrument(skip(self, id), fields(session = %abbrev_secret(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let session = sqlx::query_as::<_, SessionDBResponse>(&format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?"))
            .bind(&id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{handlers::Users, models::users::UserCreateDBRequest};
    use chrono::Duration;
    use sqlx::SqlitePool;

    async fn create_user(pool: &SqlitePool) -> i64 {
        let mut conn = pool.acquire().await.unwrap();
        Users::new(&mut conn)
            .create(&UserCreateDBRequest {
                username: "alice".to_string(),
                password_hash: "not-a-real-hash".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[sqlx::test]
    async fn test_create_get_and_revoke_session(pool: SqlitePool) {
        let user_id = create_user(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Sessions::new(&mut conn);

        let expires_at = Utc::now() + Duration::hours(1);
        let created = repo
            .create(&SessionCreateDBRequest {
                id: "digest-1".to_string(),
                user_id,
                expires_at,
            })
            .await
            .unwrap();
        assert_eq!(created.user_id, user_id);
        assert!(!created.is_expired(Utc::now()));

        let fetched = repo.get_by_id("digest-1".to_string()).await.unwrap().expect("session should exist");
        assert_eq!(fetched.user_id, user_id);

        assert!(repo.revoke("digest-1").await.unwrap());
        assert!(!repo.revoke("digest-1").await.unwrap());
        assert!(repo.get_by_id("digest-1".to_string()).await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn test_delete_expired_keeps_live_sessions(pool: SqlitePool) {
        let user_id = create_user(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Sessions::new(&mut conn);
        let now = Utc::now();

        for (id, expires_at) in [
            ("digest-old", now - Duration::hours(1)),
            ("digest-now", now),
            ("digest-live", now + Duration::hours(1)),
        ] {
            repo.create(&SessionCreateDBRequest {
                id: id.to_string(),
                user_id,
                expires_at,
            })
            .await
            .unwrap();
        }

        assert_eq!(repo.delete_expired(now).await.unwrap(), 2);
        assert!(repo.get_by_id("digest-old".to_string()).await.unwrap().is_none());
        assert!(repo.get_by_id("digest-now".to_string()).await.unwrap().is_none());
        assert!(repo.get_by_id("digest-live".to_string()).await.unwrap().is_some());
        assert_eq!(repo.delete_expired(now).await.unwrap(), 0);
    }

    #[test]
    fn test_is_expired_boundary() {
        let now = Utc::now();
        let session = SessionDBResponse {
            id: "x".to_string(),
            user_id: 1,
            created_at: now - Duration::hours(2),
            expires_at: now,
        };
        assert!(session.is_expired(now));
        assert!(!session.is_expired(now - Duration::seconds(1)));
    }
}
