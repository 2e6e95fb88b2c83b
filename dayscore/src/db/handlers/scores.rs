//! Database repository for daily scores.

use crate::types::ScoreId;
use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::scores::{ScoreCreateDBRequest, ScoreDBResponse, ScoreFilter},
};
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::instrument;

const SCORE_COLUMNS: &str = "id, user_id, date, score, created_at";

pub struct Scores<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Scores<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Record a score, replacing any existing score for the same user and date.
    ///
    /// The `(user_id, date)` unique constraint is the arbiter, so concurrent submissions for the
    /// same day converge on a single row holding the last write.
    #[instrument(skip(self, request), fields(user_id = request.user_id, date = %request.date), err)]
    pub async fn upsert(&mut self, request: &ScoreCreateDBRequest) -> Result<ScoreDBResponse> {
        let score = sqlx::query_as::<_, ScoreDBResponse>(&format!(
            "INSERT INTO scores (user_id, date, score, created_at) VALUES (?, ?, ?, ?)
             ON CONFLICT (user_id, date) DO UPDATE SET score = excluded.score
             RETURNING {SCORE_COLUMNS}"
        ))
        .bind(request.user_id)
        .bind(request.date)
        .bind(request.score)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(score)
    }

    /// Scores for one user with `start_date <= date <= end_date`, oldest first.
    #[instrument(skip(self, filter), fields(user_id = filter.user_id, start = %filter.start_date, end = %filter.end_date), err)]
    pub async fn list(&mut self, filter: &ScoreFilter) -> Result<Vec<ScoreDBResponse>> {
        let scores = sqlx::query_as::<_, ScoreDBResponse>(&format!(
            "SELECT {SCORE_COLUMNS} FROM scores
             WHERE user_id = ? AND date >= ? AND date <= ?
             ORDER BY date ASC"
        ))
        .bind(filter.user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(scores)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Scores<'c> {
    type CreateRequest = ScoreCreateDBRequest;
    type Response = ScoreDBResponse;
    type Id = ScoreId;

    /// Plain insert. Fails with a unique violation if the user already has a score for the date.
    #[instrument(skip(self, request), fields(user_id = request.user_id, date = %request.date), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let score = sqlx::query_as::<_, ScoreDBResponse>(&format!(
            "INSERT INTO scores (user_id, date, score, created_at) VALUES (?, ?, ?, ?) RETURNING {SCORE_COLUMNS}"
        ))
        .bind(request.user_id)
        .bind(request.date)
        .bind(request.score)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(score)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let score = sqlx::query_as::<_, ScoreDBResponse>(&format!("SELECT {SCORE_COLUMNS} FROM scores WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserId;
    use chrono::NaiveDate;
    use crate::db::{errors::DbError, handlers::Users, models::users::UserCreateDBRequest};
    use sqlx::SqlitePool;

    async fn create_user(pool: &SqlitePool, username: &str) -> UserId {
        let mut conn = pool.acquire().await.unwrap();
        Users::new(&mut conn)
            .create(&UserCreateDBRequest {
                username: username.to_string(),
                password_hash: "not-a-real-hash".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(user_id: UserId, day: &str, score: i64) -> ScoreCreateDBRequest {
        ScoreCreateDBRequest {
            user_id,
            date: date(day),
            score,
        }
    }

    #[sqlx::test]
    async fn test_create_and_get_score(pool: SqlitePool) {
        let user_id = create_user(&pool, "alice").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Scores::new(&mut conn);

        let created = repo.create(&request(user_id, "2024-05-01", 7)).await.unwrap();
        assert_eq!(created.user_id, user_id);
        assert_eq!(created.date, date("2024-05-01"));
        assert_eq!(created.score, 7);

        let fetched = repo.get_by_id(created.id).await.unwrap().expect("score should exist");
        assert_eq!(fetched.score, 7);
        assert!(repo.get_by_id(created.id + 1).await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn test_create_twice_for_same_day_is_unique_violation(pool: SqlitePool) {
        let user_id = create_user(&pool, "alice").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Scores::new(&mut conn);

        repo.create(&request(user_id, "2024-05-01", 7)).await.unwrap();
        let err = repo.create(&request(user_id, "2024-05-01", 3)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    async fn test_upsert_replaces_existing_score(pool: SqlitePool) {
        let user_id = create_user(&pool, "alice").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Scores::new(&mut conn);

        let first = repo.upsert(&request(user_id, "2024-05-01", 7)).await.unwrap();
        let second = repo.upsert(&request(user_id, "2024-05-01", 3)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.score, 3);

        let all = repo
            .list(&ScoreFilter {
                user_id,
                start_date: date("2024-01-01"),
                end_date: date("2024-12-31"),
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].score, 3);
    }

    #[sqlx::test]
    async fn test_out_of_range_score_is_check_violation(pool: SqlitePool) {
        let user_id = create_user(&pool, "alice").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Scores::new(&mut conn);

        let err = repo.upsert(&request(user_id, "2024-05-01", 11)).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[sqlx::test]
    async fn test_list_is_inclusive_ordered_and_scoped_to_user(pool: SqlitePool) {
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Scores::new(&mut conn);

        repo.upsert(&request(alice, "2024-05-03", 5)).await.unwrap();
        repo.upsert(&request(alice, "2024-05-01", 7)).await.unwrap();
        repo.upsert(&request(alice, "2024-04-30", 2)).await.unwrap();
        repo.upsert(&request(alice, "2024-05-04", 9)).await.unwrap();
        repo.upsert(&request(bob, "2024-05-02", 1)).await.unwrap();

        let window = repo
            .list(&ScoreFilter {
                user_id: alice,
                start_date: date("2024-05-01"),
                end_date: date("2024-05-03"),
            })
            .await
            .unwrap();

        let days: Vec<_> = window.iter().map(|s| (s.date.to_string(), s.score)).collect();
        assert_eq!(days, vec![("2024-05-01".to_string(), 7), ("2024-05-03".to_string(), 5)]);
    }
}
