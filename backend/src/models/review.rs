use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub name: String,
    pub email: String,
    pub rating: i32,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub async fn create(
        pool: &PgPool,
        tour_id: Uuid,
        name: &str,
        email: &str,
        rating: i32,
        body: &str,
    ) -> Result<Self, AppError> {
        let review = sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (tour_id, name, email, rating, body)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, tour_id, name, email, rating, body, created_at",
        )
        .bind(tour_id)
        .bind(name)
        .bind(email)
        .bind(rating)
        .bind(body)
        .fetch_one(pool)
        .await?;

        Ok(review)
    }
}
