use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub async fn create(
        pool: &PgPool,
        name: &str,
        email: &str,
        phone: &str,
        message: &str,
    ) -> Result<Self, AppError> {
        let contact = sqlx::query_as::<_, Contact>(
            "INSERT INTO contacts (name, email, phone, message)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, email, phone, message, created_at",
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(message)
        .fetch_one(pool)
        .await?;

        Ok(contact)
    }
}
