use crate::error::AppError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Tour {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub duration_days: i32,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A room type configured for a tour; `quantity` is the number of rooms
/// of this type available per departure window.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub name: String,
    pub quantity: i32,
}

impl Tour {
    /// Find a tour by its URL slug
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, AppError> {
        let tour = sqlx::query_as::<_, Tour>(
            "SELECT id, slug, title, duration_days, price, created_at, updated_at
             FROM tours
             WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(tour)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, AppError> {
        let tour = sqlx::query_as::<_, Tour>(
            "SELECT id, slug, title, duration_days, price, created_at, updated_at
             FROM tours
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(tour)
    }
}

impl Room {
    /// Rooms configured for a tour
    pub async fn find_by_tour(pool: &PgPool, tour_id: Uuid) -> Result<Vec<Self>, AppError> {
        let rooms = sqlx::query_as::<_, Room>(
            "SELECT id, tour_id, name, quantity
             FROM rooms
             WHERE tour_id = $1
             ORDER BY name",
        )
        .bind(tour_id)
        .fetch_all(pool)
        .await?;

        Ok(rooms)
    }

    /// Rooms configured for a tour, locked for the duration of the enclosing
    /// transaction. Serializes concurrent bookings against the same tour so
    /// the availability check cannot race with another insert.
    pub async fn lock_for_tour(
        tx: &mut Transaction<'_, Postgres>,
        tour_id: Uuid,
    ) -> Result<Vec<Self>, AppError> {
        let rooms = sqlx::query_as::<_, Room>(
            "SELECT id, tour_id, name, quantity
             FROM rooms
             WHERE tour_id = $1
             ORDER BY name
             FOR UPDATE",
        )
        .bind(tour_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rooms)
    }
}
