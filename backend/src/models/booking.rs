use crate::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, Transaction};
use tour_platform_shared::{BookingResponse, BookingStatus, PaymentMethod, PaymentStatus};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub departure_date: NaiveDate,
    pub people: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub zipcode: String,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: BookingStatus,
    pub invoice_no: Option<String>,
    pub transaction_id: Option<String>,
    pub deposit: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BookingRoom {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub room_id: Uuid,
    pub quantity: i32,
}

/// A room line item of a booking whose departure falls inside an occupancy
/// window, together with the booking's lifecycle status.
#[derive(Debug, Clone, FromRow)]
pub struct ReservedLine {
    pub room_id: Uuid,
    pub quantity: i32,
    pub booking_status: BookingStatus,
}

/// Insert payload for a booking header
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub tour_id: Uuid,
    pub departure_date: NaiveDate,
    pub people: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub zipcode: String,
    pub payment_method: PaymentMethod,
    pub total: Decimal,
}

const BOOKING_COLUMNS: &str =
    "id, tour_id, departure_date, people, first_name, last_name, email, phone, \
     address, city, province, country, zipcode, payment_method, payment_status, \
     status, invoice_no, transaction_id, deposit, total, created_at, updated_at";

impl Booking {
    /// Insert the booking header inside an open transaction. The caller owns
    /// the transaction; line items must be inserted before committing.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        new: &NewBooking,
    ) -> Result<Self, AppError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO bookings (tour_id, departure_date, people, first_name, last_name,
                                   email, phone, address, city, province, country, zipcode,
                                   payment_method, total)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(new.tour_id)
        .bind(new.departure_date)
        .bind(new.people)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.address)
        .bind(&new.city)
        .bind(&new.province)
        .bind(&new.country)
        .bind(&new.zipcode)
        .bind(new.payment_method)
        .bind(new.total)
        .fetch_one(&mut **tx)
        .await?;

        Ok(booking)
    }

    /// Attach a room line item to a booking inside the same transaction.
    pub async fn add_room(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
        room_id: Uuid,
        quantity: i32,
    ) -> Result<BookingRoom, AppError> {
        let line = sqlx::query_as::<_, BookingRoom>(
            "INSERT INTO booking_rooms (booking_id, room_id, quantity)
             VALUES ($1, $2, $3)
             RETURNING id, booking_id, room_id, quantity",
        )
        .bind(booking_id)
        .bind(room_id)
        .bind(quantity)
        .fetch_one(&mut **tx)
        .await?;

        Ok(line)
    }

    /// Assign the gateway-facing invoice number inside the open transaction.
    pub async fn set_invoice_no(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
        invoice_no: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE bookings SET invoice_no = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(invoice_no)
        .bind(booking_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn find_by_invoice(
        pool: &PgPool,
        invoice_no: &str,
    ) -> Result<Option<Self>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE invoice_no = $1"
        ))
        .bind(invoice_no)
        .fetch_optional(pool)
        .await?;

        Ok(booking)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(booking)
    }

    /// Conditionally mark a booking paid. The `payment_status = 'unpaid'`
    /// guard makes the transition idempotent: duplicate or concurrent
    /// confirmations affect zero rows. Returns whether this call applied
    /// the transition.
    pub async fn mark_paid(
        pool: &PgPool,
        invoice_no: &str,
        transaction_id: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE bookings
             SET payment_status = 'paid',
                 transaction_id = $2,
                 deposit = total,
                 updated_at = NOW()
             WHERE invoice_no = $1
               AND payment_status = 'unpaid'",
        )
        .bind(invoice_no)
        .bind(transaction_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Room line items of every booking (any lifecycle status) for a tour
    /// whose departure falls inside the inclusive date window. Callable on
    /// the pool or inside a transaction.
    pub async fn reserved_in_window<'e, E>(
        executor: E,
        tour_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ReservedLine>, AppError>
    where
        E: PgExecutor<'e>,
    {
        let lines = sqlx::query_as::<_, ReservedLine>(
            "SELECT br.room_id, br.quantity, b.status AS booking_status
             FROM booking_rooms br
             JOIN bookings b ON b.id = br.booking_id
             WHERE b.tour_id = $1
               AND b.departure_date >= $2
               AND b.departure_date <= $3",
        )
        .bind(tour_id)
        .bind(start)
        .bind(end)
        .fetch_all(executor)
        .await?;

        Ok(lines)
    }

    /// Line items of a single booking
    pub async fn rooms(&self, pool: &PgPool) -> Result<Vec<BookingRoom>, AppError> {
        let lines = sqlx::query_as::<_, BookingRoom>(
            "SELECT id, booking_id, room_id, quantity
             FROM booking_rooms
             WHERE booking_id = $1",
        )
        .bind(self.id)
        .fetch_all(pool)
        .await?;

        Ok(lines)
    }

    pub fn to_response(&self) -> BookingResponse {
        BookingResponse {
            id: self.id,
            tour_id: self.tour_id,
            departure_date: self.departure_date,
            people: self.people,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            status: self.status,
            invoice_no: self.invoice_no.clone(),
            total: self.total,
            deposit: self.deposit,
            created_at: self.created_at,
        }
    }
}
