use crate::error::AppError;
use crate::models::booking::{Booking, ReservedLine};
use crate::models::tour::{Room, Tour};
use chrono::{Duration, NaiveDate};
use sqlx::PgPool;
use std::collections::HashMap;
use tour_platform_shared::BookingStatus;
use uuid::Uuid;

#[cfg(test)]
mod tests;

/// Availability service computes the remaining room capacity of a tour for a
/// target departure date. Availability is always derived, never stored.
#[derive(Clone)]
pub struct AvailabilityService {
    db_pool: PgPool,
}

impl AvailabilityService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Remaining capacity per configured room for `tour` on `date`, signed.
    /// A negative value means the room is oversold; callers that admit new
    /// bookings must reject anything that would go below zero, while the
    /// public availability endpoint clamps at the response edge.
    pub async fn remaining_for_date(
        &self,
        tour: &Tour,
        date: NaiveDate,
    ) -> Result<HashMap<Uuid, i32>, AppError> {
        let (start, end) = occupancy_window(date, tour.duration_days);
        let rooms = Room::find_by_tour(&self.db_pool, tour.id).await?;
        let reserved = Booking::reserved_in_window(&self.db_pool, tour.id, start, end).await?;

        Ok(compute_remaining(&rooms, &reserved))
    }
}

/// The inclusive date range during which a tour departing inside it still
/// occupies rooms on the target date: a tour that left up to
/// `duration - 1` days earlier has not returned yet.
pub fn occupancy_window(target: NaiveDate, duration_days: i32) -> (NaiveDate, NaiveDate) {
    let span = i64::from(duration_days.max(1) - 1);
    (target - Duration::days(span), target)
}

/// Subtract reserved quantities from configured room counts. Cancelled
/// bookings do not reserve anything; line items referencing rooms that are
/// no longer configured for the tour are ignored.
pub fn compute_remaining(rooms: &[Room], reserved: &[ReservedLine]) -> HashMap<Uuid, i32> {
    let mut remaining: HashMap<Uuid, i32> = rooms.iter().map(|r| (r.id, r.quantity)).collect();

    for line in reserved {
        if line.booking_status == BookingStatus::Cancelled {
            continue;
        }
        if let Some(count) = remaining.get_mut(&line.room_id) {
            *count -= line.quantity;
        }
    }

    remaining
}

/// The availability endpoint's wire contract reports integers >= 0.
pub fn clamp_non_negative(remaining: HashMap<Uuid, i32>) -> HashMap<Uuid, i32> {
    remaining.into_iter().map(|(id, n)| (id, n.max(0))).collect()
}
