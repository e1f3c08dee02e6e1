use crate::error::{AppError, FieldError};
use crate::models::booking::{Booking, NewBooking};
use crate::models::tour::{Room, Tour};
use crate::services::notification_service::NotificationService;
use crate::services::payment_service::PaymentService;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use tour_platform_shared::{CreateBookingRequest, PaymentMethod, RoomSelection, INVOICE_PREFIX};
use tracing::info;
use uuid::Uuid;

use super::availability_service::{compute_remaining, occupancy_window};

/// Booking service records a validated booking atomically: header, room line
/// items and (for electronic payment) the gateway handshake either all take
/// effect or none do.
#[derive(Clone)]
pub struct BookingService {
    db_pool: PgPool,
    payment_service: PaymentService,
    notification_service: NotificationService,
}

/// What the handler should do after a booking is recorded.
pub enum BookingOutcome {
    /// Cash booking, committed and confirmed immediately.
    Confirmed(Booking),
    /// Electronic booking, committed pending payment; send the browser to
    /// the gateway.
    PaymentRedirect {
        booking: Booking,
        pay_url: String,
        raw_response: serde_json::Value,
    },
}

impl BookingService {
    pub fn new(
        db_pool: PgPool,
        payment_service: PaymentService,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            db_pool,
            payment_service,
            notification_service,
        }
    }

    /// Record a booking for `tour`. Room rows are locked for the duration of
    /// the transaction and availability is recomputed under that lock, so
    /// two concurrent requests cannot both take the last room.
    pub async fn create_booking(
        &self,
        tour: &Tour,
        request: &CreateBookingRequest,
    ) -> Result<BookingOutcome, AppError> {
        let total = tour.price * Decimal::from(request.people);
        let requested = requested_per_room(&request.rooms);

        let mut tx = self.db_pool.begin().await?;

        let rooms = Room::lock_for_tour(&mut tx, tour.id).await?;
        let (start, end) = occupancy_window(request.departure_date, tour.duration_days);
        let reserved =
            Booking::reserved_in_window(&mut *tx, tour.id, start, end).await?;
        let remaining = compute_remaining(&rooms, &reserved);

        admit_selection(&requested, &remaining)?;

        let booking = Booking::create(
            &mut tx,
            &NewBooking {
                tour_id: tour.id,
                departure_date: request.departure_date,
                people: request.people,
                first_name: request.first_name.clone(),
                last_name: request.last_name.clone(),
                email: request.email.clone(),
                phone: request.phone.clone(),
                address: request.address.clone(),
                city: request.city.clone(),
                province: request.province.clone(),
                country: request.country.clone(),
                zipcode: request.zipcode.clone(),
                payment_method: request.payment_method,
                total,
            },
        )
        .await?;

        for (room_id, quantity) in &requested {
            Booking::add_room(&mut tx, booking.id, *room_id, *quantity).await?;
        }

        match request.payment_method {
            PaymentMethod::Momo => {
                let invoice_no = generate_invoice_no();
                Booking::set_invoice_no(&mut tx, booking.id, &invoice_no).await?;

                // Only commit the pending booking once the gateway has
                // accepted the purchase; otherwise nothing is recorded.
                let purchase = match self.payment_service.purchase(&invoice_no, total).await {
                    Ok(purchase) => purchase,
                    Err(e) => {
                        tx.rollback().await?;
                        return Err(e);
                    }
                };
                tx.commit().await?;

                info!(
                    "Booking {} recorded pending payment, invoice {}",
                    booking.id, invoice_no
                );
                Ok(BookingOutcome::PaymentRedirect {
                    booking,
                    pay_url: purchase.pay_url,
                    raw_response: purchase.raw_response,
                })
            }
            PaymentMethod::Cash => {
                tx.commit().await?;

                info!("Booking {} recorded, payable on arrival", booking.id);
                self.notification_service
                    .queue_booking_confirmation(&booking)
                    .await;
                Ok(BookingOutcome::Confirmed(booking))
            }
        }
    }
}

/// Total requested quantity per room id. A room selected on several lines
/// counts once with the summed quantity.
fn requested_per_room(lines: &[RoomSelection]) -> HashMap<Uuid, i32> {
    let mut requested: HashMap<Uuid, i32> = HashMap::new();
    for line in lines {
        *requested.entry(line.room_id).or_insert(0) += line.quantity;
    }

    requested
}

/// Admit the selection only if every requested room is configured for the
/// tour and has enough remaining capacity.
fn admit_selection(
    requested: &HashMap<Uuid, i32>,
    remaining: &HashMap<Uuid, i32>,
) -> Result<(), AppError> {
    for (room_id, quantity) in requested {
        let Some(available) = remaining.get(room_id) else {
            return Err(AppError::Validation(vec![FieldError {
                field: "rooms".to_string(),
                label: "rooms".to_string(),
                message: format!("room {room_id} is not offered for this tour"),
            }]));
        };
        if *quantity > *available {
            return Err(AppError::Conflict(format!(
                "room {room_id} has {} left, {quantity} requested",
                (*available).max(0)
            )));
        }
    }

    Ok(())
}

/// Invoice numbers are the gateway's order ids: a fixed prefix plus the
/// current Unix timestamp.
fn generate_invoice_no() -> String {
    format!("{INVOICE_PREFIX}{}", Utc::now().timestamp())
}
