use crate::database::Database;
use crate::error::{AppError, FieldError};
use crate::models::tour::Tour;
use crate::services::availability_service::{clamp_non_negative, AvailabilityService};
use crate::services::booking_service::{BookingOutcome, BookingService};
use actix_web::{web, HttpResponse, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tour_platform_shared::{
    AvailabilityResponse, CreateBookingRequest, ElectronicPaymentResponse, ERROR_TOUR_NOT_FOUND,
    SUCCESS_BOOKING_CREATED,
};
use tracing::debug;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
}

/// GET /api/v1/tours/{slug}/availability?date=YYYY-MM-DD
pub async fn get_availability(
    db: web::Data<Database>,
    availability_service: web::Data<AvailabilityService>,
    path: web::Path<String>,
    query: web::Query<AvailabilityQuery>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let date = parse_date(&query.date)?;

    let tour = Tour::find_by_slug(db.pool(), &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(ERROR_TOUR_NOT_FOUND.to_string()))?;

    let remaining = availability_service.remaining_for_date(&tour, date).await?;
    debug!("Availability for tour {} on {}: {:?}", tour.slug, date, remaining);

    Ok(HttpResponse::Ok().json(AvailabilityResponse {
        date,
        room_available: clamp_non_negative(remaining),
    }))
}

/// POST /api/v1/tours/{slug}/bookings
pub async fn create_booking(
    db: web::Data<Database>,
    booking_service: web::Data<BookingService>,
    path: web::Path<String>,
    request: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    request.validate()?;
    for line in &request.rooms {
        line.validate()?;
    }

    let tour = Tour::find_by_slug(db.pool(), &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(ERROR_TOUR_NOT_FOUND.to_string()))?;

    match booking_service.create_booking(&tour, &request).await? {
        BookingOutcome::Confirmed(booking) => Ok(HttpResponse::Created().json(json!({
            "message": SUCCESS_BOOKING_CREATED,
            "booking": booking.to_response(),
        }))),
        BookingOutcome::PaymentRedirect {
            booking: _,
            pay_url,
            raw_response,
        } => Ok(HttpResponse::Ok().json(ElectronicPaymentResponse {
            url: pay_url,
            response: raw_response,
        })),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::Validation(vec![FieldError {
            field: "date".to_string(),
            label: "departure date".to_string(),
            message: "The departure date must be formatted as YYYY-MM-DD".to_string(),
        }])
    })
}
