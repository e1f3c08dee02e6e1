use crate::config::AppConfig;
use crate::database::Database;
use crate::error::AppError;
use crate::models::booking::{Booking, BookingRoom};
use crate::models::tour::Tour;
use crate::services::payment_service::{PaymentCallback, PaymentService, Reconciliation};
use actix_web::{get, post, web, HttpResponse, Result};
use tracing::{info, warn};

/// Where to send the customer's browser after the gateway hands them back.
fn thank_you_url(frontend: &str, invoice_no: &str) -> String {
    format!("{frontend}/booking/thank-you?invoice={invoice_no}")
}

/// Back to the booking form with the prior selection pre-filled, so the
/// customer can retry after a failed payment without re-entering it.
fn booking_form_url(
    frontend: &str,
    slug: &str,
    booking: &Booking,
    rooms: &[BookingRoom],
    gateway_message: &str,
) -> Result<String, AppError> {
    let mut params: Vec<(&str, String)> = vec![
        ("departure_date", booking.departure_date.to_string()),
        ("people", booking.people.to_string()),
    ];
    for line in rooms {
        params.push(("room_id", line.room_id.to_string()));
        params.push(("quantity", line.quantity.to_string()));
    }
    params.push(("error", "payment_failed".to_string()));
    if !gateway_message.is_empty() {
        params.push(("message", gateway_message.to_string()));
    }

    let query = serde_urlencoded::to_string(&params)
        .map_err(|e| AppError::Internal(format!("failed to encode redirect query: {e}")))?;

    Ok(format!("{frontend}/tours/{slug}/book?{query}"))
}

fn invalid_order_url(frontend: &str) -> String {
    format!("{frontend}/?error=invalid_order")
}

fn see_other(url: String) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header(("Location", url))
        .finish()
}

/// Browser redirect back from the gateway. Reconciles as a fallback for a
/// lost server notification, then forwards the customer to the appropriate
/// page. Carries no signature that covers all redirect parameters, so the
/// paid transition still only happens through the shared idempotent path.
#[get("/momo/redirect")]
pub async fn momo_redirect(
    config: web::Data<AppConfig>,
    db: web::Data<Database>,
    payment_service: web::Data<PaymentService>,
    query: web::Query<PaymentCallback>,
) -> Result<HttpResponse, AppError> {
    let callback = query.into_inner();
    let frontend = &config.frontend_base_url;

    let outcome = payment_service
        .reconcile(
            &callback.order_id,
            callback.is_success(),
            &callback.trans_id.to_string(),
        )
        .await?;

    match outcome {
        Reconciliation::Confirmed(booking) | Reconciliation::AlreadyPaid(booking) => {
            let invoice = booking.invoice_no.as_deref().unwrap_or(&callback.order_id);
            Ok(see_other(thank_you_url(frontend, invoice)))
        }
        Reconciliation::PaymentFailed(booking) => {
            let tour = Tour::find_by_id(db.pool(), booking.tour_id)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!("tour {} missing for booking", booking.tour_id))
                })?;
            let rooms = booking.rooms(db.pool()).await?;
            Ok(see_other(booking_form_url(
                frontend,
                &tour.slug,
                &booking,
                &rooms,
                &callback.message,
            )?))
        }
        Reconciliation::UnknownInvoice => Ok(see_other(invalid_order_url(frontend))),
    }
}

/// Server-to-server payment notification from the gateway. The gateway
/// retries until it sees a 204, so this endpoint always acknowledges; a bad
/// signature is logged and ignored without touching any booking.
#[post("/momo/ipn")]
pub async fn momo_ipn(
    payment_service: web::Data<PaymentService>,
    callback: web::Json<PaymentCallback>,
) -> Result<HttpResponse, AppError> {
    let callback = callback.into_inner();

    if !payment_service.verify_callback_signature(&callback)? {
        warn!(
            "Rejected payment notification with bad signature for order {}",
            callback.order_id
        );
        return Ok(HttpResponse::NoContent().finish());
    }

    let outcome = payment_service
        .reconcile(
            &callback.order_id,
            callback.is_success(),
            &callback.trans_id.to_string(),
        )
        .await?;
    let label = match outcome {
        Reconciliation::Confirmed(_) => "confirmed",
        Reconciliation::AlreadyPaid(_) => "already paid",
        Reconciliation::PaymentFailed(_) => "payment failed",
        Reconciliation::UnknownInvoice => "unknown invoice",
    };
    info!(
        "Payment notification for order {} handled: {}",
        callback.order_id, label
    );

    Ok(HttpResponse::NoContent().finish())
}
