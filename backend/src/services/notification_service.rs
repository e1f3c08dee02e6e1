use crate::config::AppConfig;
use crate::models::booking::Booking;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tour_platform_shared::{EMAIL_MAX_ATTEMPTS, EMAIL_QUEUE_POLL_INTERVAL};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Outbound email is fire-and-forget: confirmations are queued in memory and
/// drained by a background task, so a slow or failing mail provider never
/// delays a booking response.
#[derive(Clone)]
pub struct NotificationService {
    mail_api_url: Option<String>,
    mail_api_key: Option<String>,
    mail_from: String,
    http: reqwest::Client,
    queue: Arc<RwLock<Vec<PendingEmail>>>,
    dispatched: Arc<RwLock<HashSet<Uuid>>>,
}

#[derive(Debug, Clone)]
struct PendingEmail {
    id: Uuid,
    booking_id: Uuid,
    to: String,
    subject: String,
    body: String,
    scheduled_for: DateTime<Utc>,
    attempts: u32,
}

/// Delay before retrying a failed send, doubling per attempt and capped at
/// an hour.
fn retry_delay(attempt: u32) -> Duration {
    let minutes = 2i64.pow(attempt.saturating_sub(1).min(6)).min(60);
    Duration::minutes(minutes)
}

impl NotificationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            mail_api_url: config.mail_api_url.clone(),
            mail_api_key: config.mail_api_key.clone(),
            mail_from: config.mail_from.clone(),
            http: reqwest::Client::new(),
            queue: Arc::new(RwLock::new(Vec::new())),
            dispatched: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Spawn the queue drain loop.
    pub fn start_background_tasks(&self) {
        let service = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(EMAIL_QUEUE_POLL_INTERVAL);
            loop {
                interval.tick().await;
                service.process_queue().await;
            }
        });
        info!("Notification queue worker started");
    }

    /// Queue the confirmation email for a booking. Queuing the same booking
    /// twice is a no-op, which keeps duplicate payment callbacks from
    /// producing duplicate mail.
    pub async fn queue_booking_confirmation(&self, booking: &Booking) {
        {
            let mut dispatched = self.dispatched.write().await;
            if !dispatched.insert(booking.id) {
                debug!("Confirmation for booking {} already queued", booking.id);
                return;
            }
        }

        let subject = format!(
            "Booking confirmed for {} {}",
            booking.first_name, booking.last_name
        );
        let body = format!(
            "Dear {} {},\n\nYour tour booking departing {} for {} people is confirmed.\nTotal: {}\n\nThank you for travelling with us.",
            booking.first_name,
            booking.last_name,
            booking.departure_date,
            booking.people,
            booking.total,
        );

        let mut queue = self.queue.write().await;
        queue.push(PendingEmail {
            id: Uuid::new_v4(),
            booking_id: booking.id,
            to: booking.email.clone(),
            subject,
            body,
            scheduled_for: Utc::now(),
            attempts: 0,
        });
        info!("Queued confirmation email for booking {}", booking.id);
    }

    async fn process_queue(&self) {
        let now = Utc::now();
        let due: Vec<PendingEmail> = {
            let mut queue = self.queue.write().await;
            let (ready, later): (Vec<_>, Vec<_>) =
                queue.drain(..).partition(|e| e.scheduled_for <= now);
            *queue = later;
            ready
        };

        for mut email in due {
            email.attempts += 1;
            match self.send_email(&email).await {
                Ok(()) => {
                    info!(
                        "Sent confirmation email for booking {} (attempt {})",
                        email.booking_id, email.attempts
                    );
                    self.forget(email.booking_id).await;
                }
                Err(e) if email.attempts < EMAIL_MAX_ATTEMPTS => {
                    warn!(
                        "Email send failed for booking {} (attempt {}): {}",
                        email.booking_id, email.attempts, e
                    );
                    email.scheduled_for = Utc::now() + retry_delay(email.attempts);
                    self.queue.write().await.push(email);
                }
                Err(e) => {
                    error!(
                        "Giving up on confirmation email for booking {} after {} attempts: {}",
                        email.booking_id, email.attempts, e
                    );
                    self.forget(email.booking_id).await;
                }
            }
        }
    }

    // Once an email has left the queue its dedup entry is no longer needed;
    // dropping it keeps the set bounded by the pending backlog.
    async fn forget(&self, booking_id: Uuid) {
        self.dispatched.write().await.remove(&booking_id);
    }

    async fn send_email(&self, email: &PendingEmail) -> Result<(), String> {
        let Some(api_url) = &self.mail_api_url else {
            debug!(
                "Mail provider not configured, dropping email {} to {}",
                email.id, email.to
            );
            return Ok(());
        };

        let mut request = self.http.post(api_url).json(&serde_json::json!({
            "from": self.mail_from,
            "to": email.to,
            "subject": email.subject,
            "text": email.body,
        }));
        if let Some(key) = &self.mail_api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("mail provider returned HTTP {}", response.status()));
        }

        Ok(())
    }

    #[cfg(test)]
    async fn queue_len(&self) -> usize {
        self.queue.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tour_platform_shared::{BookingStatus, PaymentMethod, PaymentStatus};

    fn service() -> NotificationService {
        NotificationService {
            mail_api_url: None,
            mail_api_key: None,
            mail_from: "bookings@example.com".to_string(),
            http: reqwest::Client::new(),
            queue: Arc::new(RwLock::new(Vec::new())),
            dispatched: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    fn booking() -> Booking {
        Booking {
            id: Uuid::new_v4(),
            tour_id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "0123456789".to_string(),
            address: "1 Analytical Way".to_string(),
            city: "London".to_string(),
            province: "Greater London".to_string(),
            country: "UK".to_string(),
            zipcode: "N1".to_string(),
            people: 2,
            departure_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            payment_method: PaymentMethod::Momo,
            payment_status: PaymentStatus::Paid,
            status: BookingStatus::Active,
            invoice_no: Some("MM1700000000".to_string()),
            transaction_id: Some("987654321".to_string()),
            deposit: Decimal::new(1500, 0),
            total: Decimal::new(1500, 0),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_queue_confirmation_once_per_booking() {
        let service = service();
        let booking = booking();

        service.queue_booking_confirmation(&booking).await;
        service.queue_booking_confirmation(&booking).await;

        assert_eq!(service.queue_len().await, 1);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_drains_queue() {
        let service = service();
        service.queue_booking_confirmation(&booking()).await;

        service.process_queue().await;

        assert_eq!(service.queue_len().await, 0);
    }

    #[tokio::test]
    async fn test_dedup_entry_evicted_after_send() {
        let service = service();
        let booking = booking();

        service.queue_booking_confirmation(&booking).await;
        service.process_queue().await;

        assert_eq!(service.dispatched.read().await.len(), 0);

        // A fresh confirmation for the same booking may queue again
        service.queue_booking_confirmation(&booking).await;
        assert_eq!(service.queue_len().await, 1);
    }

    #[tokio::test]
    async fn test_dedup_entry_kept_while_pending_retry() {
        let service = NotificationService {
            // Unroutable provider URL so the send fails and requeues
            mail_api_url: Some("http://127.0.0.1:1/send".to_string()),
            mail_api_key: None,
            mail_from: "bookings@example.com".to_string(),
            http: reqwest::Client::new(),
            queue: Arc::new(RwLock::new(Vec::new())),
            dispatched: Arc::new(RwLock::new(HashSet::new())),
        };
        let booking = booking();

        service.queue_booking_confirmation(&booking).await;
        service.process_queue().await;

        assert_eq!(service.queue_len().await, 1);
        assert_eq!(service.dispatched.read().await.len(), 1);
        // While the retry is pending, re-queuing stays a no-op
        service.queue_booking_confirmation(&booking).await;
        assert_eq!(service.queue_len().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_bookings_queue_separately() {
        let service = service();

        service.queue_booking_confirmation(&booking()).await;
        service.queue_booking_confirmation(&booking()).await;

        assert_eq!(service.queue_len().await, 2);
    }

    #[test]
    fn test_retry_delay_doubles_and_caps() {
        assert_eq!(retry_delay(1), Duration::minutes(1));
        assert_eq!(retry_delay(2), Duration::minutes(2));
        assert_eq!(retry_delay(3), Duration::minutes(4));
        assert_eq!(retry_delay(10), Duration::minutes(60));
    }
}
