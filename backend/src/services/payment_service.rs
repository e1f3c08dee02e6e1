use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::booking::Booking;
use crate::services::notification_service::NotificationService;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sqlx::PgPool;
use tour_platform_shared::{
    PaymentStatus, GATEWAY_REQUEST_TIMEOUT, GATEWAY_REQUEST_TYPE, GATEWAY_RESULT_SUCCESS,
};
use tracing::{info, warn};

#[cfg(test)]
mod tests;

type HmacSha256 = Hmac<Sha256>;

/// Payment service talks to the MoMo-style wallet gateway and applies its
/// outcomes to local bookings. Reconciliation is shared by the machine
/// callback and the browser redirect handler and is idempotent.
#[derive(Clone)]
pub struct PaymentService {
    db_pool: PgPool,
    notification_service: NotificationService,
    http: reqwest::Client,
    endpoint: String,
    partner_code: String,
    access_key: String,
    secret_key: String,
    redirect_url: String,
    ipn_url: String,
}

/// Accepted purchase: where to send the browser, plus the provider's raw
/// response which is echoed back to the client.
#[derive(Debug, Clone)]
pub struct Purchase {
    pub pay_url: String,
    pub raw_response: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PurchaseRequest<'a> {
    partner_code: &'a str,
    access_key: &'a str,
    request_id: &'a str,
    amount: &'a str,
    order_id: &'a str,
    order_info: &'a str,
    redirect_url: &'a str,
    ipn_url: &'a str,
    extra_data: &'a str,
    request_type: &'a str,
    lang: &'a str,
    signature: String,
}

/// Parameters the gateway delivers on both inbound paths: the server
/// notification posts them as JSON, the browser redirect carries them in the
/// query string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCallback {
    #[serde(default)]
    pub partner_code: String,
    pub order_id: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub order_info: String,
    #[serde(default)]
    pub order_type: String,
    #[serde(default)]
    pub trans_id: i64,
    pub result_code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub pay_type: String,
    #[serde(default)]
    pub response_time: i64,
    #[serde(default)]
    pub extra_data: String,
    #[serde(default)]
    pub signature: String,
}

impl PaymentCallback {
    pub fn is_success(&self) -> bool {
        self.result_code == GATEWAY_RESULT_SUCCESS
    }
}

/// Outcome of applying a gateway result to the local booking record.
#[derive(Debug)]
pub enum Reconciliation {
    /// This call transitioned the booking to paid.
    Confirmed(Booking),
    /// The booking was already paid; repeated delivery is success, not error.
    AlreadyPaid(Booking),
    /// The gateway reported a failed payment; the booking stays unpaid.
    PaymentFailed(Booking),
    /// No booking carries this invoice number.
    UnknownInvoice,
}

#[derive(Debug, PartialEq, Eq)]
enum ReconcileAction {
    MarkPaid,
    AlreadyPaid,
    RecordFailure,
}

/// Decide what a gateway outcome means for a booking in its current state.
/// A paid booking never transitions again, whatever the callback says.
fn next_action(current: PaymentStatus, success: bool) -> ReconcileAction {
    match (current, success) {
        (PaymentStatus::Paid, _) => ReconcileAction::AlreadyPaid,
        (PaymentStatus::Unpaid, true) => ReconcileAction::MarkPaid,
        (PaymentStatus::Unpaid, false) => ReconcileAction::RecordFailure,
    }
}

impl PaymentService {
    pub fn new(
        config: &AppConfig,
        db_pool: PgPool,
        notification_service: NotificationService,
    ) -> Result<Self, AppError> {
        // The gateway call must never hang past the request timeout
        let http = reqwest::Client::builder()
            .timeout(GATEWAY_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build gateway client: {e}")))?;

        Ok(Self {
            db_pool,
            notification_service,
            http,
            endpoint: config.momo_endpoint.clone(),
            partner_code: config.momo_partner_code.clone(),
            access_key: config.momo_access_key.clone(),
            secret_key: config.momo_secret_key.clone(),
            redirect_url: config.momo_redirect_url(),
            ipn_url: config.momo_ipn_url(),
        })
    }

    /// Send the purchase request for an invoice to the gateway. A transport
    /// failure, timeout or non-zero result code is a transient gateway
    /// error; the caller rolls back its local transaction.
    pub async fn purchase(&self, invoice_no: &str, amount: Decimal) -> Result<Purchase, AppError> {
        let amount = amount.round().to_string();
        let order_info = format!("Tour booking payment, invoice {invoice_no}");
        let request = self.build_purchase_request(invoice_no, &amount, &order_info)?;

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("purchase request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Gateway(format!(
                "gateway returned HTTP {}",
                response.status()
            )));
        }

        let raw_response: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("unreadable gateway response: {e}")))?;

        let result_code = raw_response
            .get("resultCode")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(-1) as i32;

        if result_code != GATEWAY_RESULT_SUCCESS {
            let message = raw_response
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("purchase rejected");
            return Err(AppError::Gateway(format!(
                "purchase rejected for {invoice_no}: {result_code} {message}"
            )));
        }

        let pay_url = raw_response
            .get("payUrl")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| AppError::Gateway("gateway response missing payUrl".to_string()))?
            .to_string();

        info!("Gateway accepted purchase for invoice {}", invoice_no);

        Ok(Purchase { pay_url, raw_response })
    }

    fn build_purchase_request<'a>(
        &'a self,
        invoice_no: &'a str,
        amount: &'a str,
        order_info: &'a str,
    ) -> Result<PurchaseRequest<'a>, AppError> {
        let payload = format!(
            "accessKey={}&amount={}&extraData=&ipnUrl={}&orderId={}&orderInfo={}&partnerCode={}&redirectUrl={}&requestId={}&requestType={}",
            self.access_key,
            amount,
            self.ipn_url,
            invoice_no,
            order_info,
            self.partner_code,
            self.redirect_url,
            invoice_no,
            GATEWAY_REQUEST_TYPE,
        );
        let signature = sign(&self.secret_key, &payload)?;

        Ok(PurchaseRequest {
            partner_code: &self.partner_code,
            access_key: &self.access_key,
            request_id: invoice_no,
            amount,
            order_id: invoice_no,
            order_info,
            redirect_url: &self.redirect_url,
            ipn_url: &self.ipn_url,
            extra_data: "",
            request_type: GATEWAY_REQUEST_TYPE,
            lang: "en",
            signature,
        })
    }

    /// Verify the HMAC the gateway attached to a server notification.
    pub fn verify_callback_signature(&self, callback: &PaymentCallback) -> Result<bool, AppError> {
        let expected = sign(&self.secret_key, &callback_payload(&self.access_key, callback))?;

        Ok(expected == callback.signature)
    }

    /// Apply a gateway outcome to the booking identified by `invoice_no`,
    /// exactly once. Safe under duplicate delivery and under the redirect
    /// and notification paths racing each other: the paid transition is a
    /// conditional update, and only the call that wins queues the
    /// confirmation email.
    pub async fn reconcile(
        &self,
        invoice_no: &str,
        success: bool,
        transaction_id: &str,
    ) -> Result<Reconciliation, AppError> {
        let Some(booking) = Booking::find_by_invoice(&self.db_pool, invoice_no).await? else {
            warn!("Payment callback for unknown invoice {}", invoice_no);
            return Ok(Reconciliation::UnknownInvoice);
        };

        match next_action(booking.payment_status, success) {
            ReconcileAction::AlreadyPaid => Ok(Reconciliation::AlreadyPaid(booking)),
            ReconcileAction::RecordFailure => {
                info!(
                    "Payment failed for invoice {} (booking {})",
                    invoice_no, booking.id
                );
                Ok(Reconciliation::PaymentFailed(booking))
            }
            ReconcileAction::MarkPaid => {
                let applied =
                    Booking::mark_paid(&self.db_pool, invoice_no, transaction_id).await?;
                if !applied {
                    // Lost the race to a concurrent confirmation
                    return Ok(Reconciliation::AlreadyPaid(booking));
                }

                let booking = Booking::find_by_invoice(&self.db_pool, invoice_no)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal(format!("booking vanished for invoice {invoice_no}"))
                    })?;

                info!(
                    "Booking {} marked paid via invoice {} (transaction {})",
                    booking.id, invoice_no, transaction_id
                );
                self.notification_service
                    .queue_booking_confirmation(&booking)
                    .await;

                Ok(Reconciliation::Confirmed(booking))
            }
        }
    }
}

/// Canonical string the gateway signs on callbacks: fields in alphabetical
/// order, joined as query pairs.
fn callback_payload(access_key: &str, callback: &PaymentCallback) -> String {
    format!(
        "accessKey={}&amount={}&extraData={}&message={}&orderId={}&orderInfo={}&orderType={}&partnerCode={}&payType={}&requestId={}&responseTime={}&resultCode={}&transId={}",
        access_key,
        callback.amount,
        callback.extra_data,
        callback.message,
        callback.order_id,
        callback.order_info,
        callback.order_type,
        callback.partner_code,
        callback.pay_type,
        callback.request_id,
        callback.response_time,
        callback.result_code,
        callback.trans_id,
    )
}

fn sign(secret: &str, payload: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("invalid HMAC key: {e}")))?;
    mac.update(payload.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}
