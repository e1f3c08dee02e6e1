use super::*;

fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 8080,
        database_url: "postgres://localhost/tours_test".to_string(),
        public_base_url: "https://api.example.com".to_string(),
        frontend_base_url: "https://tours.example.com".to_string(),
        momo_endpoint: "https://gateway.example.com/v2/gateway/api/create".to_string(),
        momo_partner_code: "PARTNER".to_string(),
        momo_access_key: "access".to_string(),
        momo_secret_key: "secret".to_string(),
        mail_api_url: None,
        mail_api_key: None,
        mail_from: "bookings@example.com".to_string(),
    }
}

fn callback() -> PaymentCallback {
    PaymentCallback {
        partner_code: "PARTNER".to_string(),
        order_id: "MM1700000000".to_string(),
        request_id: "MM1700000000".to_string(),
        amount: 1500,
        order_info: "Tour booking payment, invoice MM1700000000".to_string(),
        order_type: "momo_wallet".to_string(),
        trans_id: 987654321,
        result_code: 0,
        message: "Successful.".to_string(),
        pay_type: "qr".to_string(),
        response_time: 1700000123,
        extra_data: String::new(),
        signature: String::new(),
    }
}

#[tokio::test]
async fn test_new_builds_service_from_config() {
    let config = test_config();
    let pool = PgPool::connect_lazy(&config.database_url).unwrap();
    let notifications = NotificationService::new(&config);

    let service = PaymentService::new(&config, pool, notifications).unwrap();

    assert_eq!(
        service.redirect_url,
        "https://api.example.com/payments/momo/redirect"
    );
    assert_eq!(service.ipn_url, "https://api.example.com/payments/momo/ipn");
}

#[test]
fn test_sign_is_deterministic() {
    let a = sign("secret", "accessKey=k&amount=10").unwrap();
    let b = sign("secret", "accessKey=k&amount=10").unwrap();

    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_sign_depends_on_key_and_payload() {
    let base = sign("secret", "accessKey=k&amount=10").unwrap();

    assert_ne!(base, sign("other", "accessKey=k&amount=10").unwrap());
    assert_ne!(base, sign("secret", "accessKey=k&amount=11").unwrap());
}

#[test]
fn test_callback_signature_round_trip() {
    let mut cb = callback();
    cb.signature = sign("secret", &callback_payload("access", &cb)).unwrap();

    let expected = sign("secret", &callback_payload("access", &cb)).unwrap();
    assert_eq!(expected, cb.signature);
}

#[test]
fn test_tampered_callback_changes_signature() {
    let cb = callback();
    let genuine = sign("secret", &callback_payload("access", &cb)).unwrap();

    let mut tampered = cb;
    tampered.amount = 1;
    let forged = sign("secret", &callback_payload("access", &tampered)).unwrap();

    assert_ne!(genuine, forged);
}

#[test]
fn test_purchase_request_uses_gateway_field_names() {
    let request = PurchaseRequest {
        partner_code: "PARTNER",
        access_key: "access",
        request_id: "MM1700000000",
        amount: "1500",
        order_id: "MM1700000000",
        order_info: "Tour booking payment, invoice MM1700000000",
        redirect_url: "https://example.com/payments/momo/redirect",
        ipn_url: "https://example.com/payments/momo/ipn",
        extra_data: "",
        request_type: GATEWAY_REQUEST_TYPE,
        lang: "en",
        signature: "abc123".to_string(),
    };
    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value["partnerCode"], "PARTNER");
    assert_eq!(value["requestId"], "MM1700000000");
    assert_eq!(value["orderId"], "MM1700000000");
    assert_eq!(value["redirectUrl"], "https://example.com/payments/momo/redirect");
    assert_eq!(value["ipnUrl"], "https://example.com/payments/momo/ipn");
    assert_eq!(value["requestType"], "captureWallet");
    // The gateway expects the amount as a string
    assert_eq!(value["amount"], "1500");
}

#[test]
fn test_callback_parses_from_notification_json() {
    let cb: PaymentCallback = serde_json::from_value(serde_json::json!({
        "partnerCode": "PARTNER",
        "orderId": "MM1700000000",
        "requestId": "MM1700000000",
        "amount": 1500,
        "orderInfo": "Tour booking payment, invoice MM1700000000",
        "orderType": "momo_wallet",
        "transId": 987654321i64,
        "resultCode": 0,
        "message": "Successful.",
        "payType": "qr",
        "responseTime": 1700000123i64,
        "extraData": "",
        "signature": "deadbeef"
    }))
    .unwrap();

    assert_eq!(cb.order_id, "MM1700000000");
    assert_eq!(cb.trans_id, 987654321);
    assert!(cb.is_success());
}

#[test]
fn test_callback_missing_optional_fields_defaults() {
    // The browser redirect may carry only a subset of the parameters
    let cb: PaymentCallback = serde_json::from_value(serde_json::json!({
        "orderId": "MM1700000000",
        "resultCode": 1006
    }))
    .unwrap();

    assert_eq!(cb.order_id, "MM1700000000");
    assert_eq!(cb.trans_id, 0);
    assert!(!cb.is_success());
}

#[test]
fn test_next_action_matrix() {
    assert_eq!(
        next_action(PaymentStatus::Unpaid, true),
        ReconcileAction::MarkPaid
    );
    assert_eq!(
        next_action(PaymentStatus::Unpaid, false),
        ReconcileAction::RecordFailure
    );
    assert_eq!(
        next_action(PaymentStatus::Paid, true),
        ReconcileAction::AlreadyPaid
    );
    assert_eq!(
        next_action(PaymentStatus::Paid, false),
        ReconcileAction::AlreadyPaid
    );
}
