use std::time::Duration;

// Invoice numbers handed to the payment gateway: prefix + epoch seconds
pub const INVOICE_PREFIX: &str = "MM";

// Booking constraints
pub const MIN_PEOPLE_PER_BOOKING: i32 = 1;
pub const MAX_PEOPLE_PER_BOOKING: i32 = 50;
pub const MAX_ROOMS_PER_LINE: i32 = 20;

// Payment gateway
pub const GATEWAY_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const GATEWAY_REQUEST_TYPE: &str = "captureWallet";
pub const GATEWAY_RESULT_SUCCESS: i32 = 0;

// Notification settings
pub const EMAIL_MAX_ATTEMPTS: u32 = 3;
pub const EMAIL_QUEUE_POLL_INTERVAL: Duration = Duration::from_secs(30);

// Database connection pool
pub const DB_MAX_CONNECTIONS: u32 = 20;
pub const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

// Success messages
pub const SUCCESS_BOOKING_CREATED: &str = "Booking created successfully";
pub const SUCCESS_CONTACT_SENT: &str = "Your message has been sent";
pub const SUCCESS_REVIEW_SENT: &str = "Your review has been submitted";

// Error messages
pub const ERROR_GATEWAY_UNAVAILABLE: &str =
    "The payment provider did not respond. Please try again later or choose another payment method";
pub const ERROR_ROOMS_UNAVAILABLE: &str = "Not enough rooms available for the selected date";
pub const ERROR_TOUR_NOT_FOUND: &str = "Tour not found";
