pub mod availability_service;
pub mod booking_service;
pub mod notification_service;
pub mod payment_service;

pub use availability_service::AvailabilityService;
pub use booking_service::BookingService;
pub use notification_service::NotificationService;
pub use payment_service::PaymentService;
