pub mod bookings;
pub mod contact;
pub mod health;
pub mod payments;
pub mod reviews;
