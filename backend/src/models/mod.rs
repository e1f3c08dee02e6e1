//! Database models for the tour booking platform.
//!
//! Each model corresponds to a database table and provides type-safe
//! interactions with the database using sqlx.

pub mod booking;
pub mod contact;
pub mod review;
pub mod tour;

pub use booking::{Booking, BookingRoom, NewBooking, ReservedLine};
pub use contact::Contact;
pub use review::Review;
pub use tour::{Room, Tour};
