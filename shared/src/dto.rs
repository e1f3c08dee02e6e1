use crate::types::*;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

// Booking DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoomSelection {
    pub room_id: Uuid,

    #[validate(range(min = 1, max = 20))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 20))]
    pub phone: String,

    #[validate(range(min = 1, max = 50))]
    pub people: i32,

    pub departure_date: NaiveDate,

    pub payment_method: PaymentMethod,

    #[validate(length(min = 1, max = 255))]
    pub address: String,

    #[validate(length(min = 1, max = 100))]
    pub city: String,

    #[validate(length(min = 1, max = 100))]
    pub province: String,

    #[validate(length(min = 1, max = 100))]
    pub country: String,

    #[validate(length(min = 1, max = 20))]
    pub zipcode: String,

    #[validate(length(min = 1))]
    pub rooms: Vec<RoomSelection>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub departure_date: NaiveDate,
    pub people: i32,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: BookingStatus,
    pub invoice_no: Option<String>,
    pub total: Decimal,
    pub deposit: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Returned when an electronic booking needs a browser hop to the gateway.
/// `response` echoes the provider's raw JSON for the client.
#[derive(Debug, Serialize, Deserialize)]
pub struct ElectronicPaymentResponse {
    pub url: String,
    pub response: serde_json::Value,
}

// Availability DTOs
#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub date: NaiveDate,
    pub room_available: HashMap<Uuid, i32>,
}

// Contact DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 20))]
    pub phone: String,

    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

// Review DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(range(min = 1, max = 5))]
    pub rating: i32,

    #[validate(length(min = 1, max = 5000))]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        MAX_PEOPLE_PER_BOOKING, MAX_ROOMS_PER_LINE, MIN_PEOPLE_PER_BOOKING,
    };

    fn valid_request() -> CreateBookingRequest {
        CreateBookingRequest {
            first_name: "Linh".to_string(),
            last_name: "Tran".to_string(),
            email: "linh@example.com".to_string(),
            phone: "0901234567".to_string(),
            people: 2,
            departure_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            payment_method: PaymentMethod::Cash,
            address: "12 Hai Ba Trung".to_string(),
            city: "Da Nang".to_string(),
            province: "Hai Chau".to_string(),
            country: "Vietnam".to_string(),
            zipcode: "550000".to_string(),
            rooms: vec![RoomSelection { room_id: Uuid::new_v4(), quantity: 1 }],
        }
    }

    #[test]
    fn test_availability_response_shape() {
        let mut room_available = HashMap::new();
        let room_id = Uuid::nil();
        room_available.insert(room_id, 3);

        let response = AvailabilityResponse {
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            room_available,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["date"], "2024-06-10");
        assert_eq!(json["room_available"][room_id.to_string()], 3);
    }

    #[test]
    fn test_booking_request_rejects_empty_rooms() {
        let mut request = valid_request();
        request.rooms = vec![];

        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("rooms"));
    }

    #[test]
    fn test_people_limits_match_constants() {
        let mut request = valid_request();

        request.people = MAX_PEOPLE_PER_BOOKING;
        assert!(request.validate().is_ok());

        request.people = MAX_PEOPLE_PER_BOOKING + 1;
        assert!(request.validate().is_err());

        request.people = MIN_PEOPLE_PER_BOOKING - 1;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_room_quantity_limit_matches_constant() {
        let mut selection = RoomSelection {
            room_id: Uuid::new_v4(),
            quantity: MAX_ROOMS_PER_LINE,
        };
        assert!(selection.validate().is_ok());

        selection.quantity = MAX_ROOMS_PER_LINE + 1;
        assert!(selection.validate().is_err());
    }

    #[test]
    fn test_room_selection_rejects_zero_quantity() {
        let selection = RoomSelection { room_id: Uuid::new_v4(), quantity: 0 };
        assert!(selection.validate().is_err());

        let selection = RoomSelection { room_id: Uuid::new_v4(), quantity: 2 };
        assert!(selection.validate().is_ok());
    }
}
