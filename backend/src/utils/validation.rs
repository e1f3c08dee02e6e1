use crate::error::FieldError;
use validator::ValidationErrors;

/// Human-readable label for a form field, as shown in error messages on the
/// booking form.
pub fn field_label(field: &str) -> &'static str {
    match field {
        "first_name" => "first name",
        "last_name" => "last name",
        "email" => "email address",
        "phone" => "phone number",
        "people" => "number of people",
        "departure_date" => "departure date",
        "payment_method" => "payment method",
        "address" => "address",
        "city" => "city",
        "province" => "district",
        "country" => "country",
        "zipcode" => "zip code",
        "rooms" => "rooms",
        "room_id" => "room",
        "quantity" => "room quantity",
        "name" => "name",
        "subject" => "subject",
        "message" => "message",
        "rating" => "rating",
        "body" => "review",
        _ => "field",
    }
}

/// Flatten validator's error tree into one entry per offending field.
pub fn to_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        let label = field_label(field);
        for error in field_errors {
            let message = match error.message.as_deref() {
                Some(custom) => custom.to_string(),
                None => match error.code.as_ref() {
                    "email" => format!("The {label} must be a valid email address"),
                    "length" => format!("The {label} has an invalid length"),
                    "range" => format!("The {label} is out of range"),
                    _ => format!("The {label} is invalid"),
                },
            };
            fields.push(FieldError {
                field: field.to_string(),
                label: label.to_string(),
                message,
            });
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use tour_platform_shared::RoomSelection;
    use validator::Validate;

    #[test]
    fn test_known_fields_get_friendly_labels() {
        assert_eq!(field_label("first_name"), "first name");
        assert_eq!(field_label("province"), "district");
        assert_eq!(field_label("zipcode"), "zip code");
        assert_eq!(field_label("something_else"), "field");
    }

    #[test]
    fn test_field_errors_carry_field_and_label() {
        let selection = RoomSelection {
            room_id: uuid::Uuid::new_v4(),
            quantity: 0,
        };
        let errors = selection.validate().unwrap_err();

        let fields = to_field_errors(&errors);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "quantity");
        assert_eq!(fields[0].label, "room quantity");
        assert!(fields[0].message.contains("room quantity"));
    }
}
