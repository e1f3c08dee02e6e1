use crate::database::Database;
use crate::error::AppError;
use crate::models::contact::Contact;
use actix_web::{web, HttpResponse, Result};
use tour_platform_shared::{ContactRequest, MessageResponse, SUCCESS_CONTACT_SENT};
use tracing::info;
use validator::Validate;

/// POST /api/v1/contact
pub async fn create_contact(
    db: web::Data<Database>,
    request: web::Json<ContactRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;

    let contact = Contact::create(
        db.pool(),
        &request.name,
        &request.email,
        &request.phone,
        &request.message,
    )
    .await?;
    info!("Contact message {} recorded", contact.id);

    Ok(HttpResponse::Created().json(MessageResponse::new(SUCCESS_CONTACT_SENT)))
}
