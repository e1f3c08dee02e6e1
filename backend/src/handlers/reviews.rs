use crate::database::Database;
use crate::error::AppError;
use crate::models::review::Review;
use crate::models::tour::Tour;
use actix_web::{web, HttpResponse, Result};
use tour_platform_shared::{MessageResponse, ReviewRequest, ERROR_TOUR_NOT_FOUND, SUCCESS_REVIEW_SENT};
use tracing::info;
use validator::Validate;

/// POST /api/v1/tours/{slug}/reviews
pub async fn create_review(
    db: web::Data<Database>,
    path: web::Path<String>,
    request: web::Json<ReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    request.validate()?;

    let tour = Tour::find_by_slug(db.pool(), &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(ERROR_TOUR_NOT_FOUND.to_string()))?;

    let review = Review::create(
        db.pool(),
        tour.id,
        &request.name,
        &request.email,
        request.rating,
        &request.body,
    )
    .await?;
    info!("Review {} recorded for tour {}", review.id, tour.slug);

    Ok(HttpResponse::Created().json(MessageResponse::new(SUCCESS_REVIEW_SENT)))
}
