use sea_orm::*;
use uuid::Uuid;

use crate::models::reviews::{self, NewReview};

/// Insert a new review.
pub async fn insert_review(
    db: &DatabaseConnection,
    input: NewReview,
) -> Result<reviews::Model, DbErr> {
    let new_review = reviews::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(input.user_id),
        provider_id: Set(input.provider_id),
        service_id: Set(Some(input.service_id)),
        booking_id: Set(input.booking_id),
        rating: Set(input.rating),
        comment: Set(input.comment),
        user_name: Set(input.user_name),
        user_avatar: Set(input.user_avatar),
        verified: Set(input.verified),
        created_at: Set(chrono::Utc::now()),
    };

    new_review.insert(db).await
}

/// Reviews for a service, newest first.
pub async fn get_reviews_by_service(
    db: &DatabaseConnection,
    service_id: Uuid,
) -> Result<Vec<reviews::Model>, DbErr> {
    reviews::Entity::find()
        .filter(reviews::Column::ServiceId.eq(service_id))
        .order_by_desc(reviews::Column::CreatedAt)
        .all(db)
        .await
}

/// Whether a review already exists for this booking.
pub async fn review_exists_for_booking(
    db: &DatabaseConnection,
    booking_id: Uuid,
) -> Result<bool, DbErr> {
    let count = reviews::Entity::find()
        .filter(reviews::Column::BookingId.eq(booking_id))
        .count(db)
        .await?;

    Ok(count > 0)
}

/// Average rating (one decimal) and count over all reviews of a service.
pub async fn rating_summary(
    db: &DatabaseConnection,
    service_id: Uuid,
) -> Result<(f64, i32), DbErr> {
    let rows = get_reviews_by_service(db, service_id).await?;
    Ok(summarize(&rows))
}

/// Average rating (one decimal) over every review a provider received.
pub async fn provider_rating(db: &DatabaseConnection, provider_id: Uuid) -> Result<f64, DbErr> {
    let rows = reviews::Entity::find()
        .filter(reviews::Column::ProviderId.eq(provider_id))
        .all(db)
        .await?;
    Ok(summarize(&rows).0)
}

fn summarize(rows: &[reviews::Model]) -> (f64, i32) {
    if rows.is_empty() {
        return (0.0, 0);
    }

    let total: i32 = rows.iter().map(|r| r.rating).sum();
    let average = f64::from(total) / rows.len() as f64;
    ((average * 10.0).round() / 10.0, rows.len() as i32)
}
