use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::bookings::{self, BookingStatus, NewBooking};

/// Insert a new booking (always Pending, request timestamp set now).
pub async fn insert_booking(
    db: &DatabaseConnection,
    input: NewBooking,
) -> Result<bookings::Model, DbErr> {
    let now = chrono::Utc::now();

    let new_booking = bookings::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(input.user_id),
        service_id: Set(input.service_id),
        provider_id: Set(input.provider_id),
        service_name: Set(input.service_name),
        provider_name: Set(input.provider_name),
        customer_name: Set(input.customer_name),
        booking_date: Set(input.booking_date),
        booking_time: Set(input.booking_time),
        status: Set(BookingStatus::Pending),
        price: Set(input.price),
        image: Set(input.image),
        location: Set(input.location),
        special_instructions: Set(input.special_instructions),
        estimated_duration: Set(input.estimated_duration),
        requested_at: Set(now),
        responded_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    new_booking.insert(db).await
}

/// Fetch a single booking by ID.
pub async fn get_booking_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<bookings::Model>, DbErr> {
    bookings::Entity::find_by_id(id).one(db).await
}

/// Bookings requested by a customer, newest request first.
pub async fn get_bookings_by_user(
    db: &DatabaseConnection,
    user_id: Uuid,
    limit: u64,
) -> Result<Vec<bookings::Model>, DbErr> {
    bookings::Entity::find()
        .filter(bookings::Column::UserId.eq(user_id))
        .order_by_desc(bookings::Column::RequestedAt)
        .order_by_desc(bookings::Column::Id)
        .limit(limit)
        .all(db)
        .await
}

/// Bookings addressed to a provider, newest request first, optionally only one status.
pub async fn get_bookings_by_provider(
    db: &DatabaseConnection,
    provider_id: Uuid,
    status: Option<BookingStatus>,
    limit: u64,
) -> Result<Vec<bookings::Model>, DbErr> {
    let mut query = bookings::Entity::find().filter(bookings::Column::ProviderId.eq(provider_id));

    if let Some(status) = status {
        query = query.filter(bookings::Column::Status.eq(status));
    }

    query
        .order_by_desc(bookings::Column::RequestedAt)
        .order_by_desc(bookings::Column::Id)
        .limit(limit)
        .all(db)
        .await
}

/// Every booking addressed to a provider, for dashboard aggregates.
pub async fn get_all_bookings_by_provider(
    db: &DatabaseConnection,
    provider_id: Uuid,
) -> Result<Vec<bookings::Model>, DbErr> {
    bookings::Entity::find()
        .filter(bookings::Column::ProviderId.eq(provider_id))
        .all(db)
        .await
}

/// Number of completed bookings addressed to a provider.
pub async fn count_completed_for_provider(
    db: &DatabaseConnection,
    provider_id: Uuid,
) -> Result<u64, DbErr> {
    bookings::Entity::find()
        .filter(bookings::Column::ProviderId.eq(provider_id))
        .filter(bookings::Column::Status.eq(BookingStatus::Completed))
        .count(db)
        .await
}

/// Move a booking from `expected` to `next` in a single conditional write.
///
/// Returns the number of rows changed: 0 means the booking was missing or its
/// status was no longer `expected`.
pub async fn compare_and_set_status(
    db: &DatabaseConnection,
    id: Uuid,
    expected: BookingStatus,
    next: BookingStatus,
    responded_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<u64, DbErr> {
    let mut update = bookings::Entity::update_many()
        .col_expr(bookings::Column::Status, Expr::value(next))
        .col_expr(bookings::Column::UpdatedAt, Expr::value(chrono::Utc::now()));

    if let Some(responded_at) = responded_at {
        update = update.col_expr(bookings::Column::RespondedAt, Expr::value(responded_at));
    }

    let result = update
        .filter(bookings::Column::Id.eq(id))
        .filter(bookings::Column::Status.eq(expected))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
