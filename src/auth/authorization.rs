use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::bookings as booking_db;
use crate::error::ServiceError;
use crate::models::bookings::{BookingStatus, Model};
use crate::models::users::User;

pub fn require_provider(user: &User) -> Result<(), ServiceError> {
    if user.is_provider() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "Only providers can perform this action".to_string(),
        ))
    }
}

/// Load a booking the user is a party to, as customer or provider.
pub async fn verify_booking_party(
    db: &DatabaseConnection,
    booking_id: Uuid,
    user_id: Uuid,
) -> Result<Model, ServiceError> {
    let booking = booking_db::get_booking_by_id(db, booking_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Booking {booking_id}")))?;

    if booking.user_id != user_id && booking.provider_id != user_id {
        return Err(ServiceError::Forbidden(
            "You are not a party to this booking".to_string(),
        ));
    }

    Ok(booking)
}

/// Either party may cancel; every other move belongs to the provider.
pub fn verify_status_change(
    booking: &Model,
    user_id: Uuid,
    next: BookingStatus,
) -> Result<(), ServiceError> {
    let allowed = match next {
        BookingStatus::Cancelled => booking.user_id == user_id || booking.provider_id == user_id,
        _ => booking.provider_id == user_id,
    };

    if allowed {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "You cannot mark this booking as {next}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn booking(customer: Uuid, provider: Uuid) -> Model {
        Model {
            id: Uuid::new_v4(),
            user_id: customer,
            service_id: Uuid::new_v4(),
            provider_id: provider,
            service_name: "Leak repair".to_string(),
            provider_name: "FixIt".to_string(),
            customer_name: None,
            booking_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            booking_time: "10:00 AM".to_string(),
            status: BookingStatus::Pending,
            price: 80.0,
            image: None,
            location: "Pune".to_string(),
            special_instructions: None,
            estimated_duration: None,
            requested_at: Utc::now(),
            responded_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_the_provider_approves() {
        let (customer, provider) = (Uuid::new_v4(), Uuid::new_v4());
        let b = booking(customer, provider);
        assert!(verify_status_change(&b, provider, BookingStatus::Approved).is_ok());
        assert!(verify_status_change(&b, customer, BookingStatus::Approved).is_err());
    }

    #[test]
    fn either_party_cancels() {
        let (customer, provider) = (Uuid::new_v4(), Uuid::new_v4());
        let b = booking(customer, provider);
        assert!(verify_status_change(&b, customer, BookingStatus::Cancelled).is_ok());
        assert!(verify_status_change(&b, provider, BookingStatus::Cancelled).is_ok());
        assert!(verify_status_change(&b, Uuid::new_v4(), BookingStatus::Cancelled).is_err());
    }
}
