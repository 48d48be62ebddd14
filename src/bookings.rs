//! Booking lifecycle: creation, status transitions, listings and the derived
//! views built on top of them.
//!
//! Status writes are compare-and-set on the status the transition was checked
//! against, so a booking that reached a terminal state stays there even when two
//! requests race.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::authorization;
use crate::db::{bookings as booking_db, services as service_db, users as user_db};
use crate::error::ServiceError;
use crate::models::bookings::{Booking, BookingStatus, CreateBooking, NewBooking};
use crate::models::users::{self, User};

pub const LIST_LIMIT: u64 = 20;
pub const PENDING_LIMIT: u64 = 10;

/// Create a pending booking for `customer`, snapshotting the service and
/// provider as they are right now.
pub async fn create_booking(
    db: &DatabaseConnection,
    customer: &User,
    input: CreateBooking,
) -> Result<Booking, ServiceError> {
    if input.time.trim().is_empty() {
        return Err(ServiceError::Validation("Booking time is required".to_string()));
    }

    let service = service_db::get_service_by_id(db, input.service_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Service {}", input.service_id)))?;

    if !service.is_active {
        return Err(ServiceError::Validation(
            "This service is not accepting bookings".to_string(),
        ));
    }
    if service.provider_id == customer.id {
        return Err(ServiceError::Forbidden(
            "You cannot book your own service".to_string(),
        ));
    }

    let provider = user_db::get_user_by_id(db, service.provider_id)
        .await?
        .ok_or_else(|| {
            ServiceError::unresolved(
                "provider",
                service.provider_id.to_string(),
                "the service's provider no longer exists",
            )
        })?;

    let customer_row = user_db::ensure_user(db, users::Model::from(customer.clone())).await?;

    let row = booking_db::insert_booking(
        db,
        NewBooking {
            user_id: customer_row.id,
            service_id: service.id,
            provider_id: provider.id,
            service_name: service.title,
            provider_name: provider.name,
            customer_name: Some(customer_row.name),
            booking_date: input.date,
            booking_time: input.time,
            price: service.price,
            image: service.images.first().cloned(),
            location: service.location,
            special_instructions: input.special_instructions,
            estimated_duration: input.estimated_duration,
        },
    )
    .await?;

    tracing::info!(booking_id = %row.id, service_id = %row.service_id, "booking requested");
    Ok(row.into())
}

/// Move a booking to `next` on behalf of `actor`.
///
/// Asking for the status the booking already has returns it unchanged. The
/// response timestamp is stamped on the first move into approved, rejected or
/// cancelled and never rewritten.
pub async fn transition(
    db: &DatabaseConnection,
    actor: &User,
    id: Uuid,
    next: BookingStatus,
) -> Result<Booking, ServiceError> {
    let current = authorization::verify_booking_party(db, id, actor.id).await?;
    authorization::verify_status_change(&current, actor.id, next)?;

    if current.status == next {
        return Ok(current.into());
    }
    if !current.status.can_transition_to(next) {
        return Err(ServiceError::InvalidTransition {
            from: current.status,
            to: next,
        });
    }

    let responded_at = (next.is_response() && current.responded_at.is_none()).then(Utc::now);

    let changed =
        booking_db::compare_and_set_status(db, id, current.status, next, responded_at).await?;
    if changed == 0 {
        return Err(ServiceError::Conflict(format!(
            "Booking {id} was updated concurrently; reload and try again"
        )));
    }

    let updated = booking_db::get_booking_by_id(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Booking {id}")))?;

    tracing::info!(booking_id = %id, from = %current.status, to = %next, "booking status changed");
    if next == BookingStatus::Completed {
        refresh_completed_jobs(db, updated.provider_id).await;
    }
    Ok(updated.into())
}

/// Recount the provider's completed jobs. The status change already happened,
/// so a failure here is logged rather than returned.
async fn refresh_completed_jobs(db: &DatabaseConnection, provider_id: Uuid) {
    let result = match booking_db::count_completed_for_provider(db, provider_id).await {
        Ok(count) => user_db::set_completed_jobs(db, provider_id, count as i32).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::warn!(%provider_id, "Failed to refresh completed jobs: {e}");
    }
}

pub async fn approve(db: &DatabaseConnection, actor: &User, id: Uuid) -> Result<Booking, ServiceError> {
    transition(db, actor, id, BookingStatus::Approved).await
}

pub async fn reject(db: &DatabaseConnection, actor: &User, id: Uuid) -> Result<Booking, ServiceError> {
    transition(db, actor, id, BookingStatus::Rejected).await
}

/// A booking the user is a party to.
pub async fn get_for_party(
    db: &DatabaseConnection,
    actor: &User,
    id: Uuid,
) -> Result<Booking, ServiceError> {
    authorization::verify_booking_party(db, id, actor.id)
        .await
        .map(Booking::from)
}

pub async fn list_for_user(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<Booking>, ServiceError> {
    let rows = booking_db::get_bookings_by_user(db, user_id, LIST_LIMIT).await?;
    Ok(rows.into_iter().map(Booking::from).collect())
}

pub async fn list_for_provider(
    db: &DatabaseConnection,
    provider_id: Uuid,
) -> Result<Vec<Booking>, ServiceError> {
    let rows = booking_db::get_bookings_by_provider(db, provider_id, None, LIST_LIMIT).await?;
    Ok(rows.into_iter().map(Booking::from).collect())
}

/// Requests still waiting on the provider.
pub async fn pending_requests(
    db: &DatabaseConnection,
    provider_id: Uuid,
) -> Result<Vec<Booking>, ServiceError> {
    let rows = booking_db::get_bookings_by_provider(
        db,
        provider_id,
        Some(BookingStatus::Pending),
        PENDING_LIMIT,
    )
    .await?;
    Ok(rows.into_iter().map(Booking::from).collect())
}

// ── Derived views ──

/// Where a booking shows up in the customer's list. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingBucket {
    Upcoming,
    Past,
    Cancelled,
}

impl FromStr for BookingBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(BookingBucket::Upcoming),
            "past" => Ok(BookingBucket::Past),
            "cancelled" => Ok(BookingBucket::Cancelled),
            other => Err(format!("unknown booking bucket '{other}'")),
        }
    }
}

pub fn classify(booking: &Booking, today: NaiveDate) -> BookingBucket {
    if booking.status == BookingStatus::Cancelled {
        BookingBucket::Cancelled
    } else if booking.date < today {
        BookingBucket::Past
    } else {
        BookingBucket::Upcoming
    }
}

pub fn in_bucket(bookings: Vec<Booking>, bucket: BookingBucket, today: NaiveDate) -> Vec<Booking> {
    bookings
        .into_iter()
        .filter(|b| classify(b, today) == bucket)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_services: usize,
    pub active_bookings: usize,
    pub completed_jobs: usize,
    /// Sum of completed bookings dated in the current month.
    pub monthly_earnings: f64,
}

pub fn dashboard_stats(bookings: &[Booking], total_services: usize, today: NaiveDate) -> DashboardStats {
    let completed = || {
        bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Completed)
    };

    DashboardStats {
        total_services,
        active_bookings: bookings.iter().filter(|b| b.status.is_active()).count(),
        completed_jobs: completed().count(),
        monthly_earnings: completed()
            .filter(|b| b.date.year() == today.year() && b.date.month() == today.month())
            .map(|b| b.price)
            .sum(),
    }
}

pub async fn provider_dashboard(
    db: &DatabaseConnection,
    provider_id: Uuid,
    today: NaiveDate,
) -> Result<DashboardStats, ServiceError> {
    let services = service_db::get_services_by_provider(db, provider_id).await?;
    let bookings: Vec<Booking> = booking_db::get_all_bookings_by_provider(db, provider_id)
        .await?
        .into_iter()
        .map(Booking::from)
        .collect();

    Ok(dashboard_stats(&bookings, services.len(), today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    fn booking(status: BookingStatus, date: NaiveDate, price: f64) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            service_name: "Sofa shampoo".to_string(),
            provider_name: "CleanCo".to_string(),
            customer_name: None,
            date,
            time: "11:00 AM".to_string(),
            status,
            price,
            image: None,
            location: "Thane".to_string(),
            special_instructions: None,
            estimated_duration: None,
            requested_at: Utc::now(),
            responded_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn every_booking_lands_in_exactly_one_bucket() {
        let today = day(2025, 6, 15);
        let dates = [day(2025, 6, 14), today, day(2025, 6, 16)];
        let buckets = [
            BookingBucket::Upcoming,
            BookingBucket::Past,
            BookingBucket::Cancelled,
        ];

        for status in BookingStatus::iter() {
            for date in dates {
                let b = booking(status, date, 10.0);
                let hits = buckets
                    .iter()
                    .filter(|bucket| classify(&b, today) == **bucket)
                    .count();
                assert_eq!(hits, 1, "{status} on {date}");
            }
        }
    }

    #[test]
    fn completed_in_the_future_is_upcoming_not_past() {
        let today = day(2025, 6, 15);
        let b = booking(BookingStatus::Completed, day(2025, 6, 20), 10.0);
        assert_eq!(classify(&b, today), BookingBucket::Upcoming);
    }

    #[test]
    fn cancelled_wins_over_date() {
        let today = day(2025, 6, 15);
        let b = booking(BookingStatus::Cancelled, day(2025, 1, 1), 10.0);
        assert_eq!(classify(&b, today), BookingBucket::Cancelled);
        assert!(in_bucket(vec![b], BookingBucket::Past, today).is_empty());
    }

    #[test]
    fn today_counts_as_upcoming() {
        let today = day(2025, 6, 15);
        let b = booking(BookingStatus::Approved, today, 10.0);
        assert_eq!(classify(&b, today), BookingBucket::Upcoming);
    }

    #[test]
    fn dashboard_counts_and_monthly_earnings() {
        let today = day(2025, 6, 15);
        let bookings = vec![
            booking(BookingStatus::Pending, day(2025, 6, 20), 50.0),
            booking(BookingStatus::Approved, day(2025, 6, 21), 60.0),
            booking(BookingStatus::InProgress, day(2025, 6, 15), 70.0),
            booking(BookingStatus::Completed, day(2025, 6, 2), 100.0),
            booking(BookingStatus::Completed, day(2025, 6, 10), 150.5),
            booking(BookingStatus::Completed, day(2025, 5, 30), 999.0),
            booking(BookingStatus::Completed, day(2024, 6, 10), 999.0),
            booking(BookingStatus::Rejected, day(2025, 6, 3), 40.0),
            booking(BookingStatus::Cancelled, day(2025, 6, 4), 40.0),
        ];

        let stats = dashboard_stats(&bookings, 3, today);
        assert_eq!(
            stats,
            DashboardStats {
                total_services: 3,
                active_bookings: 3,
                completed_jobs: 4,
                monthly_earnings: 250.5,
            }
        );
    }

    #[test]
    fn bucket_names_parse() {
        assert_eq!("past".parse::<BookingBucket>(), Ok(BookingBucket::Past));
        assert!("completed".parse::<BookingBucket>().is_err());
    }
}
