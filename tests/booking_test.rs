mod common;

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::DatabaseConnection;

use servicewala_backend::bookings;
use servicewala_backend::db::{
    bookings as booking_db, services as service_db, users as user_db,
};
use servicewala_backend::error::ServiceError;
use servicewala_backend::models::bookings::{BookingStatus, CreateBooking};
use servicewala_backend::models::services::{NewService, PriceType, UpdateService};
use servicewala_backend::models::users::{Roles, User};

use common::{insert_category, insert_user, setup_db, unsaved_user};

struct Fixture {
    db: DatabaseConnection,
    provider: User,
    customer: User,
    service_id: uuid::Uuid,
}

async fn fixture() -> Fixture {
    let db = setup_db().await;
    let provider = insert_user(&db, "prov-fixit", "FixIt Fast", Roles::Provider).await;
    let customer = insert_user(&db, "client-ravi", "Ravi", Roles::Client).await;
    let category = insert_category(&db, "Plumbing").await;

    let service = service_db::insert_service(
        &db,
        NewService {
            provider_id: provider.id,
            category_id: category.id,
            title: "Leak Repair".to_string(),
            description: "Fix leaking pipes and taps".to_string(),
            price: 120.0,
            price_type: PriceType::Fixed,
            duration: Some("1 hour".to_string()),
            location: "City Wide".to_string(),
            city: Some("Pune".to_string()),
            state: Some("Maharashtra".to_string()),
            images: vec!["https://img.example.com/leak.jpg".to_string()],
            availability: vec!["Monday".to_string()],
            tags: vec!["plumbing".to_string()],
        },
    )
    .await
    .unwrap();

    Fixture {
        db,
        provider,
        customer,
        service_id: service.id,
    }
}

fn request(service_id: uuid::Uuid, date: NaiveDate) -> CreateBooking {
    CreateBooking {
        service_id,
        date,
        time: "2:00 PM".to_string(),
        special_instructions: Some("Ring twice".to_string()),
        estimated_duration: Some(60),
        status: None,
    }
}

fn tomorrow() -> NaiveDate {
    Utc::now().date_naive() + Duration::days(1)
}

#[tokio::test]
async fn new_bookings_are_pending_with_a_snapshot() {
    let f = fixture().await;
    let mut input = request(f.service_id, tomorrow());
    input.status = Some(BookingStatus::Completed);

    let booking = bookings::create_booking(&f.db, &f.customer, input).await.unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.service_name, "Leak Repair");
    assert_eq!(booking.provider_name, "FixIt Fast");
    assert_eq!(booking.customer_name.as_deref(), Some("Ravi"));
    assert_eq!(booking.price, 120.0);
    assert_eq!(booking.image.as_deref(), Some("https://img.example.com/leak.jpg"));
    assert_eq!(booking.location, "City Wide");
    assert_eq!(booking.provider_id, f.provider.id);
    assert!(booking.responded_at.is_none());
}

#[tokio::test]
async fn approving_twice_is_a_no_op() {
    let f = fixture().await;
    let booking = bookings::create_booking(&f.db, &f.customer, request(f.service_id, tomorrow()))
        .await
        .unwrap();

    let approved = bookings::approve(&f.db, &f.provider, booking.id).await.unwrap();
    assert_eq!(approved.status, BookingStatus::Approved);
    let responded_at = approved.responded_at.expect("response should be stamped");

    let again = bookings::approve(&f.db, &f.provider, booking.id).await.unwrap();
    assert_eq!(again.status, BookingStatus::Approved);
    assert_eq!(again.responded_at, Some(responded_at));
}

#[tokio::test]
async fn response_timestamp_is_stamped_once() {
    let f = fixture().await;
    let booking = bookings::create_booking(&f.db, &f.customer, request(f.service_id, tomorrow()))
        .await
        .unwrap();

    let approved = bookings::approve(&f.db, &f.provider, booking.id).await.unwrap();
    let cancelled = bookings::transition(&f.db, &f.customer, booking.id, BookingStatus::Cancelled)
        .await
        .unwrap();

    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(cancelled.responded_at, approved.responded_at);
}

#[tokio::test]
async fn terminal_bookings_never_change() {
    let f = fixture().await;
    let booking = bookings::create_booking(&f.db, &f.customer, request(f.service_id, tomorrow()))
        .await
        .unwrap();
    bookings::reject(&f.db, &f.provider, booking.id).await.unwrap();

    for next in [
        BookingStatus::Pending,
        BookingStatus::Approved,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ] {
        let err = bookings::transition(&f.db, &f.provider, booking.id, next)
            .await
            .unwrap_err();
        assert!(
            matches!(err, ServiceError::InvalidTransition { from: BookingStatus::Rejected, .. }),
            "rejected -> {next} should be refused, got {err:?}"
        );
    }

    let stored = bookings::get_for_party(&f.db, &f.customer, booking.id).await.unwrap();
    assert_eq!(stored.status, BookingStatus::Rejected);
}

#[tokio::test]
async fn full_lifecycle_to_completion() {
    let f = fixture().await;
    let booking = bookings::create_booking(&f.db, &f.customer, request(f.service_id, tomorrow()))
        .await
        .unwrap();

    for next in [
        BookingStatus::Approved,
        BookingStatus::InProgress,
        BookingStatus::Completed,
    ] {
        let moved = bookings::transition(&f.db, &f.provider, booking.id, next).await.unwrap();
        assert_eq!(moved.status, next);
    }

    let skip = bookings::create_booking(&f.db, &f.customer, request(f.service_id, tomorrow()))
        .await
        .unwrap();
    let err = bookings::transition(&f.db, &f.provider, skip.id, BookingStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidTransition { .. }));
}

#[tokio::test]
async fn completing_a_job_updates_the_provider_profile() {
    let f = fixture().await;

    for expected in 1..=2 {
        let booking = bookings::create_booking(&f.db, &f.customer, request(f.service_id, tomorrow()))
            .await
            .unwrap();
        for next in [
            BookingStatus::Approved,
            BookingStatus::InProgress,
            BookingStatus::Completed,
        ] {
            bookings::transition(&f.db, &f.provider, booking.id, next).await.unwrap();
        }

        let profile = user_db::get_user_by_id(&f.db, f.provider.id).await.unwrap().unwrap();
        assert_eq!(profile.completed_jobs, expected);
    }

    // Cancelled work does not count.
    let booking = bookings::create_booking(&f.db, &f.customer, request(f.service_id, tomorrow()))
        .await
        .unwrap();
    bookings::transition(&f.db, &f.customer, booking.id, BookingStatus::Cancelled)
        .await
        .unwrap();
    let profile = user_db::get_user_by_id(&f.db, f.provider.id).await.unwrap().unwrap();
    assert_eq!(profile.completed_jobs, 2);
}

#[tokio::test]
async fn stale_status_write_changes_nothing() {
    let f = fixture().await;
    let booking = bookings::create_booking(&f.db, &f.customer, request(f.service_id, tomorrow()))
        .await
        .unwrap();
    bookings::reject(&f.db, &f.provider, booking.id).await.unwrap();

    // A writer that still believes the booking is pending loses.
    let changed = booking_db::compare_and_set_status(
        &f.db,
        booking.id,
        BookingStatus::Pending,
        BookingStatus::Approved,
        Some(Utc::now()),
    )
    .await
    .unwrap();
    assert_eq!(changed, 0);

    let stored = booking_db::get_booking_by_id(&f.db, booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Rejected);
}

#[tokio::test]
async fn only_the_provider_responds_but_either_party_cancels() {
    let f = fixture().await;
    let booking = bookings::create_booking(&f.db, &f.customer, request(f.service_id, tomorrow()))
        .await
        .unwrap();

    let err = bookings::approve(&f.db, &f.customer, booking.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let stranger = insert_user(&f.db, "client-other", "Other", Roles::Client).await;
    let err = bookings::get_for_party(&f.db, &stranger, booking.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let cancelled = bookings::transition(&f.db, &f.customer, booking.id, BookingStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert!(cancelled.responded_at.is_some());
}

#[tokio::test]
async fn providers_cannot_book_their_own_service() {
    let f = fixture().await;
    let err = bookings::create_booking(&f.db, &f.provider, request(f.service_id, tomorrow()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn inactive_services_take_no_bookings() {
    let f = fixture().await;
    service_db::update_service(
        &f.db,
        f.service_id,
        UpdateService {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = bookings::create_booking(&f.db, &f.customer, request(f.service_id, tomorrow()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn missing_service_is_not_found() {
    let f = fixture().await;
    let err = bookings::create_booking(&f.db, &f.customer, request(uuid::Uuid::new_v4(), tomorrow()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn first_booking_stores_an_unsaved_customer() {
    let f = fixture().await;
    let newcomer = unsaved_user("client-newcomer", "Nisha");

    let booking = bookings::create_booking(&f.db, &newcomer, request(f.service_id, tomorrow()))
        .await
        .unwrap();

    let stored = user_db::get_user_by_id(&f.db, newcomer.id).await.unwrap();
    assert!(stored.is_some());
    assert_eq!(booking.user_id, newcomer.id);
}

#[tokio::test]
async fn listings_are_capped_and_newest_first() {
    let f = fixture().await;
    for i in 0..25 {
        bookings::create_booking(
            &f.db,
            &f.customer,
            request(f.service_id, tomorrow() + Duration::days(i)),
        )
        .await
        .unwrap();
    }

    let mine = bookings::list_for_user(&f.db, f.customer.id).await.unwrap();
    assert_eq!(mine.len(), 20);
    assert!(mine.windows(2).all(|w| w[0].requested_at >= w[1].requested_at));

    let incoming = bookings::list_for_provider(&f.db, f.provider.id).await.unwrap();
    assert_eq!(incoming.len(), 20);

    let pending = bookings::pending_requests(&f.db, f.provider.id).await.unwrap();
    assert_eq!(pending.len(), 10);
    assert!(pending.iter().all(|b| b.status == BookingStatus::Pending));

    bookings::approve(&f.db, &f.provider, pending[0].id).await.unwrap();
    let pending = bookings::pending_requests(&f.db, f.provider.id).await.unwrap();
    assert!(pending.iter().all(|b| b.status == BookingStatus::Pending));
}

#[tokio::test]
async fn dashboard_reflects_bookings_and_services() {
    let f = fixture().await;
    let today = Utc::now().date_naive();

    let done = bookings::create_booking(&f.db, &f.customer, request(f.service_id, today))
        .await
        .unwrap();
    for next in [
        BookingStatus::Approved,
        BookingStatus::InProgress,
        BookingStatus::Completed,
    ] {
        bookings::transition(&f.db, &f.provider, done.id, next).await.unwrap();
    }
    bookings::create_booking(&f.db, &f.customer, request(f.service_id, tomorrow()))
        .await
        .unwrap();

    let stats = bookings::provider_dashboard(&f.db, f.provider.id, today).await.unwrap();
    assert_eq!(stats.total_services, 1);
    assert_eq!(stats.active_bookings, 1);
    assert_eq!(stats.completed_jobs, 1);
    assert_eq!(stats.monthly_earnings, 120.0);
}
