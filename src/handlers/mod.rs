pub mod auth;
pub mod bookings;
pub mod categories;
pub mod events;
pub mod providers;
pub mod reviews;
pub mod services;
pub mod users;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (bearer token required) ──
    cfg.service(
        web::scope("/auth")
            .route("/me", web::get().to(auth::me))
            .route("/register", web::post().to(auth::register)),
    );

    // ── User routes (bearer token required) ──
    cfg.service(
        web::scope("/users")
            .route("/me", web::put().to(users::update_me))
            .route("/{id}", web::get().to(users::get_user)),
    );

    // ── Catalog routes (reads are public) ──
    cfg.service(web::resource("/categories").route(web::get().to(categories::list)));
    cfg.service(
        web::scope("/services")
            .route("", web::get().to(services::list))
            .route("", web::post().to(services::create))
            .route("/search", web::get().to(services::search_live))
            .route("/{id}", web::get().to(services::get))
            .route("/{id}", web::put().to(services::update))
            .route("/{id}/reviews", web::get().to(services::reviews)),
    );
    cfg.service(
        web::scope("/providers")
            .route("/me/stats", web::get().to(providers::my_stats))
            .route("/{id}/services", web::get().to(providers::services)),
    );

    // ── Booking routes (bearer token required) ──
    cfg.service(
        web::scope("/bookings")
            .route("", web::get().to(bookings::list_mine))
            .route("", web::post().to(bookings::create))
            .route("/requests", web::get().to(bookings::requests))
            .route("/{id}", web::get().to(bookings::get))
            .route("/{id}/approve", web::post().to(bookings::approve))
            .route("/{id}/reject", web::post().to(bookings::reject))
            .route("/{id}/status", web::put().to(bookings::set_status)),
    );

    cfg.service(web::resource("/reviews").route(web::post().to(reviews::create)));
    cfg.service(web::resource("/events").route(web::get().to(events::stream)));
}
