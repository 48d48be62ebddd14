use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use migration::{Migrator, MigratorTrait};
use servicewala_backend::auth::jwt::TokenVerifier;
use servicewala_backend::config::AppConfig;
use servicewala_backend::create_pool;
use servicewala_backend::handlers;
use servicewala_backend::state::AppState;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let db = create_pool(&config.database_url)
        .await
        .expect("Failed to connect to the database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    let verifier = TokenVerifier::from_config(&config).expect("Invalid SUPABASE_URL format");
    match &verifier {
        TokenVerifier::Jwks(_) => tracing::info!("Verifying tokens against the project JWKS"),
        TokenVerifier::Secret(_) => tracing::info!("Verifying tokens with the HS256 secret"),
    }

    let state = web::Data::new(AppState::new(db, &config.cache, verifier));
    tracing::info!(
        ttl_secs = config.cache.services_ttl.as_secs(),
        "Service catalog cache configured"
    );

    let bind_addr = config.bind_addr();
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
