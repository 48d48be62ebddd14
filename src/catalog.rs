//! The service catalog: cached listing, live queries, service creation and the
//! reviews that feed back into service ratings.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::cache::ServiceCatalogCache;
use crate::db::{
    bookings as booking_db, categories as category_db, reviews as review_db,
    services as service_db, users as user_db,
};
use crate::error::ServiceError;
use crate::models::bookings::BookingStatus;
use crate::models::categories::{self, CategoryRef};
use crate::models::reviews::{CreateReview, NewReview, Review};
use crate::models::services::{CreateService, NewService, Service, ServiceQuery, UpdateService};
use crate::models::users::{self, Roles, UpsertUser, User};

pub struct ServiceCatalog {
    db: DatabaseConnection,
    cache: ServiceCatalogCache,
}

impl ServiceCatalog {
    pub fn new(db: DatabaseConnection, cache: ServiceCatalogCache) -> Self {
        Self { db, cache }
    }

    /// Active services, newest first.
    ///
    /// Without predicates the list comes from the cache. With predicates the
    /// store is queried directly. Either way a failing store yields an empty list.
    pub async fn get_all(&self, query: Option<&ServiceQuery>) -> Arc<Vec<Service>> {
        match query.filter(|q| !q.is_empty()) {
            None => {
                let db = &self.db;
                self.cache
                    .get_or_fetch(async move {
                        let rows = service_db::get_all_services(db, &ServiceQuery::default()).await?;
                        service_db::attach_relations(db, rows).await
                    })
                    .await
            }
            Some(query) => match self.query_live(query).await {
                Ok(services) => Arc::new(services),
                Err(e) => {
                    tracing::warn!("Live service query failed: {e}");
                    Arc::new(Vec::new())
                }
            },
        }
    }

    async fn query_live(&self, query: &ServiceQuery) -> Result<Vec<Service>, sea_orm::DbErr> {
        let rows = service_db::get_all_services(&self.db, query).await?;
        service_db::attach_relations(&self.db, rows).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Service>, ServiceError> {
        let Some(row) = service_db::get_service_by_id(&self.db, id).await? else {
            return Ok(None);
        };
        let mut joined = service_db::attach_relations(&self.db, vec![row]).await?;
        Ok(joined.pop())
    }

    pub async fn by_provider(&self, provider_id: Uuid) -> Result<Vec<Service>, ServiceError> {
        let rows = service_db::get_services_by_provider(&self.db, provider_id).await?;
        Ok(service_db::attach_relations(&self.db, rows).await?)
    }

    /// Create a service after resolving its provider and category references.
    ///
    /// `actor` is the authenticated caller. When present, the provider must be
    /// the caller, and a caller who has not confirmed a role yet becomes a
    /// provider.
    pub async fn create(
        &self,
        actor: Option<&User>,
        input: CreateService,
    ) -> Result<Service, ServiceError> {
        validate_listing(&input.title, input.price)?;

        let provider = self.resolve_provider(actor, &input.provider_id).await?;
        if let Some(actor) = actor {
            if actor.id != provider.id {
                return Err(ServiceError::Forbidden(
                    "You can only create services for yourself".to_string(),
                ));
            }
        }
        if provider.role != Roles::Provider {
            return Err(ServiceError::unresolved(
                "provider",
                input.provider_id,
                "user is not registered as a provider",
            ));
        }

        let category = self
            .resolve_category(&input.category_id, input.category_name.as_deref())
            .await?;

        // Both references must exist right before the insert.
        if user_db::get_user_by_id(&self.db, provider.id).await?.is_none() {
            return Err(ServiceError::unresolved(
                "provider",
                provider.id.to_string(),
                "provider record is missing",
            ));
        }
        if category_db::get_category_by_id(&self.db, category.id).await?.is_none() {
            return Err(ServiceError::unresolved(
                "category",
                category.id.to_string(),
                "category record is missing",
            ));
        }

        let row = service_db::insert_service(
            &self.db,
            NewService {
                provider_id: provider.id,
                category_id: category.id,
                title: input.title,
                description: input.description,
                price: input.price,
                price_type: input.price_type,
                duration: input.duration,
                location: input.location,
                city: input.city,
                state: input.state,
                images: input.images,
                availability: input.availability,
                tags: input.tags,
            },
        )
        .await?;

        self.cache.invalidate().await;
        tracing::info!(service_id = %row.id, provider_id = %provider.id, "service created");

        Ok(Service::from(row).with_relations(Some(&category), Some(&provider)))
    }

    /// Partial update by the owning provider.
    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        input: UpdateService,
    ) -> Result<Service, ServiceError> {
        let existing = service_db::get_service_by_id(&self.db, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Service {id}")))?;
        if existing.provider_id != actor.id {
            return Err(ServiceError::Forbidden("You do not own this service".to_string()));
        }
        if let Some(title) = &input.title {
            validate_listing(title, input.price.unwrap_or(existing.price))?;
        } else if let Some(price) = input.price {
            validate_listing(&existing.title, price)?;
        }

        let row = service_db::update_service(&self.db, id, input)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Service {id}")))?;
        self.cache.invalidate().await;

        let mut joined = service_db::attach_relations(&self.db, vec![row]).await?;
        joined
            .pop()
            .ok_or_else(|| ServiceError::not_found(format!("Service {id}")))
    }

    /// Reviews for a service, newest first. Empty when the store is unreachable.
    pub async fn reviews_for(&self, service_id: Uuid) -> Vec<Review> {
        match review_db::get_reviews_by_service(&self.db, service_id).await {
            Ok(rows) => rows.into_iter().map(Review::from).collect(),
            Err(e) => {
                tracing::warn!(%service_id, "Failed to load reviews: {e}");
                Vec::new()
            }
        }
    }

    /// Record a review and refresh the service's rating aggregate.
    pub async fn add_review(&self, actor: &User, input: CreateReview) -> Result<Review, ServiceError> {
        if !(1..=5).contains(&input.rating) {
            return Err(ServiceError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let service = service_db::get_service_by_id(&self.db, input.service_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Service {}", input.service_id)))?;
        if service.provider_id == actor.id {
            return Err(ServiceError::Forbidden(
                "You cannot review your own service".to_string(),
            ));
        }

        if let Some(booking_id) = input.booking_id {
            let booking = booking_db::get_booking_by_id(&self.db, booking_id)
                .await?
                .ok_or_else(|| ServiceError::not_found(format!("Booking {booking_id}")))?;
            if booking.user_id != actor.id {
                return Err(ServiceError::Forbidden(
                    "You can only review your own bookings".to_string(),
                ));
            }
            if booking.service_id != service.id {
                return Err(ServiceError::Validation(
                    "Booking is for a different service".to_string(),
                ));
            }
            if booking.status != BookingStatus::Completed {
                return Err(ServiceError::Validation(
                    "Only completed bookings can be reviewed".to_string(),
                ));
            }
            if review_db::review_exists_for_booking(&self.db, booking_id).await? {
                return Err(ServiceError::Conflict(
                    "This booking has already been reviewed".to_string(),
                ));
            }
        }

        let reviewer = user_db::ensure_user(&self.db, users::Model::from(actor.clone())).await?;

        let row = review_db::insert_review(
            &self.db,
            NewReview {
                user_id: reviewer.id,
                provider_id: service.provider_id,
                service_id: service.id,
                booking_id: input.booking_id,
                rating: input.rating,
                comment: input.comment,
                user_name: reviewer.name,
                user_avatar: reviewer.avatar,
                verified: input.booking_id.is_some(),
            },
        )
        .await?;

        let (rating, count) = review_db::rating_summary(&self.db, service.id).await?;
        service_db::set_rating_summary(&self.db, service.id, rating, count).await?;
        let provider_rating = review_db::provider_rating(&self.db, service.provider_id).await?;
        user_db::set_rating(&self.db, service.provider_id, provider_rating).await?;
        self.cache.invalidate().await;

        Ok(row.into())
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    /// External id first, then local id.
    ///
    /// A caller listing under their own identity gets the provider role unless
    /// they already confirmed a role at sign-up. That covers both a caller with
    /// no row yet and one whose row was only written through from the token.
    async fn resolve_provider(
        &self,
        actor: Option<&User>,
        reference: &str,
    ) -> Result<users::Model, ServiceError> {
        let mut found = user_db::get_user_by_auth_id(&self.db, reference).await?;
        if found.is_none() {
            if let Ok(id) = Uuid::parse_str(reference) {
                found = user_db::get_user_by_id(&self.db, id).await?;
            }
        }
        let own = actor.filter(|a| a.auth_id == reference || a.id.to_string() == reference);

        match (found, own) {
            (Some(user), Some(actor)) if user.auth_id == actor.auth_id && !user.role_confirmed => {
                self.claim_provider_role(actor).await
            }
            (Some(user), _) => Ok(user),
            (None, Some(actor)) => self.claim_provider_role(actor).await,
            (None, None) => Err(ServiceError::unresolved(
                "provider",
                reference,
                "no user with this external or local id",
            )),
        }
    }

    async fn claim_provider_role(&self, actor: &User) -> Result<users::Model, ServiceError> {
        tracing::info!(auth_id = %actor.auth_id, "confirming provider role for first listing");
        let row = user_db::upsert_by_auth_id(
            &self.db,
            UpsertUser {
                auth_id: actor.auth_id.clone(),
                name: actor.name.clone(),
                email: actor.email.clone(),
                avatar: actor.avatar.clone(),
                role: Some(Roles::Provider),
                verified: actor.verified,
                phone: actor.phone.clone(),
                city: actor.city.clone(),
                state: actor.state.clone(),
            },
        )
        .await?;
        Ok(row)
    }

    async fn resolve_category(
        &self,
        reference: &str,
        draft_name: Option<&str>,
    ) -> Result<categories::Model, ServiceError> {
        match CategoryRef::parse(reference) {
            Some(CategoryRef::Stored(id)) => category_db::get_category_by_id(&self.db, id)
                .await?
                .ok_or_else(|| ServiceError::unresolved("category", reference, "no such category")),
            Some(CategoryRef::Draft { sentinel }) => {
                let default = categories::default_for_sentinel(&sentinel);
                let name = default
                    .map(|(name, _, _)| name)
                    .or(draft_name.map(str::trim).filter(|n| !n.is_empty()))
                    .ok_or_else(|| {
                        ServiceError::unresolved("category", &sentinel, "draft category has no name")
                    })?;

                let category = category_db::find_or_create_by_name(
                    &self.db,
                    name,
                    default.map(|(_, icon, _)| icon),
                    default.map(|(_, _, description)| description),
                )
                .await?;
                Ok(category)
            }
            None => Err(ServiceError::unresolved(
                "category",
                reference,
                "not a category id",
            )),
        }
    }
}

fn validate_listing(title: &str, price: f64) -> Result<(), ServiceError> {
    if title.trim().is_empty() {
        return Err(ServiceError::Validation("Service title is required".to_string()));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(ServiceError::Validation(
            "Price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}
