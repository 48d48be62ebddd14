use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `reviews` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    pub rating: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub verified: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::services::Entity",
        from = "Column::ServiceId",
        to = "super::services::Column::Id"
    )]
    Service,
}

impl Related<super::services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    pub rating: i32,
    pub comment: Option<String>,
    pub date: DateTimeUtc,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub verified: bool,
}

impl From<Model> for Review {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            provider_id: m.provider_id,
            service_id: m.service_id,
            booking_id: m.booking_id,
            rating: m.rating,
            comment: m.comment,
            date: m.created_at,
            user_name: m.user_name,
            user_avatar: m.user_avatar,
            verified: m.verified,
        }
    }
}

impl From<Review> for Model {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            provider_id: r.provider_id,
            service_id: r.service_id,
            booking_id: r.booking_id,
            rating: r.rating,
            comment: r.comment,
            user_name: r.user_name,
            user_avatar: r.user_avatar,
            verified: r.verified,
            created_at: r.date,
        }
    }
}

// ── DTOs ──

/// Body of `POST /api/reviews`. Reviewer details come from the caller's identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    pub service_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub rating: i32,
    pub comment: Option<String>,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn row_round_trips_through_view_model() {
        let row = Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            service_id: Some(Uuid::new_v4()),
            booking_id: None,
            rating: 5,
            comment: Some("Spotless".to_string()),
            user_name: "Meera".to_string(),
            user_avatar: None,
            verified: true,
            created_at: Utc::now(),
        };
        assert_eq!(Model::from(Review::from(row.clone())), row);
    }
}
