use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::StringList;
use super::categories;
use super::users::{self, ProviderSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    #[sea_orm(string_value = "fixed")]
    Fixed,
    #[sea_orm(string_value = "hourly")]
    Hourly,
}

/// SeaORM entity for the `services` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub provider_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub price_type: PriceType,
    pub duration: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub images: StringList,
    #[sea_orm(column_type = "JsonBinary")]
    pub availability: StringList,
    pub location: String,
    pub city: Option<String>,
    pub state: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: StringList,
    #[sea_orm(column_type = "Double")]
    pub rating: f64,
    pub review_count: i32,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ProviderId",
        to = "super::users::Column::Id"
    )]
    Provider,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::bookings::Entity")]
    Bookings,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Provider.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── View model ──

/// A service listing as the client sees it.
///
/// `category` and `provider` are joined in by the data layer and are not part of
/// the stored row; everything else maps one-to-one onto a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub price_type: PriceType,
    pub duration: Option<String>,
    pub images: Vec<String>,
    pub availability: Vec<String>,
    pub location: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub tags: Vec<String>,
    pub rating: f64,
    pub review_count: i32,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub provider: Option<ProviderSummary>,
}

impl Service {
    pub fn with_relations(
        mut self,
        category: Option<&categories::Model>,
        provider: Option<&users::Model>,
    ) -> Self {
        if let Some(category) = category {
            self.category = category.name.clone();
        }
        self.provider = provider.map(ProviderSummary::from);
        self
    }
}

impl From<Model> for Service {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            provider_id: m.provider_id,
            category_id: m.category_id,
            title: m.title,
            description: m.description,
            price: m.price,
            price_type: m.price_type,
            duration: m.duration,
            images: m.images.into(),
            availability: m.availability.into(),
            location: m.location,
            city: m.city,
            state: m.state,
            tags: m.tags.into(),
            rating: m.rating,
            review_count: m.review_count,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
            category: String::new(),
            provider: None,
        }
    }
}

impl From<Service> for Model {
    fn from(s: Service) -> Self {
        Self {
            id: s.id,
            provider_id: s.provider_id,
            category_id: s.category_id,
            title: s.title,
            description: s.description,
            price: s.price,
            price_type: s.price_type,
            duration: s.duration,
            images: s.images.into(),
            availability: s.availability.into(),
            location: s.location,
            city: s.city,
            state: s.state,
            tags: s.tags.into(),
            rating: s.rating,
            review_count: s.review_count,
            is_active: s.is_active,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

// ── DTOs ──

/// Body of `POST /api/services`.
///
/// `provider_id` may be either an external-auth id or a local user id, and
/// `category_id` may be a sentinel draft id; both are resolved before insert.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateService {
    pub provider_id: String,
    pub category_id: String,
    /// Name for a draft category that has no default behind its sentinel.
    pub category_name: Option<String>,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub price_type: PriceType,
    pub duration: Option<String>,
    pub location: String,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub availability: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A service ready to insert: both references already resolved and verified.
#[derive(Debug, Clone)]
pub struct NewService {
    pub provider_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub price_type: PriceType,
    pub duration: Option<String>,
    pub location: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub images: Vec<String>,
    pub availability: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateService {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub price_type: Option<PriceType>,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub images: Option<Vec<String>>,
    pub availability: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Store-side predicates for `GET /api/services/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceQuery {
    /// Category name.
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    /// Substring over title and description.
    pub query: Option<String>,
}

impl ServiceQuery {
    pub fn is_empty(&self) -> bool {
        [&self.category, &self.city, &self.state, &self.query]
            .iter()
            .all(|f| f.as_deref().is_none_or(|v| v.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_row() -> Model {
        Model {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            title: "Full home deep clean".to_string(),
            description: "Kitchen, bathrooms and living areas".to_string(),
            price: 2499.0,
            price_type: PriceType::Fixed,
            duration: Some("4 hours".to_string()),
            images: vec!["https://example.com/1.jpg".to_string()].into(),
            availability: vec!["Monday".to_string(), "Saturday".to_string()].into(),
            location: "Andheri East".to_string(),
            city: Some("Mumbai".to_string()),
            state: Some("Maharashtra".to_string()),
            tags: vec!["cleaning".to_string()].into(),
            rating: 4.5,
            review_count: 12,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_round_trips_through_view_model() {
        let row = sample_row();
        assert_eq!(Model::from(Service::from(row.clone())), row);
    }

    #[test]
    fn joined_fields_do_not_leak_into_row() {
        let row = sample_row();
        let mut view = Service::from(row.clone());
        view.category = "Cleaning".to_string();
        assert_eq!(Model::from(view), row);
    }

    #[test]
    fn view_model_uses_client_field_names() {
        let json = serde_json::to_value(Service::from(sample_row())).unwrap();
        assert_eq!(json["priceType"], "fixed");
        assert_eq!(json["isActive"], true);
        assert_eq!(json["reviewCount"], 12);
    }

    #[test]
    fn blank_query_is_empty() {
        assert!(ServiceQuery::default().is_empty());
        let q = ServiceQuery {
            city: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(q.is_empty());
        let q = ServiceQuery {
            city: Some("Pune".to_string()),
            ..Default::default()
        };
        assert!(!q.is_empty());
    }
}
