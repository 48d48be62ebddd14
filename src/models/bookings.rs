use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Booking status stored as a lowercase string in the database.
///
/// `Rejected` is the provider declining a request; `Cancelled` is a withdrawal by
/// either party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Rejected | BookingStatus::Cancelled
        )
    }

    /// Whether `self -> next` is an edge of the lifecycle. Staying put is not an edge.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Approved, InProgress)
                | (Approved, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }

    /// Statuses that count as the provider responding to the request.
    pub fn is_response(&self) -> bool {
        matches!(
            self,
            BookingStatus::Approved | BookingStatus::Rejected | BookingStatus::Cancelled
        )
    }

    /// Bookings that still need the provider's attention.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Approved | BookingStatus::InProgress
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SeaORM entity for the `bookings` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub provider_id: Uuid,
    pub service_name: String,
    pub provider_name: String,
    pub customer_name: Option<String>,
    pub booking_date: Date,
    pub booking_time: String,
    pub status: BookingStatus,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub image: Option<String>,
    pub location: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub special_instructions: Option<String>,
    pub estimated_duration: Option<i32>,
    pub requested_at: DateTimeUtc,
    pub responded_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::services::Entity",
        from = "Column::ServiceId",
        to = "super::services::Column::Id"
    )]
    Service,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ProviderId",
        to = "super::users::Column::Id"
    )]
    Provider,
}

impl Related<super::services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── View model ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub provider_id: Uuid,
    pub service_name: String,
    pub provider_name: String,
    pub customer_name: Option<String>,
    pub date: Date,
    pub time: String,
    pub status: BookingStatus,
    pub price: f64,
    pub image: Option<String>,
    pub location: String,
    pub special_instructions: Option<String>,
    pub estimated_duration: Option<i32>,
    pub requested_at: DateTimeUtc,
    pub responded_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Booking {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_id == user_id || self.provider_id == user_id
    }
}

impl From<Model> for Booking {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            service_id: m.service_id,
            provider_id: m.provider_id,
            service_name: m.service_name,
            provider_name: m.provider_name,
            customer_name: m.customer_name,
            date: m.booking_date,
            time: m.booking_time,
            status: m.status,
            price: m.price,
            image: m.image,
            location: m.location,
            special_instructions: m.special_instructions,
            estimated_duration: m.estimated_duration,
            requested_at: m.requested_at,
            responded_at: m.responded_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<Booking> for Model {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            service_id: b.service_id,
            provider_id: b.provider_id,
            service_name: b.service_name,
            provider_name: b.provider_name,
            customer_name: b.customer_name,
            booking_date: b.date,
            booking_time: b.time,
            status: b.status,
            price: b.price,
            image: b.image,
            location: b.location,
            special_instructions: b.special_instructions,
            estimated_duration: b.estimated_duration,
            requested_at: b.requested_at,
            responded_at: b.responded_at,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

// ── DTOs ──

/// Body of `POST /api/bookings`.
///
/// A `status` sent by the caller is accepted and ignored: new bookings are
/// always pending.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    pub service_id: Uuid,
    pub date: Date,
    pub time: String,
    pub special_instructions: Option<String>,
    pub estimated_duration: Option<i32>,
    #[serde(default)]
    pub status: Option<BookingStatus>,
}

/// A booking row ready to insert, snapshot fields already copied.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub provider_id: Uuid,
    pub service_name: String,
    pub provider_name: String,
    pub customer_name: Option<String>,
    pub booking_date: Date,
    pub booking_time: String,
    pub price: f64,
    pub image: Option<String>,
    pub location: String,
    pub special_instructions: Option<String>,
    pub estimated_duration: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBookingStatus {
    pub status: BookingStatus,
}

/// Query string of `GET /api/bookings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingListQuery {
    /// `upcoming`, `past` or `cancelled`.
    pub bucket: Option<String>,
}

/// Query string of `GET /api/bookings/requests`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestsQuery {
    #[serde(default)]
    pub pending: bool,
}
