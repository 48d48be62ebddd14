use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ids with this prefix name a default category that has not been stored yet.
pub const DRAFT_PREFIX: &str = "mock-";

/// Categories offered before any have been stored: (name, icon, description).
pub const DEFAULT_CATEGORIES: &[(&str, &str, &str)] = &[
    ("Home Cleaning", "🧹", "House, kitchen and bathroom cleaning"),
    ("Plumbing", "🔧", "Leaks, fittings and drainage"),
    ("Electrical", "⚡", "Wiring, fixtures and appliance repair"),
    ("Carpentry", "🪚", "Furniture assembly and woodwork"),
    ("Painting", "🎨", "Interior and exterior painting"),
    ("Gardening", "🌱", "Lawn care and garden maintenance"),
    ("Pet Care", "🐾", "Pet sitting, walking and grooming"),
    ("Beauty & Wellness", "💆", "Salon and spa services at home"),
];

/// SeaORM entity for the `categories` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::services::Entity")]
    Services,
}

impl Related<super::services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Services.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

impl From<Model> for Category {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            icon: m.icon,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

impl From<Category> for Model {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            icon: c.icon,
            is_active: c.is_active,
            created_at: c.created_at,
        }
    }
}

/// A category reference as sent by the service form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    Stored(Uuid),
    /// Sentinel id (`mock-3`) for a category that must be found or created by name.
    Draft { sentinel: String },
}

impl CategoryRef {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.starts_with(DRAFT_PREFIX) {
            return Some(Self::Draft {
                sentinel: raw.to_string(),
            });
        }
        Uuid::parse_str(raw).ok().map(Self::Stored)
    }
}

/// An unsaved default category, offered until real categories exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_active: bool,
}

pub fn default_drafts() -> Vec<DraftCategory> {
    DEFAULT_CATEGORIES
        .iter()
        .enumerate()
        .map(|(idx, (name, icon, description))| DraftCategory {
            id: format!("{DRAFT_PREFIX}{idx}"),
            name: ToString::to_string(name),
            description: Some(ToString::to_string(description)),
            icon: Some(ToString::to_string(icon)),
            is_active: true,
        })
        .collect()
}

/// Default category addressed by a sentinel id, if the index is known.
pub fn default_for_sentinel(sentinel: &str) -> Option<(&'static str, &'static str, &'static str)> {
    sentinel
        .strip_prefix(DRAFT_PREFIX)
        .and_then(|idx| idx.parse::<usize>().ok())
        .and_then(|idx| DEFAULT_CATEGORIES.get(idx).copied())
}
