//! Menu subsystem: dishes, categories, tags, and customizations.
//!
//! Mapped to the tables in `0002_menu.sql` but not reachable from any
//! route yet; onboarding only creates the restaurant side.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-restaurant category, optionally nested one level under a parent
/// category of the same restaurant. Unique by restaurant + name + parent.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DishCategory {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub category_name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Dish {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub dish_name: String,
    pub dish_category_id: Option<Uuid>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DishTag {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CustomizationType {
    /// Choice replaces the base item, no surcharge.
    Direct,
    /// Add-on priced on top of the dish.
    Extra,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomizationGroup {
    pub id: Uuid,
    pub dish_id: Uuid,
    pub group_name: Option<String>,
    pub customization_type: CustomizationType,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomizationOption {
    pub id: Uuid,
    pub group_id: Uuid,
    pub option_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub extra_price: Option<Decimal>,
}
