use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CuisineType, RestaurantTiming, TimingRequest, TimingResponse};
use crate::error::AppError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Restaurant {
    pub id: Uuid,
    pub tiny_id: String,
    pub restaurant_name: String,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub ui_template: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Onboarding request body. Optional-able fields default so that field
/// validation can report every violation in one response instead of
/// failing at deserialization on the first missing key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantRequest {
    #[serde(default)]
    pub restaurant_name: String,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub ui_template: Option<String>,
    #[serde(default)]
    pub cuisine_types: HashSet<String>,
    #[serde(default)]
    pub timings: Vec<TimingRequest>,
}

impl CreateRestaurantRequest {
    /// Structural constraints only; business rules need storage and live
    /// in the onboarding handler.
    pub fn validate_fields(&self) -> Result<(), AppError> {
        let mut violations = Vec::new();

        if self.restaurant_name.trim().is_empty() {
            violations.push("Restaurant name is required".to_string());
        }
        if let Some(address) = &self.address_line1 {
            if address.chars().count() > 300 {
                violations.push("Address line 1 cannot exceed 300 characters".to_string());
            }
        }
        if let Some(city) = &self.city {
            if city.chars().count() > 50 {
                violations.push("City name cannot exceed 50 characters".to_string());
            }
        }
        if let Some(state) = &self.state {
            if state.chars().count() > 50 {
                violations.push("State name cannot exceed 50 characters".to_string());
            }
        }
        if let Some(pincode) = &self.pincode {
            if pincode.len() != 6 || !pincode.bytes().all(|b| b.is_ascii_digit()) {
                violations.push("Pincode must be 6 digits".to_string());
            }
        }
        if let Some(latitude) = self.latitude {
            if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
                violations.push("Latitude must be between -90 and 90".to_string());
            }
        }
        if let Some(longitude) = self.longitude {
            if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
                violations.push("Longitude must be between -180 and 180".to_string());
            }
        }
        if self.cuisine_types.is_empty() {
            violations.push("At least one cuisine type is required".to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(AppError::FieldValidation(violations))
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantResponse {
    pub id: Uuid,
    pub tiny_id: String,
    pub restaurant_name: String,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub latitude: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub longitude: Option<Decimal>,
    pub ui_template: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cuisine_types: Vec<String>,
    pub timings: Vec<TimingResponse>,
}

impl CreateRestaurantResponse {
    pub fn from_parts(
        restaurant: Restaurant,
        cuisines: Vec<CuisineType>,
        timings: Vec<RestaurantTiming>,
    ) -> Self {
        Self {
            id: restaurant.id,
            tiny_id: restaurant.tiny_id,
            restaurant_name: restaurant.restaurant_name,
            address_line1: restaurant.address_line1,
            city: restaurant.city,
            state: restaurant.state,
            pincode: restaurant.pincode,
            latitude: restaurant.latitude,
            longitude: restaurant.longitude,
            ui_template: restaurant.ui_template,
            created_at: restaurant.created_at,
            updated_at: restaurant.updated_at,
            cuisine_types: cuisines.into_iter().map(|c| c.name).collect(),
            timings: timings.into_iter().map(TimingResponse::from).collect(),
        }
    }
}
