use uuid::Uuid;

/// A named category tag shared across restaurants (many-to-many through
/// `restaurant_cuisine_type_mapping`). Rows are created lazily on first
/// use and never deleted by the onboarding workflow.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CuisineType {
    pub id: Uuid,
    pub name: String,
}
