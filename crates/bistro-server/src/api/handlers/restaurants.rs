use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    tiny_id, validate_timings, CreateRestaurantRequest, CreateRestaurantResponse, CuisineType,
    DayOfWeek, Restaurant, RestaurantTiming, TimingRequest,
};
use crate::error::{AppError, Result};
use crate::AppState;

pub const MAX_TINY_ID_ATTEMPTS: usize = 10;

/// `POST /api/restaurants/onboard`
///
/// Field validation runs before any storage work; everything after it
/// happens inside one transaction, so a failure at any step leaves no
/// partial restaurant behind.
pub async fn onboard(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRestaurantRequest>,
) -> Result<impl IntoResponse> {
    req.validate_fields()?;

    info!(restaurant_name = %req.restaurant_name, "onboarding restaurant");

    let mut tx = state.db.begin().await?;

    check_duplicate_name(&mut tx, &req).await?;
    if req.latitude.is_some() != req.longitude.is_some() {
        return Err(AppError::BusinessRule(
            "Both latitude and longitude must be provided together".into(),
        ));
    }
    validate_timings(&req.timings)?;

    let tiny_id = allocate_tiny_id(&mut tx, tiny_id::generate).await?;
    let cuisines = resolve_cuisine_types(&mut tx, &req.cuisine_types).await?;

    let restaurant = insert_restaurant(&mut tx, &req, &tiny_id).await?;
    link_cuisine_types(&mut tx, restaurant.id, &cuisines).await?;
    let timings = insert_timings(&mut tx, restaurant.id, &req.timings).await?;

    tx.commit().await?;

    info!(id = %restaurant.id, tiny_id = %restaurant.tiny_id, "restaurant onboarded");

    Ok((
        StatusCode::CREATED,
        Json(CreateRestaurantResponse::from_parts(
            restaurant, cuisines, timings,
        )),
    ))
}

/// Only applies when a city is supplied; state-only duplicates pass.
async fn check_duplicate_name(
    conn: &mut PgConnection,
    req: &CreateRestaurantRequest,
) -> Result<()> {
    let Some(city) = req.city.as_deref() else {
        return Ok(());
    };

    let names: Vec<String> = sqlx::query_scalar(
        "SELECT restaurant_name FROM restaurant WHERE lower(city) = lower($1) AND lower(state) = lower($2)",
    )
    .bind(city)
    .bind(&req.state)
    .fetch_all(&mut *conn)
    .await?;

    if names
        .iter()
        .any(|name| name.eq_ignore_ascii_case(&req.restaurant_name))
    {
        return Err(AppError::BusinessRule(format!(
            "Restaurant with this name already exists in {city}"
        )));
    }

    Ok(())
}

/// Generate-and-check loop over the tiny id space. The generator is a
/// parameter so tests can force every attempt to collide.
pub async fn allocate_tiny_id(
    conn: &mut PgConnection,
    mut generate: impl FnMut() -> String,
) -> Result<String> {
    for _ in 0..MAX_TINY_ID_ATTEMPTS {
        let candidate = generate();

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM restaurant WHERE tiny_id = $1)")
                .bind(&candidate)
                .fetch_one(&mut *conn)
                .await?;

        if !exists {
            return Ok(candidate);
        }
    }

    Err(AppError::BusinessRule(format!(
        "Unable to generate unique tiny ID after {MAX_TINY_ID_ATTEMPTS} attempts"
    )))
}

/// Case-insensitive get-or-create over the requested names. Two spellings
/// of the same cuisine collapse to one record; a brand-new name keeps the
/// casing as submitted.
async fn resolve_cuisine_types(
    conn: &mut PgConnection,
    names: &HashSet<String>,
) -> Result<Vec<CuisineType>> {
    let mut resolved: Vec<CuisineType> = Vec::with_capacity(names.len());

    for name in names {
        let existing: Option<CuisineType> =
            sqlx::query_as("SELECT id, name FROM cuisine_type WHERE lower(name) = lower($1)")
                .bind(name)
                .fetch_optional(&mut *conn)
                .await?;

        let cuisine = match existing {
            Some(cuisine) => cuisine,
            None => {
                info!(name = %name, "creating cuisine type");
                sqlx::query_as("INSERT INTO cuisine_type (name) VALUES ($1) RETURNING id, name")
                    .bind(name)
                    .fetch_one(&mut *conn)
                    .await?
            }
        };

        if !resolved.iter().any(|c| c.id == cuisine.id) {
            resolved.push(cuisine);
        }
    }

    Ok(resolved)
}

async fn insert_restaurant(
    conn: &mut PgConnection,
    req: &CreateRestaurantRequest,
    tiny_id: &str,
) -> Result<Restaurant> {
    let inserted = sqlx::query_as::<_, Restaurant>(
        r#"
        INSERT INTO restaurant
            (tiny_id, restaurant_name, address_line1, city, state, pincode, latitude, longitude, ui_template)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(tiny_id)
    .bind(&req.restaurant_name)
    .bind(&req.address_line1)
    .bind(&req.city)
    .bind(&req.state)
    .bind(&req.pincode)
    .bind(req.latitude)
    .bind(req.longitude)
    .bind(&req.ui_template)
    .fetch_one(&mut *conn)
    .await;

    match inserted {
        Ok(restaurant) => Ok(restaurant),
        // Concurrent request won the pre-check race; the index is the
        // authoritative answer, so report it as the same duplicate error.
        Err(sqlx::Error::Database(db))
            if db.constraint() == Some("uq_restaurant_name_city_state") =>
        {
            Err(AppError::BusinessRule(format!(
                "Restaurant with this name already exists in {}",
                req.city.as_deref().unwrap_or_default()
            )))
        }
        Err(e) => Err(e.into()),
    }
}

async fn link_cuisine_types(
    conn: &mut PgConnection,
    restaurant_id: Uuid,
    cuisines: &[CuisineType],
) -> Result<()> {
    for cuisine in cuisines {
        sqlx::query(
            "INSERT INTO restaurant_cuisine_type_mapping (restaurant_id, cuisine_type_id) VALUES ($1, $2)",
        )
        .bind(restaurant_id)
        .bind(cuisine.id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn insert_timings(
    conn: &mut PgConnection,
    restaurant_id: Uuid,
    timings: &[TimingRequest],
) -> Result<Vec<RestaurantTiming>> {
    let mut rows = Vec::with_capacity(timings.len());

    for timing in timings {
        // Labels were checked in validate_timings; this parse cannot fail
        // on a request that got this far.
        let day: DayOfWeek = timing
            .day_of_week
            .parse()
            .map_err(|_| AppError::BusinessRule(format!("Invalid day of week: {}", timing.day_of_week)))?;

        let row: RestaurantTiming = sqlx::query_as(
            r#"
            INSERT INTO restaurant_timing (restaurant_id, day_of_week, open_time, close_time)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(restaurant_id)
        .bind(day)
        .bind(timing.open_time)
        .bind(timing.close_time)
        .fetch_one(&mut *conn)
        .await?;

        rows.push(row);
    }

    Ok(rows)
}
