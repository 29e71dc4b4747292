use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bistro_server::api::handlers::restaurants::allocate_tiny_id;
use bistro_server::config::Config;
use bistro_server::domain::tiny_id;
use bistro_server::error::AppError;
use bistro_server::App;
use serde_json::{json, Value};
use sqlx::PgPool;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use tower::ServiceExt;
use uuid::Uuid;

static TEST_CONTAINER: OnceCell<Arc<ContainerAsync<Postgres>>> = OnceCell::const_new();
static TEST_POOL: OnceCell<PgPool> = OnceCell::const_new();

async fn get_test_db() -> (PgPool, String) {
    let container = TEST_CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default()
                .start()
                .await
                .expect("Failed to start postgres container");
            Arc::new(container)
        })
        .await;

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");
    let database_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let pool = TEST_POOL
        .get_or_init(|| async {
            sqlx::PgPool::connect(&database_url)
                .await
                .expect("Failed to connect to test database")
        })
        .await
        .clone();

    (pool, database_url)
}

// Tests run in parallel against one database, so fixtures use unique
// names instead of truncating shared tables between tests.
async fn setup() -> (Router, PgPool) {
    let (_pool, database_url) = get_test_db().await;

    let config = Config {
        database_url,
        bind_address: "0.0.0.0:8080".to_string(),
        db_max_connections: 5,
        otlp_endpoint: None,
    };

    let app = App::new(config).await.expect("Failed to create app");
    let pool = app.db().clone();

    (app.router(), pool)
}

fn unique(name: &str) -> String {
    format!("{} {}", name, Uuid::new_v4().simple())
}

async fn onboard(router: &Router, body: &Value) -> (StatusCode, Value) {
    let res = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/restaurants/onboard")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap()
}

fn cuisine_set(body: &Value) -> HashSet<String> {
    body["cuisineTypes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// END-TO-END ONBOARDING
// =============================================================================

#[tokio::test]
async fn test_onboard_cafe_luna_end_to_end() {
    let (router, _pool) = setup().await;

    let body = json!({
        "restaurantName": "Cafe Luna",
        "city": "Pune",
        "state": "MH",
        "cuisineTypes": ["Italian", "Cafe"],
        "timings": [{"dayOfWeek": "Mon", "openTime": "09:00", "closeTime": "22:00"}]
    });

    let (status, created) = onboard(&router, &body).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    let tiny_id = created["tinyId"].as_str().unwrap();
    assert_eq!(tiny_id.len(), 8);
    assert!(tiny_id
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));

    assert_eq!(created["restaurantName"], "Cafe Luna");
    assert_eq!(created["city"], "Pune");
    assert_eq!(created["state"], "MH");
    assert!(created["id"].as_str().is_some());
    assert!(created["createdAt"].as_str().is_some());
    assert!(created["updatedAt"].as_str().is_some());

    assert_eq!(
        cuisine_set(&created),
        HashSet::from(["Italian".to_string(), "Cafe".to_string()])
    );

    let timings = created["timings"].as_array().unwrap();
    assert_eq!(timings.len(), 1);
    assert_eq!(timings[0]["dayOfWeek"], "Mon");
    assert_eq!(timings[0]["openTime"], "09:00:00");
    assert_eq!(timings[0]["closeTime"], "22:00:00");

    // Same name, same city: the duplicate check rejects the resubmission.
    let (status, err) = onboard(&router, &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["error"]["code"], "business_rule_violation");
    assert_eq!(
        error_message(&err),
        "Restaurant with this name already exists in Pune"
    );
}

#[tokio::test]
async fn test_duplicate_name_check_is_case_insensitive() {
    let (router, _pool) = setup().await;
    let name = unique("Spice Route");

    let first = json!({
        "restaurantName": name,
        "city": "Nagpur",
        "state": "MH",
        "cuisineTypes": [unique("Cuisine")]
    });
    let (status, _) = onboard(&router, &first).await;
    assert_eq!(status, StatusCode::CREATED);

    let second = json!({
        "restaurantName": name.to_uppercase(),
        "city": "NAGPUR",
        "state": "mh",
        "cuisineTypes": [unique("Cuisine")]
    });
    let (status, err) = onboard(&router, &second).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        error_message(&err),
        "Restaurant with this name already exists in NAGPUR"
    );
}

#[tokio::test]
async fn test_missing_city_skips_the_duplicate_check() {
    let (router, _pool) = setup().await;
    let name = unique("Roadside Dhaba");

    for _ in 0..2 {
        let body = json!({
            "restaurantName": name,
            "state": "MH",
            "cuisineTypes": [unique("Cuisine")]
        });
        let (status, created) = onboard(&router, &body).await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
    }
}

// =============================================================================
// BUSINESS-RULE VALIDATION
// =============================================================================

#[tokio::test]
async fn test_rejects_a_single_coordinate() {
    let (router, _pool) = setup().await;

    let body = json!({
        "restaurantName": unique("Lone Latitude"),
        "latitude": 18.52,
        "cuisineTypes": [unique("Cuisine")]
    });
    let (status, err) = onboard(&router, &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        error_message(&err),
        "Both latitude and longitude must be provided together"
    );

    let body = json!({
        "restaurantName": unique("Full Fix"),
        "latitude": 18.52,
        "longitude": 73.85,
        "cuisineTypes": [unique("Cuisine")]
    });
    let (status, created) = onboard(&router, &body).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
}

#[tokio::test]
async fn test_rejects_duplicate_timing_days() {
    let (router, _pool) = setup().await;

    let body = json!({
        "restaurantName": unique("Groundhog Grill"),
        "cuisineTypes": [unique("Cuisine")],
        "timings": [
            {"dayOfWeek": "Mon", "openTime": "09:00", "closeTime": "22:00"},
            {"dayOfWeek": "Mon", "openTime": "10:00", "closeTime": "23:00"}
        ]
    });
    let (status, err) = onboard(&router, &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_message(&err), "Duplicate timing entry for day: Mon");
}

#[tokio::test]
async fn test_rejects_an_unknown_day_label() {
    let (router, _pool) = setup().await;

    let body = json!({
        "restaurantName": unique("Calendar Confusion"),
        "cuisineTypes": [unique("Cuisine")],
        "timings": [{"dayOfWeek": "Monday", "openTime": "09:00", "closeTime": "22:00"}]
    });
    let (status, err) = onboard(&router, &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_message(&err), "Invalid day of week: Monday");
}

#[tokio::test]
async fn test_rejects_equal_open_and_close_times() {
    let (router, _pool) = setup().await;

    let body = json!({
        "restaurantName": unique("Zero Hours"),
        "cuisineTypes": [unique("Cuisine")],
        "timings": [{"dayOfWeek": "Wed", "openTime": "09:00", "closeTime": "09:00"}]
    });
    let (status, err) = onboard(&router, &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        error_message(&err),
        "Open time and close time cannot be the same for Wed"
    );
}

#[tokio::test]
async fn test_rejects_a_partial_timing_pair() {
    let (router, _pool) = setup().await;

    let body = json!({
        "restaurantName": unique("Half Open"),
        "cuisineTypes": [unique("Cuisine")],
        "timings": [{"dayOfWeek": "Tue", "openTime": "09:00"}]
    });
    let (status, err) = onboard(&router, &body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        error_message(&err),
        "Both open time and close time must be provided for Tue"
    );
}

#[tokio::test]
async fn test_timing_cardinality_is_preserved() {
    let (router, _pool) = setup().await;

    let body = json!({
        "restaurantName": unique("Week Planner"),
        "cuisineTypes": [unique("Cuisine")],
        "timings": [
            {"dayOfWeek": "Fri", "openTime": "11:00", "closeTime": "23:30"},
            {"dayOfWeek": "Sat", "openTime": "11:00", "closeTime": "23:30"},
            {"dayOfWeek": "Sun"}
        ]
    });
    let (status, created) = onboard(&router, &body).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    let timings = created["timings"].as_array().unwrap();
    assert_eq!(timings.len(), 3);

    let sunday = timings
        .iter()
        .find(|t| t["dayOfWeek"] == "Sun")
        .expect("Sun entry present");
    assert!(sunday["openTime"].is_null());
    assert!(sunday["closeTime"].is_null());
}

// =============================================================================
// FIELD VALIDATION
// =============================================================================

#[tokio::test]
async fn test_field_validation_enumerates_every_violation() {
    let (router, _pool) = setup().await;

    let body = json!({
        "restaurantName": "   ",
        "pincode": "12ab",
        "latitude": 200.0,
        "longitude": 73.85,
        "cuisineTypes": []
    });
    let (status, err) = onboard(&router, &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["code"], "validation_error");

    let details: HashSet<String> = err["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        details,
        HashSet::from([
            "Restaurant name is required".to_string(),
            "Pincode must be 6 digits".to_string(),
            "Latitude must be between -90 and 90".to_string(),
            "At least one cuisine type is required".to_string(),
        ])
    );
}

// =============================================================================
// CUISINE RESOLUTION
// =============================================================================

#[tokio::test]
async fn test_cuisine_resolution_reuses_existing_rows_case_insensitively() {
    let (router, pool) = setup().await;
    let cuisine = unique("Szechuan");

    let first = json!({
        "restaurantName": unique("First Mover"),
        "cuisineTypes": [cuisine]
    });
    let (status, created) = onboard(&router, &first).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    let second = json!({
        "restaurantName": unique("Fast Follower"),
        "cuisineTypes": [cuisine.to_uppercase()]
    });
    let (status, created) = onboard(&router, &second).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    // Matched records keep their stored casing.
    assert_eq!(cuisine_set(&created), HashSet::from([cuisine.clone()]));

    let count: i64 =
        sqlx::query_scalar("SELECT count(*) FROM cuisine_type WHERE lower(name) = lower($1)")
            .bind(&cuisine)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_cuisine_spellings_collapse_within_one_request() {
    let (router, _pool) = setup().await;
    let cuisine = unique("Coastal");

    let body = json!({
        "restaurantName": unique("Dedup Diner"),
        "cuisineTypes": [cuisine, cuisine.to_lowercase()]
    });
    let (status, created) = onboard(&router, &body).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["cuisineTypes"].as_array().unwrap().len(), 1);
}

// =============================================================================
// TINY IDS
// =============================================================================

#[tokio::test]
async fn test_tiny_ids_are_unique_across_creations() {
    let (router, _pool) = setup().await;

    let mut seen = HashSet::new();
    for _ in 0..5 {
        let body = json!({
            "restaurantName": unique("Franchise"),
            "cuisineTypes": [unique("Cuisine")]
        });
        let (status, created) = onboard(&router, &body).await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        assert!(seen.insert(created["tinyId"].as_str().unwrap().to_string()));
    }
}

#[tokio::test]
async fn test_tiny_id_allocation_gives_up_after_ten_collisions() {
    let (_router, pool) = setup().await;

    let colliding = tiny_id::generate();
    sqlx::query("INSERT INTO restaurant (tiny_id, restaurant_name) VALUES ($1, $2)")
        .bind(&colliding)
        .bind(unique("Collision Fixture"))
        .execute(&pool)
        .await
        .unwrap();

    let mut conn = pool.acquire().await.unwrap();

    let mut attempts = 0;
    let err = allocate_tiny_id(&mut conn, || {
        attempts += 1;
        colliding.clone()
    })
    .await
    .unwrap_err();

    assert_eq!(attempts, 10);
    match err {
        AppError::BusinessRule(msg) => {
            assert_eq!(msg, "Unable to generate unique tiny ID after 10 attempts")
        }
        other => panic!("expected business rule violation, got {other:?}"),
    }

    // A generator that stops colliding succeeds.
    let fresh = allocate_tiny_id(&mut conn, tiny_id::generate).await.unwrap();
    assert_ne!(fresh, colliding);
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn test_health_and_ready() {
    let (router, _pool) = setup().await;

    for uri in ["/health", "/ready"] {
        let res = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{uri}");
    }
}
