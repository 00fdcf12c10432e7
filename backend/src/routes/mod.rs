//! Route definitions for the bakery inventory server

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes
        .nest("/users", user_routes(state.clone()))
        .nest("/recipes", recipe_routes(state.clone()))
        .nest("/inventory", inventory_routes(state.clone()))
        .nest("/sales", sales_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
}

/// User management routes (protected)
fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_user))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Recipe routes (protected)
fn recipe_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_recipes).post(handlers::create_recipe))
        .route(
            "/:recipe_id",
            get(handlers::get_recipe)
                .put(handlers::update_recipe)
                .delete(handlers::delete_recipe),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Inventory ledger routes (protected)
fn inventory_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/levels", get(handlers::get_levels))
        .route("/periods", get(handlers::list_periods))
        .route("/check", post(handlers::check_sale))
        .route("/sales", post(handlers::record_sale))
        .route("/amount", put(handlers::set_amount))
        .route("/reset", post(handlers::reset_period))
        .route("/snapshots", get(handlers::get_snapshots))
        .route("/transactions", get(handlers::list_transactions))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Sales log routes (protected)
fn sales_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use sqlx::PgPool;
    use tower::ServiceExt;

    use crate::config::{Config, DatabaseConfig, InventoryConfig, JwtConfig, ServerConfig};
    use crate::services::PeriodLocks;

    fn app(db: PgPool) -> Router {
        let config = Config {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 1,
                min_connections: 0,
            },
            jwt: JwtConfig {
                secret: "route-test-secret".to_string(),
                access_token_expiry: 3600,
            },
            inventory: InventoryConfig::default(),
        };
        let state = AppState {
            db,
            config: Arc::new(config),
            locks: PeriodLocks::new(),
        };
        api_routes(state.clone()).with_state(state)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register_owner(app: &Router) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "business_name": "Corner Bakery",
                "username": "owner",
                "password": "kneading-dough"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_ledger_requires_token(pool: PgPool) {
        let app = app(pool);
        let (status, body) = send(&app, Method::GET, "/inventory/levels", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_sale_quantities_are_bounded(pool: PgPool) {
        let app = app(pool);
        let token = register_owner(&app).await;
        let period = json!({"year": 2024, "month": 3, "week": 10});

        let mut sale = period.clone();
        sale["sales"] = json!({"Bread": 1_000_001});
        let (status, body) =
            send(&app, Method::POST, "/inventory/sales", Some(&token), Some(sale)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "sales");

        // The dry run skips the per-item bound but still refuses to overflow
        let mut check = period.clone();
        check["sales"] = json!({"Bread": i64::MAX / 100});
        let (status, body) =
            send(&app, Method::POST, "/inventory/check", Some(&token), Some(check)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Quantity sold of Bread is too large");

        let mut sale = period.clone();
        sale["sales"] = json!({"Bread": 2});
        let (status, body) =
            send(&app, Method::POST, "/inventory/sales", Some(&token), Some(sale)).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["remaining"]["flour"], 9_000);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_staff_cannot_reset(pool: PgPool) {
        let app = app(pool);
        let admin = register_owner(&app).await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/users",
            Some(&admin),
            Some(json!({"username": "baker", "password": "rye-and-spelt"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({
                "business_name": "Corner Bakery",
                "username": "baker",
                "password": "rye-and-spelt"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let staff = body["access_token"].as_str().unwrap().to_string();

        let period = json!({"year": 2024, "month": 3, "week": 10});
        let (status, body) =
            send(&app, Method::POST, "/inventory/reset", Some(&staff), Some(period.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "INSUFFICIENT_PERMISSIONS");

        let (status, body) =
            send(&app, Method::POST, "/inventory/reset", Some(&admin), Some(period)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["levels"]["eggs"], 50);
    }
}
