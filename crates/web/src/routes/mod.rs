use std::time::Duration;

use axum::Router;
use storage::Database;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::ApiDoc;
use crate::features::{bestlist, disciplines};

pub fn api_routes() -> Router<Database> {
    Router::new()
        .nest("/bestlist", bestlist::routes::routes())
        .nest("/disciplines", disciplines::routes::routes())
}

pub fn app(db: Database) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .nest("/api", api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .with_state(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    /// The pool never connects: every request here is answered before touching the database.
    fn offline_app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/track_insights")
            .unwrap();
        app(Database::from_pool(pool))
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = offline_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or_default())
    }

    #[tokio::test]
    async fn test_bestlist_requires_a_discipline() {
        let (status, body) = get("/api/bestlist?year=2023").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No discipline identifier specified");
    }

    #[tokio::test]
    async fn test_bestlist_rejects_unknown_range_types() {
        let uri = format!(
            "/api/bestlist?discipline_id={}&range_type=height",
            uuid::Uuid::new_v4()
        );
        let (status, body) = get(&uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid range type height");
    }

    #[tokio::test]
    async fn test_openapi_document_lists_both_endpoints() {
        let (status, body) = get("/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/bestlist"].is_object());
        assert!(body["paths"]["/api/disciplines"].is_object());
    }
}
