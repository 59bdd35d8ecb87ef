//! Router construction.
//!
//! Builds the axum router with all routes and middleware. Every content
//! kind shares one uniform route shape parameterized by `{kind}`.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post, put};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{entities, health, items, sections};
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/api/health", get(health::get_health))
        // Entities
        .route("/api/{kind}", get(entities::list).post(entities::create))
        .route(
            "/api/{kind}/{entity_id}",
            get(entities::get_tree)
                .put(entities::update)
                .delete(entities::remove),
        )
        .route("/api/{kind}/{entity_id}/visibility", patch(entities::toggle))
        .route(
            "/api/{kind}/{entity_id}/position",
            patch(entities::move_position),
        )
        .route("/api/{kind}/{entity_id}/duplicate", post(entities::duplicate))
        // Sections
        .route(
            "/api/{kind}/{entity_id}/sections",
            get(sections::list).post(sections::create),
        )
        .route(
            "/api/{kind}/{entity_id}/sections/{section_id}",
            put(sections::update).delete(sections::remove),
        )
        .route(
            "/api/{kind}/{entity_id}/sections/{section_id}/visibility",
            patch(sections::toggle),
        )
        .route(
            "/api/{kind}/{entity_id}/sections/{section_id}/position",
            patch(sections::move_position),
        )
        .route(
            "/api/{kind}/{entity_id}/sections/{section_id}/duplicate",
            post(sections::duplicate),
        )
        // Items
        .route(
            "/api/{kind}/{entity_id}/sections/{section_id}/items",
            get(items::list).post(items::create),
        )
        .route(
            "/api/{kind}/{entity_id}/sections/{section_id}/items/{item_id}",
            put(items::update).delete(items::remove),
        )
        .route(
            "/api/{kind}/{entity_id}/sections/{section_id}/items/{item_id}/visibility",
            patch(items::toggle),
        )
        .route(
            "/api/{kind}/{entity_id}/sections/{section_id}/items/{item_id}/position",
            patch(items::move_position),
        );

    Router::new()
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use canopy_engine::ContentEngine;
    use canopy_store::{ContentStore, MemoryStore};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn state() -> Arc<AppState> {
        let store = Arc::new(MemoryStore::new());
        Arc::new(AppState {
            engine: Arc::new(ContentEngine::new(store as Arc<dyn ContentStore>)),
            version: "test".to_owned(),
        })
    }

    async fn send(
        state: &Arc<AppState>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value, axum::http::HeaderMap) {
        let router = create_router(Arc::clone(state));
        let request = match body {
            Some(value) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value, headers)
    }

    #[tokio::test]
    async fn test_health() {
        let state = state();

        let (status, body, _) = send(&state, Method::GET, "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_unknown_kind_is_validation_error() {
        let state = state();

        let (status, body, _) = send(&state, Method::GET, "/api/blog", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation");
    }

    #[tokio::test]
    async fn test_create_and_list_entities() {
        let state = state();

        let (status, created, _) = send(
            &state,
            Method::POST,
            "/api/products",
            Some(json!({"name": "Compute", "route": "/products/compute"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["position"], 0);

        let (status, listed, _) = send(&state, Method::GET, "/api/products?all=true", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["name"], "Compute");
    }

    #[tokio::test]
    async fn test_missing_route_is_rejected_before_any_write() {
        let state = state();

        let (status, body, _) = send(
            &state,
            Method::POST,
            "/api/products",
            Some(json!({"name": "Compute", "route": "  "})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation");

        let (_, listed, _) = send(&state, Method::GET, "/api/products?all=true", None).await;
        assert_eq!(listed.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_unknown_section_type_rejected() {
        let state = state();
        let (_, entity, _) = send(
            &state,
            Method::POST,
            "/api/products",
            Some(json!({"name": "Compute", "route": "/p/c"})),
        )
        .await;
        let entity_id = entity["id"].as_str().unwrap().to_owned();

        let (status, body, _) = send(
            &state,
            Method::POST,
            &format!("/api/products/{entity_id}/sections"),
            Some(json!({"sectionType": "sidebar", "title": "Nope"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation");
    }

    #[tokio::test]
    async fn test_tree_round_trip_with_sections_and_items() {
        let state = state();
        let (_, entity, _) = send(
            &state,
            Method::POST,
            "/api/solutions",
            Some(json!({"name": "Retail", "route": "/solutions/retail"})),
        )
        .await;
        let entity_id = entity["id"].as_str().unwrap().to_owned();

        let (status, section, _) = send(
            &state,
            Method::POST,
            &format!("/api/solutions/{entity_id}/sections"),
            Some(json!({"sectionType": "features", "title": "Key features"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let section_id = section["id"].as_str().unwrap().to_owned();

        let (status, _, _) = send(
            &state,
            Method::POST,
            &format!("/api/solutions/{entity_id}/sections/{section_id}/items"),
            Some(json!({"itemType": "feature_card", "title": "Scale"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, tree, _) = send(
            &state,
            Method::GET,
            &format!("/api/solutions/{entity_id}?all=true"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tree["sections"][0]["items"][0]["title"], "Scale");
    }

    #[tokio::test]
    async fn test_visibility_toggle_and_public_pruning() {
        let state = state();
        let (_, entity, _) = send(
            &state,
            Method::POST,
            "/api/products",
            Some(json!({"name": "Compute", "route": "/p/c"})),
        )
        .await;
        let entity_id = entity["id"].as_str().unwrap().to_owned();
        let (_, section, _) = send(
            &state,
            Method::POST,
            &format!("/api/products/{entity_id}/sections"),
            Some(json!({"sectionType": "hero", "title": "Hero"})),
        )
        .await;
        let section_id = section["id"].as_str().unwrap().to_owned();

        let (status, body, _) = send(
            &state,
            Method::PATCH,
            &format!("/api/products/{entity_id}/sections/{section_id}/visibility"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isVisible"], false);

        let (_, public_tree, _) = send(
            &state,
            Method::GET,
            &format!("/api/products/{entity_id}"),
            None,
        )
        .await;
        assert_eq!(public_tree["sections"], json!([]));

        let (_, admin_tree, _) = send(
            &state,
            Method::GET,
            &format!("/api/products/{entity_id}?all=true"),
            None,
        )
        .await;
        assert_eq!(admin_tree["sections"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_conflict_on_taken_route() {
        let state = state();
        let (_, entity, _) = send(
            &state,
            Method::POST,
            "/api/products",
            Some(json!({"name": "Compute", "route": "/p/c"})),
        )
        .await;
        let entity_id = entity["id"].as_str().unwrap().to_owned();

        let (status, body, _) = send(
            &state,
            Method::POST,
            &format!("/api/products/{entity_id}/duplicate"),
            Some(json!({"newRoute": "/p/c"})),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "conflict");
    }

    #[tokio::test]
    async fn test_delete_returns_no_content_then_404() {
        let state = state();
        let (_, entity, _) = send(
            &state,
            Method::POST,
            "/api/pages",
            Some(json!({"name": "Home", "route": "/"})),
        )
        .await;
        let entity_id = entity["id"].as_str().unwrap().to_owned();

        let (status, _, _) = send(
            &state,
            Method::DELETE,
            &format!("/api/pages/{entity_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body, _) = send(
            &state,
            Method::GET,
            &format!("/api/pages/{entity_id}?all=true"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn test_public_tree_carries_etag_and_304() {
        let state = state();
        let (_, entity, _) = send(
            &state,
            Method::POST,
            "/api/pages",
            Some(json!({"name": "Home", "route": "/"})),
        )
        .await;
        let entity_id = entity["id"].as_str().unwrap().to_owned();
        let uri = format!("/api/pages/{entity_id}");

        let (status, _, headers) = send(&state, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let etag = headers.get(header::ETAG).unwrap().clone();

        let router = create_router(Arc::clone(&state));
        let request = Request::builder()
            .method(Method::GET)
            .uri(&uri)
            .header(header::IF_NONE_MATCH, etag)
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let state = state();

        let (_, _, headers) = send(&state, Method::GET, "/api/health", None).await;

        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert!(headers.get("content-security-policy").is_some());
    }

    #[tokio::test]
    async fn test_item_reorder_via_position_endpoint() {
        let state = state();
        let (_, entity, _) = send(
            &state,
            Method::POST,
            "/api/products",
            Some(json!({"name": "Compute", "route": "/p/c"})),
        )
        .await;
        let entity_id = entity["id"].as_str().unwrap().to_owned();
        let (_, section, _) = send(
            &state,
            Method::POST,
            &format!("/api/products/{entity_id}/sections"),
            Some(json!({"sectionType": "features", "title": "Features"})),
        )
        .await;
        let section_id = section["id"].as_str().unwrap().to_owned();

        let mut item_ids = Vec::new();
        for title in ["a", "b", "c"] {
            let (_, item, _) = send(
                &state,
                Method::POST,
                &format!("/api/products/{entity_id}/sections/{section_id}/items"),
                Some(json!({"itemType": "feature_card", "title": title})),
            )
            .await;
            item_ids.push(item["id"].as_str().unwrap().to_owned());
        }

        let (status, _, _) = send(
            &state,
            Method::PATCH,
            &format!(
                "/api/products/{entity_id}/sections/{section_id}/items/{}/position",
                item_ids[2]
            ),
            Some(json!({"to": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, items, _) = send(
            &state,
            Method::GET,
            &format!("/api/products/{entity_id}/sections/{section_id}/items?all=true"),
            None,
        )
        .await;
        let titles: Vec<&str> = items
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["c", "a", "b"]);
        let positions: Vec<i64> = items
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["position"].as_i64().unwrap())
            .collect();
        assert_eq!(positions, [0, 1, 2]);
    }
}
