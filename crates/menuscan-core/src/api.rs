//! Read-only JSON query service.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::models::menu_item::MenuItemView;
use crate::store::MenuStore;

/// State shared by the request handlers.
#[derive(Clone)]
pub struct ApiState {
    /// Store the handlers read from.
    pub store: MenuStore,
}

impl ApiState {
    pub fn new(store: MenuStore) -> Self {
        Self { store }
    }
}

/// Build the router exposing `GET /menu_items`.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/menu_items", get(list_menu_items))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve the router until the process exits.
pub async fn serve(addr: &str, state: ApiState) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Serving menu items on http://{}/menu_items", listener.local_addr()?);

    axum::serve(listener, build_router(state)).await
}

/// Every stored item as `[{"name": ..., "price": ...}]`.
pub async fn list_menu_items(
    State(state): State<ApiState>,
) -> Result<Json<Vec<MenuItemView>>, (StatusCode, String)> {
    let store = state.store.clone();

    let items = tokio::task::spawn_blocking(move || store.list_all())
        .await
        .map_err(|e| internal_error(e.to_string()))?
        .map_err(|e| internal_error(e.to_string()))?;

    Ok(Json(items.into_iter().map(MenuItemView::from).collect()))
}

fn internal_error(message: String) -> (StatusCode, String) {
    error!("GET /menu_items failed: {}", message);
    (StatusCode::INTERNAL_SERVER_ERROR, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::menu_item::ParsedItem;
    use crate::store::ReingestPolicy;
    use pretty_assertions::assert_eq;

    async fn spawn(state: ApiState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = MenuStore::open(dir.path().join("menu_items.db"), ReingestPolicy::Append).unwrap();
        let base = spawn(ApiState::new(store)).await;

        let response = reqwest::get(format!("{}/menu_items", base)).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert!(response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json")));
        assert_eq!(response.text().await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_lists_stored_items() {
        let dir = tempfile::tempdir().unwrap();
        let store = MenuStore::open(dir.path().join("menu_items.db"), ReingestPolicy::Append).unwrap();
        store
            .persist(&[ParsedItem::new("Burger", "12"), ParsedItem::new("Fries", "5")])
            .unwrap();
        let base = spawn(ApiState::new(store)).await;

        let body = reqwest::get(format!("{}/menu_items", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        let mut items: Vec<MenuItemView> = serde_json::from_str(&body).unwrap();
        items.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(
            items,
            vec![
                MenuItemView { name: "Burger".to_string(), price: 12.0 },
                MenuItemView { name: "Fries".to_string(), price: 5.0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_a_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = MenuStore::open(dir.path().join("menu_items.db"), ReingestPolicy::Append).unwrap();
        std::fs::write(store.path(), "not a database file\n".repeat(256)).unwrap();
        let base = spawn(ApiState::new(store)).await;

        let response = reqwest::get(format!("{}/menu_items", base)).await.unwrap();
        assert_eq!(response.status().as_u16(), 500);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let dir = tempfile::tempdir().unwrap();
        let store = MenuStore::open(dir.path().join("menu_items.db"), ReingestPolicy::Append).unwrap();
        let base = spawn(ApiState::new(store)).await;

        let response = reqwest::get(format!("{}/menu", base)).await.unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }
}
