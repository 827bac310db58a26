//! HTTP API server for paginated ledger listings
//!
//! Routes are organized into modules:
//! - routes::transactions: Transaction list with keyset pagination

pub mod error;
pub mod routes;

use axum::{http::Uri, routing::get, Router};
use ledgerpage_config::Config;
use ledgerpage_core::{ErrorLogger, KeysetPager, LegacyAdapter, RecordStore, Transaction};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Store backing the transaction endpoints
pub type TransactionStore = dyn RecordStore<Row = Transaction>;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub pager: KeysetPager<TransactionStore>,
    pub legacy: Arc<LegacyAdapter>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<TransactionStore>, logger: Arc<dyn ErrorLogger>, config: Config) -> Self {
        let legacy = LegacyAdapter::new(logger.clone()).with_default_limit(config.pagination.default_limit);
        Self {
            pager: KeysetPager::new(store, logger),
            legacy: Arc::new(legacy),
            config,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::transactions::api_transactions;

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/transactions", get(api_transactions))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound {
        resource: uri.path().to_string(),
    }
}

/// Start the HTTP server and serve until Ctrl-C
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_address();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting ledgerpage server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - GET /api/health");
    log::info!("  - GET /api/transactions (cursor or page pagination)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{NaiveDate, TimeZone, Utc};
    use ledgerpage_core::{Cursor, DefaultErrorLogger, MemoryStore, TransactionType};
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    fn transaction(id: i64, owner: i64) -> Transaction {
        Transaction {
            id,
            owner_user_id: owner,
            group_id: if id % 4 == 0 { Some(9) } else { None },
            transaction_type: if id % 2 == 1 {
                TransactionType::Expense
            } else {
                TransactionType::Income
            },
            amount: Decimal::new(id * 100, 2),
            category_id: Some(id % 3),
            memo: Some(format!("entry {}", id)),
            merchant: if id == 7 { Some("Coffee Corner".to_string()) } else { None },
            date: NaiveDate::from_ymd_opt(2024, 3, id as u32).unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    fn app(rows: Vec<Transaction>, config: Config) -> Router {
        let store: Arc<TransactionStore> = Arc::new(MemoryStore::new(rows));
        create_router(AppState::new(store, Arc::new(DefaultErrorLogger), config))
    }

    fn ledger_app() -> Router {
        let mut rows: Vec<Transaction> = (1..=10).map(|id| transaction(id, 123)).collect();
        rows.push(transaction(11, 555));
        app(rows, Config::default())
    }

    async fn get_json(app: Router, uri: &str, user: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(user) = user {
            request = request.header("x-user-id", user);
        }
        let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    fn ids(body: &serde_json::Value) -> Vec<i64> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_health() {
        let response = ledger_app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_cursor_pages() {
        let (status, body) = get_json(ledger_app(), "/api/transactions?limit=4", Some("123")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![10, 9, 8, 7]);
        assert_eq!(body["pagination"]["hasMore"], true);
        assert!(body["pagination"]["prevCursor"].is_null());

        let next = body["pagination"]["nextCursor"].as_str().unwrap().to_string();
        assert_eq!(next, Cursor::encode(7).as_str());

        let uri = format!("/api/transactions?limit=4&cursor={}", next.replace('=', "%3D"));
        let (status, body) = get_json(ledger_app(), &uri, Some("123")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![6, 5, 4, 3]);
        assert_eq!(body["pagination"]["prevCursor"], Cursor::encode(6).as_str());
        assert_eq!(body["performance"]["cursorUsed"], true);
    }

    #[tokio::test]
    async fn test_scope_hides_other_users() {
        let (_, body) = get_json(ledger_app(), "/api/transactions?count=true", Some("555")).await;
        assert_eq!(ids(&body), vec![11]);
        assert_eq!(body["pagination"]["totalCount"], 1);
    }

    #[tokio::test]
    async fn test_group_header_widens_scope() {
        let request = Request::builder()
            .uri("/api/transactions?count=true")
            .header("x-user-id", "555")
            .header("x-group-id", "9")
            .body(Body::empty())
            .unwrap();
        let response = ledger_app().oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(ids(&body), vec![11, 8, 4]);
    }

    #[tokio::test]
    async fn test_filters() {
        let (_, body) = get_json(ledger_app(), "/api/transactions?type=EXPENSE&count=true", Some("123")).await;
        assert_eq!(ids(&body), vec![9, 7, 5, 3, 1]);
        assert_eq!(body["pagination"]["totalCount"], 5);

        let (_, body) = get_json(
            ledger_app(),
            "/api/transactions?startDate=2024-03-03&endDate=2024-03-05",
            Some("123"),
        )
        .await;
        assert_eq!(ids(&body), vec![5, 4, 3]);

        let (_, body) = get_json(ledger_app(), "/api/transactions?search=coffee", Some("123")).await;
        assert_eq!(ids(&body), vec![7]);
    }

    #[tokio::test]
    async fn test_limit_is_clamped() {
        let mut config = Config::default();
        config.pagination.max_limit = 3;
        let rows = (1..=10).map(|id| transaction(id, 123)).collect();

        let (_, body) = get_json(app(rows, config), "/api/transactions?limit=500", Some("123")).await;
        assert_eq!(ids(&body), vec![10, 9, 8]);
    }

    #[tokio::test]
    async fn test_legacy_page_shape() {
        let (status, body) =
            get_json(ledger_app(), "/api/transactions?page=2&limit=3&count=true", Some("123")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![10, 9, 8]);

        let pagination = &body["pagination"];
        assert_eq!(pagination["page"], 2);
        assert_eq!(pagination["limit"], 3);
        assert_eq!(pagination["total"], 10);
        assert_eq!(pagination["totalPages"], 4);
        assert_eq!(pagination["hasNext"], true);
        assert_eq!(pagination["hasPrev"], true);
        assert!(pagination.get("nextCursor").is_none());
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthorized() {
        let (status, body) = get_json(ledger_app(), "/api/transactions", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_invalid_cursor_is_bad_request() {
        let (status, body) = get_json(ledger_app(), "/api/transactions?cursor=%21%21", Some("123")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_CURSOR");
        assert!(body["error"].as_str().unwrap().contains("Invalid cursor"));
    }

    #[tokio::test]
    async fn test_bad_query_values() {
        for uri in [
            "/api/transactions?limit=abc",
            "/api/transactions?direction=sideways",
            "/api/transactions?type=refund",
        ] {
            let (status, body) = get_json(ledger_app(), uri, Some("123")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["code"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, body) = get_json(ledger_app(), "/api/accounts", Some("123")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
