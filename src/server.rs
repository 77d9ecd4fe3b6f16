//! # HTTP Server
//!
//! Exposes the enrichment pipeline as a small JSON endpoint:
//!
//! - `POST /add_company` (or `POST /`) with `{"name": ..., "website": ...}`
//!   answers `{"company_id": ...}`; failures answer `{"error": ...}`
//! - `GET /health` answers `OK`

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rig::completion::CompletionModel;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::enrich::Enricher;
use crate::error::Error;
use crate::store::{CompanyId, CompanyStore};

/// Shared state handed to every handler
pub struct AppState<C, S>
where
    C: CompletionModel,
    S: CompanyStore,
{
    enricher: Arc<Enricher<C, S>>,
}

impl<C, S> Clone for AppState<C, S>
where
    C: CompletionModel,
    S: CompanyStore,
{
    fn clone(&self) -> Self {
        Self {
            enricher: Arc::clone(&self.enricher),
        }
    }
}

/// Request body for `/add_company`
#[derive(Debug, Deserialize)]
struct AddCompanyRequest {
    name: String,
    #[serde(default)]
    website: String,
}

/// Response body for `/add_company`
#[derive(Debug, Serialize)]
struct AddCompanyResponse {
    company_id: CompanyId,
}

/// Error wrapper that renders as `{"error": message}`
struct AppError(Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!("Function error: {}", self.0);

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Creates the router with all routes
pub fn create_router<C, S>(enricher: Arc<Enricher<C, S>>) -> Router
where
    C: CompletionModel + 'static,
    S: CompanyStore + 'static,
{
    Router::new()
        .route("/", post(add_company::<C, S>))
        .route("/add_company", post(add_company::<C, S>))
        .route("/health", get(health_check))
        .with_state(AppState { enricher })
        .layer(TraceLayer::new_for_http())
}

/// Serve `router` on `listener` until the process stops
pub async fn run(listener: TcpListener, router: Router) -> std::io::Result<()> {
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await
}

async fn health_check() -> &'static str {
    "OK"
}

async fn add_company<C, S>(
    State(state): State<AppState<C, S>>,
    Json(payload): Json<AddCompanyRequest>,
) -> Result<Json<AddCompanyResponse>, AppError>
where
    C: CompletionModel + 'static,
    S: CompanyStore + 'static,
{
    info!(name = %payload.name, website = %payload.website, "Request");

    let enrichment = state
        .enricher
        .add_company(&payload.name, &payload.website)
        .await?;

    Ok(Json(AddCompanyResponse {
        company_id: enrichment.company_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Client;
    use crate::model::mock_model::MockCompletionModel;
    use crate::store::LocalStore;
    use serde_json::Value;

    async fn spawn_app(model: MockCompletionModel) -> (String, Arc<Enricher<MockCompletionModel, LocalStore>>) {
        let store = LocalStore::open_in_memory().await.unwrap();
        let enricher = Arc::new(Enricher::new(Client::new(model, "mock"), store));
        let router = create_router(Arc::clone(&enricher));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let _ = run(listener, router).await;
        });

        (address, enricher)
    }

    #[tokio::test]
    async fn test_add_company_returns_id() {
        let model = MockCompletionModel::new();
        model
            .set_text_response("Acme builds software tools.\nProducts: Tool One, Tool Two")
            .await;
        let (address, enricher) = spawn_app(model).await;

        let response = reqwest::Client::new()
            .post(format!("{address}/add_company"))
            .json(&json!({"name": "Acme Corp", "website": "https://acme.com"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"company_id": 1}));

        let record = enricher
            .store()
            .fetch_company(&CompanyId::Int(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.description.as_deref(), Some("Acme builds software tools"));
        assert_eq!(record.products, vec!["Tool One", "Tool Two"]);
    }

    #[tokio::test]
    async fn test_root_path_accepts_requests() {
        let model = MockCompletionModel::new();
        model.set_text_response("Acme does things.").await;
        let (address, _) = spawn_app(model).await;

        let response = reqwest::Client::new()
            .post(format!("{address}/"))
            .json(&json!({"name": "Acme Corp", "website": "https://acme.com"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_blank_name_is_bad_request() {
        let (address, _) = spawn_app(MockCompletionModel::new()).await;

        let response = reqwest::Client::new()
            .post(format!("{address}/add_company"))
            .json(&json!({"name": " ", "website": "https://acme.com"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("name"));
    }

    #[tokio::test]
    async fn test_model_failure_is_server_error() {
        let model = MockCompletionModel::new();
        model.set_failure("upstream down").await;
        let (address, _) = spawn_app(model).await;

        let response = reqwest::Client::new()
            .post(format!("{address}/add_company"))
            .json(&json!({"name": "Acme Corp", "website": "https://acme.com"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 500);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("upstream down"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let (address, _) = spawn_app(MockCompletionModel::new()).await;

        let body = reqwest::get(format!("{address}/health"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        assert_eq!(body, "OK");
    }
}
