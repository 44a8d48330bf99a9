//! # dealflow-api
//!
//! HTTP surface of dealflow: the summary relay that Zapier posts to, plus
//! lead management and import endpoints for the pipeline UI.

pub mod config;
pub mod handlers;

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::error;
use uuid::Uuid;

use dealflow_core::defaults::REQUEST_BODY_LIMIT;
use dealflow_core::{LeadRepository, NoteMerger, SummaryFeed, SummaryLog};
use dealflow_db::Store;
use dealflow_jobs::{FathomClient, SummaryImporter};

pub use config::ServerConfig;

// =============================================================================
// STATE
// =============================================================================

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Leads managed by the pipeline UI.
    pub leads: Arc<dyn LeadRepository>,
    /// This relay's own summary log, fed by the webhook.
    pub summaries: Arc<dyn SummaryLog>,
    /// Where imports read pending summaries from: the local log or a remote relay.
    pub feed: Arc<dyn SummaryFeed>,
    pub importer: SummaryImporter,
    pub merger: NoteMerger,
    /// Present when a Fathom API key is configured.
    pub fathom: Option<FathomClient>,
}

impl AppState {
    /// State importing from `feed` into the store's leads.
    pub fn new(store: &Store, feed: Arc<dyn SummaryFeed>) -> Self {
        let merger = NoteMerger::default();
        Self {
            leads: store.leads.clone(),
            summaries: store.summaries.clone(),
            importer: SummaryImporter::new(feed.clone(), store.leads.clone()).with_merger(merger),
            feed,
            merger,
            fathom: None,
        }
    }

    /// State importing from the store's own summary log.
    pub fn local(store: &Store) -> Self {
        Self::new(store, store.summaries.clone())
    }

    /// Render note blocks with `merger` instead of the host's local offset.
    pub fn with_merger(mut self, merger: NoteMerger) -> Self {
        self.merger = merger;
        self.importer = self.importer.with_merger(merger);
        self
    }

    /// Enable direct imports from the Fathom API.
    pub fn with_fathom(mut self, client: FathomClient) -> Self {
        self.fathom = Some(client);
        self
    }
}

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    use handlers::{fathom, health, import, leads, summaries, webhook};

    Router::new()
        // Relay
        .route("/api/webhook/summary", post(webhook::receive_summary))
        .route("/api/webhook/fathom-summary", post(webhook::receive_summary))
        .route("/api/webhook/fathom-direct", post(webhook::format_direct))
        .route("/api/summaries/pending", get(summaries::list_pending))
        .route("/api/pending-summaries", get(summaries::list_pending))
        .route("/api/summaries/debug", get(summaries::debug_log))
        .route("/api/summaries/:id/processed", post(summaries::mark_processed))
        .route("/api/health", get(health::health_check))
        // Pipeline
        .route("/api/leads", get(leads::list_leads).post(leads::create_lead))
        .route(
            "/api/leads/:id",
            get(leads::get_lead)
                .put(leads::update_lead)
                .delete(leads::delete_lead),
        )
        .route("/api/leads/:id/stage", post(leads::move_lead_to_stage))
        .route("/api/leads/:id/summaries", get(import::summaries_for_lead))
        .route(
            "/api/leads/:id/summaries/:summary_id/import",
            post(import::import_summary),
        )
        .route(
            "/api/leads/:id/fathom/:meeting_id/import",
            post(fathom::import_meeting),
        )
        .route("/api/fathom/meetings", get(fathom::list_meetings))
        .route("/api/pipeline/stats", get(leads::pipeline_stats))
        .route("/api/import/run", post(import::run_import))
        .fallback(not_found)
        // Middleware
        .layer(middleware::map_response(method_not_allowed_json))
        .layer(middleware::from_fn(answer_options))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(RequestBodyLimitLayer::new(REQUEST_BODY_LIMIT))
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// OPTIONS on any path is a successful pre-flight; CORS headers are added outside.
async fn answer_options(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(request).await
}

/// Give the router's bare 405 a JSON body, keeping its `Allow` header.
async fn method_not_allowed_json(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let allow = response.headers().get(header::ALLOW).cloned();
    let mut replaced = (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Method not allowed" })),
    )
        .into_response();
    if let Some(allow) = allow {
        replaced.headers_mut().insert(header::ALLOW, allow);
    }
    replaced
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

/// Generic message for failures with no more specific context.
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub enum ApiError {
    /// Logged in full; the client only sees `context`.
    Internal {
        context: &'static str,
        source: dealflow_core::Error,
    },
    NotFound(String),
    BadRequest(String),
    /// An optional integration is not configured.
    Unavailable(String),
}

impl ApiError {
    /// Map an unexpected failure to a 500 carrying `context` as its message.
    pub fn internal(context: &'static str) -> impl FnOnce(dealflow_core::Error) -> ApiError {
        move |source| ApiError::Internal { context, source }
    }
}

impl From<dealflow_core::Error> for ApiError {
    fn from(err: dealflow_core::Error) -> Self {
        match &err {
            e if e.is_not_found() => ApiError::NotFound(e.to_string()),
            dealflow_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            _ => ApiError::Internal {
                context: INTERNAL_ERROR_MESSAGE,
                source: err,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Internal { context, source } => {
                error!(error = %source, context, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
