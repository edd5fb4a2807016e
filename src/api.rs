//! REST API for the packaging service.
//!
//! Provides HTTP endpoints for checkout and shipping-quote workflows.
//! Uses Axum as the web framework and supports CORS.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::OnceLock;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::config::ApiConfig;
use crate::model::{CartItem, Container, ContainerKind, ValidationError};
use crate::outcome::{ContainerSnapshot, ItemEcho, OutcomeBranch, PackagingDebug, PackagingOutcome};
use crate::service::{PackagingError, PackagingService};

#[derive(Clone)]
pub struct ApiState {
    service: PackagingService,
}

impl ApiState {
    pub fn new(service: PackagingService) -> Self {
        Self { service }
    }
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>cartonize API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-standalone-preset.js"
            integrity="sha384-2YH8WDRaj7V2OqU/trsmzSagmk/E2SutiCsGkdgoQwC9pNUJV1u/141DHB6jgs8t"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                const ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                    presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
                    layout: "StandaloneLayout",
                });
                window.ui = ui;
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Request structure for the packaging endpoints.
#[derive(Deserialize, ToSchema)]
#[schema(
    example = json!({
        "items": [
            { "id": "sku-1001", "name": "Ceramic mug", "quantity": 2,
              "weight": 0.4, "length": 12.0, "width": 9.0, "height": 10.0 },
            { "id": "sku-2002", "quantity": 1 }
        ]
    })
)]
pub struct PackagingRequest {
    pub items: Vec<CartItem>,
}

impl PackagingRequest {
    fn into_validated(self) -> Result<Vec<CartItem>, ValidationError> {
        for item in &self.items {
            item.validate()?;
        }
        Ok(self.items)
    }
}

/// Active catalog listing.
#[derive(Serialize, ToSchema)]
pub struct ContainersResponse {
    pub containers: Vec<Container>,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn validation_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        details,
    )
}

fn catalog_unavailable(err: PackagingError) -> Response {
    error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        "Container catalog unavailable",
        err.to_string(),
    )
}

fn parse_packaging_request(
    payload: Result<Json<PackagingRequest>, JsonRejection>,
) -> Result<Vec<CartItem>, Response> {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => return Err(json_deserialize_error(err)),
    };

    payload
        .into_validated()
        .map_err(|err| validation_error(err.to_string()))
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_packaging, handle_packaging_stream, handle_containers),
    components(
        schemas(
            PackagingRequest,
            CartItem,
            PackagingOutcome,
            OutcomeBranch,
            ContainerSnapshot,
            ItemEcho,
            PackagingDebug,
            ContainersResponse,
            Container,
            ContainerKind,
            ErrorResponse
        )
    ),
    tags((name = "packaging", description = "Endpoints for shipment sizing"))
)]
struct ApiDoc;

/// Builds the application router.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        // API endpoints
        .route("/packaging", post(handle_packaging))
        .route("/packaging_stream", post(handle_packaging_stream))
        .route("/containers", get(handle_containers))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server.
///
/// Blocks until the server is terminated.
pub async fn start_api_server(config: ApiConfig, service: PackagingService) {
    let app = router(ApiState::new(service));

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("❌ Could not bind API server to {}: {}", addr, err);
            return;
        }
    };

    let display_host = config.display_host().to_string();
    info!(
        "🚀 Server running on http://{}:{}",
        display_host,
        config.port()
    );
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        info!("💡 Local access: http://localhost:{}", config.port());
    }
    info!("📦 API Endpoints: POST /packaging, POST /packaging_stream, GET /containers");
    info!("📑 Documentation: GET /docs, GET /docs/openapi.json");

    if let Err(err) = axum::serve(listener, app).await {
        error!("❌ API server terminated with an error: {err}");
    }
}

/// Handler for POST /packaging endpoint.
///
/// Consolidates the items, picks the best catalog container and returns
/// the packaging outcome with billable weights.
#[utoipa::path(
    post,
    path = "/packaging",
    request_body = PackagingRequest,
    responses(
        (status = 200, description = "Packaging decision", body = PackagingOutcome),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request",
            body = ErrorResponse
        ),
        (
            status = SERVICE_UNAVAILABLE,
            description = "Container catalog could not be read",
            body = ErrorResponse
        )
    ),
    tag = "packaging"
)]
async fn handle_packaging(
    State(state): State<ApiState>,
    payload: Result<Json<PackagingRequest>, JsonRejection>,
) -> impl IntoResponse {
    let items = match parse_packaging_request(payload) {
        Ok(items) => items,
        Err(response) => return response,
    };

    info!("📥 New packaging request: {} items", items.len());
    match state.service.compute_packaging(&items).await {
        Ok(outcome) => {
            info!(
                "📦 Result: {:?} via {}, success = {}",
                outcome.branch,
                outcome.container_id().unwrap_or("-"),
                outcome.success
            );
            (StatusCode::OK, Json(outcome)).into_response()
        }
        Err(err) => catalog_unavailable(err),
    }
}

/// Handler for POST /packaging_stream endpoint (SSE).
///
/// Streams every selection step as Server-Sent Events (text/event-stream),
/// finishing with the complete outcome.
#[utoipa::path(
    post,
    path = "/packaging_stream",
    request_body = PackagingRequest,
    responses(
        (
            status = 200,
            description = "Streams selection events in real-time",
            content_type = "text/event-stream",
            body = String
        ),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request",
            body = ErrorResponse
        ),
        (
            status = SERVICE_UNAVAILABLE,
            description = "Container catalog could not be read",
            body = ErrorResponse
        )
    ),
    tag = "packaging"
)]
async fn handle_packaging_stream(
    State(state): State<ApiState>,
    payload: Result<Json<PackagingRequest>, JsonRejection>,
) -> impl IntoResponse {
    let items = match parse_packaging_request(payload) {
        Ok(items) => items,
        Err(response) => return response,
    };

    let catalog = match state.service.active_containers().await {
        Ok(catalog) => catalog,
        Err(err) => return catalog_unavailable(err),
    };

    let (tx, rx) = mpsc::channel::<String>(32);
    let service = state.service.clone();

    tokio::task::spawn_blocking(move || {
        // The final `Outcome` event carries the full decision.
        service.compute_with_catalog(&items, &catalog, |evt| match serde_json::to_string(evt) {
            Ok(json) => {
                // Receiver has closed the stream; remaining events are discarded.
                let _ = tx.blocking_send(json);
            }
            Err(err) => warn!("⚠️ Could not serialize selection event: {err}"),
        });
    });

    let stream = ReceiverStream::new(rx)
        .map(|msg| Ok::<_, std::convert::Infallible>(Event::default().data(msg)));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

/// Handler for GET /containers endpoint.
#[utoipa::path(
    get,
    path = "/containers",
    responses(
        (status = 200, description = "Active containers in preference order", body = ContainersResponse),
        (
            status = SERVICE_UNAVAILABLE,
            description = "Container catalog could not be read",
            body = ErrorResponse
        )
    ),
    tag = "packaging"
)]
async fn handle_containers(State(state): State<ApiState>) -> Response {
    match state.service.active_containers().await {
        Ok(containers) => (StatusCode::OK, Json(ContainersResponse { containers })).into_response(),
        Err(err) => catalog_unavailable(err),
    }
}

async fn serve_openapi_json(State(_state): State<ApiState>) -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui(State(_state): State<ApiState>) -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
