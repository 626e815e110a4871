//! # Gateway HTTP Server
//!
//! Axum router for the REST surface: `/{mount}/{table}` and
//! `/{mount}/{table}/{id}`, dispatched strictly by HTTP method. Paths that
//! do not carry at least a mount prefix and a table name fall to a
//! bad-request handler before any table name is interpreted.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::Value;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::GatewayConfig;
use crate::gateway::ident;
use crate::observability::{Logger, Severity};

use super::engine::StorageEngine;
use super::errors::{GatewayError, GatewayResult};
use super::handler::Gateway;
use super::params::ListParams;
use super::response::Envelope;

/// HTTP server wrapping a gateway instance.
pub struct GatewayServer<E: StorageEngine> {
    config: GatewayConfig,
    gateway: Arc<Gateway<E>>,
}

impl<E: StorageEngine + 'static> GatewayServer<E> {
    pub fn new(gateway: Gateway<E>, config: GatewayConfig) -> Self {
        Self {
            config,
            gateway: Arc::new(gateway),
        }
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        let mount = ident::sanitize(&self.config.mount);
        let mount = if mount.is_empty() {
            "rest".to_string()
        } else {
            mount
        };

        Router::new()
            .route(&format!("/{}/{{table}}", mount), any(collection_handler::<E>))
            .route(
                &format!("/{}/{{table}}/{{id}}", mount),
                any(resource_handler::<E>),
            )
            .fallback(malformed_path)
            .layer(cors_layer(&self.config))
            .with_state(self.gateway.clone())
    }

    /// Bind and serve until the process is stopped.
    pub async fn serve(self) -> std::io::Result<()> {
        let addr = self.config.socket_addr();
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        Logger::log(
            Severity::Info,
            "server_started",
            &[("addr", &addr), ("mount", &self.config.mount)],
        );
        axum::serve(listener, router).await
    }
}

/// Shared state type
type ServerState<E> = Arc<Gateway<E>>;

fn cors_layer(config: &GatewayConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Collection route: GET lists, POST creates. Update and Delete require a
/// present id, so here they are a client error rather than silently
/// ignored; anything else is method-not-allowed.
async fn collection_handler<E: StorageEngine + 'static>(
    State(gateway): State<ServerState<E>>,
    Path(table): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    method: Method,
    body: Bytes,
) -> Result<Response, GatewayError> {
    match method {
        Method::GET => {
            let params = ListParams::parse(&query)?;
            let (results, pagination) = gateway.list(&table, &params)?;
            Ok(Json(Envelope::records(results, pagination)).into_response())
        }
        Method::POST => {
            let payload = parse_body(&body)?;
            let result = gateway.create(&table, &payload)?;
            Ok((StatusCode::CREATED, Json(Envelope::record(result))).into_response())
        }
        Method::PUT | Method::PATCH | Method::DELETE => Err(GatewayError::Validation(
            "row id is required".to_string(),
        )),
        _ => Err(GatewayError::MethodNotAllowed),
    }
}

/// Resource route: GET fetches, PUT/PATCH update, DELETE deletes.
async fn resource_handler<E: StorageEngine + 'static>(
    State(gateway): State<ServerState<E>>,
    Path((table, id)): Path<(String, String)>,
    method: Method,
    body: Bytes,
) -> Result<Response, GatewayError> {
    match method {
        Method::GET => {
            let result = gateway.get(&table, &id)?;
            Ok(Json(Envelope::record(result)).into_response())
        }
        Method::PUT | Method::PATCH => {
            let payload = parse_body(&body)?;
            let result = gateway.update(&table, &id, &payload)?;
            Ok(Json(Envelope::record(result)).into_response())
        }
        Method::DELETE => {
            let result = gateway.delete(&table, &id)?;
            Ok(Json(Envelope::record(result)).into_response())
        }
        _ => Err(GatewayError::MethodNotAllowed),
    }
}

async fn malformed_path() -> GatewayError {
    GatewayError::Validation("malformed path: expected /{mount}/{table}[/{id}]".to_string())
}

fn parse_body(body: &Bytes) -> GatewayResult<Value> {
    serde_json::from_slice(body)
        .map_err(|err| GatewayError::Validation(format!("invalid JSON body: {}", err)))
}
