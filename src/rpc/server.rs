/*!
 * HTTP transport for the translation facade.
 *
 * Calls are JSON-RPC 2.0 requests POSTed to the configured RPC path. Every
 * domain outcome, including failures, is returned as a string `result`;
 * JSON-RPC `error` members are reserved for protocol problems.
 */

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::app_config::ServerConfig;
use crate::errors::AppError;
use crate::translation::{SchemaPayload, SqlTranslator};
use super::protocol::{
    RpcMethod, RpcRequest, RpcResponse, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};

/// Build the router serving RPC calls on `rpc_path` and a `/health` probe
pub fn router(translator: Arc<SqlTranslator>, rpc_path: &str) -> Router {
    Router::new()
        .route(rpc_path, post(handle_rpc))
        .route("/health", get(|| async { "ok" }))
        .with_state(translator)
}

async fn handle_rpc(State(translator): State<Arc<SqlTranslator>>, body: String) -> Json<RpcResponse> {
    let value: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(e) => {
            warn!("Rejected RPC body: {}", e);
            return Json(RpcResponse::failure(Value::Null, PARSE_ERROR, format!("Parse error: {}", e)));
        }
    };

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: RpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            return Json(RpcResponse::failure(id, INVALID_REQUEST, format!("Invalid request: {}", e)));
        }
    };

    Json(dispatch(&translator, request).await)
}

/// Execute one call against the translator
pub async fn dispatch(translator: &SqlTranslator, request: RpcRequest) -> RpcResponse {
    if let Some(version) = &request.jsonrpc {
        if version != "2.0" {
            return RpcResponse::failure(request.id, INVALID_REQUEST, format!("Unsupported jsonrpc version: {}", version));
        }
    }

    let Some(method) = RpcMethod::from_name(&request.method) else {
        warn!("Unknown RPC method: {}", request.method);
        return RpcResponse::failure(request.id, METHOD_NOT_FOUND, format!("Method not found: {}", request.method));
    };
    debug!("RPC call: {}", method.name());

    match method {
        RpcMethod::UpdateContext => match request.param(0, "payload") {
            Some(payload) => {
                let reply = translator.update_context_reply(SchemaPayload::from(payload.clone()));
                RpcResponse::success(request.id, reply)
            }
            None => RpcResponse::failure(request.id, INVALID_PARAMS, "updateContext expects one parameter: payload"),
        },
        RpcMethod::Translate => match request.param(0, "query").and_then(Value::as_str) {
            Some(query) => {
                let reply = translator.translate_reply(query).await;
                RpcResponse::success(request.id, reply)
            }
            None => RpcResponse::failure(request.id, INVALID_PARAMS, "translate expects one string parameter: query"),
        },
        RpcMethod::ListMethods => {
            let names: Vec<Value> = RpcMethod::ALL.iter().map(|m| Value::from(m.name())).collect();
            RpcResponse::success(request.id, Value::Array(names))
        }
    }
}

/// Bind the configured address and serve until Ctrl+C
pub async fn serve(translator: Arc<SqlTranslator>, config: &ServerConfig) -> Result<(), AppError> {
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind {}: {}", address, e)))?;

    serve_with_listener(listener, translator, &config.rpc_path, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves
pub async fn serve_with_listener(
    listener: TcpListener,
    translator: Arc<SqlTranslator>,
    rpc_path: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    let local_addr = listener.local_addr()
        .map_err(|e| AppError::Server(format!("Failed to get local addr: {}", e)))?;
    info!("RPC server listening on http://{}{}", local_addr, rpc_path);

    axum::serve(listener, router(translator, rpc_path))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

/// Resolve once `signal` fires; if the handler cannot be installed, never resolve.
async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutdown requested, stopping RPC server"),
        Err(e) => {
            error!("Failed to listen for Ctrl+C ({}); the server will run until killed", e);
            std::future::pending::<()>().await;
        }
    }
}
