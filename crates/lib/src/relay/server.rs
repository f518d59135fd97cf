//! Relay HTTP server (single port, one route family).

use crate::channels::{self, DingTalkChannel, Notifier};
use crate::config::Config;
use crate::relay::protocol::Alert;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{Method, StatusCode, Uri},
    routing::any,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Path prefix of the webhook route; the access token follows it.
pub const WEBHOOK_PREFIX: &str = "/webhook/";

/// Shared state for the relay: the outbound channel.
#[derive(Clone)]
pub struct RelayState {
    pub notifier: Arc<dyn Notifier>,
}

impl RelayState {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// State backed by a DingTalk channel built from `config.dingtalk`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let channel =
            DingTalkChannel::from_config(config).context("building dingtalk http client")?;
        log::debug!("dingtalk endpoint: {}", channel.base_url());
        Ok(Self::new(Arc::new(channel)))
    }
}

/// Router with the webhook route family. Other paths get the default 404.
/// Alert bodies are not size-capped.
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route(WEBHOOK_PREFIX, any(webhook))
        .route("/webhook/*access_token", any(webhook))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// Access token from a request path: drop [`WEBHOOK_PREFIX`], then at most one leading `/`.
/// The remainder is returned untouched (it may be empty or contain further `/`).
pub fn routing_credential(path: &str) -> &str {
    let rest = path.strip_prefix(WEBHOOK_PREFIX).unwrap_or(path);
    rest.strip_prefix('/').unwrap_or(rest)
}

/// ANY /webhook/{access_token} — POST only; decodes the alert, forwards it, always 200 once decoded.
async fn webhook(
    State(state): State<RelayState>,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> StatusCode {
    if method != Method::POST {
        log::debug!("rejecting {} {}: method not allowed", method, uri.path());
        return StatusCode::METHOD_NOT_ALLOWED;
    }

    let access_token = routing_credential(uri.path());

    let body = match body {
        Ok(b) => b,
        Err(e) => {
            log::debug!("rejecting webhook: unreadable body: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };
    let alert: Alert = match serde_json::from_slice(&body) {
        Ok(a) => a,
        Err(e) => {
            log::debug!("rejecting webhook: bad alert body: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    log::info!("received alert: {}", alert.text);

    // The send completes (or fails) before the caller gets its 200.
    channels::forward(state.notifier.as_ref(), &alert.text, access_token).await;

    StatusCode::OK
}

/// Bind `server.bind:server.port` and serve until SIGINT/SIGTERM. Bind failure is returned.
pub async fn run_server(config: Config) -> Result<()> {
    let state = RelayState::from_config(&config)?;
    let bind_addr = config.server.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    serve_on(listener, state).await
}

/// Serve the relay on an already-bound listener until SIGINT/SIGTERM.
pub async fn serve_on(listener: TcpListener, state: RelayState) -> Result<()> {
    let local = listener
        .local_addr()
        .context("reading listener address")?;
    log::info!("relay listening on {}", local);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("relay server exited")?;
    log::info!("relay stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}
