// src/serve/mod.rs

//! Live-reload development server.
//!
//! - `GET /__livereload` upgrades to a websocket that receives `"reload"` or
//!   `"css"` text frames.
//! - Everything else is served from `serve.base_dir`; HTML responses get the
//!   reload client injected.
//! - [`reload`] watches the served directory and feeds the broadcast channel.

pub mod inject;
pub mod reload;

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::middleware;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::errors::{Result, SitepipeError};

pub use inject::{inject_client, CLIENT_SCRIPT, LIVERELOAD_PATH};
pub use reload::{spawn_reload_watcher, ReloadFilter, ReloadKind};

#[derive(Clone)]
struct ServeState {
    reload_tx: broadcast::Sender<ReloadKind>,
}

/// Build the server's router over `serve_dir`.
pub fn router(serve_dir: PathBuf, reload_tx: broadcast::Sender<ReloadKind>) -> Router {
    Router::new()
        .route(LIVERELOAD_PATH, get(livereload))
        .fallback_service(ServeDir::new(serve_dir))
        .layer(middleware::from_fn(inject::inject_reload_client))
        .layer(TraceLayer::new_for_http())
        .with_state(ServeState { reload_tx })
}

/// Bind `0.0.0.0:port`. Failure here is fatal for the process.
pub async fn bind(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr)
        .await
        .map_err(|e| SitepipeError::Serve(format!("cannot bind {addr}: {e}")))
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn run(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("serving on http://localhost:{}", addr.port());
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| SitepipeError::Serve(e.to_string()))
}

async fn livereload(ws: WebSocketUpgrade, State(state): State<ServeState>) -> Response {
    let rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| client_session(socket, rx))
}

async fn client_session(socket: WebSocket, mut rx: broadcast::Receiver<ReloadKind>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    debug!("live-reload client connected");

    loop {
        tokio::select! {
            pushed = rx.recv() => {
                let kind = match pushed {
                    Ok(kind) => kind,
                    // Missed some; a full reload covers them all.
                    Err(broadcast::error::RecvError::Lagged(_)) => ReloadKind::Full,
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if ws_sender.send(Message::Text(kind.message().to_string())).await.is_err() {
                    break;
                }
            }
            incoming = ws_receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    debug!("live-reload client disconnected");
}
