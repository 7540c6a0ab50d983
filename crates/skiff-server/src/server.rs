//! Static asset server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, HeaderValue, Response},
    response::IntoResponse,
    routing::get,
    Router,
};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::reload::{reload_client_script, ReloadHub, ReloadMessage};

/// HTML documents always revalidate so a new deploy is picked up on the
/// next full-page load.
const HTML_CACHE_CONTROL: &str = "public, max-age=0";

/// Everything else is filename-hashed and safe to cache for a day.
const ASSET_CACHE_CONTROL: &str = "public, max-age=86400";

/// Configuration for the static asset server.
#[derive(Debug, Clone)]
pub struct SpaServerConfig {
    /// Build output directory to serve
    pub root: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for SpaServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("dist"),
            port: 8080,
            host: "0.0.0.0".to_string(),
            open: false,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Build output directory not found: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),
}

/// Static asset server with SPA fallback.
pub struct SpaServer {
    config: SpaServerConfig,
    reload: Option<ReloadHub>,
}

impl SpaServer {
    /// Create a new server.
    pub fn new(config: SpaServerConfig) -> Self {
        Self {
            config,
            reload: None,
        }
    }

    /// Attach a live-reload hub, exposing the reload WebSocket and client
    /// script routes. Used by the dev command only.
    pub fn with_reload(mut self, hub: ReloadHub) -> Self {
        self.reload = Some(hub);
        self
    }

    /// Build the router.
    ///
    /// Any path that resolves to a file under the root is served as-is;
    /// everything else falls back to index.html so client-side routes
    /// resolve on full-page load. The cache-control layer differentiates
    /// HTML from hashed static assets.
    pub fn router(&self) -> Router {
        let index = ServeFile::new(self.config.root.join("index.html"));
        let files = ServeDir::new(&self.config.root).fallback(index);

        let app = match &self.reload {
            Some(hub) => Router::new()
                .route("/__reload", get(ws_handler))
                .route("/__reload.js", get(reload_script_handler))
                .with_state(hub.clone()),
            None => Router::new(),
        };

        app.fallback_service(files).layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            cache_control,
        ))
    }

    /// Start the server.
    pub async fn start(self) -> Result<(), ServerError> {
        if !self.config.root.exists() {
            return Err(ServerError::MissingRoot(self.config.root));
        }

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .expect("Invalid address");

        let app = self.router();

        tracing::info!("Serving {} at http://{}", self.config.root.display(), addr);
        tracing::info!("Unresolved paths fall back to index.html");

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Pick the Cache-Control value from the response content type.
fn cache_control(response: &Response<Body>) -> Option<HeaderValue> {
    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));

    let value = if is_html {
        HTML_CACHE_CONTROL
    } else {
        ASSET_CACHE_CONTROL
    };

    Some(HeaderValue::from_static(value))
}

/// Handler for the live-reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(hub): State<ReloadHub>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, hub))
}

/// Forward reload messages to a connected client.
async fn handle_ws(mut socket: WebSocket, hub: ReloadHub) {
    let mut rx = hub.subscribe();

    let msg = serde_json::to_string(&ReloadMessage::Connected).unwrap();
    if socket.send(Message::Text(msg.into())).await.is_err() {
        return;
    }

    while let Ok(reload_msg) = rx.recv().await {
        let json = serde_json::to_string(&reload_msg).unwrap();
        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

/// Handler for the live-reload client script.
async fn reload_script_handler() -> impl IntoResponse {
    (
        [("content-type", "application/javascript")],
        reload_client_script(),
    )
}
