//! Development server with live reload
//!
//! Pages are rendered from the posts directory on every request, with
//! drafts visible.

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{Catalog, MarkdownRenderer};
use crate::error::Error;
use crate::helpers::inject_before_body_end;
use crate::offline::APP_DIR;
use crate::templates::{SiteData, TemplateRenderer};
use crate::Blog;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
"#;

/// Server state
pub struct ServerState {
    blog: Blog,
    catalog: Catalog,
    renderer: MarkdownRenderer,
    templates: TemplateRenderer,
    site: SiteData,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    /// Build the state for a blog in development mode
    pub fn new(blog: &Blog, live_reload: bool) -> crate::Result<Self> {
        let (reload_tx, _) = broadcast::channel::<()>(16);
        Ok(Self {
            catalog: blog.catalog(true),
            renderer: blog.renderer()?,
            templates: TemplateRenderer::new()?,
            site: SiteData::new(&blog.config, false),
            blog: blog.clone(),
            reload_tx,
            live_reload,
        })
    }

    fn page(&self, html: String) -> Response {
        if self.live_reload {
            Html(inject_before_body_end(&html, LIVE_RELOAD_SCRIPT)).into_response()
        } else {
            Html(html).into_response()
        }
    }

    fn error_response(&self, err: Error) -> Response {
        if err.is_not_found() {
            tracing::warn!("404: {}", err);
            let diagnostic = err.diagnostic();
            let body = self
                .templates
                .render_not_found(&self.site, &diagnostic)
                .unwrap_or(diagnostic);
            let mut response = self.page(body);
            *response.status_mut() = StatusCode::NOT_FOUND;
            response
        } else {
            tracing::error!("Request failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Build the router
pub fn router(state: Arc<ServerState>) -> Router {
    let static_dir = ServeDir::new(&state.blog.static_dir);

    Router::new()
        .route("/", get(list_handler))
        .route("/blog", get(list_handler))
        .route("/blog/", get(list_handler))
        .route("/blog/:slug", get(post_handler))
        .route("/blog/:slug/", get(post_handler))
        .route("/blog/:slug/index.json", get(post_json_handler))
        .route("/__livereload", get(livereload_handler))
        .nest_service(&format!("/{}", APP_DIR), static_dir)
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(blog: &Blog, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let state = Arc::new(ServerState::new(blog, watch)?);
    let reload_tx = state.reload_tx.clone();
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let dirs = vec![blog.posts_dir.clone(), blog.static_dir.clone()];
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(dirs, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch content directories and tell clients to reload
///
/// Pages are rendered per request, so a change only needs a reload signal.
fn watch_and_reload(dirs: Vec<PathBuf>, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid reloads
    let mut debouncer = new_debouncer(Duration::from_millis(300), tx)?;

    for dir in dirs.iter().filter(|d| d.exists()) {
        debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", dir);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".DS_Store") && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }
                // No receivers just means no open pages
                let _ = reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// List page
async fn list_handler(State(state): State<Arc<ServerState>>) -> Response {
    let result = match state.catalog.list().await {
        Ok(posts) => state
            .templates
            .render_index(&state.site, &state.blog.config, &posts),
        Err(e) => Err(e),
    };

    match result {
        Ok(html) => state.page(html),
        Err(e) => state.error_response(e),
    }
}

/// Post page
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    let result = match state.catalog.load(&slug, &state.renderer).await {
        Ok(post) => state.templates.render_post(&state.site, &post),
        Err(e) => Err(e),
    };

    match result {
        Ok(html) => state.page(html),
        Err(e) => state.error_response(e),
    }
}

/// Detail view as JSON
async fn post_json_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    match state.catalog.load(&slug, &state.renderer).await {
        Ok(post) => Json(post).into_response(),
        Err(e) => state.error_response(e),
    }
}

async fn fallback_handler(State(state): State<Arc<ServerState>>) -> Response {
    state.error_response(Error::NotFound("page".to_string()))
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
