//! Development server with on-demand rendering and live reload

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::ContentError;
use crate::generator::Generator;
use crate::Site;

/// Reconnecting client appended to every rendered page
const LIVE_RELOAD_SCRIPT: &str = r#"<script>
(() => {
  const connect = () => {
    const ws = new WebSocket(`ws://${location.host}/__livereload`);
    ws.onmessage = (msg) => { if (msg.data === "reload") location.reload(); };
    ws.onclose = () => setTimeout(connect, 1000);
  };
  connect();
})();
</script>
"#;

/// Server state
struct ServerState {
    base_dir: PathBuf,
    generator: RwLock<Arc<Generator>>,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    fn generator(&self) -> Arc<Generator> {
        match self.generator.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Re-read the configuration and swap in a fresh generator
    fn reload(&self) -> Result<()> {
        let site = Site::new(&self.base_dir)?;
        let generator = Arc::new(Generator::new(&site)?);
        match self.generator.write() {
            Ok(mut guard) => *guard = generator,
            Err(poisoned) => *poisoned.into_inner() = generator,
        }
        Ok(())
    }
}

/// Start the development server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        base_dir: site.base_dir.clone(),
        generator: RwLock::new(Arc::new(Generator::new(site)?)),
        reload_tx,
        live_reload: watch,
    });

    let app = Router::new()
        .route("/", get(home_handler))
        .route("/posts/:id", get(post_handler))
        .route("/__livereload", get(livereload_handler))
        .fallback_service(ServeDir::new(&site.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

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
        let paths = vec![site.content_dir.clone(), site.static_dir.clone(), site.config_path()];
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(paths, state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch for file changes and tell connected pages to reload
fn watch_and_reload(paths: Vec<PathBuf>, state: Arc<ServerState>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel::<DebounceEventResult>();

    // Debounce to avoid reloading on every write of a save burst
    let mut debouncer = new_debouncer(Duration::from_millis(300), tx)?;

    for path in &paths {
        if path.exists() {
            let mode = if path.is_dir() {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            debouncer.watcher().watch(path, mode)?;
            tracing::debug!("Watching: {:?}", path);
        }
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path = e.path.to_string_lossy();
                        !path.contains(".DS_Store") && !path.ends_with('~')
                    })
                    .collect();
                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                if let Err(e) = state.reload() {
                    tracing::error!("Reload failed: {:#}", e);
                    continue;
                }
                let _ = state.reload_tx.send(());
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

async fn home_handler(State(state): State<Arc<ServerState>>) -> Response {
    let generator = state.generator();
    let rendered = tokio::task::spawn_blocking(move || generator.render_home()).await;
    page_response(&state, rendered)
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    axum::extract::Path(id): axum::extract::Path<String>,
) -> Response {
    let generator = state.generator();
    let rendered = tokio::task::spawn_blocking(move || generator.render_post(&id)).await;
    page_response(&state, rendered)
}

/// Turn a render result into a response; missing posts are 404s
fn page_response(
    state: &ServerState,
    rendered: Result<Result<String>, tokio::task::JoinError>,
) -> Response {
    match rendered {
        Ok(Ok(html)) => {
            if state.live_reload {
                Html(inject_live_reload(&html)).into_response()
            } else {
                Html(html).into_response()
            }
        }
        Ok(Err(e)) => {
            let not_found = e
                .downcast_ref::<ContentError>()
                .map(ContentError::is_not_found)
                .unwrap_or(false);
            if not_found {
                (StatusCode::NOT_FOUND, "Not found").into_response()
            } else {
                tracing::error!("Render failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e)).into_response()
            }
        }
        Err(e) => {
            tracing::error!("Render task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Push a `reload` message for every change until the page goes away
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        let keep_open = tokio::select! {
            changed = reload_rx.recv() => match changed {
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => socket
                    .send(Message::Text("reload".into()))
                    .await
                    .is_ok(),
                Err(broadcast::error::RecvError::Closed) => false,
            },
            incoming = socket.recv() => !matches!(incoming, None | Some(Err(_)) | Some(Ok(Message::Close(_)))),
        };
        if !keep_open {
            break;
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Append the live reload client just before `</body>`
fn inject_live_reload(html: &str) -> String {
    match html.rfind("</body>") {
        Some(pos) => format!("{}{}{}", &html[..pos], LIVE_RELOAD_SCRIPT, &html[pos..]),
        None => format!("{}{}", html, LIVE_RELOAD_SCRIPT),
    }
}

/// Hand the URL to the platform's opener
fn open_browser(url: &str) -> Result<()> {
    let (program, args): (&str, Vec<&str>) = if cfg!(target_os = "macos") {
        ("open", vec![url])
    } else if cfg!(target_os = "windows") {
        ("cmd", vec!["/c", "start", url])
    } else {
        ("xdg-open", vec![url])
    };
    std::process::Command::new(program).args(args).spawn()?;
    Ok(())
}
