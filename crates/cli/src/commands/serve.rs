use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use chrono::Utc;
use clap::Args;
use mvw_generator::Generator;
use mvw_generator::paths::{is_hidden, request_path};
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::broadcast;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, error, info};

use super::load_wiki;

/// Server-sent events endpoint pages listen on for reloads. Hidden, so it
/// never collides with a wiki page.
const RELOAD_PATH: &str = "/.mvw-reload";

const RELOAD_SCRIPT: &str = r#"<script>
    // Live reload via Server-Sent Events
    const mvwReload = new EventSource('/.mvw-reload');
    mvwReload.onmessage = () => location.reload();
    mvwReload.onerror = () => mvwReload.close();
</script>
"#;

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Port to serve on (defaults to the configured port, 8000)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Skip the initial full build and generate pages only as they are requested
    #[arg(long)]
    pub lazy: bool,

    /// Do not reload open pages when sources change
    #[arg(long)]
    pub no_live_reload: bool,
}

#[derive(Clone)]
struct AppState {
    generator: Arc<Generator>,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Serve the wiki locally.
///
/// This command:
/// - Runs a full build (unless `--lazy`) with links rooted at `/`
/// - Regenerates each requested page from its current source
/// - Serves everything else from the output directory
/// - Watches the sources and tells open pages to reload
pub async fn run(start: PathBuf, args: ServeArgs) -> Result<()> {
    let mut config = load_wiki(&start)?;
    config.site_root = "/".to_string();
    let port = args.port.unwrap_or(config.port);

    println!("📖 Starting wiki server...");
    println!("   Source: {}", config.source_dir.display());
    println!("   Output: {}", config.output_dir.display());

    let generator = Arc::new(Generator::new(config).context("Failed to load theme")?);

    println!("   ✓ {}", prepare_site(&generator, args.lazy)?);

    // Create broadcast channel for reload events
    let (reload_tx, _) = broadcast::channel::<()>(100);

    let state = AppState {
        generator: generator.clone(),
        reload_tx: reload_tx.clone(),
        live_reload: !args.no_live_reload,
    };
    let app = router(state);

    if !args.no_live_reload {
        let source = generator.source_dir().to_path_buf();
        let output = generator.output_dir().to_path_buf();
        tokio::spawn(async move {
            if let Err(e) = watch_files(source, output, reload_tx).await {
                error!(error = %e, "File watcher stopped");
            }
        });
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\n🚀 Wiki ready at: http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to port {}", port))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Build the site before serving. A lazy start only installs the theme
/// assets; pages are generated and files served from the sources on request.
fn prepare_site(generator: &Generator, lazy: bool) -> Result<String> {
    if lazy {
        let assets = generator.install_assets().context("Failed to install theme assets")?;
        Ok(format!("Lazy mode: {} theme assets installed, pages generated on request", assets))
    } else {
        let report = generator.generate().context("Failed to generate site")?;
        Ok(format!("Generated {}", report))
    }
}

fn router(state: AppState) -> Router {
    let mut router = Router::new();
    if state.live_reload {
        router = router.route(RELOAD_PATH, get(sse_handler));
    }
    router.fallback(page_handler).with_state(state)
}

/// Regenerate the requested page, falling back to the source file a full
/// build would copy, then to the output directory
async fn page_handler(State(state): State<AppState>, req: Request) -> Response {
    let path = req.uri().path().to_string();
    if request_path(&path).iter().any(is_hidden) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let method = req.method().clone();
    if method == Method::GET || method == Method::HEAD {
        let generator = state.generator.clone();
        let request = path.clone();
        let regenerated =
            tokio::task::spawn_blocking(move || generator.regenerate(&request)).await;

        match regenerated {
            Ok(Ok(Some(html))) => return page_response(&method, html, state.live_reload),
            Ok(Ok(None)) => debug!(path = %path, "Serving from output directory"),
            Ok(Err(e)) => {
                error!(path = %path, error = %e, "Regeneration failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, format!("Regeneration failed: {e}"))
                    .into_response();
            }
            Err(e) => {
                error!(path = %path, error = %e, "Regeneration task failed");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    let served = match state.generator.resource_path(&path) {
        Some(source) => ServeFile::new(source).oneshot(req).await,
        None => ServeDir::new(state.generator.output_dir()).oneshot(req).await,
    };
    match served {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

fn page_response(method: &Method, html: String, live_reload: bool) -> Response {
    let html = if live_reload {
        inject_reload_script(html)
    } else {
        html
    };

    let headers = [
        (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
        (header::CONTENT_LENGTH, html.len().to_string()),
        (header::LAST_MODIFIED, http_date()),
    ];
    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(html)
    };

    (StatusCode::OK, headers, body).into_response()
}

/// Current time in the IMF-fixdate form HTTP headers use
fn http_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Add the reload listener before `</body>`. Pages without one are left alone.
fn inject_reload_script(html: String) -> String {
    match html.rfind("</body>") {
        Some(at) => {
            let mut injected = String::with_capacity(html.len() + RELOAD_SCRIPT.len());
            injected.push_str(&html[..at]);
            injected.push_str(RELOAD_SCRIPT);
            injected.push_str(&html[at..]);
            injected
        }
        None => html,
    }
}

/// Watch the sources and signal a reload on every visible change
async fn watch_files(
    source: PathBuf,
    output: PathBuf,
    reload_tx: broadcast::Sender<()>,
) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher =
        notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

    watcher
        .watch(&source, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", source.display()))?;

    while let Some(event) = rx.recv().await {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => {
                if let Some(changed) = event
                    .paths
                    .iter()
                    .find(|p| is_source_change(p, &source, &output))
                {
                    info!(path = %changed.display(), "Source changed");
                    println!("   📝 {} changed, reloading...", changed.display());
                    let _ = reload_tx.send(());
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Changes under the output directory, hidden paths and editor backups
/// never trigger a reload
fn is_source_change(path: &Path, source: &Path, output: &Path) -> bool {
    if path.starts_with(output) {
        return false;
    }
    let Ok(relative) = path.strip_prefix(source) else {
        return false;
    };
    if relative.iter().any(is_hidden) {
        return false;
    }
    !relative.to_string_lossy().ends_with('~')
}

/// SSE endpoint for live reload
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.reload_tx.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(()) => yield Ok(Event::default().data("reload")),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
