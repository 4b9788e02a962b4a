use std::path::{Path, PathBuf};

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use fieldlines::io::FormatRegistry;
use fieldlines::request::SimulationRequest;
use fieldlines::validate::validate;
use notify::{Event, RecursiveMode, Watcher};
use serde_json::json;
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_livereload::LiveReloadLayer;
use tracing::{info, warn};

/// Formats the dev server keeps up to date in the output directory.
const SERVED_FORMATS: [&str; 3] = ["html", "svg", "json"];

/// Regenerate every served format from the input request
fn regenerate(input: &Path, output: &Path) -> anyhow::Result<()> {
    FormatRegistry::with_defaults().generate(input, output, &SERVED_FORMATS)?;
    Ok(())
}

/// `POST /api/simulate`: run a request body and answer with the JSON result.
async fn simulate(body: String) -> Response {
    let simulation = match SimulationRequest::from_json(&body).and_then(|r| validate(&r)) {
        Ok(simulation) => simulation,
        Err(e) => {
            warn!(error = %e, "rejected simulation request");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    match tokio::task::spawn_blocking(move || simulation.run()).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

fn router(output: &Path) -> Router {
    Router::new()
        .route("/api/simulate", post(simulate))
        .fallback_service(ServeDir::new(output))
}

/// Start the development server with hot reload
pub async fn serve(input: &Path, output: &Path, port: u16) -> anyhow::Result<()> {
    regenerate(input, output)?;
    println!("Generated initial output in {}", output.display());

    let (tx, mut rx) = mpsc::channel::<()>(1);

    let input_name = input.file_name().map(|n| n.to_os_string());
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            let touches_input = event
                .paths
                .iter()
                .any(|p| p.file_name() == input_name.as_deref());
            if touches_input && (event.kind.is_modify() || event.kind.is_create()) {
                let _ = tx.blocking_send(());
            }
        }
    })?;

    // Watch the parent directory so editors that replace the file are seen.
    let watch_path = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;

    let input_for_regen = input.to_path_buf();
    let output_for_regen = output.to_path_buf();
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            // Debounce: wait a bit for rapid changes to settle
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            while rx.try_recv().is_ok() {}

            let (input, output) = (input_for_regen.clone(), output_for_regen.clone());
            match tokio::task::spawn_blocking(move || regenerate(&input, &output)).await {
                Ok(Ok(())) => info!("regenerated output"),
                Ok(Err(e)) => warn!(error = %e, "regeneration failed"),
                Err(e) => warn!(error = %e, "regeneration task panicked"),
            }
        }
    });

    let livereload = LiveReloadLayer::new();
    let reloader = livereload.reloader();

    // Reload the browser whenever the output directory changes
    let mut output_watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() {
                reloader.reload();
            }
        }
    })?;
    output_watcher.watch(output, RecursiveMode::Recursive)?;

    let app = router(output).layer(livereload);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("Development server running at http://localhost:{port}");
    println!("Watching {} for changes...", input.display());
    println!("Press Ctrl+C to stop");

    // Keep watchers alive
    let _watcher = watcher;
    let _output_watcher = output_watcher;

    axum::serve(listener, app).await?;

    Ok(())
}
