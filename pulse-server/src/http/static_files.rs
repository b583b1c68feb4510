//! Bootstrap asset serving from the local file tree

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Path as UrlPath, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use tracing::debug;

use crate::{AppState, NOT_FOUND_BODY, ServerError};

/// Serve `index.html` for `/`
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Response, ServerError> {
    serve_file(&state.static_dir, "index.html").await
}

/// Serve anything under `/static/`
pub async fn static_asset(
    State(state): State<Arc<AppState>>,
    UrlPath(path): UrlPath<String>,
) -> Result<Response, ServerError> {
    serve_file(&state.static_dir, &format!("static/{}", path)).await
}

/// Fallback for every unrouted path
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_BODY)).into_response()
}

/// Content type by extension: scripts, stylesheets, and HTML for everything else
pub fn content_type_for(path: &str) -> &'static str {
    if path.ends_with(".js") {
        "text/javascript"
    } else if path.ends_with(".css") {
        "text/css"
    } else {
        "text/html"
    }
}

async fn serve_file(root: &Path, relative: &str) -> Result<Response, ServerError> {
    let path = resolve(root, relative).ok_or_else(|| ServerError::StaticAsset {
        path: relative.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path escapes asset root"),
    })?;

    let data = tokio::fs::read(&path).await.map_err(|e| {
        debug!(path = %path.display(), error = %e, "Static asset unavailable");
        ServerError::StaticAsset {
            path: relative.to_string(),
            source: e,
        }
    })?;

    Ok(([(header::CONTENT_TYPE, content_type_for(relative))], data).into_response())
}

/// Join `relative` onto `root`, refusing anything but plain path segments
fn resolve(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| root.join(relative))
}
