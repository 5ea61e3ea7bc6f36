use std::fs;
use std::path::{Component, Path, PathBuf};

use actix_files::NamedFile;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::AppState;

pub const APP_TITLE: &str = "AI Pong Arena";

const MISSING_BUILD_MESSAGE: &str =
    "Frontend build not found. Run 'npm install && npm run build' inside frontend/.";

const MISSING_BUILD_WIDGET: &str = "<!doctype html><html><head><meta charset='utf-8'/>\
<title>AI Pong Arena</title></head><body>\
<div style='font-family:sans-serif;padding:16px'>\
Frontend build is missing. Run <code>npm install && npm run build</code> in <code>frontend/</code>.\
</div></body></html>";

/// GET /
/// Serves the built index page, or build instructions when there is no build
pub async fn index(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let index_file = state.frontend_dist.join("index.html");
    match NamedFile::open_async(&index_file).await {
        Ok(file) => file.into_response(&req),
        Err(_) => HttpResponse::Ok().json(serde_json::json!({
            "message": MISSING_BUILD_MESSAGE
        })),
    }
}

/// Self-contained widget document: the built index page with its stylesheet
/// and script inlined, or a placeholder page when the build is missing.
pub fn load_widget_html(dist: &Path) -> String {
    let Ok(html) = fs::read_to_string(dist.join("index.html")) else {
        return MISSING_BUILD_WIDGET.to_string();
    };

    let css = find_reference(&html, "href", ".css")
        .and_then(|rel| read_bundle_file(dist, rel))
        .unwrap_or_default();
    let js = find_reference(&html, "src", ".js")
        .and_then(|rel| read_bundle_file(dist, rel))
        .unwrap_or_default();

    format!(
        "<!doctype html>\
<html lang='en'>\
<head>\
<meta charset='UTF-8' />\
<meta name='viewport' content='width=device-width, initial-scale=1.0' />\
<title>{APP_TITLE}</title>\
<style>{css}</style>\
</head>\
<body>\
<div id='root'></div>\
<script type='module'>{js}</script>\
</body>\
</html>"
    )
}

/// First `attr="..."` value in the page that ends with `ext`
fn find_reference<'a>(html: &'a str, attr: &str, ext: &str) -> Option<&'a str> {
    let needle = format!("{attr}=\"");
    let mut rest = html;
    while let Some(start) = rest.find(&needle) {
        let value_start = &rest[start + needle.len()..];
        let end = value_start.find('"')?;
        let value = &value_start[..end];
        if value.len() > ext.len() && value.ends_with(ext) {
            return Some(value);
        }
        rest = &value_start[end..];
    }
    None
}

/// Reads a file referenced by the index page; stays inside the bundle directory.
fn read_bundle_file(dist: &Path, reference: &str) -> Option<String> {
    let relative = PathBuf::from(reference.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        tracing::warn!("Ignoring bundle reference outside dist: {}", reference);
        return None;
    }
    fs::read_to_string(dist.join(relative)).ok()
}
