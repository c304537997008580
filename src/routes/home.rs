use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::path::PathBuf;

/// Directory the front page and its script are served from.
pub struct StaticDir(pub PathBuf);

/// Endpoint used by clients to know if the server is working
#[tracing::instrument(name = "Health Check handler")]
pub async fn health_check(_: HttpRequest) -> impl Responder {
    HttpResponse::Ok()
}

#[tracing::instrument(name = "Front page handler", skip(static_dir))]
pub async fn home(static_dir: web::Data<StaticDir>) -> HttpResponse {
    serve_file(&static_dir, "index.html", "text/html; charset=utf-8").await
}

#[tracing::instrument(name = "Front page script handler", skip(static_dir))]
pub async fn home_script(static_dir: web::Data<StaticDir>) -> HttpResponse {
    serve_file(&static_dir, "script.js", "application/javascript; charset=utf-8").await
}

async fn serve_file(static_dir: &StaticDir, name: &str, content_type: &'static str) -> HttpResponse {
    let path = static_dir.0.join(name);

    match tokio::fs::read(&path).await {
        Ok(contents) => HttpResponse::Ok().content_type(content_type).body(contents),
        Err(err) => {
            tracing::error!("Failed to read static file {}: {:?}", path.display(), err);
            HttpResponse::NotFound().finish()
        }
    }
}
