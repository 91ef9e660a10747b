use crate::app::ScannerApp;
use crate::error::ClientError;
use crate::models::scan::{ScanRequest, UploadFile};
use crate::models::state::ActiveMode;
use actix_web::{HttpResponse, Result as ActixResult, web};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use log::{error, info};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GitScanForm {
    pub repo_url: String,
    #[serde(default)]
    pub github_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModeSelection {
    pub mode: ActiveMode,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .service(
            web::scope("/api")
                .route("/config", web::get().to(get_config))
                .route("/state", web::get().to(get_state))
                .route("/scan/git", web::post().to(submit_git_scan))
                .route("/scan/upload", web::post().to(submit_upload_scan))
                .route("/view/mode", web::post().to(select_mode))
                .route("/history/refresh", web::post().to(refresh_history))
                .route("/history/{id}/view", web::post().to(view_history_item))
                .route("/error", web::delete().to(clear_error)),
        );
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "secrets-console"
    }))
}

async fn get_config(app: web::Data<ScannerApp>) -> HttpResponse {
    HttpResponse::Ok().json(app.config.as_ref())
}

async fn get_state(app: web::Data<ScannerApp>) -> HttpResponse {
    HttpResponse::Ok().json(app.snapshot().await)
}

/// Runs the scan on its own task so a dropped connection cannot abandon it mid-flight.
async fn run_scan(app: &web::Data<ScannerApp>, request: ScanRequest) -> ActixResult<HttpResponse> {
    let orchestrator = app.orchestrator.clone();
    let scan = request.clone();
    let outcome = match tokio::spawn(async move { orchestrator.submit(scan).await }).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Scan task failed: {}", e);
            return Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": app.config.ui.messages.unknown_error
            })));
        }
    };

    let snapshot = app.snapshot().await;
    let response = match outcome {
        Ok(_) => HttpResponse::Ok().json(snapshot),
        Err(ClientError::Validation(message)) => {
            HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "error": message,
                "state": snapshot
            }))
        }
        // the notifier may already hold a later history error
        Err(e) => HttpResponse::BadGateway().json(serde_json::json!({
            "error": request.failure_message(&e, &app.config.ui.messages),
            "state": snapshot
        })),
    };
    Ok(response)
}

async fn submit_git_scan(
    form: web::Json<GitScanForm>,
    app: web::Data<ScannerApp>,
) -> ActixResult<HttpResponse> {
    let form = form.into_inner();
    run_scan(&app, ScanRequest::git(form.repo_url, form.github_token)).await
}

/// Reads at most one byte past `limit`, enough for validation to see an oversized file.
async fn read_upload(mut payload: web::Payload, limit: u64) -> ActixResult<Bytes> {
    let cap = usize::try_from(limit.saturating_add(1)).unwrap_or(usize::MAX);
    let mut body = BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        let room = cap - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}

async fn submit_upload_scan(
    query: web::Query<UploadQuery>,
    payload: web::Payload,
    app: web::Data<ScannerApp>,
) -> ActixResult<HttpResponse> {
    let filename = query
        .into_inner()
        .filename
        .filter(|name| !name.trim().is_empty());

    let file = match filename {
        Some(name) => {
            let content = read_upload(payload, app.config.max_upload_bytes).await?;
            info!("Received upload {} ({} bytes)", name, content.len());
            Some(UploadFile::new(name, content))
        }
        None => None,
    };

    run_scan(&app, ScanRequest::upload(file)).await
}

async fn select_mode(
    selection: web::Json<ModeSelection>,
    app: web::Data<ScannerApp>,
) -> HttpResponse {
    app.view.select_mode(selection.mode).await;
    HttpResponse::Ok().json(app.snapshot().await)
}

async fn refresh_history(app: web::Data<ScannerApp>) -> HttpResponse {
    // a failure is reported through the snapshot's error
    let _ = app.history.refresh().await;
    HttpResponse::Ok().json(app.snapshot().await)
}

async fn view_history_item(path: web::Path<i64>, app: web::Data<ScannerApp>) -> HttpResponse {
    let id = path.into_inner();
    match app.view_history_item(id).await {
        Some(_) => HttpResponse::Ok().json(app.snapshot().await),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("No scan with id {} in history", id)
        })),
    }
}

async fn clear_error(app: web::Data<ScannerApp>) -> HttpResponse {
    app.notifier.clear().await;
    HttpResponse::Ok().json(app.snapshot().await)
}
