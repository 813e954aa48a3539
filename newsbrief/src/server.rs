use std::sync::Arc;

use anyhow::{anyhow, Result};
use rocket::figment::Figment;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, routes, Build, Rocket, State};
use serde::Serialize;

use crate::error::BriefingError;
use crate::models::{NewsResponse, StyleMode};
use crate::processing::Briefing;
use common::ServerConfig;

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub briefing: Arc<Briefing>,
}

impl AppState {
    pub fn new(briefing: Arc<Briefing>) -> Self {
        Self { briefing }
    }
}

/// JSON error body shared by every failing route
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (Status, Json<ErrorBody>);

fn api_error(status: Status, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

/// Styled briefing. A missing or empty `style` means CEO.
#[get("/api/news?<style>")]
async fn news(state: &State<AppState>, style: Option<String>) -> Result<Json<NewsResponse>, ApiError> {
    let style = match style.as_deref().filter(|s| !s.is_empty()).unwrap_or("CEO").parse::<StyleMode>() {
        Ok(style) => style,
        Err(e) => return Err(api_error(Status::BadRequest, e.to_string())),
    };

    match state.briefing.generate(style).await {
        Ok(response) => {
            tracing::info!(style = %style, articles = response.articles.len(), "briefing served");
            Ok(Json(response))
        }
        Err(BriefingError::NoArticles) => Err(api_error(Status::NotFound, BriefingError::NoArticles.to_string())),
        Err(e) => {
            tracing::error!("Error in news API: {}", e);
            Err(api_error(Status::InternalServerError, e.to_string()))
        }
    }
}

/// Build the Rocket instance with managed state and routes mounted.
pub fn build_rocket(state: AppState, figment: Figment) -> Rocket<Build> {
    rocket::custom(figment).manage(state).mount("/", routes![health, news])
}

/// Launch the HTTP server on the `[server]` bind address and port.
///
/// This function blocks until the Rocket server shuts down (it awaits `rocket.launch().await`)
/// and returns an error if Rocket fails to start.
pub async fn launch_rocket(state: AppState, server: &ServerConfig) -> Result<()> {
    let figment = rocket::Config::figment()
        .merge(("address", server.bind().to_string()))
        .merge(("port", server.port()));

    tracing::info!(
        bind = server.bind(),
        port = server.port(),
        source = state.briefing.source_name(),
        "Starting Rocket HTTP server"
    );
    build_rocket(state, figment)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
