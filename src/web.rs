use crate::config::Config;
use crate::error::PanelError;
use crate::models::{duration_label, PanelEvent, PanelView, DURATION_CHOICES};
use crate::panel::{ControlPanel, STATUS_RUNNING};
use crate::system::Cursor;
use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

const INDEX_TEMPLATE: &str = include_str!("../static/index.html");

pub struct AppState<C> {
    pub panel: Arc<ControlPanel<C>>,
    pub config: Config,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

pub fn build_router<C>(state: Arc<AppState<C>>) -> Router
where
    C: Cursor + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index::<C>))
        .route("/healthz", get(healthz))
        .route("/api/event", post(panel_event::<C>))
        .route("/api/status", get(panel_status::<C>))
        .with_state(state)
}

/// Serves the panel until Ctrl-C, then stops any active run.
pub async fn serve<C>(addr: SocketAddr, state: Arc<AppState<C>>) -> Result<()>
where
    C: Cursor + Clone + Send + Sync + 'static,
{
    let panel = state.panel.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "control panel listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tokio::task::spawn_blocking(move || panel.shutdown()).await?;
    info!("control panel shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index<C>(State(state): State<Arc<AppState<C>>>) -> Html<String> {
    Html(render_index(&state.config))
}

async fn panel_event<C>(
    State(state): State<Arc<AppState<C>>>,
    Json(event): Json<PanelEvent>,
) -> ApiResult<PanelView>
where
    C: Cursor + Clone + Send + Sync + 'static,
{
    state.panel.handle(&event).map(Json).map_err(|err| {
        warn!(%err, trigger = ?event.trigger, "panel event rejected");
        api_error(err)
    })
}

async fn panel_status<C>(State(state): State<Arc<AppState<C>>>) -> Json<PanelView>
where
    C: Cursor + Clone + Send + Sync + 'static,
{
    Json(state.panel.status_at(chrono::Local::now()))
}

fn api_error(err: PanelError) -> (StatusCode, Json<ApiError>) {
    let status = if err.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ApiError {
            code: err.code().to_string(),
            message: err.to_string(),
        }),
    )
}

pub fn render_index(config: &Config) -> String {
    let options = DURATION_CHOICES
        .iter()
        .map(|minutes| {
            let selected = if *minutes == config.default_duration_mins {
                " selected"
            } else {
                ""
            };
            format!(
                "      <option value=\"{}\"{}>{}</option>",
                minutes,
                selected,
                duration_label(*minutes)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    INDEX_TEMPLATE
        .replace("{{frequency}}", &config.default_frequency_secs.to_string())
        .replace("{{duration_options}}", &options)
        .replace("{{running_status}}", STATUS_RUNNING)
}
