#![cfg(feature = "web")]

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    response::Html,
    routing::get,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::chart;
use crate::config::{MAX_UPLOAD_BYTES, PipelineConfig, Profile};
use crate::error::DashboardError;
use crate::pipeline::analyze;
use crate::render::{PageContent, PageRenderer};
use crate::upload::extract_upload;

/// Read-only state shared by every request
pub struct AppState {
    pub config: PipelineConfig,
    pub renderer: PageRenderer,
}

impl AppState {
    pub fn new(config: PipelineConfig) -> Result<Self, DashboardError> {
        chart::install_font(None);
        let renderer = PageRenderer::new(&config)?;
        Ok(AppState { config, renderer })
    }
}

/// Process-level settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Verbose logging and template reload
    pub debug: bool,
    pub profile: Profile,
    /// TrueType font for chart text, tried before the system candidates
    pub font: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            debug: false,
            profile: Profile::default(),
            font: None,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(show_form).post(analyze_upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

pub async fn run(server: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let config = PipelineConfig::for_profile(server.profile);
    chart::install_font(server.font.as_deref());

    let renderer = if server.debug {
        let template = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates/dashboard.hbs");
        PageRenderer::with_reload(&config, &template)?
    } else {
        PageRenderer::new(&config)?
    };

    log::info!(
        "profile '{}': form field '{}', grouping by '{}'",
        server.profile,
        config.field_name,
        config.group_by
    );
    let app_state = Arc::new(AppState { config, renderer });
    let app = build_router(app_state);

    // Start server
    let addr = format!("{}:{}", server.host, server.port);
    let listener = TcpListener::bind(&addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn show_form(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(
        state
            .renderer
            .render_or_fallback(&PageContent::initial(&state.config)),
    )
}

/// Run the pipeline over the submitted workbook.
///
/// Always answers 200; failures are shown inline on the page.
async fn analyze_upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Html<String> {
    let content = match process_upload(&state, multipart).await {
        Ok(content) => content,
        Err(e) => {
            if e.is_user_error() {
                log::warn!("analysis rejected: {}", e);
            } else {
                log::error!("analysis failed: {}", e);
            }
            PageContent::failed(&e)
        }
    };

    Html(state.renderer.render_or_fallback(&content))
}

async fn process_upload(
    state: &Arc<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<PageContent, DashboardError> {
    let mut multipart = multipart.map_err(|e| {
        log::debug!("not a multipart upload: {}", e);
        DashboardError::MissingFile
    })?;
    let upload = extract_upload(&mut multipart, &state.config.field_name).await?;

    // Workbook parsing and PNG encoding are CPU-bound
    let worker_state = Arc::clone(state);
    let analysis = tokio::task::spawn_blocking(move || analyze(&upload.bytes, &worker_state.config))
        .await
        .map_err(|e| DashboardError::Internal(e.to_string()))??;

    Ok(PageContent::analyzed(&analysis))
}
