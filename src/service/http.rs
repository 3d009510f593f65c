use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use image::RgbaImage;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

use crate::{
    charts::{
        division::{DivisionInput, render_division},
        election::{ElectionInput, render_election},
        svg::SvgRasterizer,
    },
    effects::{overlay::pride_flag_template, transform::TransformSpec},
    encode::assembler::{EncodedImage, output_name},
    foundation::error::{MagikdError, MagikdResult},
    frames::{
        pipeline::{PipelineOpts, check_frame_limit, transform_source},
        source::FrameSource,
    },
    imaging::backend::{CpuImaging, ImagingBackend},
    service::{
        config::ServiceConfig,
        fetch::{FsSourceFetcher, SourceFetcher},
    },
};

/// Effects reachable over HTTP and from the CLI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Distort,
    Pride,
}

impl Effect {
    /// File stem of the produced attachment.
    pub fn output_stem(self) -> &'static str {
        match self {
            Self::Distort => "distorted",
            Self::Pride => "pride",
        }
    }
}

/// Process-wide state shared by every request. Assets and the frame pool are set up once, at
/// startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub pipeline: PipelineOpts,
    pub imaging: Arc<dyn ImagingBackend>,
    pub overlay_template: Arc<RgbaImage>,
    pub charts: Arc<SvgRasterizer>,
    pub fetcher: Arc<dyn SourceFetcher>,
}

impl AppState {
    pub fn new(
        config: ServiceConfig,
        imaging: Arc<dyn ImagingBackend>,
        overlay_template: RgbaImage,
        charts: SvgRasterizer,
        fetcher: Arc<dyn SourceFetcher>,
    ) -> MagikdResult<Self> {
        let pipeline = config.pipeline_opts()?;
        Ok(Self {
            config: Arc::new(config),
            pipeline,
            imaging,
            overlay_template: Arc::new(overlay_template),
            charts: Arc::new(charts),
            fetcher,
        })
    }

    /// CPU imaging, filesystem fetcher, system fonts and the configured overlay.
    pub fn from_config(config: ServiceConfig) -> MagikdResult<Self> {
        config.validate()?;
        let overlay = load_overlay_template(&config)?;
        let charts = SvgRasterizer::new(config.fonts_dir.as_deref());
        let fetcher = FsSourceFetcher::new(&config.source_root)?;
        Self::new(
            config,
            Arc::new(CpuImaging::default()),
            overlay,
            charts,
            Arc::new(fetcher),
        )
    }

    /// Decode `bytes`, apply `effect` to every frame and encode the result.
    ///
    /// Returns the encoded image and its attachment name. `hint` picks the output extension.
    #[tracing::instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub fn run_effect(
        &self,
        effect: Effect,
        bytes: &[u8],
        hint: Option<&str>,
    ) -> MagikdResult<(EncodedImage, String)> {
        if bytes.is_empty() {
            return Err(MagikdError::invalid_input("image body is empty"));
        }
        let opts = &self.pipeline;
        let source = FrameSource::decode_bounded(bytes, opts.max_frames)?;
        check_frame_limit(source.frame_count(), opts.max_frames)?;

        let spec = match effect {
            Effect::Distort => TransformSpec::distort(self.config.distort_params()?),
            Effect::Pride => TransformSpec::pride(
                &self.overlay_template,
                self.config.overlay_params()?,
                self.imaging.as_ref(),
            )?,
        };

        let out = transform_source(&source, hint, &spec, self.imaging.as_ref(), opts)?;
        let name = output_name(effect.output_stem(), hint, out.format);
        Ok((out, name))
    }
}

/// The configured overlay image (first frame), or the built-in flag sized to the box.
pub fn load_overlay_template(config: &ServiceConfig) -> MagikdResult<RgbaImage> {
    let Some(path) = &config.overlay_path else {
        return Ok(pride_flag_template(config.box_width, config.box_height));
    };
    let bytes = std::fs::read(path)
        .with_context(|| format!("read overlay template '{}'", path.display()))?;
    let source = FrameSource::decode(&bytes)?;
    Ok(source.frames()[0].image().clone())
}

/// Wraps a library error for the HTTP boundary.
///
/// Client errors become `400` with their message. Anything else is logged and reported as a
/// generic `500`.
#[derive(Debug)]
pub struct ApiError(pub MagikdError);

impl From<MagikdError> for ApiError {
    fn from(value: MagikdError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_client_error() {
            warn!(error = %self.0, "rejected request");
            (StatusCode::BAD_REQUEST, self.0.to_string()).into_response()
        } else {
            error!(error = ?self.0, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "image processing failed",
            )
                .into_response()
        }
    }
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ImageQuery {
    pub img: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct UploadQuery {
    pub name: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/distort", get(distort_ref).post(distort_upload))
        .route("/pride", get(pride_ref).post(pride_upload))
        .route("/division", post(division))
        .route("/election", post(election))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind listener on {addr}"))?;
    info!(%addr, "magikd listening");

    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited")?;
    info!("magikd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut term) = signal(SignalKind::terminate()) {
            term.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> MagikdResult<T> + Send + 'static,
{
    let joined = tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| MagikdError::processing(format!("worker task failed: {e}")))?;
    Ok(joined?)
}

fn attachment(out: EncodedImage, name: &str) -> Response {
    info!(
        name,
        format = ?out.format,
        frames = out.frames,
        bytes = out.bytes.len(),
        "request served"
    );
    (
        [
            (header::CONTENT_TYPE, out.mime_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        out.bytes,
    )
        .into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn effect_from_ref(
    state: AppState,
    effect: Effect,
    query: ImageQuery,
) -> Result<Response, ApiError> {
    let reference = query
        .img
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| MagikdError::invalid_input("missing 'img' query parameter"))?;

    let (out, name) = blocking(move || {
        let bytes = state.fetcher.fetch(&reference)?;
        state.run_effect(effect, &bytes, Some(&reference))
    })
    .await?;
    Ok(attachment(out, &name))
}

async fn effect_from_upload(
    state: AppState,
    effect: Effect,
    query: UploadQuery,
    body: Bytes,
) -> Result<Response, ApiError> {
    let (out, name) =
        blocking(move || state.run_effect(effect, &body, query.name.as_deref())).await?;
    Ok(attachment(out, &name))
}

async fn distort_ref(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    effect_from_ref(state, Effect::Distort, query).await
}

async fn distort_upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Response, ApiError> {
    effect_from_upload(state, Effect::Distort, query, body).await
}

async fn pride_ref(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    effect_from_ref(state, Effect::Pride, query).await
}

async fn pride_upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Response, ApiError> {
    effect_from_upload(state, Effect::Pride, query, body).await
}

async fn division(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let out = blocking(move || {
        let input = DivisionInput::from_json(&body)?;
        render_division(&input, &state.charts)
    })
    .await?;
    Ok(attachment(out, "division.png"))
}

async fn election(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let out = blocking(move || {
        let input = ElectionInput::from_json(&body)?;
        render_election(&input, &state.charts)
    })
    .await?;
    Ok(attachment(out, "election.png"))
}
