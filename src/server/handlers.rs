use axum::{
    Json,
    extract::{Path, Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::config::{CFG_SCALE, DURATION_S, STEPS};
use crate::gate::{GateStatus, GenerationRequest, GenerationResult};
use crate::server::page;
use crate::server::routes::ARTIFACTS_PATH;
use crate::server::state::AppState;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

pub async fn index() -> Html<String> {
    Html(page::render_index())
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
}

pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    state: GateStatus,
    ready: bool,
    message: &'static str,
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = state.gate.status();
    Json(StatusResponse {
        state: status,
        ready: status == GateStatus::Ready,
        message: status.message(),
    })
}

/// A preset shown under the form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Example {
    pub prompt: &'static str,
    pub duration: u32,
    pub steps: u32,
    pub cfg_scale: f64,
}

pub const EXAMPLES: [Example; 4] = [
    Example {
        prompt: "Deep ambient focus music with rich low-end textures and evolving bass drones. \
                 Soft atmospheric layers, slow harmonic shifts, subtle sub-bass pulses, analog warmth, \
                 filtered noise. Inspired by early morning stillness and internal reflection. No melody, \
                 no vocals. Smooth, immersive, and grounding. Tempo: 60 BPM. Ideal for deep concentration, \
                 introspection, and flow state.",
        duration: 15,
        steps: 150,
        cfg_scale: 13.0,
    },
    Example {
        prompt: "A chilled, atmospheric lo-fi beat with warm vinyl crackle, soft piano chords, and \
                 mellow synth textures. Slow tempo. Dreamy and nostalgic mood. Subtle tape hiss and \
                 background ambiance. Suitable for studying, relaxing, or rainy late-night scenes.",
        duration: 47,
        steps: 180,
        cfg_scale: 9.0,
    },
    Example {
        prompt: "Recreate a gentle rainfall with distant thunder.",
        duration: 15,
        steps: 100,
        cfg_scale: 7.0,
    },
    Example {
        prompt: "Rock beat played in a treated studio, session drumming on an acoustic kit.",
        duration: 15,
        steps: 50,
        cfg_scale: 7.0,
    },
];

pub async fn examples() -> Json<&'static [Example]> {
    Json(&EXAMPLES[..])
}

#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    prompt: String,
    #[serde(default = "default_duration")]
    duration: u32,
    #[serde(default = "default_steps")]
    steps: u32,
    #[serde(default = "default_cfg_scale")]
    cfg_scale: f64,
}

fn default_duration() -> u32 {
    DURATION_S.default
}

fn default_steps() -> u32 {
    STEPS.default
}

fn default_cfg_scale() -> f64 {
    CFG_SCALE.default
}

impl GenerateForm {
    fn into_request(self) -> Result<GenerationRequest, ApiError> {
        if !DURATION_S.contains(self.duration) {
            return Err(ApiError::bad_request(format!(
                "duration must be between {} and {} seconds, got {}",
                DURATION_S.min, DURATION_S.max, self.duration
            )));
        }
        if !STEPS.contains(self.steps) {
            return Err(ApiError::bad_request(format!(
                "steps must be between {} and {}, got {}",
                STEPS.min, STEPS.max, self.steps
            )));
        }
        if !CFG_SCALE.contains(self.cfg_scale) {
            return Err(ApiError::bad_request(format!(
                "cfg_scale must be between {} and {}, got {}",
                CFG_SCALE.min, CFG_SCALE.max, self.cfg_scale
            )));
        }
        Ok(GenerationRequest {
            prompt: self.prompt,
            duration_s: self.duration,
            steps: self.steps,
            cfg_scale: self.cfg_scale,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// URL of the generated file, if any.
    audio: Option<String>,
    message: String,
}

pub async fn generate(
    State(state): State<AppState>,
    Json(form): Json<GenerateForm>,
) -> Result<Response, ApiError> {
    let request = form.into_request()?;

    // Sampling blocks for a long time; keep it off the async workers.
    let gate = state.gate.clone();
    let result = tokio::task::spawn_blocking(move || gate.generate(&request))
        .await
        .map_err(|e| ApiError::internal(format!("generation task failed: {e}")))?;

    let (status, audio) = match &result {
        GenerationResult::Generated { path, .. } => {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| ApiError::internal("artifact path has no file name"))?;
            (StatusCode::OK, Some(format!("{ARTIFACTS_PATH}/{name}")))
        }
        GenerationResult::NotReady { .. } => (StatusCode::SERVICE_UNAVAILABLE, None),
        GenerationResult::Failed { .. } => (StatusCode::INTERNAL_SERVER_ERROR, None),
    };

    let body = Json(GenerateResponse {
        audio,
        message: result.message().to_string(),
    });
    Ok((status, body).into_response())
}

/// Serve one generated file. Only artifact names are accepted, so nothing
/// else in the output directory is reachable.
pub async fn artifact(
    State(state): State<AppState>,
    Path(name): Path<String>,
    request: Request,
) -> Result<Response, ApiError> {
    let path = state
        .gate
        .store()
        .resolve(&name)
        .ok_or_else(|| ApiError::not_found(format!("no artifact named {name:?}")))?;
    let response = match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    Ok(response.into_response())
}
