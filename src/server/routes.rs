//! HTTP route handlers.

use crate::core::constants::{
    MAX_UPLOAD_BYTES, MODEL_INPUT_CHANNELS, MODEL_INPUT_HEIGHT, MODEL_INPUT_WIDTH,
    PREDICTION_CLASSES,
};
use crate::core::errors::ClassifierError;
use crate::core::traits::ProbabilityModel;
use crate::domain::{Label, ModelInfo};
use crate::predictor::DamageClassifier;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Shared application state.
///
/// Built once during startup and never mutated afterwards; cloning shares
/// the same classifier and metadata.
pub struct AppState<M> {
    /// The classification pipeline around the loaded model.
    pub classifier: Arc<DamageClassifier<M>>,
    /// Model metadata loaded from the optional sidecar.
    pub model_info: Arc<ModelInfo>,
}

impl<M> Clone for AppState<M> {
    fn clone(&self) -> Self {
        Self {
            classifier: Arc::clone(&self.classifier),
            model_info: Arc::clone(&self.model_info),
        }
    }
}

impl<M> AppState<M> {
    /// Creates the application state from its startup-built parts.
    pub fn new(classifier: DamageClassifier<M>, model_info: ModelInfo) -> Self {
        Self {
            classifier: Arc::new(classifier),
            model_info: Arc::new(model_info),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status, always `"healthy"` for a running process.
    pub status: &'static str,
    /// Whether the model artifact is loaded.
    pub model_loaded: bool,
}

/// Classification response.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    /// The two-valued verdict.
    pub prediction: Label,
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Human-readable description of the failure.
    pub error: String,
}

/// Preprocessing section of the summary response.
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingSummary {
    /// Target spatial size.
    pub resize: [u32; 2],
    /// Pixel value range after normalization.
    pub normalization: &'static str,
    /// Color mode fed to the model.
    pub color_mode: &'static str,
}

/// Model summary response.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    /// Model name from the metadata sidecar.
    pub model_name: String,
    /// Architecture name derived from the loaded artifact.
    pub model_architecture: String,
    /// Model input signature; the batch dimension is dynamic.
    pub input_shape: [Option<u32>; 4],
    /// Model output signature; the batch dimension is dynamic.
    pub output_shape: [Option<u32>; 2],
    /// Trainable parameter count from the metadata sidecar.
    pub total_parameters: u64,
    /// Held-out test accuracy, or `"N/A"` when unknown.
    pub test_accuracy: serde_json::Value,
    /// Spatial input size.
    pub image_size: [u32; 2],
    /// Preprocessing applied before inference.
    pub preprocessing: PreprocessingSummary,
    /// Output classes, indexed by class id.
    pub prediction_classes: [&'static str; 2],
    /// Textual summary of the model graph.
    pub model_summary: String,
}

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request carried no image payload.
    #[error("no image data provided")]
    MissingImage,

    /// The multipart payload could not be parsed.
    #[error("invalid multipart payload: {0}")]
    Multipart(String),

    /// The request body could not be read.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// A pipeline error, client- or internal-class.
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    /// Any other internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response wrapper for axum.
#[derive(Debug)]
pub struct ApiErrorResponse(ApiError);

impl From<ApiError> for ApiErrorResponse {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl From<ClassifierError> for ApiErrorResponse {
    fn from(err: ClassifierError) -> Self {
        Self(ApiError::Classifier(err))
    }
}

/// Renders an error and its source chain as one message.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ApiError::MissingImage | ApiError::Multipart(_) | ApiError::BodyRead(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Classifier(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Classifier(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = error_chain(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %message, "request failed");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Creates the service router.
pub fn create_router<M>(state: AppState<M>) -> Router
where
    M: ProbabilityModel + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/summary", get(summary_handler::<M>))
        .route("/inference", post(inference_handler::<M>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Root endpoint describing the API.
async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "Building Damage Classification API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET /": "API information",
            "GET /summary": "Model metadata and summary",
            "POST /inference": "Image classification endpoint (accepts binary image data)",
            "GET /health": "Health check"
        },
        "usage": {
            "inference": "Send POST request to /inference with binary image data in request body"
        }
    }))
}

/// Health check endpoint.
///
/// The service cannot start without a loaded model, so a responding
/// process always reports the model as loaded.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_loaded: true,
    })
}

/// Model summary endpoint.
async fn summary_handler<M>(
    State(state): State<AppState<M>>,
) -> Result<Json<SummaryResponse>, ApiErrorResponse>
where
    M: ProbabilityModel + Send + Sync + 'static,
{
    let description = state.classifier.model().describe()?;

    Ok(Json(SummaryResponse {
        model_name: state.model_info.model_name.clone(),
        model_architecture: description.architecture_name,
        input_shape: [
            None,
            Some(MODEL_INPUT_HEIGHT),
            Some(MODEL_INPUT_WIDTH),
            Some(MODEL_INPUT_CHANNELS as u32),
        ],
        output_shape: [None, Some(1)],
        total_parameters: state.model_info.total_parameters,
        test_accuracy: state.model_info.test_accuracy_json(),
        image_size: [MODEL_INPUT_WIDTH, MODEL_INPUT_HEIGHT],
        preprocessing: PreprocessingSummary {
            resize: [MODEL_INPUT_WIDTH, MODEL_INPUT_HEIGHT],
            normalization: "[0, 1]",
            color_mode: "RGB",
        },
        prediction_classes: PREDICTION_CLASSES,
        model_summary: description.summary,
    }))
}

/// Extracts the image bytes from a request.
///
/// A `multipart/form-data` request is searched for a field named
/// `image`; any other request supplies the image as its raw body
/// (original service behavior: form field first, raw body fallback).
async fn extract_image_bytes(req: Request) -> Result<Vec<u8>, ApiError> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        let mut multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| ApiError::Multipart(e.to_string()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::Multipart(e.to_string()))?
        {
            if field.name() == Some("image") {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Multipart(e.to_string()))?;
                if bytes.is_empty() {
                    return Err(ApiError::MissingImage);
                }
                return Ok(bytes.to_vec());
            }
        }

        Err(ApiError::MissingImage)
    } else {
        let bytes = axum::body::to_bytes(req.into_body(), MAX_UPLOAD_BYTES)
            .await
            .map_err(|e| ApiError::BodyRead(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ApiError::MissingImage);
        }
        Ok(bytes.to_vec())
    }
}

/// Classification endpoint.
///
/// Runs the full pipeline on the blocking pool so the accept loop stays
/// responsive during preprocessing and the forward pass.
async fn inference_handler<M>(
    State(state): State<AppState<M>>,
    req: Request,
) -> Result<Json<PredictionResponse>, ApiErrorResponse>
where
    M: ProbabilityModel + Send + Sync + 'static,
{
    let bytes = extract_image_bytes(req).await?;

    let classifier = Arc::clone(&state.classifier);
    let label = tokio::task::spawn_blocking(move || classifier.classify(&bytes))
        .await
        .map_err(|e| ApiError::Internal(format!("classification task failed: {e}")))??;

    Ok(Json(PredictionResponse { prediction: label }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Tensor4D;
    use crate::core::errors::{ClassifierResult, SimpleError};
    use crate::domain::ModelDescription;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::io::Cursor;
    use tower::ServiceExt;

    /// Stub model returning a fixed probability.
    struct FixedProbability(f32);

    impl ProbabilityModel for FixedProbability {
        fn predict(&self, _batch: &Tensor4D) -> ClassifierResult<f32> {
            Ok(self.0)
        }

        fn describe(&self) -> ClassifierResult<ModelDescription> {
            Ok(ModelDescription {
                architecture_name: "best_model".to_string(),
                summary: "Model: best_model\n  input  x [None, 128, 128, 3]\n  output y [None, 1]\n"
                    .to_string(),
            })
        }
    }

    /// Stub model whose forward pass always fails.
    struct BrokenModel;

    impl ProbabilityModel for BrokenModel {
        fn predict(&self, _batch: &Tensor4D) -> ClassifierResult<f32> {
            Err(ClassifierError::inference_error(SimpleError::new(
                "numeric runtime exploded",
            )))
        }

        fn describe(&self) -> ClassifierResult<ModelDescription> {
            Err(ClassifierError::inference_error(SimpleError::new(
                "session unavailable",
            )))
        }
    }

    fn router_with_probability(probability: f32) -> Router {
        let classifier = DamageClassifier::new(FixedProbability(probability)).unwrap();
        create_router(AppState::new(classifier, ModelInfo::default()))
    }

    fn white_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn multipart_body(field_name: &str, payload: &[u8]) -> (String, Vec<u8>) {
        let boundary = "damage-classifier-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field_name}\"; filename=\"image.png\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_describes_the_service() {
        let response = router_with_probability(0.5)
            .oneshot(HttpRequest::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["service"].as_str().unwrap().contains("Damage"));
        assert!(json["endpoints"].is_object());
    }

    #[tokio::test]
    async fn health_reports_model_loaded() {
        let response = router_with_probability(0.5)
            .oneshot(HttpRequest::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["model_loaded"], true);
    }

    #[tokio::test]
    async fn summary_reports_the_model_contract() {
        let response = router_with_probability(0.5)
            .oneshot(HttpRequest::get("/summary").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["model_name"], "Unknown");
        assert_eq!(json["input_shape"], serde_json::json!([null, 128, 128, 3]));
        assert_eq!(json["output_shape"], serde_json::json!([null, 1]));
        assert_eq!(json["test_accuracy"], "N/A");
        assert_eq!(json["image_size"], serde_json::json!([128, 128]));
        assert_eq!(json["preprocessing"]["normalization"], "[0, 1]");
        assert_eq!(json["preprocessing"]["color_mode"], "RGB");
        assert_eq!(
            json["prediction_classes"],
            serde_json::json!(["no_damage", "damage"])
        );
        assert!(json["model_summary"].as_str().unwrap().contains("best_model"));
    }

    #[tokio::test]
    async fn summary_failure_maps_to_internal_error() {
        let classifier = DamageClassifier::new(BrokenModel).unwrap();
        let router = create_router(AppState::new(classifier, ModelInfo::default()));

        let response = router
            .oneshot(HttpRequest::get("/summary").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn inference_accepts_raw_body() {
        let response = router_with_probability(0.9)
            .oneshot(
                HttpRequest::post("/inference")
                    .body(Body::from(white_png(64, 64)))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["prediction"], "damage");
    }

    #[tokio::test]
    async fn inference_accepts_multipart_image_field() {
        let (content_type, body) = multipart_body("image", &white_png(32, 32));
        let response = router_with_probability(0.1)
            .oneshot(
                HttpRequest::post("/inference")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["prediction"], "no_damage");
    }

    #[tokio::test]
    async fn inference_boundary_probability_is_damage() {
        let response = router_with_probability(0.5)
            .oneshot(
                HttpRequest::post("/inference")
                    .body(Body::from(white_png(64, 64)))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["prediction"], "damage");
    }

    #[tokio::test]
    async fn inference_rejects_empty_body() {
        let response = router_with_probability(0.5)
            .oneshot(
                HttpRequest::post("/inference")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "no image data provided");
    }

    #[tokio::test]
    async fn inference_rejects_multipart_without_image_field() {
        let (content_type, body) = multipart_body("attachment", &white_png(32, 32));
        let response = router_with_probability(0.5)
            .oneshot(
                HttpRequest::post("/inference")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "no image data provided");
    }

    #[tokio::test]
    async fn inference_rejects_undecodable_bytes() {
        let response = router_with_probability(0.5)
            .oneshot(
                HttpRequest::post("/inference")
                    .body(Body::from("not an image at all"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("image decode"));
    }

    #[tokio::test]
    async fn inference_model_failure_maps_to_internal_error() {
        let classifier = DamageClassifier::new(BrokenModel).unwrap();
        let router = create_router(AppState::new(classifier, ModelInfo::default()));

        let response = router
            .oneshot(
                HttpRequest::post("/inference")
                    .body(Body::from(white_png(64, 64)))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("inference"));
    }

    #[tokio::test]
    async fn summary_echoes_sidecar_metadata() {
        let classifier = DamageClassifier::new(FixedProbability(0.5)).unwrap();
        let info = ModelInfo {
            model_name: "cnn_v2".to_string(),
            test_accuracy: Some(0.9431),
            total_parameters: 1_234_567,
        };
        let router = create_router(AppState::new(classifier, info));

        let response = router
            .oneshot(HttpRequest::get("/summary").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["model_name"], "cnn_v2");
        assert_eq!(json["test_accuracy"], 0.9431);
        assert_eq!(json["total_parameters"], 1234567);
    }
}
