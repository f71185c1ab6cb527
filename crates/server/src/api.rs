//! HTTP surface: the form page, the JSON prediction API, health checks and
//! Prometheus metrics

use crate::page;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use pricer_lib::{
    health::{components, ComponentStatus, HealthRegistry},
    predictor::{result_line, SchemaRef},
    ArtifactError, Control, FeatureRecord, FormState, ModelCache, PredictionError, Predictor,
    PricerMetrics, PricingModel, Session, StructuredLogger, CONTROLS,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ModelCache>,
    pub health_registry: HealthRegistry,
    pub metrics: PricerMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        cache: Arc<ModelCache>,
        health_registry: HealthRegistry,
        metrics: PricerMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            cache,
            health_registry,
            metrics,
            logger,
        }
    }

    /// The cached model, loading it on first use
    ///
    /// Health, readiness and the model metrics follow the outcome of the
    /// load that actually touched the artifact.
    pub async fn model(&self) -> Result<Arc<PricingModel>, ArtifactError> {
        if let Some(model) = self.cache.get() {
            return Ok(model);
        }

        // Reading the artifact and optimizing a graph both block
        let cache = Arc::clone(&self.cache);
        let result = tokio::task::spawn_blocking(move || cache.load())
            .await
            .unwrap_or_else(|e| Err(ArtifactError::Interrupted(e.to_string())));

        match &result {
            Ok(model) => {
                self.metrics
                    .set_model_info(model.model_version(), model.estimator_kind());
                self.logger.log_model_loaded(
                    model.model_version(),
                    model.estimator_kind(),
                    model.input_width(),
                );
                self.health_registry.set_healthy(components::MODEL).await;
                self.health_registry.set_ready(true).await;
            }
            Err(e) => {
                self.health_registry
                    .set_unhealthy(components::MODEL, e.to_string())
                    .await;
                self.health_registry.set_ready(false).await;
            }
        }
        result
    }

    /// Run one trigger against the loaded model, recording metrics and logs
    fn trigger(
        &self,
        session: &mut Session,
        model: &PricingModel,
    ) -> Result<pricer_lib::PriceEstimate, PredictionError> {
        let start = Instant::now();
        let result = session.trigger(model);
        self.metrics
            .observe_prediction_latency(start.elapsed().as_secs_f64());

        match &result {
            Ok(estimate) => {
                self.metrics.inc_predictions();
                self.logger.log_prediction(
                    &session.form().record(),
                    estimate.price,
                    &estimate.model_version,
                );
            }
            Err(e) => {
                self.metrics.inc_prediction_errors();
                self.logger.log_prediction_failed(&e.to_string());
            }
        }
        result
    }
}

/// Response of `POST /api/predict`
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub price: f64,
    /// Result line exactly as the page shows it
    pub display: String,
    pub model_version: String,
    pub generated_at: i64,
}

/// Response of `GET /api/schema`
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub schema: SchemaRef,
    pub controls: &'static [Control],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn json_error(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn prediction_status(error: &PredictionError) -> StatusCode {
    match error {
        PredictionError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        PredictionError::NonFinite(_) | PredictionError::Inference(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Form page with every control at its default and nothing computed
async fn index() -> Html<String> {
    Html(page::render(&Session::new(), None))
}

/// Form submission: apply the submitted values, then trigger a prediction
async fn predict_form(
    State(state): State<Arc<AppState>>,
    Form(submission): Form<Vec<(String, String)>>,
) -> Response {
    let mut session = Session::new();

    let pairs = submission.iter().map(|(field, raw)| (field.as_str(), raw.as_str()));
    if let Err(errors) = session.apply(pairs) {
        state.metrics.inc_rejected_submissions();
        let message = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        warn!(rejected = errors.len(), error = %message, "Rejected form submission");
        let html = page::render(&session, Some(&message));
        return (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response();
    }

    let model = match state.model().await {
        Ok(model) => model,
        Err(e) => {
            state.metrics.inc_prediction_errors();
            let message = PredictionError::from(e).to_string();
            let html = page::render(&session, Some(&message));
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response();
        }
    };

    match state.trigger(&mut session, &model) {
        Ok(_) => Html(page::render(&session, None)).into_response(),
        Err(e) => {
            let html = page::render(&session, Some(&e.to_string()));
            (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response()
        }
    }
}

/// JSON prediction for a complete Feature Record
async fn predict_api(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FeatureRecord>, JsonRejection>,
) -> Response {
    let record = match payload {
        Ok(Json(record)) => record,
        Err(rejection) => {
            state.metrics.inc_rejected_submissions();
            return json_error(rejection.status(), rejection.body_text());
        }
    };

    let model = match state.model().await {
        Ok(model) => model,
        Err(e) => {
            state.metrics.inc_prediction_errors();
            let error = PredictionError::from(e);
            return json_error(prediction_status(&error), error);
        }
    };

    let mut session = Session::with_form(FormState::from_record(record));
    match state.trigger(&mut session, &model) {
        Ok(estimate) => Json(PredictResponse {
            price: estimate.price,
            display: result_line(estimate.price),
            model_version: estimate.model_version,
            generated_at: estimate.generated_at,
        })
        .into_response(),
        Err(e) => json_error(prediction_status(&e), e),
    }
}

async fn schema() -> Json<SchemaResponse> {
    Json(SchemaResponse {
        schema: SchemaRef::current(),
        controls: &CONTROLS,
    })
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 once the model is loaded
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_api))
        .route("/api/schema", get(schema))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting HTTP server");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
