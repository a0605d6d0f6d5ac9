//! HTTP surface for blended scoring and logistic retraining

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::{
    top_n, BlendError, FeatureBuilder, ItemId, LinearBlendScorer, LogisticBlendScorer,
    LogisticModelTrainer, MeanBiasModel, Rating, RatingCounts, RatingDataset, ScoredItem,
    ServiceConfig, UserId,
};

/// Shared scorers plus what is needed to retrain the logistic blend
pub struct AppState {
    linear: LinearBlendScorer,
    logistic: RwLock<Arc<LogisticBlendScorer>>,
    trainer: Arc<LogisticModelTrainer>,
    training: Arc<Vec<Rating>>,
    train_guard: Mutex<()>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        linear: LinearBlendScorer,
        logistic: LogisticBlendScorer,
        trainer: LogisticModelTrainer,
        training: Vec<Rating>,
    ) -> SharedState {
        Arc::new(Self {
            linear,
            logistic: RwLock::new(Arc::new(logistic)),
            trainer: Arc::new(trainer),
            training: Arc::new(training),
            train_guard: Mutex::new(()),
        })
    }

    /// Wire both blends from a loaded dataset and train the initial logistic model.
    ///
    /// The linear blend uses a user+item baseline; the logistic blend uses the
    /// user-only baseline for its bias feature.
    pub fn from_dataset(
        config: &ServiceConfig,
        dataset: RatingDataset,
    ) -> anyhow::Result<SharedState> {
        let recommenders = dataset.recommenders();
        let pick = |name: &Option<String>, idx: usize| match name {
            Some(name) => recommenders
                .find(name)
                .with_context(|| format!("No component recommender named '{}'", name)),
            None => recommenders.get(idx).cloned().with_context(|| {
                format!(
                    "Linear blend needs two component recommenders, dataset has {}",
                    recommenders.len()
                )
            }),
        };
        let left = pick(&config.left, 0)?;
        let right = pick(&config.right, 1)?;

        let linear_bias = Arc::new(MeanBiasModel::fit(&dataset.ratings, config.damping));
        let linear = LinearBlendScorer::new(linear_bias, left, right, config.blend_weight)?;

        let features = FeatureBuilder::new(
            Arc::new(MeanBiasModel::fit_user_only(&dataset.ratings, config.damping)),
            Arc::new(RatingCounts::from_ratings(&dataset.ratings)),
            recommenders,
        );
        let trainer = LogisticModelTrainer::new(config.trainer, features.clone())?;
        let model = trainer.train(&dataset);
        let logistic = LogisticBlendScorer::new(Arc::new(model), features)?;

        Ok(Self::new(linear, logistic, trainer, dataset.training))
    }

    /// Currently bound logistic scorer; callers keep it even if a retrain rebinds
    pub async fn logistic(&self) -> Arc<LogisticBlendScorer> {
        self.logistic.read().await.clone()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub user: UserId,
    pub items: Vec<ItemId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub user: UserId,
    /// Ranked best-first
    pub scores: Vec<ScoredItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrainResponse {
    pub epochs: usize,
    pub final_mean_log_loss: Option<f64>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: &str, details: impl ToString) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            details: Some(details.to_string()),
        }),
    )
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "blendrank".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn score_linear_handler(
    State(state): State<SharedState>,
    Json(req): Json<ScoreRequest>,
) -> Json<ScoreResponse> {
    let scores = state.linear.score(req.user, &req.items);
    Json(ScoreResponse {
        user: req.user,
        scores: top_n(&scores, scores.len()),
    })
}

async fn score_logistic_handler(
    State(state): State<SharedState>,
    Json(req): Json<ScoreRequest>,
) -> Json<ScoreResponse> {
    let scorer = state.logistic().await;
    let scores = scorer.score(req.user, &req.items);
    Json(ScoreResponse {
        user: req.user,
        scores: top_n(&scores, scores.len()),
    })
}

/// Retrain on the stored examples and rebind the logistic scorer
async fn train_handler(
    State(state): State<SharedState>,
) -> Result<Json<TrainResponse>, HandlerError> {
    let _guard = state.train_guard.try_lock().map_err(|_| {
        warn!("Rejected training request: a run is already in progress");
        error_response(StatusCode::CONFLICT, "Training already running", "retry later")
    })?;

    if state.training.is_empty() {
        let err = BlendError::Dataset("no training examples loaded".to_string());
        return Err(error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Training failed",
            err,
        ));
    }

    info!("Retraining logistic blend on {} examples", state.training.len());

    let trainer = state.trainer.clone();
    let training = state.training.clone();
    let report = tokio::task::spawn_blocking(move || trainer.train_with_report(&*training))
        .await
        .map_err(|e| {
            error!("Training task failed: {:?}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Training failed", e)
        })?;

    let response = TrainResponse {
        epochs: report.epochs.len(),
        final_mean_log_loss: report.final_loss(),
        intercept: report.model.intercept(),
        coefficients: report.model.coefficients().to_vec(),
    };

    let scorer = LogisticBlendScorer::new(
        Arc::new(report.model),
        state.trainer.features().clone(),
    )
    .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, "Training failed", e))?;

    *state.logistic.write().await = Arc::new(scorer);
    info!("Logistic blend rebound: loss={:?}", response.final_mean_log_loss);

    Ok(Json(response))
}

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/score/linear", post(score_linear_handler))
        .route("/score/logistic", post(score_logistic_handler))
        .route("/train", post(train_handler))
        .with_state(state)
}

pub async fn run_server(state: SharedState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    info!("Starting blendrank server on {}", addr);

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
