use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use parking_lot::RwLock;

use crate::config::ServerConfig;
use crate::domain::error::EngineError;
use crate::domain::normalize::{NormalizeOptions, RawPlayerRow};
use crate::domain::solve::SquadOptimizer;
use crate::domain::solver::SolveOptions;
use crate::domain::solver_factory::create_solver;
use crate::models::{ApiError, ApiSolution, OptimizeRequest, OptimizeResponse};

/// Shared service state: the optimizer and the replaceable stored roster.
pub struct AppState {
    pub optimizer: SquadOptimizer,
    pub roster: RwLock<Vec<RawPlayerRow>>,
    pub min_minutes: Option<f64>,
}

impl AppState {
    pub fn new(optimizer: SquadOptimizer, roster: Vec<RawPlayerRow>, min_minutes: Option<f64>) -> Self {
        AppState {
            optimizer,
            roster: RwLock::new(roster),
            min_minutes,
        }
    }

    pub fn from_config(config: &ServerConfig, roster: Vec<RawPlayerRow>) -> Self {
        let optimizer = SquadOptimizer::new(
            create_solver(config.solver),
            SolveOptions {
                time_limit: config.time_limit,
            },
        );
        Self::new(optimizer, roster, config.min_minutes)
    }
}

// ---------- Route handlers ----------

/// POST /optimize
pub async fn optimize(state: web::Data<AppState>, req: web::Json<OptimizeRequest>) -> HttpResponse {
    let req = req.into_inner();
    if req.objectives.is_empty() {
        return HttpResponse::BadRequest().json(ApiError::message("at least one objective is required"));
    }

    // Clone the rows out so the lock is not held while solving
    let rows = match req.players {
        Some(players) => players,
        None => state.roster.read().clone(),
    };
    if rows.is_empty() {
        return HttpResponse::BadRequest()
            .json(ApiError::message("no players supplied and no roster stored"));
    }

    let options = NormalizeOptions {
        position_codes: req.position_codes.unwrap_or_default(),
        min_minutes: req.min_minutes.or(state.min_minutes),
        ..NormalizeOptions::default()
    };
    let config = req.config;
    let objectives = req.objectives;

    let worker_state = state.clone();
    let outcome = web::block(move || {
        worker_state
            .optimizer
            .optimize_objectives(&rows, &config, &objectives, &options)
    })
    .await;

    let runs = match outcome {
        Ok(Ok(runs)) => runs,
        Ok(Err(EngineError::Configuration(err))) => {
            info!("rejected optimize request: {}", err);
            return HttpResponse::BadRequest().json(ApiError::from(err));
        }
        Ok(Err(err)) => {
            error!("{}", err);
            sentry::capture_message(&err.to_string(), sentry::Level::Error);
            return HttpResponse::InternalServerError().json(ApiError::message(err.to_string()));
        }
        Err(err) => {
            error!("optimize worker failed: {}", err);
            return HttpResponse::InternalServerError().json(ApiError::message("Something went wrong"));
        }
    };

    let solver = state.optimizer.solver_name().to_string();
    let solutions: Vec<ApiSolution> = runs
        .into_iter()
        .map(|run| ApiSolution {
            objective: run.objective.to_string(),
            solver: solver.clone(),
            dropped: run.pool.dropped(),
            filtered: run.pool.filtered,
            rejected: run.pool.rejected,
            result: run.result,
        })
        .collect();

    HttpResponse::Ok().json(OptimizeResponse { solutions })
}

/// PUT /players
pub async fn replace_players(
    state: web::Data<AppState>,
    rows: web::Json<Vec<RawPlayerRow>>,
) -> impl Responder {
    let rows = rows.into_inner();
    let stored = rows.len();
    *state.roster.write() = rows;
    info!("stored roster replaced with {} rows", stored);
    HttpResponse::Ok().json(serde_json::json!({ "stored": stored }))
}

/// GET /health
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/optimize", web::post().to(optimize))
        .route("/players", web::put().to(replace_players))
        .route("/health", web::get().to(health_check));
}

/// JSON extractor settings: payload limit and a JSON body for malformed input.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _| {
            let err_string = err.to_string();
            actix_web::error::InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(serde_json::json!({ "error": err_string })),
            )
            .into()
        })
}
