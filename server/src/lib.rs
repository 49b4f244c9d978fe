use anyhow::Result;
use axum::{extract::State, routing::{get, post}, Json, Router};
use orderdesk_core::{load_orders, AnswerGenerator, OrderSearch, QueryResult, Unconfigured, VectorizerConfig, DEFAULT_TOP_K};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub mod gemini;
pub mod students;

use gemini::{GeminiConfig, GeminiGenerator};
use students::StudentStore;

pub const MAX_TOP_K: usize = 100;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// JSON/JSONL file or directory of orders; the demo set when `None`
    pub orders_path: Option<PathBuf>,
    pub static_dir: PathBuf,
    pub default_top_k: usize,
    pub gemini: Option<GeminiConfig>,
    /// Comma-separated list of allowed origins; any origin when `None`
    pub cors_allow_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            orders_path: None,
            static_dir: PathBuf::from("./static"),
            default_top_k: DEFAULT_TOP_K,
            gemini: None,
            cors_allow_origin: None,
        }
    }
}

#[derive(Deserialize)]
pub struct OrderQueryRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<OrderSearch>,
    pub generator: Arc<dyn AnswerGenerator>,
    pub default_top_k: usize,
}

impl AppState {
    pub fn new(search: OrderSearch, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self { search: Arc::new(search), generator, default_top_k: DEFAULT_TOP_K }
    }
}

/// Pick the answer generator once at startup.
pub fn select_generator(config: Option<GeminiConfig>) -> Arc<dyn AnswerGenerator> {
    match config {
        Some(cfg) => match GeminiGenerator::new(cfg) {
            Ok(g) => Arc::new(g),
            Err(e) => {
                tracing::warn!(error = %e, "failed to build gemini client, answers disabled");
                Arc::new(Unconfigured)
            }
        },
        None => {
            tracing::info!("GEMINI_API_KEY not set, answers disabled");
            Arc::new(Unconfigured)
        }
    }
}

pub fn build_state(config: &ServerConfig) -> Result<AppState> {
    let orders = match &config.orders_path {
        Some(path) => load_orders(path)?,
        None => orderdesk_core::demo_orders(),
    };
    let search = OrderSearch::new(orders, VectorizerConfig::default());
    tracing::info!(
        orders = search.orders().len(),
        terms = search.index().vocabulary_len(),
        "order index ready"
    );
    let mut state = AppState::new(search, select_generator(config.gemini.clone()));
    state.default_top_k = config.default_top_k;
    Ok(state)
}

pub fn build_app(config: ServerConfig) -> Result<Router> {
    let state = build_state(&config)?;
    Ok(router(state, &config))
}

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    // CORS: comma-separated origins from config, or allow Any by default
    let cors = match &config.cors_allow_origin {
        Some(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let orders = Router::new()
        .route("/health", get(health_handler))
        .route("/order-status", post(order_status_handler))
        .with_state(state);

    Router::new()
        .merge(orders)
        .merge(students::router(Arc::new(StudentStore::new())))
        .route_service("/", ServeFile::new(config.static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn order_status_handler(State(state): State<AppState>, Json(req): Json<OrderQueryRequest>) -> Json<QueryResult> {
    let k = req.top_k.unwrap_or(state.default_top_k).min(MAX_TOP_K);
    Json(state.search.query(&req.query, k, state.generator.as_ref()).await)
}
