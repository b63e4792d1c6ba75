use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::{
    engine::{IntelEngine, PlanetView, TurnFrame},
    tables::CodeBook,
    timeline::{PlanetId, TurnId},
};

struct AppState {
    engine: IntelEngine,
}

pub struct WebServerConfig {
    pub engine: IntelEngine,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize)]
pub struct GameSummary {
    pub game: String,
    pub last_turn: TurnId,
    pub planets: Vec<PlanetId>,
}

pub fn router(engine: IntelEngine) -> Router {
    let state = Arc::new(AppState { engine });
    Router::new()
        .route("/api/game", get(game_summary))
        .route("/api/turns/:turn", get(turn_frame))
        .route("/api/planets/:planet/:turn", get(planet_view))
        .route("/api/codebook", get(codebook))
        .with_state(state)
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig { engine, host, port } = config;
    let game = engine.game().to_string();

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(%game, %addr, "serving turn frames (Ctrl+C to stop)");
    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down web server");
}

async fn game_summary(State(state): State<Arc<AppState>>) -> Json<GameSummary> {
    let engine = &state.engine;
    let planets = engine.timeline().read().planets().collect();
    Json(GameSummary {
        game: engine.game().to_string(),
        last_turn: engine.last_turn(),
        planets,
    })
}

async fn turn_frame(State(state): State<Arc<AppState>>, Path(turn): Path<i64>) -> Json<TurnFrame> {
    debug!(turn, "frame requested");
    Json(state.engine.frame(turn))
}

async fn planet_view(
    State(state): State<Arc<AppState>>,
    Path((planet, turn)): Path<(u32, i64)>,
) -> Json<PlanetView> {
    Json(state.engine.planet(PlanetId::new(planet), turn))
}

async fn codebook(State(state): State<Arc<AppState>>) -> Json<CodeBook> {
    Json(state.engine.codebook().clone())
}
