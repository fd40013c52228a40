use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use disc_optimizer::catalog::{Catalog, RectangleType};
use disc_optimizer::evolution::Evolution;
use disc_optimizer::geometry::PlacedRect;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    radius: f64,
    shapes: Vec<RectangleType>,
    #[serde(default = "default_population")]
    population_size: usize,
    #[serde(default = "default_generations")]
    generations: usize,
    #[serde(default = "default_operator_count")]
    n_crossings: usize,
    #[serde(default = "default_operator_count")]
    n_mutations: usize,
    #[serde(default = "default_elite")]
    elite_count: usize,
    #[serde(default = "default_starting_rectangles")]
    starting_rectangles: usize,
    seed: Option<u64>,
}

fn default_population() -> usize {
    20
}

fn default_generations() -> usize {
    50
}

fn default_operator_count() -> usize {
    10
}

fn default_elite() -> usize {
    2
}

fn default_starting_rectangles() -> usize {
    500
}

#[derive(Serialize)]
struct OptimizeResponse {
    best: PackingResponse,
    radius: f64,
    generations: usize,
    population_size: usize,
}

#[derive(Serialize)]
struct PackingResponse {
    fitness: f64,
    rectangles: Vec<PlacedRect>,
}

async fn optimize(
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    if req.radius <= 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "radius must be positive".to_string(),
        ));
    }
    if req.shapes.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "at least one catalog shape is required".to_string(),
        ));
    }
    for shape in &req.shapes {
        if shape.width <= 0.0 || shape.height <= 0.0 {
            return Err((
                StatusCode::BAD_REQUEST,
                "shape dimensions must be positive".to_string(),
            ));
        }
        if shape.value < 0.0 {
            return Err((
                StatusCode::BAD_REQUEST,
                "shape value must be non-negative".to_string(),
            ));
        }
    }

    let mut rng = match req.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut evolution = Evolution::new(
        req.population_size,
        req.radius,
        Catalog::new(req.shapes.iter().copied()),
        req.starting_rectangles,
        &mut rng,
    )
    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    for _ in 0..req.generations {
        evolution
            .iter(req.n_mutations, req.n_crossings, req.elite_count, &mut rng)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    }

    let best = evolution
        .best()
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "empty population".to_string()))?;

    Ok(Json(OptimizeResponse {
        best: PackingResponse {
            fitness: best.evaluate(),
            rectangles: best.rects().to_vec(),
        },
        radius: req.radius,
        generations: req.generations,
        population_size: req.population_size,
    }))
}

#[tokio::main]
async fn main() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
