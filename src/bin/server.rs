use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use bar_optimizer::solver::Solver;
use bar_optimizer::types::{Bar, Item, Stats, deserialize_u32_from_number};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

const MAX_BAR_LENGTH: u32 = 100_000;
const MAX_KERF: u32 = 50;
const MAX_ITEMS: usize = 200;

#[derive(Deserialize, Serialize)]
struct SolveRequest {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    bar_length: u32,
    items: Vec<ItemRequest>,
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    kerf: u32,
}

#[derive(Deserialize, Serialize)]
struct ItemRequest {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    length: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    count: u32,
}

#[derive(Serialize)]
struct SolveResponse {
    status: &'static str,
    bars: Vec<Bar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<Stats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

async fn solve(
    Json(req): Json<SolveRequest>,
) -> Result<Json<SolveResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /solve"
    );

    if req.bar_length == 0 || req.bar_length > MAX_BAR_LENGTH {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("bar_length must be between 1 and {MAX_BAR_LENGTH}"),
        ));
    }
    if req.kerf > MAX_KERF {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("kerf must be between 0 and {MAX_KERF}"),
        ));
    }
    if req.items.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "at least one item is required".to_string(),
        ));
    }
    if req.items.len() > MAX_ITEMS {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("too many items (limit {MAX_ITEMS})"),
        ));
    }

    let items: Vec<Item> = req
        .items
        .iter()
        .map(|it| {
            if it.length == 0 {
                return Err("item length must be non-zero".to_string());
            }
            if it.count == 0 {
                return Err("item count must be non-zero".to_string());
            }
            Ok(Item::new(it.length, it.count))
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let solver = Solver::new(req.bar_length, req.kerf, items);
    let solution = solver.solve();

    // Solver-level failures are domain outcomes, not HTTP errors; partial
    // bars ride along so the client can still show them
    let response = SolveResponse {
        status: if solution.is_ok() { "ok" } else { "error" },
        message: solution.error.map(|e| e.to_string()),
        stats: solution.stats,
        bars: solution.bars,
    };

    Ok(Json(response))
}

#[tokio::main]
async fn main() {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

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
        .route("/solve", post(solve))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
