use crate::{
    index, precipitation, routes, stations, temperature_stats_open, temperature_stats_range, tobs,
    ClimateData, Database,
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub remote_url: String,
    pub climate_db: Arc<dyn ClimateData>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::climate::precipitation,
        routes::climate::stations,
        routes::climate::tobs,
        routes::climate::temperature_stats_open,
        routes::climate::temperature_stats_range,
    ),
    components(
        schemas(
            routes::climate::StationsResponse,
            routes::climate::TemperatureSpanResponse,
            routes::climate::TemperatureStatsResponse,
        )
    ),
    tags(
        (name = "hawaii climate analysis api", description = "a read-only RESTful api over the Hawaii historical climate dataset")
    )
)]
struct ApiDoc;

pub async fn build_app_state(
    remote_url: String,
    database_path: String,
) -> Result<AppState, anyhow::Error> {
    let climate_db = Arc::new(
        Database::new(&database_path)
            .await
            .map_err(|e| anyhow!("error opening climate dataset: {}", e))?,
    );

    Ok(AppState {
        remote_url,
        climate_db,
    })
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/v1.0/precipitation", get(precipitation))
        .route("/api/v1.0/stations", get(stations))
        .route("/api/v1.0/tobs", get(tobs))
        .route("/api/v1.0/temp/{start}", get(temperature_stats_open))
        .route(
            "/api/v1.0/temp/{start}/{end}",
            get(temperature_stats_range),
        )
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
