use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use log::error;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use time::Date;
use utoipa::ToSchema;

use crate::{db, parse_compact_date, AppState};

/// Date string ("YYYY-MM-DD") to precipitation in inches, null where the
/// gauge reported nothing.
pub type PrecipitationByDate = BTreeMap<String, Option<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StationsResponse {
    pub stations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemperatureSpanResponse {
    pub temps: Vec<f64>,
}

/// Always three elements: [min, avg, max]. All null when no measurement
/// matched the requested range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemperatureStatsResponse {
    pub temps: [Option<f64>; 3],
}

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Precipitation by date over the trailing year", body = PrecipitationByDate),
        (status = INTERNAL_SERVER_ERROR, description = "Climate dataset unavailable")
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PrecipitationByDate>, (StatusCode, String)> {
    let precip = state
        .climate_db
        .precipitation_last_year()
        .await
        .map_err(store_error)?;

    Ok(Json(precip))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "All weather station identifiers", body = StationsResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Climate dataset unavailable")
    ))]
pub async fn stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StationsResponse>, (StatusCode, String)> {
    let stations = state.climate_db.list_stations().await.map_err(store_error)?;

    Ok(Json(StationsResponse { stations }))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Trailing-year temperature observations at the primary station", body = TemperatureSpanResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Climate dataset unavailable")
    ))]
pub async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TemperatureSpanResponse>, (StatusCode, String)> {
    let temps = state
        .climate_db
        .primary_station_temps_last_year()
        .await
        .map_err(store_error)?;

    Ok(Json(TemperatureSpanResponse { temps }))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/temp/{start}",
    params(
        ("start" = String, Path, description = "Start date, MMDDYYYY"),
    ),
    responses(
        (status = OK, description = "Min/avg/max temperature from the start date onward", body = TemperatureStatsResponse),
        (status = BAD_REQUEST, description = "Start date is not a valid MMDDYYYY date"),
        (status = INTERNAL_SERVER_ERROR, description = "Climate dataset unavailable")
    ))]
pub async fn temperature_stats_open(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureStatsResponse>, (StatusCode, String)> {
    let start = parse_date_param("start", &start)?;

    temperature_stats(&state, start, None).await
}

#[utoipa::path(
    get,
    path = "/api/v1.0/temp/{start}/{end}",
    params(
        ("start" = String, Path, description = "Start date, MMDDYYYY"),
        ("end" = String, Path, description = "End date (inclusive), MMDDYYYY"),
    ),
    responses(
        (status = OK, description = "Min/avg/max temperature over the date range", body = TemperatureStatsResponse),
        (status = BAD_REQUEST, description = "A date is not a valid MMDDYYYY date"),
        (status = INTERNAL_SERVER_ERROR, description = "Climate dataset unavailable")
    ))]
pub async fn temperature_stats_range(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureStatsResponse>, (StatusCode, String)> {
    let start = parse_date_param("start", &start)?;
    let end = parse_date_param("end", &end)?;

    temperature_stats(&state, start, Some(end)).await
}

async fn temperature_stats(
    state: &AppState,
    start: Date,
    end: Option<Date>,
) -> Result<Json<TemperatureStatsResponse>, (StatusCode, String)> {
    let stats = state
        .climate_db
        .temperature_stats(start, end)
        .await
        .map_err(store_error)?;

    Ok(Json(TemperatureStatsResponse {
        temps: [stats.min, stats.avg, stats.max],
    }))
}

fn parse_date_param(name: &str, value: &str) -> Result<Date, (StatusCode, String)> {
    parse_compact_date(value).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!(
                "invalid {} date {:?}, expected MMDDYYYY (e.g. 08232017): {}",
                name, value, e
            ),
        )
    })
}

fn store_error(err: db::Error) -> (StatusCode, String) {
    error!("error querying climate dataset: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("climate dataset unavailable: {}", err),
    )
}
