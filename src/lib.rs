//! Hawaii Climate Analysis API
//!
//! A read-only REST API over the Hawaii climate SQLite dataset:
//! - Trailing-year precipitation by date
//! - Weather station listing
//! - Trailing-year temperature observations for the primary station
//! - Min/avg/max temperature aggregates over a caller-supplied date range

mod config;
pub mod db;
pub mod routes;
mod startup;
mod utils;

pub use config::{find_config_file, load_config, ConfigSource, APP_NAME};
pub use db::{
    parse_compact_date, trailing_year_start, ClimateData, Database, Measurement, Station,
    TemperatureStats, LATEST_OBSERVATION_DATE, PRIMARY_STATION,
};
pub use routes::{
    index, precipitation, stations, temperature_stats_open, temperature_stats_range, tobs,
    PrecipitationByDate, StationsResponse, TemperatureSpanResponse, TemperatureStatsResponse,
};
pub use startup::{app, build_app_state, AppState};
pub use utils::{get_config_info, get_log_level, setup_logger, Cli, DEFAULT_API_PORT};
