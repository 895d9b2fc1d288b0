use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::{
    format_description::BorrowedFormatItem,
    macros::{date, format_description},
    Date, Duration,
};

/// The last observation date present in the dataset. The trailing-year
/// window is anchored to this literal rather than `max(date)` so responses
/// stay stable for the fixed historical dataset.
pub const LATEST_OBSERVATION_DATE: Date = date!(2017 - 08 - 23);

/// Station with the most observations in the dataset (Waihee 837.5, HI US).
pub const PRIMARY_STATION: &str = "USC00519281";

/// Caller-supplied date format for the `/api/v1.0/temp` routes, e.g. "08232017".
const COMPACT_DATE: &[BorrowedFormatItem<'static>] = format_description!("[month][day][year]");

/// Storage format of `measurement.date`. Lexicographic comparison over this
/// rendering matches chronological order, which is what the SQL filters rely on.
pub(crate) const ISO_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Start of the trailing-year window: 365 days before the last observation.
pub fn trailing_year_start() -> Date {
    LATEST_OBSERVATION_DATE - Duration::days(365)
}

/// Parse a zero-padded MMDDYYYY date parameter.
pub fn parse_compact_date(input: &str) -> Result<Date, time::error::Parse> {
    Date::parse(input, COMPACT_DATE)
}

/// One dated observation of precipitation and temperature at a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Measurement {
    pub station: String,
    /// Observation date as stored, "YYYY-MM-DD".
    pub date: String,
    /// Precipitation in inches; null where the gauge reported nothing.
    pub prcp: Option<f64>,
    /// Temperature observation in °F.
    pub tobs: f64,
}

/// A fixed physical observation site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Station {
    pub station: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// Min/avg/max aggregates over `tobs` for a filtered set of measurements.
///
/// All three are `None` when the filter matched no rows — SQLite aggregates
/// over the empty set return NULL, and that is surfaced as-is.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TemperatureStats {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
    #[error("failed to format time string: {0}")]
    TimeFormat(#[from] time::error::Format),
}

/// Read access to the climate dataset.
#[async_trait]
pub trait ClimateData: Sync + Send {
    /// Precipitation by date over the trailing-year window, one value per
    /// date. On dates observed by multiple stations the value from the
    /// greatest station id wins.
    async fn precipitation_last_year(&self) -> Result<BTreeMap<String, Option<f64>>, Error>;

    /// All station identifiers, in store order.
    async fn list_stations(&self) -> Result<Vec<String>, Error>;

    /// Temperature observations at [`PRIMARY_STATION`] over the
    /// trailing-year window, in store order.
    async fn primary_station_temps_last_year(&self) -> Result<Vec<f64>, Error>;

    /// Min/avg/max of `tobs` for `date >= start`, bounded above by `end`
    /// when supplied. An inverted range is not an error; it aggregates the
    /// empty set.
    async fn temperature_stats(
        &self,
        start: Date,
        end: Option<Date>,
    ) -> Result<TemperatureStats, Error>;
}
