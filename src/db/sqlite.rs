use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{collections::BTreeMap, str::FromStr, time::Duration};
use time::Date;

use super::{
    climate_data::ISO_DATE, trailing_year_start, ClimateData, Error, Measurement, Station,
    TemperatureStats, PRIMARY_STATION,
};

/// Tables the dataset is expected to carry. The schema pre-exists; this
/// service never creates or migrates it.
const REQUIRED_TABLES: [&str; 2] = ["measurement", "station"];

#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the climate dataset read-only and verify it is usable.
    pub async fn new(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))
            .with_context(|| format!("invalid database path: {}", path))?
            .read_only(true)
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-64000");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .context("failed to create database connection pool")?;

        let db = Self { pool };
        db.health_check().await?;
        db.verify_schema().await?;
        info!("climate dataset opened read-only at: {}", path);

        Ok(db)
    }

    /// Wrap an existing pool. Used by tests that seed their own fixture data.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Check database connectivity and integrity.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("database connectivity check failed")?;

        let result: String = sqlx::query_scalar("PRAGMA quick_check;")
            .fetch_one(&self.pool)
            .await
            .context("database integrity check failed")?;
        if result != "ok" {
            return Err(anyhow::anyhow!(
                "database integrity check failed: {}",
                result
            ));
        }

        Ok(())
    }

    /// Fail fast when the pre-existing schema is not the one this service
    /// binds to at startup.
    async fn verify_schema(&self) -> Result<()> {
        for table in REQUIRED_TABLES {
            let found: Option<String> = sqlx::query_scalar(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to look up table {}", table))?;

            if found.is_none() {
                return Err(anyhow::anyhow!(
                    "dataset is missing required table: {}",
                    table
                ));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ClimateData for Database {
    async fn precipitation_last_year(&self) -> Result<BTreeMap<String, Option<f64>>, Error> {
        let window_start = trailing_year_start().format(ISO_DATE)?;

        let rows: Vec<Measurement> = sqlx::query_as(
            "SELECT station, date, prcp, tobs
             FROM measurement
             WHERE date >= ?
             ORDER BY date, station",
        )
        .bind(&window_start)
        .fetch_all(&self.pool)
        .await?;

        // Later rows overwrite earlier ones, so the ORDER BY pins the
        // duplicate-date collapse: the greatest station id wins.
        Ok(rows.into_iter().map(|m| (m.date, m.prcp)).collect())
    }

    async fn list_stations(&self) -> Result<Vec<String>, Error> {
        let rows: Vec<Station> = sqlx::query_as(
            "SELECT station, name, latitude, longitude, elevation FROM station",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|s| s.station).collect())
    }

    async fn primary_station_temps_last_year(&self) -> Result<Vec<f64>, Error> {
        let window_start = trailing_year_start().format(ISO_DATE)?;

        let rows: Vec<Measurement> = sqlx::query_as(
            "SELECT station, date, prcp, tobs
             FROM measurement
             WHERE station = ? AND date >= ?",
        )
        .bind(PRIMARY_STATION)
        .bind(&window_start)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|m| m.tobs).collect())
    }

    async fn temperature_stats(
        &self,
        start: Date,
        end: Option<Date>,
    ) -> Result<TemperatureStats, Error> {
        let start = start.format(ISO_DATE)?;

        let (min, avg, max): (Option<f64>, Option<f64>, Option<f64>) = match end {
            Some(end) => {
                let end = end.format(ISO_DATE)?;
                sqlx::query_as(
                    "SELECT MIN(tobs), AVG(tobs), MAX(tobs)
                     FROM measurement
                     WHERE date >= ? AND date <= ?",
                )
                .bind(&start)
                .bind(&end)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT MIN(tobs), AVG(tobs), MAX(tobs)
                     FROM measurement
                     WHERE date >= ?",
                )
                .bind(&start)
                .fetch_one(&self.pool)
                .await?
            }
        };

        Ok(TemperatureStats { min, avg, max })
    }
}
