use axum::Router;
use climate_api::{app, db, AppState, ClimateData, TemperatureStats};
use mockall::mock;
use std::{collections::BTreeMap, sync::Arc};
use time::Date;

mock! {
    pub ClimateAccess {}

    #[async_trait::async_trait]
    impl ClimateData for ClimateAccess {
        async fn precipitation_last_year(&self) -> Result<BTreeMap<String, Option<f64>>, db::Error>;
        async fn list_stations(&self) -> Result<Vec<String>, db::Error>;
        async fn primary_station_temps_last_year(&self) -> Result<Vec<f64>, db::Error>;
        async fn temperature_stats(
            &self,
            start: Date,
            end: Option<Date>,
        ) -> Result<TemperatureStats, db::Error>;
    }
}

pub struct TestApp {
    pub app: Router,
}

pub async fn spawn_app(climate_db: Arc<dyn ClimateData>) -> TestApp {
    let app_state = AppState {
        remote_url: "http://localhost:9090".to_string(),
        climate_db,
    };

    TestApp {
        app: app(app_state),
    }
}
