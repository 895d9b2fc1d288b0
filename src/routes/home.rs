use std::sync::Arc;

use axum::{extract::State, response::Html};

use crate::AppState;

/// Handler for the landing page (GET /): a human-readable endpoint index.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let base = &state.remote_url;

    Html(format!(
        "Welcome to the Hawaii Climate Analysis API!<br/>\
         Available Endpoints:<br/>\
         {base}/api/v1.0/precipitation<br/>\
         {base}/api/v1.0/stations<br/>\
         {base}/api/v1.0/tobs<br/>\
         {base}/api/v1.0/temp/start<br/>\
         {base}/api/v1.0/temp/start/end<br/>\
         {base}/docs<br/>\
         <p>Provide 'start' and/or 'end' dates in the format MMDDYYYY for temperature statistics.</p>",
    ))
}
