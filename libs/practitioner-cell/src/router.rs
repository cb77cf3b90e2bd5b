// libs/practitioner-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::services::PractitionerSource;

pub fn practitioner_routes(roster: Arc<dyn PractitionerSource>) -> Router {
    Router::new()
        .route("/practitioners", get(handlers::list_practitioners))
        .route("/practitioners/{practitioner_id}", get(handlers::get_practitioner))
        // Paths used by the existing booking client.
        .route("/doctors", get(handlers::list_practitioners))
        .route("/doctors/{practitioner_id}", get(handlers::get_practitioner))
        .with_state(roster)
}
