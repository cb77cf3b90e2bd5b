use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use appointment_cell::SchedulingService;
use practitioner_cell::router::practitioner_routes;
use practitioner_cell::PractitionerSource;

pub fn create_router(roster: Arc<dyn PractitionerSource>, scheduling: Arc<SchedulingService>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Scheduler API is running!" }))
        .merge(practitioner_routes(roster))
        .merge(appointment_routes(scheduling))
}
