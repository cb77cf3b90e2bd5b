// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::services::SchedulingService;

pub fn appointment_routes(service: Arc<SchedulingService>) -> Router {
    Router::new()
        .route("/practitioners/{practitioner_id}/slots", get(handlers::list_slots))
        .route("/doctors/{practitioner_id}/slots", get(handlers::list_slots))
        .route(
            "/appointments",
            get(handlers::list_appointments).post(handlers::create_appointment),
        )
        .route(
            "/appointments/{appointment_id}",
            get(handlers::get_appointment)
                .put(handlers::update_appointment)
                .delete(handlers::delete_appointment),
        )
        .with_state(service)
}
