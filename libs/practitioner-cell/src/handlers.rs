// libs/practitioner-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{Practitioner, PractitionerError};
use crate::services::PractitionerSource;

impl From<PractitionerError> for AppError {
    fn from(e: PractitionerError) -> Self {
        match e {
            PractitionerError::NotFound(id) => AppError::NotFound {
                kind: "practitioner_not_found",
                message: format!("Practitioner {} not found", id),
            },
            PractitionerError::InvalidWindow { .. } => AppError::Unprocessable {
                kind: "invalid_window",
                message: e.to_string(),
            },
            PractitionerError::InvalidRecord(msg) => AppError::Internal(msg),
            PractitionerError::Unavailable(msg) => AppError::Unavailable(msg),
        }
    }
}

pub async fn list_practitioners(
    State(roster): State<Arc<dyn PractitionerSource>>,
) -> Result<Json<Vec<Practitioner>>, AppError> {
    let practitioners = roster.list_practitioners().await?;
    Ok(Json(practitioners))
}

pub async fn get_practitioner(
    State(roster): State<Arc<dyn PractitionerSource>>,
    Path(practitioner_id): Path<Uuid>,
) -> Result<Json<Practitioner>, AppError> {
    let practitioner = roster.get_practitioner(practitioner_id).await?;
    Ok(Json(practitioner))
}
