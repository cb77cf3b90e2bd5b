// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    Appointment, AppointmentError, AppointmentIdResponse, CreateAppointmentRequest, SlotsQuery,
    UpdateAppointmentRequest,
};
use crate::services::SchedulingService;

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        let kind = e.kind();
        let message = e.to_string();
        match e {
            AppointmentError::PractitionerNotFound(_) | AppointmentError::AppointmentNotFound(_) => {
                AppError::NotFound { kind, message }
            }
            AppointmentError::Conflict(conflicting_ids) => AppError::Conflict {
                kind,
                message: "Time slot is already booked".to_string(),
                conflicting_ids,
            },
            AppointmentError::OutOfHours { .. }
            | AppointmentError::InvalidDuration(_)
            | AppointmentError::InvalidWindow(_) => AppError::Unprocessable { kind, message },
            AppointmentError::InvalidRequest(_) => AppError::BadRequest { kind, message },
            AppointmentError::Unavailable(_) => AppError::Unavailable(message),
            AppointmentError::Internal(_) => AppError::Internal(message),
        }
    }
}

// ==============================================================================
// SLOT HANDLERS
// ==============================================================================

/// `["09:00", "09:30", ...]`
#[axum::debug_handler]
pub async fn list_slots(
    State(service): State<Arc<SchedulingService>>,
    Path(practitioner_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let slots = service.list_slots(practitioner_id, query.date).await?;
    Ok(Json(slots))
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(service): State<Arc<SchedulingService>>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    Ok(Json(service.list_appointments().await?))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(service): State<Arc<SchedulingService>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    Ok(Json(service.get_appointment(appointment_id).await?))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(service): State<Arc<SchedulingService>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentIdResponse>), AppError> {
    let appointment = service.create_appointment(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(AppointmentIdResponse { id: appointment.id }),
    ))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(service): State<Arc<SchedulingService>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentIdResponse>, AppError> {
    let appointment = service.update_appointment(appointment_id, request).await?;
    Ok(Json(AppointmentIdResponse { id: appointment.id }))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(service): State<Arc<SchedulingService>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    service.delete_appointment(appointment_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Appointment deleted successfully"
    })))
}
