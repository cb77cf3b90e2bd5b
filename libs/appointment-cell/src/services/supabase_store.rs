// libs/appointment-cell/src/services/supabase_store.rs
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};
use shared_models::TimeInterval;

use crate::models::Appointment;
use crate::services::store::{AppointmentStore, StoreError};

const APPOINTMENTS_PATH: &str = "/rest/v1/appointments";

/// PostgREST-backed store. The `appointments` table is expected to carry an
/// exclusion constraint on `(practitioner_id, tstzrange(start_time, end_time))`,
/// which PostgREST reports as HTTP 409.
pub struct SupabaseAppointmentStore {
    supabase: SupabaseClient,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    fn to_row(appointment: &Appointment) -> Value {
        json!({
            "id": appointment.id,
            "practitioner_id": appointment.practitioner_id,
            "start_time": appointment.start_time.to_rfc3339(),
            "end_time": appointment.end_time().to_rfc3339(),
            "duration_minutes": appointment.duration_minutes,
            "appointment_type": appointment.appointment_type.to_string(),
            "patient_name": appointment.patient_name,
            "notes": appointment.notes,
            "created_at": appointment.created_at.to_rfc3339(),
            "updated_at": appointment.updated_at.to_rfc3339(),
        })
    }

    fn parse_rows(rows: Vec<Value>) -> Result<Vec<Appointment>, StoreError> {
        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| StoreError::Corrupt(format!("Failed to parse appointments: {}", e)))
    }

    fn first_row(rows: Vec<Value>, id: Uuid) -> Result<Appointment, StoreError> {
        Self::parse_rows(rows)?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound(id))
    }
}

fn map_db_error(e: DatabaseError) -> StoreError {
    match e {
        DatabaseError::Conflict(detail) => {
            debug!("Store rejected overlapping write: {}", detail);
            StoreError::UniqueConflict {
                conflicting_ids: Vec::new(),
            }
        }
        other => {
            if other.is_transient() {
                warn!("Transient store failure: {}", other);
            }
            StoreError::Unavailable(other.to_string())
        }
    }
}

fn encode_ts(ts: chrono::DateTime<chrono::Utc>) -> String {
    urlencoding::encode(&ts.to_rfc3339()).into_owned()
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn find_by_practitioner_and_range(
        &self,
        practitioner_id: Uuid,
        range: TimeInterval,
    ) -> Result<Vec<Appointment>, StoreError> {
        let query_parts = [
            format!("practitioner_id=eq.{}", practitioner_id),
            format!("start_time=lt.{}", encode_ts(range.end)),
            format!("end_time=gt.{}", encode_ts(range.start)),
        ];
        let path = format!(
            "{}?{}&order=start_time.asc",
            APPOINTMENTS_PATH,
            query_parts.join("&")
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        Self::parse_rows(rows)
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                APPOINTMENTS_PATH,
                Some(Self::to_row(&appointment)),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(map_db_error)?;

        match Self::parse_rows(rows)?.into_iter().next() {
            Some(stored) => Ok(stored),
            None => Err(StoreError::Unavailable("Insert returned no rows".to_string())),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Appointment, StoreError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        Self::first_row(rows, id)
    }

    async fn replace(&self, id: Uuid, appointment: Appointment) -> Result<Appointment, StoreError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, id);
        let mut row = Self::to_row(&appointment);
        if let Some(fields) = row.as_object_mut() {
            fields.remove("id");
            fields.remove("created_at");
        }

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(row),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(map_db_error)?;

        Self::first_row(rows, id)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, id);
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                None,
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(map_db_error)?;

        if rows.is_empty() {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, StoreError> {
        let path = format!("{}?order=start_time.asc", APPOINTMENTS_PATH);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        Self::parse_rows(rows)
    }
}
