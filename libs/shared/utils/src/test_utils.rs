use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use shared_config::{AppConfig, StoreBackend};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub store_timeout: Duration,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
            store_timeout: Duration::from_secs(2),
        }
    }
}

impl TestConfig {
    /// Point the config at a mock server (e.g. `MockServer::uri()`).
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            supabase_url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            store_backend: StoreBackend::Supabase,
            store_timeout: self.store_timeout,
            ..AppConfig::default()
        }
    }
}

/// PostgREST row bodies as the Supabase tables return them.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn practitioner_row(id: Uuid, name: &str, start: &str, end: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "working_hours_start": start,
            "working_hours_end": end,
            "specialization": "Obstetrics",
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_row(
        id: Uuid,
        practitioner_id: Uuid,
        start_time: DateTime<Utc>,
        duration_minutes: i64,
    ) -> serde_json::Value {
        let end_time = start_time + chrono::Duration::minutes(duration_minutes);
        json!({
            "id": id,
            "practitioner_id": practitioner_id,
            "start_time": start_time.to_rfc3339(),
            "end_time": end_time.to_rfc3339(),
            "duration_minutes": duration_minutes,
            "appointment_type": "Routine Check-Up",
            "patient_name": "Test Patient",
            "notes": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code,
            "details": null,
            "hint": null
        })
    }
}
