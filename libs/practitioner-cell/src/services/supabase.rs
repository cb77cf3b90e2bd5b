// libs/practitioner-cell/src/services/supabase.rs
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{hhmm, Practitioner, PractitionerError, WorkingHours};
use crate::services::roster::PractitionerSource;

const PRACTITIONERS_PATH: &str = "/rest/v1/practitioners";

/// Row shape of the `practitioners` table.
#[derive(Debug, Deserialize)]
struct PractitionerRow {
    id: Uuid,
    name: String,
    working_hours_start: String,
    working_hours_end: String,
    specialization: Option<String>,
}

impl TryFrom<PractitionerRow> for Practitioner {
    type Error = PractitionerError;

    fn try_from(row: PractitionerRow) -> Result<Self, Self::Error> {
        let start = hhmm::parse(&row.working_hours_start).map_err(|e| {
            PractitionerError::InvalidRecord(format!("practitioner {} start: {}", row.id, e))
        })?;
        let end = hhmm::parse(&row.working_hours_end).map_err(|e| {
            PractitionerError::InvalidRecord(format!("practitioner {} end: {}", row.id, e))
        })?;

        Ok(Practitioner {
            id: row.id,
            name: row.name,
            working_hours: WorkingHours::new(start, end)?,
            specialization: row.specialization,
        })
    }
}

fn map_db_error(e: DatabaseError) -> PractitionerError {
    match e {
        DatabaseError::Decode(msg) => PractitionerError::InvalidRecord(msg),
        other => PractitionerError::Unavailable(other.to_string()),
    }
}

pub struct SupabaseRoster {
    supabase: SupabaseClient,
}

impl SupabaseRoster {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }
}

#[async_trait]
impl PractitionerSource for SupabaseRoster {
    async fn get_practitioner(&self, id: Uuid) -> Result<Practitioner, PractitionerError> {
        debug!("Fetching practitioner {} from Supabase", id);

        let path = format!("{}?id=eq.{}", PRACTITIONERS_PATH, id);
        let rows: Vec<PractitionerRow> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        rows.into_iter()
            .next()
            .ok_or(PractitionerError::NotFound(id))?
            .try_into()
    }

    async fn list_practitioners(&self) -> Result<Vec<Practitioner>, PractitionerError> {
        let path = format!("{}?order=name.asc", PRACTITIONERS_PATH);
        let rows: Vec<PractitionerRow> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(map_db_error)?;

        let mut practitioners = Vec::with_capacity(rows.len());
        for row in rows {
            match Practitioner::try_from(row) {
                Ok(practitioner) => practitioners.push(practitioner),
                Err(e) => warn!("Skipping malformed practitioner row: {}", e),
            }
        }
        Ok(practitioners)
    }
}
