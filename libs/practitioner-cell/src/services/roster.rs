// libs/practitioner-cell/src/services/roster.rs
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Practitioner, PractitionerError};

/// Read-only view of the practitioner roster. Roster maintenance lives elsewhere.
#[async_trait]
pub trait PractitionerSource: Send + Sync {
    async fn get_practitioner(&self, id: Uuid) -> Result<Practitioner, PractitionerError>;

    async fn list_practitioners(&self) -> Result<Vec<Practitioner>, PractitionerError>;
}

#[derive(Debug, Default)]
pub struct InMemoryRoster {
    practitioners: RwLock<HashMap<Uuid, Practitioner>>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_practitioners(practitioners: impl IntoIterator<Item = Practitioner>) -> Self {
        let map = practitioners.into_iter().map(|p| (p.id, p)).collect();
        Self {
            practitioners: RwLock::new(map),
        }
    }

    /// Load a JSON array of practitioners. Working hours are validated on decode.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PractitionerError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            PractitionerError::InvalidRecord(format!("cannot read {}: {}", path.display(), e))
        })?;
        let practitioners: Vec<Practitioner> = serde_json::from_str(&raw)
            .map_err(|e| PractitionerError::InvalidRecord(format!("{}: {}", path.display(), e)))?;

        info!("Loaded {} practitioners from {}", practitioners.len(), path.display());
        Ok(Self::with_practitioners(practitioners))
    }

    pub async fn insert(&self, practitioner: Practitioner) {
        self.practitioners
            .write()
            .await
            .insert(practitioner.id, practitioner);
    }
}

#[async_trait]
impl PractitionerSource for InMemoryRoster {
    async fn get_practitioner(&self, id: Uuid) -> Result<Practitioner, PractitionerError> {
        debug!("Looking up practitioner {}", id);
        self.practitioners
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(PractitionerError::NotFound(id))
    }

    async fn list_practitioners(&self) -> Result<Vec<Practitioner>, PractitionerError> {
        let mut practitioners: Vec<Practitioner> =
            self.practitioners.read().await.values().cloned().collect();
        practitioners.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(practitioners)
    }
}
