//! Incident persistence seam
//!
//! The dispatch core treats persistence as an external collaborator with
//! keyed get/put semantics. [`MemoryIncidentStore`] is the in-process
//! implementation used by the gateway and the test harness; terminal
//! incidents are retained for audit, never removed.

use lifeline_domain::{Incident, IncidentStatus};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Persistence failures, surfaced as `DispatchError::Dependency` upstream
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Keyed incident storage with one indexed lookup
pub trait IncidentStore: Send + Sync {
    /// Fetch an incident by id
    fn get(&self, id: &str) -> Result<Option<Incident>, StoreError>;

    /// Insert or replace an incident record
    fn put(&self, incident: &Incident) -> Result<(), StoreError>;

    /// The non-terminal incident currently holding this agent, if any
    fn active_for_agent(&self, agent_id: &str) -> Result<Option<Incident>, StoreError>;
}

/// In-memory store backed by a read-write locked map
pub struct MemoryIncidentStore {
    records: RwLock<HashMap<String, Incident>>,
}

impl MemoryIncidentStore {
    pub fn new() -> Self {
        Self { records: RwLock::new(HashMap::new()) }
    }

    /// All incidents currently in a given status (dashboards, tests)
    pub fn list_by_status(&self, status: IncidentStatus) -> Vec<Incident> {
        self.records
            .read()
            .expect("incident store lock poisoned")
            .values()
            .filter(|incident| incident.status == status)
            .cloned()
            .collect()
    }
}

impl Default for MemoryIncidentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IncidentStore for MemoryIncidentStore {
    fn get(&self, id: &str) -> Result<Option<Incident>, StoreError> {
        Ok(self
            .records
            .read()
            .expect("incident store lock poisoned")
            .get(id)
            .cloned())
    }

    fn put(&self, incident: &Incident) -> Result<(), StoreError> {
        self.records
            .write()
            .expect("incident store lock poisoned")
            .insert(incident.id.clone(), incident.clone());
        Ok(())
    }

    fn active_for_agent(&self, agent_id: &str) -> Result<Option<Incident>, StoreError> {
        Ok(self
            .records
            .read()
            .expect("incident store lock poisoned")
            .values()
            .find(|incident| {
                !incident.status.is_terminal()
                    && incident.assigned_agent_id.as_deref() == Some(agent_id)
            })
            .cloned())
    }
}
