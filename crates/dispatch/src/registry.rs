//! Agent registry and availability tracker
//!
//! The registry is the single owner of responder state: last known
//! location, availability, specialization, and the active assignment
//! binding. Nothing outside this type touches the underlying map.
//!
//! Busy is a derived status. The only paths into it are [`AgentRegistry::reserve`]
//! (an atomic available→busy check-and-set under the write lock) and the
//! only path out is [`AgentRegistry::release`]. Clients asking to set Busy
//! directly are rejected.

use lifeline_core::haversine_km;
use lifeline_domain::{
    Agent, AgentStatus, DispatchError, GeoPoint, Result, Specialization,
};
use std::collections::HashMap;
use std::sync::Mutex as StdMutex;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

/// The incident an agent is currently bound to
#[derive(Debug, Clone)]
pub struct ActiveAssignment {
    /// Incident id
    pub alert_id: String,
    /// Incident location, used for proximity arrival detection
    pub location: GeoPoint,
    /// Whether the arrival signal for this assignment already fired
    arrival_signalled: bool,
}

impl ActiveAssignment {
    pub fn new(alert_id: impl Into<String>, location: GeoPoint) -> Self {
        Self { alert_id: alert_id.into(), location, arrival_signalled: false }
    }
}

/// Emitted when a busy agent's location crosses the arrival threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalSignal {
    pub alert_id: String,
    pub agent_id: String,
}

struct AgentRecord {
    agent: Agent,
    assignment: Option<ActiveAssignment>,
}

/// Owned registry of responder state
pub struct AgentRegistry {
    records: RwLock<HashMap<String, AgentRecord>>,
    /// Proximity at which a busy agent counts as on scene (meters)
    arrival_threshold_m: f64,
    /// Wired by the gateway to the lifecycle manager's arrival pump
    arrival_tx: StdMutex<Option<mpsc::UnboundedSender<ArrivalSignal>>>,
}

impl AgentRegistry {
    pub fn new(arrival_threshold_m: f64) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            arrival_threshold_m,
            arrival_tx: StdMutex::new(None),
        }
    }

    /// Connect the arrival-detection channel
    pub fn set_arrival_channel(&self, tx: mpsc::UnboundedSender<ArrivalSignal>) {
        *self.arrival_tx.lock().expect("arrival channel lock poisoned") = Some(tx);
    }

    /// Register a new agent or refresh an existing agent's profile.
    ///
    /// The availability status and any live assignment of an existing agent
    /// are preserved; profile updates cannot un-busy a responder.
    pub async fn upsert(&self, agent: Agent) {
        let mut records = self.records.write().await;
        match records.get_mut(&agent.id) {
            Some(record) => {
                record.agent.location = agent.location;
                record.agent.location_updated_at = agent.location_updated_at;
                record.agent.specialization = agent.specialization;
                record.agent.rating = agent.rating;
            }
            None => {
                records.insert(agent.id.clone(), AgentRecord { agent, assignment: None });
            }
        }
    }

    pub async fn get(&self, agent_id: &str) -> Option<Agent> {
        self.records.read().await.get(agent_id).map(|r| r.agent.clone())
    }

    /// Update an agent's position, detecting proximity arrival.
    ///
    /// For a busy agent the distance to its assigned incident is checked
    /// against the arrival threshold; the first crossing emits an
    /// [`ArrivalSignal`] on the wired channel and returns it.
    pub async fn update_location(
        &self,
        agent_id: &str,
        location: GeoPoint,
        now: u64,
    ) -> Result<Option<ArrivalSignal>> {
        location
            .as_latlon()
            .validate()
            .map_err(|e| DispatchError::Validation(e.to_string()))?;

        let mut records = self.records.write().await;
        let record = records
            .get_mut(agent_id)
            .ok_or_else(|| DispatchError::NotFound(format!("agent {}", agent_id)))?;

        record.agent.location = location;
        record.agent.location_updated_at = now;

        let Some(assignment) = record.assignment.as_mut() else {
            return Ok(None);
        };
        if assignment.arrival_signalled {
            return Ok(None);
        }

        let distance_m =
            haversine_km(&location.as_latlon(), &assignment.location.as_latlon()) * 1000.0;
        if distance_m > self.arrival_threshold_m {
            return Ok(None);
        }

        assignment.arrival_signalled = true;
        let signal = ArrivalSignal {
            alert_id: assignment.alert_id.clone(),
            agent_id: agent_id.to_string(),
        };
        debug!(agent_id, alert_id = %signal.alert_id, distance_m, "proximity arrival detected");

        if let Some(tx) = self
            .arrival_tx
            .lock()
            .expect("arrival channel lock poisoned")
            .as_ref()
        {
            let _ = tx.send(signal.clone());
        }
        Ok(Some(signal))
    }

    /// Set an agent's availability.
    ///
    /// Busy cannot be requested (it is derived from reservations), and an
    /// agent with a live assignment cannot change status until released.
    pub async fn set_status(&self, agent_id: &str, status: AgentStatus) -> Result<Agent> {
        if status == AgentStatus::Busy {
            return Err(DispatchError::Validation(
                "busy is derived from assignment and cannot be set directly".to_string(),
            ));
        }

        let mut records = self.records.write().await;
        let record = records
            .get_mut(agent_id)
            .ok_or_else(|| DispatchError::NotFound(format!("agent {}", agent_id)))?;

        if let Some(assignment) = &record.assignment {
            return Err(DispatchError::Conflict(format!(
                "agent {} is assigned to incident {}",
                agent_id, assignment.alert_id
            )));
        }

        record.agent.status = status;
        Ok(record.agent.clone())
    }

    /// Atomic available→busy check-and-set.
    ///
    /// Fails with `Conflict` unless the agent is currently available; this
    /// is what prevents double-booking under concurrent assignment.
    pub async fn reserve(&self, agent_id: &str, assignment: ActiveAssignment) -> Result<Agent> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(agent_id)
            .ok_or_else(|| DispatchError::NotFound(format!("agent {}", agent_id)))?;

        if record.agent.status != AgentStatus::Available {
            return Err(DispatchError::Conflict(format!(
                "agent {} is not available",
                agent_id
            )));
        }

        record.agent.status = AgentStatus::Busy;
        record.assignment = Some(assignment);
        Ok(record.agent.clone())
    }

    /// Re-enable proximity detection for an agent's live assignment.
    ///
    /// Used when an arrival signal could not be applied (for example the
    /// agent never flagged en_route) so a later crossing can fire again.
    pub async fn rearm_arrival(&self, agent_id: &str) {
        if let Some(record) = self.records.write().await.get_mut(agent_id) {
            if let Some(assignment) = record.assignment.as_mut() {
                assignment.arrival_signalled = false;
            }
        }
    }

    /// Free an agent after completion or cancellation
    pub async fn release(&self, agent_id: &str) -> Result<Agent> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(agent_id)
            .ok_or_else(|| DispatchError::NotFound(format!("agent {}", agent_id)))?;

        record.assignment = None;
        if record.agent.status == AgentStatus::Busy {
            record.agent.status = AgentStatus::Available;
        }
        Ok(record.agent.clone())
    }

    /// Consistent snapshot of every available agent, for the matcher
    pub async fn snapshot_available(&self) -> Vec<Agent> {
        self.records
            .read()
            .await
            .values()
            .filter(|record| record.agent.is_available())
            .map(|record| record.agent.clone())
            .collect()
    }

    /// Indexed lookup: available agents within `radius_km` of `point`,
    /// optionally filtered by specialization
    pub async fn within_radius(
        &self,
        point: &GeoPoint,
        radius_km: f64,
        specialization: Option<Specialization>,
    ) -> Vec<(Agent, f64)> {
        self.records
            .read()
            .await
            .values()
            .filter(|record| record.agent.is_available())
            .filter(|record| match specialization {
                Some(required) => {
                    record.agent.specialization == required
                        || record.agent.specialization == Specialization::General
                }
                None => true,
            })
            .filter_map(|record| {
                let d = haversine_km(
                    &record.agent.location.as_latlon(),
                    &point.as_latlon(),
                );
                (d <= radius_km).then(|| (record.agent.clone(), d))
            })
            .collect()
    }
}
