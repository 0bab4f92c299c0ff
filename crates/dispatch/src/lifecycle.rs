//! Incident lifecycle manager
//!
//! The only component allowed to mutate an incident's status. Operations
//! are serialized per incident through a keyed async mutex; the assign
//! path additionally rides the registry's atomic reservation so two
//! concurrent assigns can never both win.
//!
//! Side-effect order is always persist → publish. Broadcast and
//! notification failures are logged and never roll back persisted state.

use crate::matcher::{rank_candidates, RankedCandidate};
use crate::notify::NotificationGateway;
use crate::registry::{ActiveAssignment, AgentRegistry, ArrivalSignal};
use crate::store::IncidentStore;
use lifeline_broadcast::BroadcastRouter;
use lifeline_core::config::DispatchConfig;
use lifeline_core::geo::{eta_minutes, haversine_km};
use lifeline_core::now_ms;
use lifeline_domain::{
    Agent, DispatchError, DispatchEvent, GeoPoint, HazardAssessor, Incident, IncidentCategory,
    IncidentStatus, Priority, Result, Topic,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

/// Result of a successful create: the incident plus its ranked candidates
#[derive(Debug, Clone)]
pub struct CreatedAlert {
    pub incident: Incident,
    pub candidates: Vec<RankedCandidate>,
}

/// Result of a successful assignment
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    pub incident: Incident,
    pub agent: Agent,
    pub eta_minutes: f64,
}

/// Owner of the incident state machine
pub struct LifecycleManager {
    store: Arc<dyn IncidentStore>,
    registry: Arc<AgentRegistry>,
    router: Arc<BroadcastRouter>,
    assessor: Option<Arc<dyn HazardAssessor>>,
    notifier: Arc<dyn NotificationGateway>,
    config: DispatchConfig,
    /// Per-incident serialization; entries are pruned at terminal states
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LifecycleManager {
    pub fn new(
        store: Arc<dyn IncidentStore>,
        registry: Arc<AgentRegistry>,
        router: Arc<BroadcastRouter>,
        notifier: Arc<dyn NotificationGateway>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            store,
            registry,
            router,
            assessor: None,
            notifier,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Attach a live hazard assessor used for priority escalation
    pub fn with_assessor(mut self, assessor: Arc<dyn HazardAssessor>) -> Self {
        self.assessor = Some(assessor);
        self
    }

    /// Create a new incident from a distress report.
    ///
    /// Validates coordinates, derives priority (escalated one tier when a
    /// live hazard assessment reports high severity or above, degraded to
    /// the base priority when the assessment is unavailable), persists the
    /// pending record, and offers it to ranked candidates on the `agents`
    /// topic.
    pub async fn create(
        &self,
        reporter_id: &str,
        location: GeoPoint,
        category: IncidentCategory,
        description: &str,
    ) -> Result<CreatedAlert> {
        location
            .as_latlon()
            .validate()
            .map_err(|e| DispatchError::Validation(e.to_string()))?;
        if reporter_id.is_empty() {
            return Err(DispatchError::Validation("reporter id is required".to_string()));
        }

        let base = Priority::for_category(category);
        let assessment = match &self.assessor {
            Some(assessor) => match assessor.severity_near(&location) {
                Ok(severity) => severity,
                Err(e) => {
                    warn!("hazard assessment unavailable, using base priority: {}", e);
                    None
                }
            },
            None => None,
        };
        let priority = base.with_hazard_assessment(assessment);

        let incident = Incident::new(
            reporter_id,
            location,
            category,
            priority,
            description,
            now_ms(),
        );
        self.persist(&incident)?;
        info!(
            alert_id = %incident.id,
            ?category,
            ?priority,
            "incident created"
        );

        let snapshot: Vec<Agent> = self
            .registry
            .within_radius(
                &location,
                self.config.matching.default_radius_km,
                category.required_specialization(),
            )
            .await
            .into_iter()
            .map(|(agent, _)| agent)
            .collect();
        let candidates = rank_candidates(
            &snapshot,
            &location,
            category,
            self.config.matching.default_radius_km,
            self.config.matching.candidate_fanout,
            &self.config.matching,
        );

        self.router
            .publish(
                &Topic::Agents,
                DispatchEvent::AlertCreated {
                    incident: incident.clone(),
                    candidates: candidates.iter().map(RankedCandidate::summary).collect(),
                },
            )
            .await;
        self.notify(reporter_id, "report received", "searching for nearby responders");

        Ok(CreatedAlert { incident, candidates })
    }

    /// Assign a pending incident to an available agent.
    ///
    /// Atomic check-and-set: succeeds only while the incident is still
    /// pending and the agent still available; the loser of a race gets
    /// `Conflict` and the losing agent stays available.
    pub async fn assign(&self, alert_id: &str, agent_id: &str) -> Result<AssignmentOutcome> {
        let lock = self.incident_lock(alert_id).await;
        let _guard = lock.lock().await;

        let mut incident = self.load(alert_id)?;
        if incident.status != IncidentStatus::Pending {
            return Err(DispatchError::Conflict(format!(
                "incident {} is no longer pending",
                alert_id
            )));
        }

        // One live incident per agent, checked against the store as well
        // as the registry reservation.
        if let Some(held) = self
            .store
            .active_for_agent(agent_id)
            .map_err(|e| DispatchError::Dependency(e.to_string()))?
        {
            return Err(DispatchError::Conflict(format!(
                "agent {} already holds incident {}",
                agent_id, held.id
            )));
        }

        let agent = self
            .registry
            .reserve(agent_id, ActiveAssignment::new(alert_id, incident.location))
            .await?;

        let now = now_ms();
        incident.status = IncidentStatus::Assigned;
        incident.assigned_agent_id = Some(agent_id.to_string());
        incident.assigned_at = Some(now);

        if let Err(e) = self.persist(&incident) {
            // Reservation must not outlive a failed write
            if let Err(release_err) = self.registry.release(agent_id).await {
                warn!("failed to release agent after store error: {}", release_err);
            }
            return Err(e);
        }

        let distance_km = haversine_km(
            &agent.location.as_latlon(),
            &incident.location.as_latlon(),
        );
        let eta = eta_minutes(
            distance_km,
            self.config.matching.assumed_speed_kmh,
            &self.config.matching.congestion,
        );
        drop(_guard);

        info!(alert_id, agent_id, eta_minutes = eta, "incident assigned");
        self.router
            .publish(
                &Topic::User(incident.reporter_id.clone()),
                DispatchEvent::AlertAssigned {
                    incident: incident.clone(),
                    agent: agent.clone(),
                    eta_minutes: eta,
                },
            )
            .await;
        // Retract the offer from the other candidates
        self.router
            .publish(
                &Topic::Agents,
                DispatchEvent::SosAssigned {
                    alert_id: alert_id.to_string(),
                    agent_id: agent_id.to_string(),
                },
            )
            .await;
        self.notify(
            &incident.reporter_id,
            "responder assigned",
            &format!("{} is on the way", agent_id),
        );

        Ok(AssignmentOutcome { incident, agent, eta_minutes: eta })
    }

    /// Advance an assigned incident through en_route → arrived → completed.
    ///
    /// Only the assigned agent may advance it, and only to the adjacent
    /// state. Completion frees the agent.
    pub async fn update_status(
        &self,
        alert_id: &str,
        new_status: IncidentStatus,
        acting_agent_id: &str,
    ) -> Result<Incident> {
        if !matches!(
            new_status,
            IncidentStatus::EnRoute | IncidentStatus::Arrived | IncidentStatus::Completed
        ) {
            return Err(DispatchError::Validation(format!(
                "status {:?} cannot be requested by an agent",
                new_status
            )));
        }

        let lock = self.incident_lock(alert_id).await;
        let _guard = lock.lock().await;

        let mut incident = self.load(alert_id)?;
        if incident.assigned_agent_id.as_deref() != Some(acting_agent_id) {
            return Err(DispatchError::Unauthorized(format!(
                "agent {} is not assigned to incident {}",
                acting_agent_id, alert_id
            )));
        }
        if !incident.status.can_transition_to(new_status) {
            return Err(DispatchError::InvalidTransition {
                from: incident.status,
                to: new_status,
            });
        }

        let now = now_ms();
        incident.status = new_status;
        match new_status {
            IncidentStatus::Arrived => incident.arrived_at = Some(now),
            IncidentStatus::Completed => {
                incident.completed_at = Some(now);
                incident.assigned_agent_id = None;
            }
            _ => {}
        }
        self.persist(&incident)?;

        if new_status == IncidentStatus::Completed {
            if let Err(e) = self.registry.release(acting_agent_id).await {
                warn!("failed to release agent on completion: {}", e);
            }
            self.prune_lock(alert_id).await;
        }
        drop(_guard);

        info!(alert_id, agent_id = acting_agent_id, status = ?new_status, "status updated");
        self.router
            .publish(
                &Topic::User(incident.reporter_id.clone()),
                DispatchEvent::StatusUpdate {
                    alert_id: alert_id.to_string(),
                    status: new_status,
                    timestamp: now,
                },
            )
            .await;
        self.notify(
            &incident.reporter_id,
            "status update",
            &format!("your report is now {:?}", new_status),
        );

        Ok(incident)
    }

    /// Cancel a pending or assigned incident.
    ///
    /// Only the original reporter may cancel. An assigned agent is freed
    /// and told to stand down.
    pub async fn cancel(&self, alert_id: &str, reporter_id: &str) -> Result<Incident> {
        let lock = self.incident_lock(alert_id).await;
        let _guard = lock.lock().await;

        let mut incident = self.load(alert_id)?;
        if incident.reporter_id != reporter_id {
            return Err(DispatchError::Unauthorized(format!(
                "reporter {} did not file incident {}",
                reporter_id, alert_id
            )));
        }
        if !incident.status.can_transition_to(IncidentStatus::Cancelled) {
            return Err(DispatchError::Conflict(format!(
                "incident {} cannot be cancelled from {:?}",
                alert_id, incident.status
            )));
        }

        let now = now_ms();
        let freed_agent = incident.assigned_agent_id.take();
        incident.status = IncidentStatus::Cancelled;
        incident.cancelled_at = Some(now);
        self.persist(&incident)?;

        if let Some(agent_id) = &freed_agent {
            if let Err(e) = self.registry.release(agent_id).await {
                warn!("failed to release agent on cancellation: {}", e);
            }
        }
        self.prune_lock(alert_id).await;
        drop(_guard);

        info!(alert_id, reporter_id, "incident cancelled");
        if let Some(agent_id) = &freed_agent {
            self.router
                .publish(
                    &Topic::Agent(agent_id.clone()),
                    DispatchEvent::AlertCancelled { alert_id: alert_id.to_string() },
                )
                .await;
        }
        self.router
            .publish(
                &Topic::User(incident.reporter_id.clone()),
                DispatchEvent::StatusUpdate {
                    alert_id: alert_id.to_string(),
                    status: IncidentStatus::Cancelled,
                    timestamp: now,
                },
            )
            .await;

        Ok(incident)
    }

    /// Read-only ranked candidate query for the HTTP layer
    pub async fn nearby_agents(
        &self,
        location: GeoPoint,
        category: Option<IncidentCategory>,
        radius_km: Option<f64>,
    ) -> Result<Vec<RankedCandidate>> {
        location
            .as_latlon()
            .validate()
            .map_err(|e| DispatchError::Validation(e.to_string()))?;

        let snapshot = self.registry.snapshot_available().await;
        Ok(rank_candidates(
            &snapshot,
            &location,
            category.unwrap_or(IncidentCategory::Other),
            radius_km.unwrap_or(self.config.matching.default_radius_km),
            self.config.matching.default_limit,
            &self.config.matching,
        ))
    }

    /// Consume proximity arrival signals from the registry.
    ///
    /// An agent who never flagged en_route produces a non-adjacent
    /// transition here; the signal is dropped and the detector re-armed so
    /// a later crossing can try again.
    pub async fn run_arrival_pump(
        self: Arc<Self>,
        mut signals: mpsc::UnboundedReceiver<ArrivalSignal>,
    ) {
        while let Some(signal) = signals.recv().await {
            match self
                .update_status(&signal.alert_id, IncidentStatus::Arrived, &signal.agent_id)
                .await
            {
                Ok(_) => {
                    info!(
                        alert_id = %signal.alert_id,
                        agent_id = %signal.agent_id,
                        "proximity arrival recorded"
                    );
                }
                Err(e) => {
                    debug!(
                        alert_id = %signal.alert_id,
                        agent_id = %signal.agent_id,
                        "auto-arrival skipped: {}",
                        e
                    );
                    self.registry.rearm_arrival(&signal.agent_id).await;
                }
            }
        }
    }

    fn load(&self, alert_id: &str) -> Result<Incident> {
        self.store
            .get(alert_id)
            .map_err(|e| DispatchError::Dependency(e.to_string()))?
            .ok_or_else(|| DispatchError::NotFound(format!("incident {}", alert_id)))
    }

    fn persist(&self, incident: &Incident) -> Result<()> {
        debug_assert!(incident.invariants_hold());
        self.store
            .put(incident)
            .map_err(|e| DispatchError::Dependency(e.to_string()))
    }

    fn notify(&self, recipient: &str, title: &str, body: &str) {
        if let Err(e) = self.notifier.push(recipient, title, body) {
            warn!(recipient, "notification failed: {}", e);
        }
    }

    async fn incident_lock(&self, alert_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(alert_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn prune_lock(&self, alert_id: &str) {
        self.locks.lock().await.remove(alert_id);
    }
}
