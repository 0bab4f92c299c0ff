//! End-to-end incident lifecycle scenarios

use crate::test_utils::{available_agent, offset_north_km, DispatchHarness, ORIGIN};
use lifeline_core::now_ms;
use lifeline_domain::{
    AgentStatus, DispatchError, DispatchEvent, GeoPoint, IncidentCategory, IncidentStatus,
    Priority, Specialization, Topic,
};
use std::sync::Arc;
use std::time::Duration;

/// Scenario: a medical emergency in the Johannesburg CBD is reported,
/// offered to the three closest qualified responders, accepted by the
/// nearest, driven through en-route and arrival, and completed.
#[tokio::test]
async fn test_full_incident_walk() {
    let h = DispatchHarness::new();
    let (lat, lon) = ORIGIN;

    // Three medics at 2, 5 and 9 km; one firefighter who must not appear.
    h.registry
        .upsert(available_agent("medic-near", offset_north_km(lat, 2.0), lon, Specialization::Medical, 4.0))
        .await;
    h.registry
        .upsert(available_agent("medic-mid", offset_north_km(lat, 5.0), lon, Specialization::Medical, 5.0))
        .await;
    h.registry
        .upsert(available_agent("medic-far", offset_north_km(lat, 9.0), lon, Specialization::Medical, 4.8))
        .await;
    h.registry
        .upsert(available_agent("pump-1", offset_north_km(lat, 1.0), lon, Specialization::Fire, 5.0))
        .await;

    let (agents_conn, mut agents_rx) = h.router.register().await;
    h.router.subscribe(agents_conn, &Topic::Agents).await;
    let (reporter_conn, mut reporter_rx) = h.router.register().await;
    h.router
        .subscribe(reporter_conn, &Topic::User("reporter-1".to_string()))
        .await;

    let created = h
        .lifecycle
        .create(
            "reporter-1",
            GeoPoint::new(lat, lon),
            IncidentCategory::Medical,
            "collapsed pedestrian, not breathing",
        )
        .await
        .unwrap();

    assert_eq!(created.incident.status, IncidentStatus::Pending);
    assert_eq!(created.incident.priority, Priority::Critical);
    let offered: Vec<&str> = created.candidates.iter().map(|c| c.agent.id.as_str()).collect();
    assert_eq!(offered, vec!["medic-near", "medic-mid", "medic-far"]);

    let envelope = agents_rx.recv().await.unwrap();
    match envelope.event {
        DispatchEvent::AlertCreated { ref incident, ref candidates } => {
            assert_eq!(incident.id, created.incident.id);
            assert_eq!(candidates.len(), 3);
        }
        other => panic!("expected alert-created, got {}", other.name()),
    }

    let outcome = h.lifecycle.assign(&created.incident.id, "medic-near").await.unwrap();
    assert_eq!(outcome.incident.status, IncidentStatus::Assigned);
    assert!(outcome.eta_minutes > 0.0);
    assert_eq!(
        h.registry.get("medic-near").await.unwrap().status,
        AgentStatus::Busy
    );

    match reporter_rx.recv().await.unwrap().event {
        DispatchEvent::AlertAssigned { agent, .. } => assert_eq!(agent.id, "medic-near"),
        other => panic!("expected alert-assigned, got {}", other.name()),
    }

    for status in [IncidentStatus::EnRoute, IncidentStatus::Arrived, IncidentStatus::Completed] {
        let incident = h
            .lifecycle
            .update_status(&created.incident.id, status, "medic-near")
            .await
            .unwrap();
        assert_eq!(incident.status, status);
        assert!(incident.invariants_hold());
    }

    // Completion releases the responder and stamps the record.
    assert_eq!(
        h.registry.get("medic-near").await.unwrap().status,
        AgentStatus::Available
    );
    let completed = h
        .lifecycle
        .update_status(&created.incident.id, IncidentStatus::EnRoute, "medic-near")
        .await;
    assert!(completed.is_err(), "terminal incidents accept no further updates");
}

#[tokio::test]
async fn test_concurrent_assigns_exactly_one_winner() {
    let h = DispatchHarness::new();
    let (lat, lon) = ORIGIN;
    h.registry
        .upsert(available_agent("a1", offset_north_km(lat, 1.0), lon, Specialization::General, 4.0))
        .await;
    h.registry
        .upsert(available_agent("a2", offset_north_km(lat, 2.0), lon, Specialization::General, 4.0))
        .await;

    let created = h
        .lifecycle
        .create("r1", GeoPoint::new(lat, lon), IncidentCategory::Accident, "pile-up")
        .await
        .unwrap();

    let first = tokio::spawn({
        let lifecycle = Arc::clone(&h.lifecycle);
        let id = created.incident.id.clone();
        async move { lifecycle.assign(&id, "a1").await }
    });
    let second = tokio::spawn({
        let lifecycle = Arc::clone(&h.lifecycle);
        let id = created.incident.id.clone();
        async move { lifecycle.assign(&id, "a2").await }
    });

    let (first, second) = tokio::join!(first, second);
    let results = [first.unwrap(), second.unwrap()];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one dispatcher must win the race");
    let conflict = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(conflict, Err(DispatchError::Conflict(_))));

    // The losing agent is untouched.
    let winner_id = results
        .iter()
        .find_map(|r| r.as_ref().ok().map(|o| o.agent.id.clone()))
        .unwrap();
    let loser_id = if winner_id == "a1" { "a2" } else { "a1" };
    assert_eq!(h.registry.get(loser_id).await.unwrap().status, AgentStatus::Available);
}

#[tokio::test]
async fn test_cancel_releases_agent_and_blocks_updates() {
    let h = DispatchHarness::new();
    let (lat, lon) = ORIGIN;
    h.registry
        .upsert(available_agent("a1", offset_north_km(lat, 1.0), lon, Specialization::Police, 4.5))
        .await;

    let created = h
        .lifecycle
        .create("r1", GeoPoint::new(lat, lon), IncidentCategory::Police, "break-in")
        .await
        .unwrap();
    h.lifecycle.assign(&created.incident.id, "a1").await.unwrap();

    // Only the reporter may withdraw.
    let denied = h.lifecycle.cancel(&created.incident.id, "someone-else").await;
    assert!(matches!(denied, Err(DispatchError::Unauthorized(_))));

    let (agent_conn, mut agent_rx) = h.router.register().await;
    h.router
        .subscribe(agent_conn, &Topic::Agent("a1".to_string()))
        .await;

    let cancelled = h.lifecycle.cancel(&created.incident.id, "r1").await.unwrap();
    assert_eq!(cancelled.status, IncidentStatus::Cancelled);
    assert!(cancelled.assigned_agent_id.is_none());
    assert_eq!(h.registry.get("a1").await.unwrap().status, AgentStatus::Available);

    match agent_rx.recv().await.unwrap().event {
        DispatchEvent::AlertCancelled { alert_id } => assert_eq!(alert_id, created.incident.id),
        other => panic!("expected alert-cancelled, got {}", other.name()),
    }

    let stale = h
        .lifecycle
        .update_status(&created.incident.id, IncidentStatus::EnRoute, "a1")
        .await;
    assert!(stale.is_err(), "cancelled incidents accept no field updates");
}

#[tokio::test]
async fn test_update_status_rejects_unassigned_actor() {
    let h = DispatchHarness::new();
    let (lat, lon) = ORIGIN;
    h.registry
        .upsert(available_agent("a1", lat, lon, Specialization::General, 4.0))
        .await;
    h.registry
        .upsert(available_agent("a2", lat, lon, Specialization::General, 4.0))
        .await;

    let created = h
        .lifecycle
        .create("r1", GeoPoint::new(lat, lon), IncidentCategory::Other, "noise complaint")
        .await
        .unwrap();
    h.lifecycle.assign(&created.incident.id, "a1").await.unwrap();

    let err = h
        .lifecycle
        .update_status(&created.incident.id, IncidentStatus::EnRoute, "a2")
        .await;
    assert!(matches!(err, Err(DispatchError::Unauthorized(_))));
}

/// Proximity arrival: once the responder flags en-route, a location update
/// inside the arrival threshold moves the incident to Arrived without any
/// explicit status call.
#[tokio::test]
async fn test_location_update_triggers_auto_arrival() {
    let mut h = DispatchHarness::new();
    h.spawn_arrival_pump();
    let (lat, lon) = ORIGIN;
    h.registry
        .upsert(available_agent("a1", offset_north_km(lat, 3.0), lon, Specialization::Medical, 4.9))
        .await;

    let created = h
        .lifecycle
        .create("r1", GeoPoint::new(lat, lon), IncidentCategory::Medical, "chest pain")
        .await
        .unwrap();
    h.lifecycle.assign(&created.incident.id, "a1").await.unwrap();
    h.lifecycle
        .update_status(&created.incident.id, IncidentStatus::EnRoute, "a1")
        .await
        .unwrap();

    let (reporter_conn, mut reporter_rx) = h.router.register().await;
    h.router
        .subscribe(reporter_conn, &Topic::User("r1".to_string()))
        .await;

    // 10 m away: inside the 50 m threshold.
    let near = GeoPoint::new(lat + 10.0 / 111_000.0, lon);
    let signal = h.registry.update_location("a1", near, now_ms()).await.unwrap();
    assert!(signal.is_some(), "threshold crossing must emit a signal");

    let envelope = tokio::time::timeout(Duration::from_secs(2), reporter_rx.recv())
        .await
        .expect("arrival pump should publish within the timeout")
        .unwrap();
    match envelope.event {
        DispatchEvent::StatusUpdate { alert_id, status, .. } => {
            assert_eq!(alert_id, created.incident.id);
            assert_eq!(status, IncidentStatus::Arrived);
        }
        other => panic!("expected status-update, got {}", other.name()),
    }
}
