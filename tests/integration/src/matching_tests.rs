//! Candidate matching across the registry and lifecycle seams

use crate::test_utils::{available_agent, offset_north_km, DispatchHarness, ORIGIN};
use lifeline_domain::{DispatchError, GeoPoint, IncidentCategory, Specialization};

#[tokio::test]
async fn test_nearby_orders_by_distance_then_rating() {
    let h = DispatchHarness::new();
    let (lat, lon) = ORIGIN;

    h.registry
        .upsert(available_agent("far-good", offset_north_km(lat, 20.0), lon, Specialization::General, 5.0))
        .await;
    h.registry
        .upsert(available_agent("near-low", offset_north_km(lat, 2.0), lon, Specialization::General, 3.1))
        .await;
    // Same distance as near-low but better rated: wins the tie.
    h.registry
        .upsert(available_agent("near-high", offset_north_km(lat, 2.0), lon, Specialization::General, 4.9))
        .await;

    let ranked = h
        .lifecycle
        .nearby_agents(GeoPoint::new(lat, lon), None, None)
        .await
        .unwrap();

    let ids: Vec<&str> = ranked.iter().map(|c| c.agent.id.as_str()).collect();
    assert_eq!(ids, vec!["near-high", "near-low", "far-good"]);
    assert!(ranked[0].distance_km < ranked[2].distance_km);
    assert!(ranked[0].eta_minutes > 0.0);
}

#[tokio::test]
async fn test_specialized_category_excludes_mismatched_agents() {
    let h = DispatchHarness::new();
    let (lat, lon) = ORIGIN;

    h.registry
        .upsert(available_agent("medic", offset_north_km(lat, 5.0), lon, Specialization::Medical, 4.0))
        .await;
    h.registry
        .upsert(available_agent("generalist", offset_north_km(lat, 8.0), lon, Specialization::General, 4.0))
        .await;
    h.registry
        .upsert(available_agent("firefighter", offset_north_km(lat, 1.0), lon, Specialization::Fire, 5.0))
        .await;

    let ranked = h
        .lifecycle
        .nearby_agents(GeoPoint::new(lat, lon), Some(IncidentCategory::Medical), None)
        .await
        .unwrap();

    let ids: Vec<&str> = ranked.iter().map(|c| c.agent.id.as_str()).collect();
    assert_eq!(ids, vec!["medic", "generalist"], "closest firefighter must be filtered");
}

#[tokio::test]
async fn test_radius_cutoff_is_respected() {
    let h = DispatchHarness::new();
    let (lat, lon) = ORIGIN;

    h.registry
        .upsert(available_agent("inside", offset_north_km(lat, 4.0), lon, Specialization::General, 4.0))
        .await;
    h.registry
        .upsert(available_agent("outside", offset_north_km(lat, 30.0), lon, Specialization::General, 4.0))
        .await;

    let ranked = h
        .lifecycle
        .nearby_agents(GeoPoint::new(lat, lon), None, Some(10.0))
        .await
        .unwrap();

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].agent.id, "inside");
}

#[tokio::test]
async fn test_nearby_rejects_invalid_coordinates() {
    let h = DispatchHarness::new();
    let err = h
        .lifecycle
        .nearby_agents(GeoPoint::new(-91.0, 0.0), None, None)
        .await;
    assert!(matches!(err, Err(DispatchError::Validation(_))));
}

#[tokio::test]
async fn test_busy_agents_never_ranked() {
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
        .create("r1", GeoPoint::new(lat, lon), IncidentCategory::Other, "stuck lift")
        .await
        .unwrap();
    h.lifecycle.assign(&created.incident.id, "a1").await.unwrap();

    let ranked = h
        .lifecycle
        .nearby_agents(GeoPoint::new(lat, lon), None, None)
        .await
        .unwrap();
    let ids: Vec<&str> = ranked.iter().map(|c| c.agent.id.as_str()).collect();
    assert_eq!(ids, vec!["a2"]);
}
