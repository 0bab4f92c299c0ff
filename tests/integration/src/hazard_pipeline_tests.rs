//! Disaster feed pipeline: feed, dedup, broadcast, priority escalation

use crate::test_utils::{available_agent, raw_quake, DispatchHarness, ScriptedFeed, ORIGIN};
use lifeline_domain::{
    DispatchEvent, GeoPoint, IncidentCategory, Priority, Severity, Specialization, Topic,
};
use lifeline_hazards::{FeedBinding, FeedScheduler, HazardFeed};
use std::sync::Arc;
use std::time::Duration;

fn bind(h: &DispatchHarness, feed: ScriptedFeed) -> (Arc<FeedScheduler>, FeedBinding) {
    let mut scheduler =
        FeedScheduler::new(Arc::clone(&h.router), Arc::clone(&h.index), &h.config.hazards);
    let feed: Arc<dyn HazardFeed> = Arc::new(feed);
    scheduler.add_feed(Arc::clone(&feed), Duration::from_secs(60));
    (Arc::new(scheduler), FeedBinding { feed, interval: Duration::from_secs(60) })
}

#[tokio::test]
async fn test_fresh_disaster_reaches_agents_and_dashboards() {
    let h = DispatchHarness::new();
    let (scheduler, binding) = bind(
        &h,
        ScriptedFeed::new("seismic", vec![Ok(vec![raw_quake("ZA-GP", "M7.5 - Gauteng", 7.5)])]),
    );

    let (agents_conn, mut agents_rx) = h.router.register().await;
    h.router.subscribe(agents_conn, &Topic::Agents).await;
    let (admin_conn, mut admin_rx) = h.router.register().await;
    h.router.subscribe(admin_conn, &Topic::AdminDashboards).await;

    scheduler.poll_feed_once(&binding).await;

    for rx in [&mut agents_rx, &mut admin_rx] {
        match rx.recv().await.unwrap().event {
            DispatchEvent::DisasterAlert { disaster } => {
                assert_eq!(disaster.severity, Severity::Critical);
                assert_eq!(disaster.region.code, "ZA-GP");
            }
            other => panic!("expected disaster-alert, got {}", other.name()),
        }
    }
}

#[tokio::test]
async fn test_repeat_sightings_deduplicated_across_cycles() {
    let h = DispatchHarness::new();
    let raw = raw_quake("ZA-GP", "M6.1 - Gauteng", 6.1);
    let (scheduler, binding) = bind(
        &h,
        ScriptedFeed::new(
            "seismic",
            vec![Ok(vec![raw.clone()]), Ok(vec![raw.clone()]), Ok(vec![raw])],
        ),
    );

    let (conn, mut rx) = h.router.register().await;
    h.router.subscribe(conn, &Topic::Agents).await;

    for _ in 0..3 {
        scheduler.poll_feed_once(&binding).await;
    }

    assert!(rx.recv().await.is_some());
    assert!(rx.try_recv().is_err(), "only the first sighting publishes");
    assert_eq!(scheduler.live_event_count().await, 1);
}

/// A live critical hazard near the report location escalates the incident
/// one priority tier through the hazard index assessor.
#[tokio::test]
async fn test_live_hazard_escalates_incident_priority() {
    let h = DispatchHarness::new();
    let (lat, lon) = ORIGIN;
    h.registry
        .upsert(available_agent("a1", lat, lon, Specialization::General, 4.0))
        .await;

    let (scheduler, binding) = bind(
        &h,
        ScriptedFeed::new("seismic", vec![Ok(vec![raw_quake("ZA-GP", "M7.2 - Gauteng", 7.2)])]),
    );
    scheduler.poll_feed_once(&binding).await;

    // Accident is High by category; the nearby quake lifts it to Critical.
    let near = h
        .lifecycle
        .create("r1", GeoPoint::new(lat, lon), IncidentCategory::Accident, "bridge collapse")
        .await
        .unwrap();
    assert_eq!(near.incident.priority, Priority::Critical);

    // Outside the assessment radius the base priority stands.
    let far = h
        .lifecycle
        .create("r2", GeoPoint::new(lat + 3.0, lon), IncidentCategory::Accident, "fender bender")
        .await
        .unwrap();
    assert_eq!(far.incident.priority, Priority::High);
}

#[tokio::test]
async fn test_low_magnitude_events_stay_out_of_the_pipeline() {
    let h = DispatchHarness::new();
    let (scheduler, binding) = bind(
        &h,
        ScriptedFeed::new("seismic", vec![Ok(vec![raw_quake("ZA-GP", "M3.2 - Gauteng", 3.2)])]),
    );

    let (conn, mut rx) = h.router.register().await;
    h.router.subscribe(conn, &Topic::Agents).await;

    scheduler.poll_feed_once(&binding).await;

    assert!(rx.try_recv().is_err());
    assert_eq!(scheduler.live_event_count().await, 0);
}
