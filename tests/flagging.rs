use std::sync::Arc;
use std::time::{Duration, Instant};

use trustgate::infrastructure::mocks::MockClock;
use trustgate::{
    EntityKind, EntityRef, Error, FlagCriteria, ReportReason, ReportStatus, TrustEngine,
    VoteDirection,
};

fn engine_with_clock() -> (TrustEngine, Arc<MockClock>) {
    let clock = Arc::new(MockClock::new(Instant::now()));
    let engine = TrustEngine::builder()
        .with_clock(clock.clone())
        .build()
        .unwrap();
    (engine, clock)
}

fn seed_cars(engine: &TrustEngine, ids: &[u64]) {
    for &id in ids {
        engine.directory().add(EntityRef::car(id), 9000 + id);
    }
}

fn downvote_n(engine: &TrustEngine, entity: EntityRef, n: u64) {
    for user in 0..n {
        engine
            .upsert_vote(entity, 1000 + user, VoteDirection::Downvote)
            .unwrap();
    }
}

#[test]
fn downvote_threshold_is_inclusive() {
    let (engine, _) = engine_with_clock();
    seed_cars(&engine, &[1, 2, 3]);

    downvote_n(&engine, EntityRef::car(1), 6);
    downvote_n(&engine, EntityRef::car(2), 5);
    downvote_n(&engine, EntityRef::car(3), 4);

    let criteria = FlagCriteria::new(30, 5).unwrap();
    let flagged = engine.flagged_entities(EntityKind::Car, criteria);

    let ids: Vec<u64> = flagged.iter().map(|f| f.entity_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn six_downvotes_qualify_four_do_not() {
    let (engine, _) = engine_with_clock();
    seed_cars(&engine, &[1, 2]);

    downvote_n(&engine, EntityRef::car(1), 6);
    downvote_n(&engine, EntityRef::car(2), 4);

    let criteria = FlagCriteria::new(30, 5).unwrap();
    let flagged = engine.flagged_entities(EntityKind::Car, criteria);

    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].entity_id, 1);
    assert_eq!(flagged[0].downvotes, 6);
    assert!(!flagged[0].has_pending_reports);
}

#[test]
fn yesterdays_report_qualifies_a_barely_downvoted_entity() {
    let (engine, clock) = engine_with_clock();
    seed_cars(&engine, &[5]);
    let car = EntityRef::car(5);

    downvote_n(&engine, car, 1);
    engine
        .create_report(car, 42, ReportReason::Spam, None)
        .unwrap();

    // A day passes; the report is now "created yesterday".
    clock.advance(Duration::from_secs(86_400));

    let criteria = FlagCriteria::new(30, 5).unwrap();
    let flagged = engine.flagged_entities(EntityKind::Car, criteria);

    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].entity_id, 5);
    assert_eq!(flagged[0].downvotes, 1);
    assert!(flagged[0].has_pending_reports);
}

#[test]
fn report_outside_lookback_window_does_not_qualify() {
    let (engine, clock) = engine_with_clock();
    seed_cars(&engine, &[5]);
    let car = EntityRef::car(5);

    engine
        .create_report(car, 42, ReportReason::Spam, None)
        .unwrap();

    clock.advance(Duration::from_secs(31 * 86_400));

    let criteria = FlagCriteria::new(30, 5).unwrap();
    assert!(engine
        .flagged_entities(EntityKind::Car, criteria)
        .is_empty());
}

#[test]
fn resolved_reports_still_count_for_recency_but_not_pending() {
    let (engine, clock) = engine_with_clock();
    seed_cars(&engine, &[5]);
    let car = EntityRef::car(5);

    let report = engine
        .create_report(car, 42, ReportReason::Spam, None)
        .unwrap();
    engine
        .update_report_status(report.id, ReportStatus::Resolved, None, 7)
        .unwrap();

    clock.advance(Duration::from_secs(86_400));

    let criteria = FlagCriteria::new(30, 5).unwrap();
    let flagged = engine.flagged_entities(EntityKind::Car, criteria);

    // Recency is about report creation, not review state.
    assert_eq!(flagged.len(), 1);
    assert!(!flagged[0].has_pending_reports);
}

#[test]
fn ordering_is_downvotes_desc_then_id_asc() {
    let (engine, _) = engine_with_clock();
    seed_cars(&engine, &[11, 3, 8]);

    downvote_n(&engine, EntityRef::car(11), 2);
    downvote_n(&engine, EntityRef::car(3), 2);
    downvote_n(&engine, EntityRef::car(8), 6);

    let criteria = FlagCriteria::new(30, 2).unwrap();
    let flagged = engine.flagged_entities(EntityKind::Car, criteria);
    let ids: Vec<u64> = flagged.iter().map(|f| f.entity_id).collect();

    // The 2-2 tie resolves by entity id ascending - a stable but arbitrary
    // secondary order.
    assert_eq!(ids, vec![8, 3, 11]);
}

#[test]
fn all_time_downvotes_qualify_but_recent_figure_is_windowed() {
    let (engine, clock) = engine_with_clock();
    seed_cars(&engine, &[6]);
    let car = EntityRef::car(6);

    downvote_n(&engine, car, 5);
    clock.advance(Duration::from_secs(45 * 86_400));

    for user in 100..102 {
        engine
            .upsert_vote(car, user, VoteDirection::Downvote)
            .unwrap();
    }

    let criteria = FlagCriteria::new(30, 5).unwrap();
    let flagged = engine.flagged_entities(EntityKind::Car, criteria);

    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].downvotes, 7);
    assert_eq!(flagged[0].recent_downvotes, 2);
    assert!((flagged[0].downvote_ratio - 1.0).abs() < f64::EPSILON);
}

#[test]
fn scan_is_scoped_to_one_kind() {
    let (engine, _) = engine_with_clock();
    engine.directory().add(EntityRef::car(1), 100);
    engine.directory().add_unowned(EntityRef::part(1));

    downvote_n(&engine, EntityRef::part(1), 6);

    let criteria = FlagCriteria::new(30, 5).unwrap();
    assert!(engine
        .flagged_entities(EntityKind::Car, criteria)
        .is_empty());
    assert_eq!(
        engine.flagged_entities(EntityKind::Part, criteria).len(),
        1
    );
}

#[test]
fn criteria_bounds_are_enforced() {
    assert!(matches!(
        FlagCriteria::new(0, 5),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        FlagCriteria::new(400, 5),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        FlagCriteria::new(30, 0),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        FlagCriteria::new(30, 500),
        Err(Error::InvalidArgument(_))
    ));
    assert!(FlagCriteria::new(1, 1).is_ok());
    assert!(FlagCriteria::new(365, 100).is_ok());
}

#[test]
fn scan_recomputes_from_scratch_each_call() {
    let (engine, _) = engine_with_clock();
    seed_cars(&engine, &[1]);
    let car = EntityRef::car(1);
    let criteria = FlagCriteria::new(30, 5).unwrap();

    downvote_n(&engine, car, 5);
    assert_eq!(engine.flagged_entities(EntityKind::Car, criteria).len(), 1);

    // Removing votes immediately de-flags the entity: nothing is cached.
    for user in 0..5 {
        engine.remove_vote(car, 1000 + user);
    }
    assert!(engine
        .flagged_entities(EntityKind::Car, criteria)
        .is_empty());
}
