use trustgate::{
    ConflictKind, EntityRef, Error, TrustEngine, VoteDirection,
};

fn engine_with_car() -> (TrustEngine, EntityRef) {
    let engine = TrustEngine::builder().build().unwrap();
    let car = EntityRef::car(1);
    engine.directory().add(car, 100);
    (engine, car)
}

#[test]
fn summary_identities_hold_for_any_mix() {
    let (engine, car) = engine_with_car();

    for user in 1..=7 {
        engine.upsert_vote(car, user, VoteDirection::Upvote).unwrap();
    }
    for user in 8..=10 {
        engine
            .upsert_vote(car, user, VoteDirection::Downvote)
            .unwrap();
    }

    let summary = engine.vote_summary(car).unwrap();
    assert_eq!(summary.upvotes + summary.downvotes, summary.total);
    assert_eq!(
        summary.score,
        summary.upvotes as i64 - summary.downvotes as i64
    );
    assert_eq!(summary.upvotes, 7);
    assert_eq!(summary.downvotes, 3);
}

#[test]
fn double_vote_never_produces_two_rows() {
    let (engine, car) = engine_with_car();

    engine.upsert_vote(car, 5, VoteDirection::Upvote).unwrap();
    let second = engine.upsert_vote(car, 5, VoteDirection::Downvote).unwrap();

    assert_eq!(second.direction, VoteDirection::Downvote);

    let summary = engine.vote_summary(car).unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.downvotes, 1);
    assert_eq!(summary.upvotes, 0);

    let stored = engine.user_vote(car, 5).unwrap();
    assert_eq!(stored.direction, VoteDirection::Downvote);
}

#[test]
fn revote_same_direction_is_not_an_error() {
    let (engine, car) = engine_with_car();

    let first = engine.upsert_vote(car, 5, VoteDirection::Upvote).unwrap();
    let second = engine.upsert_vote(car, 5, VoteDirection::Upvote).unwrap();

    // A no-op direction still counts as an update.
    assert_eq!(second.direction, first.direction);
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(engine.vote_summary(car).unwrap().total, 1);
}

#[test]
fn remove_vote_reports_existence() {
    let (engine, car) = engine_with_car();

    assert!(!engine.remove_vote(car, 5));

    engine.upsert_vote(car, 5, VoteDirection::Upvote).unwrap();
    assert!(engine.remove_vote(car, 5));
    assert!(!engine.remove_vote(car, 5));
    assert!(engine.user_vote(car, 5).is_none());
}

#[test]
fn voting_on_missing_entity_is_not_found() {
    let engine = TrustEngine::builder().build().unwrap();
    let ghost = EntityRef::part(999);

    assert_eq!(
        engine
            .upsert_vote(ghost, 1, VoteDirection::Upvote)
            .unwrap_err(),
        Error::NotFound
    );
    assert_eq!(engine.vote_summary(ghost).unwrap_err(), Error::NotFound);
}

#[test]
fn percentages_sum_to_hundred_or_zero() {
    let (engine, car) = engine_with_car();

    // No votes at all: both percentages are 0.
    let empty = engine.vote_summary(car).unwrap();
    assert_eq!(empty.upvote_pct, 0.0);
    assert_eq!(empty.downvote_pct, 0.0);

    // Odd splits still sum to 100.0 within rounding.
    engine.upsert_vote(car, 1, VoteDirection::Upvote).unwrap();
    engine.upsert_vote(car, 2, VoteDirection::Upvote).unwrap();
    engine.upsert_vote(car, 3, VoteDirection::Downvote).unwrap();

    let summary = engine.vote_summary(car).unwrap();
    assert!((summary.upvote_pct + summary.downvote_pct - 100.0).abs() <= 0.1);
    assert_eq!(summary.upvote_pct, 66.7);
    assert_eq!(summary.downvote_pct, 33.3);
}

#[test]
fn self_vote_policy_is_opt_in() {
    let permissive = TrustEngine::builder().build().unwrap();
    let car = EntityRef::car(1);
    permissive.directory().add(car, 100);
    assert!(permissive
        .upsert_vote(car, 100, VoteDirection::Upvote)
        .is_ok());

    let strict = TrustEngine::builder()
        .with_reject_self_votes(true)
        .build()
        .unwrap();
    strict.directory().add(car, 100);
    assert_eq!(
        strict
            .upsert_vote(car, 100, VoteDirection::Upvote)
            .unwrap_err(),
        Error::Conflict(ConflictKind::SelfVote)
    );
}

#[test]
fn votes_are_scoped_per_entity_kind() {
    let engine = TrustEngine::builder().build().unwrap();
    let car = EntityRef::car(7);
    let part = EntityRef::part(7);
    engine.directory().add(car, 100);
    engine.directory().add_unowned(part);

    engine.upsert_vote(car, 1, VoteDirection::Upvote).unwrap();
    engine.upsert_vote(part, 1, VoteDirection::Downvote).unwrap();

    // Same id, different kinds: two independent records.
    assert_eq!(engine.vote_summary(car).unwrap().upvotes, 1);
    assert_eq!(engine.vote_summary(part).unwrap().downvotes, 1);
}

#[test]
fn concurrent_same_user_votes_resolve_to_one_record() {
    use std::sync::Arc;
    use std::thread;

    let (engine, car) = engine_with_car();
    let engine = Arc::new(engine);
    let mut handles = vec![];

    for i in 0..10 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            let direction = if i % 2 == 0 {
                VoteDirection::Upvote
            } else {
                VoteDirection::Downvote
            };
            for _ in 0..25 {
                engine.upsert_vote(car, 42, direction).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let summary = engine.vote_summary(car).unwrap();
    assert_eq!(summary.total, 1, "same-user upserts must stay one row");
}

#[test]
fn concurrent_distinct_users_do_not_interfere() {
    use std::sync::Arc;
    use std::thread;

    let (engine, car) = engine_with_car();
    let engine = Arc::new(engine);
    let mut handles = vec![];

    for user in 0..20u64 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            engine.upsert_vote(car, user, VoteDirection::Upvote).unwrap();
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.vote_summary(car).unwrap().upvotes, 20);
}
