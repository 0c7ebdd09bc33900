//! Basic walkthrough: votes, reports and a flag scan.
//!
//! Run with: cargo run --example basic

use trustgate::{
    EntityKind, EntityRef, FlagCriteria, ReportReason, ReportStatus, TrustEngine, VoteDirection,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let engine = TrustEngine::builder().build().unwrap();

    // Seed a few entities. In production an adapter over the application's
    // database answers these lookups instead.
    let car = EntityRef::car(17);
    let build = EntityRef::build_list(4);
    engine.directory().add(car, 100);
    engine.directory().add(build, 200);

    // Community voting: one vote per user per entity, re-votes overwrite.
    engine.upsert_vote(car, 1, VoteDirection::Upvote).unwrap();
    engine.upsert_vote(car, 2, VoteDirection::Downvote).unwrap();
    engine.upsert_vote(car, 2, VoteDirection::Upvote).unwrap();

    let summary = engine.vote_summary(car).unwrap();
    println!(
        "car/17: {} up / {} down (score {}, {}% positive)",
        summary.upvotes, summary.downvotes, summary.score, summary.upvote_pct
    );

    // Heavy downvoting plus a report pushes the build list into the
    // moderation queue.
    for user in 10..16 {
        engine
            .upsert_vote(build, user, VoteDirection::Downvote)
            .unwrap();
    }
    let report = engine
        .create_report(
            build,
            10,
            ReportReason::Inaccurate,
            Some("dyno numbers are fabricated".to_string()),
        )
        .unwrap();

    let criteria = FlagCriteria::new(30, 5).unwrap();
    for flagged in engine.flagged_entities(EntityKind::BuildList, criteria) {
        println!(
            "flagged build_list/{}: {} downvotes, pending reports: {}",
            flagged.entity_id, flagged.downvotes, flagged.has_pending_reports
        );
    }

    // An admin works the queue.
    engine
        .update_report_status(
            report.id,
            ReportStatus::Resolved,
            Some("list unpublished".to_string()),
            999,
        )
        .unwrap();

    println!("metrics: {:?}", engine.metrics());
}
