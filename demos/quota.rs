//! Rate limiting walkthrough: ceilings, quota introspection, eviction.
//!
//! Run with: cargo run --example quota

use trustgate::{ClientKey, RateLimitConfig, TrustEngine};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let engine = TrustEngine::builder()
        .with_rate_limits(RateLimitConfig {
            requests_per_minute: 5,
            requests_per_hour: 100,
        })
        // Bound tracked clients; the longest-idle one is evicted when the
        // bound is hit.
        .with_max_clients(10_000)
        .build()
        .unwrap();

    let client = ClientKey::from("203.0.113.7");

    for attempt in 1..=7 {
        let decision = engine.evaluate(&client);
        match decision.reason() {
            None => println!("request {attempt}: allowed"),
            Some(reason) => println!("request {attempt}: rejected ({reason})"),
        }
    }

    // Introspection is a pure read - it never consumes quota.
    let quota = engine.remaining_quota(&client);
    println!(
        "remaining: {}/min, {}/hour",
        quota.minute_remaining, quota.hour_remaining
    );

    // Proxy-aware resolution: the forwarded-for header names the client,
    // the transport peer is the fallback.
    let peer = "192.0.2.1".parse().unwrap();
    let (resolved, decision) = engine.evaluate_request(Some("198.51.100.23, 10.0.0.1"), peer);
    println!(
        "forwarded request counted against {resolved}: allowed = {}",
        decision.is_allow()
    );

    println!("metrics: {:?}", engine.metrics());
}
