use std::sync::Arc;
use std::thread;

use rulebook::{Context, Engine};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let engine = Arc::new(
        Engine::builder()
            .subrule("access", "eligible", |r| r.when("input.user.age >= 18"))
            .subrule("access", "active", |r| r.when("input.user.status == \"active\""))
            .rule("access", "allowed", |r| {
                r.when("#eligible && #active").outcome("ALLOW").priority(1)
            })
            .rule("access", "denied", |r| r.when("true").outcome("DENY"))
            .build()
            .expect("failed to build access rules"),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let ctx = Context::new()
                    .set("user.age", 16_i64 + i64::from(i))
                    .set("user.status", "active");

                let result = engine.best_outcome(&ctx, None);
                println!("Thread {i}: {result:?}");
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
