use rulebook::{Context, Engine};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let engine = Engine::builder()
        .rule("v1.products", "A", |r| {
            r.when("input.distance < 100").outcome("productA").priority(1)
        })
        .rule("v1.products", "B", |r| {
            r.when("input.distance > 100").outcome("productB").priority(2)
        })
        .rule("v1.products", "C", |r| {
            r.when("input.distance > 150").outcome("productC").priority(3)
        })
        .rule("v2.products", "D", |r| {
            r.when("input.distance > 100 && input.map[\"travelClass\"] == 1")
                .outcome("productD")
                .priority(4)
        })
        .build()
        .expect("failed to build product rules");

    let ctx = Context::new()
        .set("distance", 151_i64)
        .set("map.travelClass", 1_i64);

    let report = engine
        .matches_detailed(&ctx, Some(r"^v1\."))
        .expect("matching failed");

    println!("{report}");
    println!();
    println!("Matched: {:?}", report.matched().iter().map(|r| r.name()).collect::<Vec<_>>());
    println!("Unmatched: {:?}", report.unmatched().iter().map(|r| r.name()).collect::<Vec<_>>());
    println!("Evaluated: {}", report.evaluated());
    println!("Filtered out: {}", report.filtered_out());
    println!("Duration: {:?}", report.duration());
}
