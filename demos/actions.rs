use rulebook::{ActionError, Context, Engine, action};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let ns = "ch.maxant.produkte";
    let engine = Engine::builder()
        .subrule(ns, "family", |r| {
            r.when("input.p1.name == \"ant\" && input.p2.name == \"clare\"")
        })
        .rule(ns, "R1", |r| {
            r.when("#family")
                .outcome("familyPrice")
                .priority(1)
                .description("special price for the family")
        })
        .rule(ns, "R2", |r| r.when("true").outcome("standardPrice"))
        .build()
        .expect("failed to build product rules");

    let actions = [
        action("familyPrice", |_: &Context| -> Result<f64, ActionError> { Ok(50.0) }),
        action("standardPrice", |_: &Context| -> Result<f64, ActionError> { Ok(101.0) }),
    ];

    let family = Context::new()
        .set("p1.name", "ant")
        .set("p2.name", "clare");
    let stranger = Context::new().set("p1.name", "bob");

    for (who, input) in [("family", &family), ("stranger", &stranger)] {
        match engine.execute_best_action(input, &actions, None) {
            Ok(price) => println!("{who}: {price}"),
            Err(err) => println!("{who}: {err}"),
        }
    }

    let incomplete = [action("standardPrice", |_: &Context| -> Result<f64, ActionError> {
        Ok(101.0)
    })];
    if let Err(err) = engine.execute_best_action(&family, &incomplete, None) {
        println!("misconfigured: {err}");
    }
}
