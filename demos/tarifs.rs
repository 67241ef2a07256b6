use rulebook::{Context, Engine};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let ns = "ch.maxant.someapp.tarifs";
    let engine = Engine::builder()
        .rule(ns, "YouthTarif", |r| {
            r.when("input.person.age < 26").outcome("YT2011").priority(3)
        })
        .rule(ns, "SeniorTarif", |r| {
            r.when("input.person.age > 59").outcome("ST2011").priority(3)
        })
        .rule(ns, "DefaultTarif", |r| {
            r.when("!#YouthTarif && !#SeniorTarif")
                .outcome("DT2011")
                .priority(3)
        })
        .rule(ns, "LoyaltyTarif", |r| {
            r.when("#DefaultTarif && input.account.ageInMonths > 24")
                .outcome("LT2011")
                .priority(4)
        })
        .build()
        .expect("failed to build tarif rules");

    for rule in engine.rules() {
        println!("{rule}");
    }
    println!();

    for (age, months) in [(20, 5), (35, 5), (35, 35), (65, 35)] {
        let input = Context::new()
            .set("person.age", age)
            .set("account.ageInMonths", months);
        let tarif = engine
            .best_outcome(&input, None)
            .expect("every customer gets a tarif");
        println!("age {age}, account {months} months -> {tarif:?}");
    }
}
