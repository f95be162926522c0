#![no_main]

use arbitrary::Arbitrary;
use linkage::{Config, Strategy, datatypes::SceneState};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|setup: Setup| {
    let config = Config::default()
        .with_strategy(setup.strategy)
        .with_max_iterations(200);
    let Ok(report) = linkage::solve(&setup.state, &setup.point, setup.dx, setup.dy, config) else {
        return;
    };
    // Anything the scene accepted must come back finite.
    for (name, position) in report.positions() {
        assert!(position.is_finite(), "{name} ended at {position}");
    }
});

#[derive(Debug, Arbitrary)]
struct Setup {
    state: SceneState,
    point: String,
    dx: f64,
    dy: f64,
    strategy: Strategy,
}
