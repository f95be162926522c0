use proptest::prelude::*;

use crate::{
    Config, Scene, Strategy,
    datatypes::{PointState, Position, SceneState},
};

fn strategy_choice() -> impl proptest::strategy::Strategy<Value = Strategy> {
    prop_oneof![
        Just(Strategy::Relaxation),
        Just(Strategy::GaussNewton),
        Just(Strategy::Penalty),
    ]
}

proptest! {
    #[test]
    fn single_link_drag_converges(
        x0 in -1000.0..1000.0f64,
        y0 in -1000.0..1000.0f64,
        x1 in -1000.0..1000.0f64,
        y1 in -1000.0..1000.0f64,
        dx in -500.0..500.0f64,
        dy in -500.0..500.0f64,
    ) {
        // Keep the link long enough that drags can't land the ends on top of each other.
        prop_assume!((x0 - x1).hypot(y0 - y1) > 1.0);
        prop_assume!((x0 - x1 - dx).hypot(y0 - y1 - dy) > 1.0);

        let mut scene = Scene::default();
        scene.add_point("anchor", x0, y0).unwrap();
        scene.add_point("free", x1, y1).unwrap();
        scene.link("anchor", "free").unwrap();
        scene.pin("anchor").unwrap();
        let length = scene.constraints()[0];

        let report = scene.displace("free", dx, dy).unwrap();

        // Invariant: one pinned link can always be satisfied.
        prop_assert!(report.converged(), "{report:?}");
        // Invariant: the pin holds.
        prop_assert_eq!(report.position("anchor").unwrap(), Position { x: x0, y: y0 });
        // Invariant: the link keeps its rest length.
        prop_assert!(length.is_satisfied(scene.points(), Config::default().tolerance));
    }

    #[test]
    fn random_scenes_stay_finite(
        coords in prop::collection::vec((-100.0..100.0f64, -100.0..100.0f64), 2..6),
        links in prop::collection::vec((0usize..6, 0usize..6, 0.0..50.0f64), 0..8),
        pins in prop::collection::vec(0usize..6, 0..3),
        dragged in 0usize..6,
        dx in -50.0..50.0f64,
        dy in -50.0..50.0f64,
        strategy in strategy_choice(),
    ) {
        let n = coords.len();
        let config = Config::default().with_strategy(strategy).with_max_iterations(200);
        let mut scene = Scene::new(config).unwrap();
        for (i, (x, y)) in coords.iter().enumerate() {
            scene.add_point(&format!("p{i}"), *x, *y).unwrap();
        }
        for (a, b, length) in links {
            scene
                .link_with_length(&format!("p{}", a % n), &format!("p{}", b % n), length)
                .unwrap();
        }
        for p in &pins {
            scene.pin(&format!("p{}", p % n)).unwrap();
        }

        // Arbitrary scenes are often contradictory, so don't expect convergence.
        let report = scene.displace(&format!("p{}", dragged % n), dx, dy).unwrap();

        // Invariant: coordinates stay finite.
        prop_assert!(report.positions().values().all(Position::is_finite), "{report:?}");
        // Invariant: pins hold after every solve, converged or not.
        for p in &pins {
            let name = format!("p{}", p % n);
            let pinned_at = Position { x: coords[p % n].0, y: coords[p % n].1 };
            let position = report.position(&name).unwrap();
            prop_assert!(
                position.euclidean_distance(pinned_at) <= config.tolerance,
                "{name} drifted to {position}"
            );
        }
    }

    #[test]
    fn scene_state_round_trips_through_json(
        coords in prop::collection::vec((-1e6..1e6f64, -1e6..1e6f64), 0..5),
    ) {
        let state = SceneState {
            points: coords
                .iter()
                .enumerate()
                .map(|(i, (x, y))| PointState::new(format!("p{i}"), *x, *y))
                .collect(),
            constraints: Vec::new(),
        };
        let json = serde_json::to_string(&state).unwrap();
        let parsed: SceneState = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed, state);
    }
}
