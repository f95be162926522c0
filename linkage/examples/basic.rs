//! A basic example for how to use the constraint solver.
use linkage::{Config, Scene};

fn main() {
    // Define the geometry.
    // Every point starts somewhere, and the solver keeps them consistent
    // as the user drags them around.
    let mut scene = Scene::new(Config::default()).unwrap();
    scene.add_point("a", 200.0, 100.0).unwrap();
    scene.add_point("b", 200.0, 300.0).unwrap();
    scene.add_point("c", 500.0, 400.0).unwrap();
    scene.add_point("d", 500.0, 100.0).unwrap();

    // Links keep the length their points start at, pins keep points where they are.
    scene.link("a", "b").unwrap();
    scene.link("c", "d").unwrap();
    scene.link("b", "c").unwrap();
    scene.pin("a").unwrap();
    scene.pin("b").unwrap();

    // Drag C to the right, and let the rest of the linkage follow.
    match scene.displace("c", 50.0, 0.0) {
        Ok(report) => {
            println!(
                "converged: {} after {} iterations",
                report.converged(),
                report.iterations()
            );
            for (name, position) in report.positions() {
                println!("{name} = {position}");
            }
        }
        Err(e) => {
            eprintln!("could not drag C: {e}");
        }
    }
}
