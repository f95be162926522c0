use crate::{Config, Scene, SceneError, SolveReport, TextualError};

use super::{
    Label, Problem,
    instruction::{Distance, Drag, Fix, Instruction},
};

/// Result of running a problem's drags.
#[derive(Debug)]
pub struct Outcome {
    /// The scene after the last drag.
    pub scene: Scene,
    /// One report per drag, in order. If the problem had no drags,
    /// a single report from stabilizing the scene as declared.
    pub reports: Vec<SolveReport>,
}

impl Outcome {
    /// Where did this point end up?
    pub fn get_point(&self, label: &str) -> Option<crate::datatypes::Position> {
        self.scene.point(label).map(|p| p.position())
    }

    /// The last report, i.e. the scene's final state.
    pub fn last_report(&self) -> Option<&SolveReport> {
        self.reports.last()
    }
}

/// Names that don't resolve become [`TextualError::UndefinedPoint`].
fn undefined(label: &Label) -> impl FnOnce(SceneError) -> TextualError + '_ {
    move |e| match e {
        SceneError::NotFound { .. } => TextualError::UndefinedPoint {
            label: label.to_string(),
        },
        other => TextualError::Scene(other),
    }
}

impl Problem {
    /// Build the scene this problem declares, without performing any drags.
    pub fn to_scene(&self, config: Config) -> Result<Scene, TextualError> {
        let mut scene = Scene::new(config)?;
        for point in &self.points {
            scene.add_point(point.label.as_str(), point.at.x, point.at.y)?;
        }
        for instruction in &self.instructions {
            match instruction {
                Instruction::Fix(Fix { point, at: None }) => {
                    scene.pin(point.as_str()).map_err(undefined(point))?;
                }
                Instruction::Fix(Fix {
                    point,
                    at: Some(at),
                }) => {
                    scene
                        .pin_at(point.as_str(), at.x, at.y)
                        .map_err(undefined(point))?;
                }
                Instruction::Distance(Distance {
                    label: (p0, p1),
                    length,
                }) => {
                    // Resolve both names first, so the error names the undefined one.
                    scene.id_of(p0.as_str()).map_err(undefined(p0))?;
                    scene.id_of(p1.as_str()).map_err(undefined(p1))?;
                    match length {
                        Some(length) => {
                            scene.link_with_length(p0.as_str(), p1.as_str(), *length)?;
                        }
                        None => {
                            scene.link(p0.as_str(), p1.as_str())?;
                        }
                    }
                }
            }
        }
        Ok(scene)
    }

    /// Build the scene, then perform every drag in order.
    pub fn run(&self, config: Config) -> Result<Outcome, TextualError> {
        let mut scene = self.to_scene(config)?;
        let mut reports = Vec::with_capacity(self.drags.len().max(1));
        for drag in &self.drags {
            let report = match drag {
                Drag::By { point, dx, dy } => scene.displace(point.as_str(), *dx, *dy),
                Drag::To { point, x, y } => scene.drag_to(point.as_str(), *x, *y),
            }
            .map_err(undefined(drag.point()))?;
            reports.push(report);
        }
        if reports.is_empty() {
            reports.push(scene.solve());
        }
        Ok(Outcome { scene, reports })
    }
}
