use anyhow::{Context, Result, bail};
use cgmath::{Deg, InnerSpace, Rotation3};
use serde::Deserialize;
use spatia_geometry::{Point, Quat, Transform, Vec3};
use spatia_gesture::{DragRotateSample, ManipulationEvent, Manipulator, ScaleSample};
use spatia_scene::NodeId;
use std::path::Path;
use tracing::debug;

fn zero() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

/// One host-side action. Nodes are referenced by scene node name.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Drag {
        hit: String,
        offset: [f32; 3],
        #[serde(default = "zero")]
        location: [f32; 3],
    },
    Rotate {
        hit: String,
        axis: [f32; 3],
        degrees: f32,
    },
    EndDragRotate,
    Scale {
        hit: String,
        magnification: f32,
    },
    EndScale,
    /// Adds a node to the hierarchy after registration.
    Attach {
        name: String,
        parent: String,
        #[serde(default = "zero")]
        translation: [f32; 3],
    },
    Unregister {
        name: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read script file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parse script file {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Runs every step, handing each step's notifications to `emit`.
    pub fn replay<F>(&self, manipulator: &mut Manipulator, mut emit: F) -> Result<()>
    where
        F: FnMut(&[ManipulationEvent]) -> Result<()>,
    {
        for (index, step) in self.steps.iter().enumerate() {
            let mut events = Vec::new();
            apply(manipulator, step, &mut events)
                .with_context(|| format!("script step {index}"))?;
            debug!(step = index, events = events.len(), "script step applied");
            emit(&events)?;
        }
        Ok(())
    }
}

fn node(manipulator: &Manipulator, name: &str) -> Result<NodeId> {
    manipulator
        .scene()
        .find_by_name(name)
        .with_context(|| format!("no scene node named {name:?}"))
}

fn apply(
    manipulator: &mut Manipulator,
    step: &Step,
    events: &mut Vec<ManipulationEvent>,
) -> Result<()> {
    match step {
        Step::Drag {
            hit,
            offset,
            location,
        } => {
            let sample = DragRotateSample::drag(
                node(manipulator, hit)?,
                Point::from(*location),
                Vec3::from(*offset),
            );
            manipulator.drag_rotate_changed(&sample, events);
        }
        Step::Rotate { hit, axis, degrees } => {
            let axis = Vec3::from(*axis);
            if axis.magnitude2() <= f32::EPSILON {
                bail!("rotation axis must be non-zero");
            }
            let delta = Quat::from_axis_angle(axis.normalize(), Deg(*degrees));
            let sample =
                DragRotateSample::rotate(node(manipulator, hit)?, delta, Some(degrees.to_radians()));
            manipulator.drag_rotate_changed(&sample, events);
        }
        Step::EndDragRotate => manipulator.drag_rotate_ended(events),
        Step::Scale { hit, magnification } => {
            let sample = ScaleSample {
                hit: node(manipulator, hit)?,
                magnification: *magnification,
            };
            manipulator.scale_changed(&sample, events);
        }
        Step::EndScale => manipulator.scale_ended(events),
        Step::Attach {
            name,
            parent,
            translation,
        } => {
            let parent = node(manipulator, parent)?;
            manipulator.scene_mut().spawn_child(
                parent,
                name.as_str(),
                Transform::from_translation(Vec3::from(*translation)),
            )?;
        }
        Step::Unregister { name } => {
            if manipulator.unregister(name).is_none() {
                debug!(name = %name, "unregister of unknown object ignored");
            }
        }
    }
    Ok(())
}
