use anyhow::{Context, Result, bail};
use serde::Deserialize;
use spatia_base::ManipulationConfig;
use spatia_geometry::{Aabb, Point, Quat, Transform, Vec3};
use spatia_gesture::{Manipulator, PlaneAnchor, PlaneClassification};
use spatia_scene::{NodeId, SceneGraph};
use std::collections::HashMap;
use std::path::Path;

fn zero() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

fn unit() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn identity() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

#[derive(Debug, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default = "zero")]
    pub translation: [f32; 3],
    /// `[x, y, z, w]`.
    #[serde(default = "identity")]
    pub rotation: [f32; 4],
    #[serde(default = "unit")]
    pub scale: [f32; 3],
    /// Full size of a box centered on the node origin.
    #[serde(default)]
    pub bounds: Option<[f32; 3]>,
    #[serde(default)]
    pub tracked: bool,
}

#[derive(Debug, Deserialize)]
pub struct PlaneSpec {
    pub id: String,
    pub classification: PlaneClassification,
    #[serde(default = "zero")]
    pub translation: [f32; 3],
    #[serde(default = "identity")]
    pub rotation: [f32; 4],
    pub extent: [f32; 3],
    #[serde(default)]
    pub visual: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub planes: Vec<PlaneSpec>,
    #[serde(default)]
    pub indicator: Option<String>,
}

pub fn quat(value: [f32; 4]) -> Quat {
    let [x, y, z, w] = value;
    Quat::new(w, x, y, z)
}

fn transform(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Transform {
    Transform::from_translation(Vec3::from(translation))
        .with_rotation(quat(rotation))
        .with_scale(Vec3::from(scale))
}

impl SceneDescription {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scene file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parse scene file {}", path.display()))
    }

    /// Builds the scene graph, registers tracked nodes, and installs planes
    /// and the placement indicator.
    pub fn build(&self, config: ManipulationConfig) -> Result<Manipulator> {
        let mut scene = SceneGraph::new();
        let mut by_name: HashMap<&str, NodeId> = HashMap::new();

        for entry in &self.nodes {
            if by_name.contains_key(entry.name.as_str()) {
                bail!("duplicate node name {:?}", entry.name);
            }
            let local = transform(entry.translation, entry.rotation, entry.scale);
            let id = match &entry.parent {
                Some(parent) => {
                    let Some(parent_id) = by_name.get(parent.as_str()) else {
                        bail!("node {:?} names unknown parent {parent:?}", entry.name);
                    };
                    scene.spawn_child(*parent_id, entry.name.as_str(), local)?
                }
                None => scene.spawn(entry.name.as_str(), local),
            };
            if let Some(size) = entry.bounds {
                let bounds = Aabb::from_center_size(Point::new(0.0, 0.0, 0.0), Vec3::from(size));
                scene.set_bounds(id, Some(bounds))?;
            }
            by_name.insert(entry.name.as_str(), id);
        }

        let mut manipulator = Manipulator::with_scene(scene, config)?;
        for entry in self.nodes.iter().filter(|entry| entry.tracked) {
            manipulator.register(by_name[entry.name.as_str()], entry.name.as_str());
        }

        for entry in &self.planes {
            let mut plane = PlaneAnchor::new(
                entry.id.as_str(),
                entry.classification,
                transform(entry.translation, entry.rotation, unit()),
                Vec3::from(entry.extent),
            );
            if let Some(visual) = &entry.visual {
                let Some(node) = by_name.get(visual.as_str()) else {
                    bail!("plane {:?} names unknown visual node {visual:?}", entry.id);
                };
                plane = plane.with_visual(*node);
            }
            manipulator.add_plane(plane);
        }

        if let Some(indicator) = &self.indicator {
            let Some(node) = by_name.get(indicator.as_str()) else {
                bail!("unknown placement indicator node {indicator:?}");
            };
            manipulator.set_placement_indicator(Some(*node));
        }
        Ok(manipulator)
    }
}
