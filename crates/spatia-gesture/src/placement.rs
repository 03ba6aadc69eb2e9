use cgmath::{EuclideanSpace, Transform as _};
use serde::{Deserialize, Serialize};
use spatia_base::ManipulationConfig;
use spatia_geometry::{Mat4, Point, Transform, Vec3, point_in_plane_extent};
use spatia_scene::{NodeId, SceneGraph};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaneClassification {
    Floor,
    Table,
    Wall,
    Ceiling,
    Seat,
    Window,
    Door,
    Unknown,
}

/// A detected surface that dragged objects may snap onto.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneAnchor {
    pub id: String,
    pub classification: PlaneClassification,
    /// World pose of the plane; its local XZ rectangle is the surface.
    pub transform: Transform,
    /// Full size of the surface rectangle (`x` by `z`).
    pub extent: Vec3,
    /// Scene node realizing the plane, if any. When live, its world frame
    /// takes precedence over `transform`.
    pub visual: Option<NodeId>,
}

impl PlaneAnchor {
    pub fn new(
        id: impl Into<String>,
        classification: PlaneClassification,
        transform: Transform,
        extent: Vec3,
    ) -> Self {
        Self {
            id: id.into(),
            classification,
            transform,
            extent,
            visual: None,
        }
    }

    pub fn with_visual(mut self, visual: NodeId) -> Self {
        self.visual = Some(visual);
        self
    }

    fn frame(&self, scene: &SceneGraph) -> Mat4 {
        self.visual
            .and_then(|node| scene.world_matrix(node))
            .unwrap_or_else(|| self.transform.matrix())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacementCandidate {
    pub plane_id: String,
    pub classification: PlaneClassification,
    pub clearance: f32,
    pub surface_y: f32,
    /// Where the object's origin would rest on the plane.
    pub position: Point,
    pub indicator_scale: f32,
}

/// Indicator scale for a given clearance, or `None` when the object is too
/// far above the surface to be placed.
pub fn snap_decision(clearance: f32, config: &ManipulationConfig) -> Option<f32> {
    if clearance >= config.snap_clearance {
        return None;
    }
    if clearance <= 0.0 {
        return Some(config.indicator_max_scale);
    }
    let span = config.indicator_max_scale - config.indicator_min_scale;
    Some(config.indicator_max_scale - span * (clearance / config.snap_clearance))
}

#[derive(Clone, Debug, Default)]
pub struct PlacementState {
    placeable: bool,
    placement_position: Option<Point>,
    planes: BTreeMap<String, PlaneAnchor>,
    indicator: Option<NodeId>,
}

impl PlacementState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_placeable(&self) -> bool {
        self.placeable
    }

    pub fn placement_position(&self) -> Option<Point> {
        self.placement_position
    }

    pub fn upsert_plane(&mut self, plane: PlaneAnchor) {
        self.planes.insert(plane.id.clone(), plane);
    }

    pub fn remove_plane(&mut self, id: &str) -> Option<PlaneAnchor> {
        self.planes.remove(id)
    }

    pub fn plane(&self, id: &str) -> Option<&PlaneAnchor> {
        self.planes.get(id)
    }

    pub fn planes(&self) -> impl Iterator<Item = &PlaneAnchor> {
        self.planes.values()
    }

    pub fn indicator(&self) -> Option<NodeId> {
        self.indicator
    }

    pub fn set_indicator(&mut self, indicator: Option<NodeId>) {
        self.indicator = indicator;
    }

    /// Checks every floor and table plane against `object`'s current world
    /// position and updates placeability and the indicator. A qualifying
    /// table always wins over any floor; within a class the surface nearest
    /// the object's bottom wins.
    pub fn evaluate(
        &mut self,
        scene: &mut SceneGraph,
        object: NodeId,
        config: &ManipulationConfig,
    ) -> Option<PlacementCandidate> {
        let chosen = match scene.world_position(object) {
            Some(position) => self.best_candidate(scene, object, position, config),
            None => None,
        };

        match &chosen {
            Some(candidate) => {
                trace!(
                    plane = %candidate.plane_id,
                    clearance = candidate.clearance,
                    "object is placeable"
                );
                self.placeable = true;
                self.placement_position = Some(candidate.position);
                let at = Point::new(
                    candidate.position.x,
                    candidate.surface_y,
                    candidate.position.z,
                );
                self.show_indicator(scene, at, candidate.indicator_scale);
            }
            None => self.clear(scene),
        }
        chosen
    }

    fn best_candidate(
        &self,
        scene: &SceneGraph,
        object: NodeId,
        position: Point,
        config: &ManipulationConfig,
    ) -> Option<PlacementCandidate> {
        let half_height = scene
            .visual_bounds(object)
            .map(|bounds| bounds.size().y * 0.5)
            .unwrap_or(0.0);
        let bottom = position.y - half_height;

        let mut table: Option<PlacementCandidate> = None;
        let mut floor: Option<PlacementCandidate> = None;
        for plane in self.planes.values() {
            let slot = match plane.classification {
                PlaneClassification::Table => &mut table,
                PlaneClassification::Floor => &mut floor,
                _ => continue,
            };

            let frame = plane.frame(scene);
            if !point_in_plane_extent(position, &frame, plane.extent) {
                continue;
            }
            let surface_y = frame.transform_point(Point::origin()).y;
            let clearance = bottom - surface_y;
            let Some(indicator_scale) = snap_decision(clearance, config) else {
                continue;
            };

            let nearer = slot
                .as_ref()
                .is_none_or(|best| clearance.abs() < best.clearance.abs());
            if nearer {
                *slot = Some(PlacementCandidate {
                    plane_id: plane.id.clone(),
                    classification: plane.classification,
                    clearance,
                    surface_y,
                    position: Point::new(position.x, surface_y + half_height, position.z),
                    indicator_scale,
                });
            }
        }
        table.or(floor)
    }

    fn show_indicator(&self, scene: &mut SceneGraph, at: Point, scale: f32) {
        let Some(indicator) = self.indicator else {
            return;
        };
        if let Err(err) = place_indicator(scene, indicator, at, scale) {
            warn!(%err, "placement indicator unavailable");
        }
    }

    /// Marks the state not placeable and hides the indicator.
    pub fn clear(&mut self, scene: &mut SceneGraph) {
        self.placeable = false;
        self.placement_position = None;
        if let Some(indicator) = self.indicator {
            if scene.set_enabled(indicator, false).is_err() {
                debug!(%indicator, "placement indicator no longer in scene");
            }
        }
    }
}

fn place_indicator(
    scene: &mut SceneGraph,
    indicator: NodeId,
    at: Point,
    scale: f32,
) -> spatia_scene::Result<()> {
    scene.set_world_position(indicator, at)?;
    let mut transform = scene
        .transform(indicator)
        .ok_or(spatia_scene::Error::UnknownNode(indicator))?;
    transform.scale = Vec3::new(scale, scale, scale);
    scene.set_transform(indicator, transform)?;
    scene.set_enabled(indicator, true)
}
