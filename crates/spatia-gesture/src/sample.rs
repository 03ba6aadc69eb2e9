use serde::{Deserialize, Serialize};
use spatia_geometry::{Point, Quat, Vec3};
use spatia_scene::NodeId;

/// Translation component of a drag sample. `offset` is cumulative since the
/// gesture began, not a per-sample delta.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranslationInput {
    pub location: Point,
    pub offset: Vec3,
}

/// Rotation component of a drag sample, relative to the gesture start.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotationInput {
    pub delta: Quat,
    pub angle: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragRotateSample {
    pub hit: NodeId,
    pub translation: Option<TranslationInput>,
    pub rotation: Option<RotationInput>,
}

impl DragRotateSample {
    pub fn drag(hit: NodeId, location: Point, offset: Vec3) -> Self {
        Self {
            hit,
            translation: Some(TranslationInput { location, offset }),
            rotation: None,
        }
    }

    pub fn rotate(hit: NodeId, delta: Quat, angle: Option<f32>) -> Self {
        Self {
            hit,
            translation: None,
            rotation: Some(RotationInput { delta, angle }),
        }
    }
}

/// Pinch sample; `magnification` is the ratio relative to the gesture start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleSample {
    pub hit: NodeId,
    pub magnification: f32,
}
