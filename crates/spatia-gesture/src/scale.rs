use spatia_base::ManipulationConfig;
use spatia_geometry::{Transform, Vec3};
use spatia_registry::EntityRegistry;
use spatia_scene::{NodeId, SceneGraph};
use tracing::{debug, trace, warn};

use crate::event::{EventSink, GestureEvent, GestureEventKind};
use crate::sample::ScaleSample;

#[derive(Clone, Debug)]
struct ScaleSession {
    target: String,
    node: NodeId,
    initial_transform: Transform,
}

#[derive(Clone, Debug, Default)]
pub struct ScaleGesture {
    session: Option<ScaleSession>,
}

fn clamp_axis(value: f32, config: &ManipulationConfig) -> f32 {
    value.max(config.min_scale).min(config.max_scale)
}

impl ScaleGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn target(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.target.as_str())
    }

    /// Scales the target to its gesture-start scale times the magnification,
    /// clamping each axis independently.
    pub fn update(
        &mut self,
        scene: &mut SceneGraph,
        registry: &EntityRegistry,
        config: &ManipulationConfig,
        sample: &ScaleSample,
        sink: &mut dyn EventSink,
    ) {
        if self.session.is_none() {
            let Some(object) = registry.resolve(scene, sample.hit) else {
                return;
            };
            let Some(initial_transform) = scene.transform(object.node) else {
                return;
            };
            debug!(name = %object.name, "scale session started");
            self.session = Some(ScaleSession {
                target: object.name.clone(),
                node: object.node,
                initial_transform,
            });
        }
        let Some(session) = self.session.as_ref() else {
            return;
        };

        let Some(mut transform) = scene.transform(session.node) else {
            warn!(name = %session.target, "scale target left the scene; dropping session");
            self.session = None;
            return;
        };
        let candidate = session.initial_transform.scale * sample.magnification;
        transform.scale = Vec3::new(
            clamp_axis(candidate.x, config),
            clamp_axis(candidate.y, config),
            clamp_axis(candidate.z, config),
        );
        if let Err(err) = scene.set_transform(session.node, transform) {
            warn!(%err, "scale target left the scene; dropping session");
            self.session = None;
            return;
        }
        trace!(name = %session.target, magnification = sample.magnification, "scale sample applied");

        sink.on_transform_changed(&session.target, &transform);
        sink.on_gesture_event(&GestureEvent {
            object_name: session.target.clone(),
            transform,
            initial_transform: Some(session.initial_transform),
            kind: GestureEventKind::Scale {
                magnification: sample.magnification,
            },
        });
    }

    /// No-op when no session is active.
    pub fn end(&mut self, scene: &SceneGraph, sink: &mut dyn EventSink) {
        let Some(session) = self.session.take() else {
            trace!("scale end without an active session");
            return;
        };
        if let Some(transform) = scene.transform(session.node) {
            sink.on_gesture_event(&GestureEvent {
                object_name: session.target.clone(),
                transform,
                initial_transform: Some(session.initial_transform),
                kind: GestureEventKind::GestureEnded,
            });
        }
        debug!(name = %session.target, "scale session ended");
    }
}
