use spatia_base::ManipulationConfig;
use spatia_geometry::{Point, Quat, Transform, is_identity};
use spatia_registry::EntityRegistry;
use spatia_scene::{NodeId, SceneGraph};
use tracing::{debug, trace, warn};

use crate::event::{EventSink, GestureEvent, GestureEventKind};
use crate::placement::PlacementState;
use crate::sample::{DragRotateSample, RotationInput, TranslationInput};

#[derive(Clone, Debug)]
struct DragSession {
    target: String,
    node: NodeId,
    initial_transform: Transform,
    drag_start: Option<Point>,
    rotation_base: Option<Quat>,
}

/// Combined drag and rotate stream. The first sample resolves the hit node
/// to a tracked object, which stays the target until the stream ends.
#[derive(Clone, Debug, Default)]
pub struct DragRotateGesture {
    session: Option<DragSession>,
}

impl DragRotateGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn target(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.target.as_str())
    }

    pub fn update(
        &mut self,
        scene: &mut SceneGraph,
        registry: &EntityRegistry,
        placement: &mut PlacementState,
        config: &ManipulationConfig,
        sample: &DragRotateSample,
        sink: &mut dyn EventSink,
    ) {
        if self.session.is_none() {
            self.session = start_session(scene, registry, sample.hit);
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let mut result = match &sample.rotation {
            Some(rotation) => session.rotate(scene, rotation, sink),
            None => Ok(()),
        };
        if let (true, Some(translation)) = (result.is_ok(), &sample.translation) {
            result = session.translate(scene, translation, sink);
            if result.is_ok() {
                placement.evaluate(scene, session.node, config);
            }
        }

        if let Err(err) = result {
            warn!(%err, "drag target left the scene; dropping session");
            self.session = None;
            placement.clear(scene);
        }
    }

    /// Closes the stream. Commits a pending placement. No-op when no session
    /// is active.
    pub fn end(
        &mut self,
        scene: &mut SceneGraph,
        placement: &mut PlacementState,
        sink: &mut dyn EventSink,
    ) {
        let Some(session) = self.session.take() else {
            trace!("drag/rotate end without an active session");
            return;
        };

        if let Some(transform) = scene.transform(session.node) {
            sink.on_gesture_event(&GestureEvent {
                object_name: session.target.clone(),
                transform,
                initial_transform: Some(session.initial_transform),
                kind: GestureEventKind::GestureEnded,
            });

            if let Some(position) = placement
                .placement_position()
                .filter(|_| placement.is_placeable())
            {
                match scene.set_world_position(session.node, position) {
                    Ok(()) => {
                        if let Some(committed) = scene.transform(session.node) {
                            debug!(name = %session.target, "committed placement");
                            sink.on_transform_changed(&session.target, &committed);
                        }
                    }
                    Err(err) => warn!(%err, "could not commit placement"),
                }
            }
        }

        placement.clear(scene);
        debug!(name = %session.target, "drag/rotate session ended");
    }
}

fn start_session(
    scene: &SceneGraph,
    registry: &EntityRegistry,
    hit: NodeId,
) -> Option<DragSession> {
    let object = registry.resolve(scene, hit)?;
    let initial_transform = scene.transform(object.node)?;
    debug!(name = %object.name, "drag/rotate session started");
    Some(DragSession {
        target: object.name.clone(),
        node: object.node,
        initial_transform,
        drag_start: None,
        rotation_base: None,
    })
}

impl DragSession {
    fn current(&self, scene: &SceneGraph) -> spatia_scene::Result<Transform> {
        scene
            .transform(self.node)
            .ok_or(spatia_scene::Error::UnknownNode(self.node))
    }

    fn rotate(
        &mut self,
        scene: &mut SceneGraph,
        input: &RotationInput,
        sink: &mut dyn EventSink,
    ) -> spatia_scene::Result<()> {
        let mut transform = self.current(scene)?;
        let base = *self.rotation_base.get_or_insert(transform.rotation);
        // Identity base takes the delta as-is instead of composing.
        transform.rotation = if is_identity(base) {
            input.delta
        } else {
            base * input.delta
        };
        scene.set_transform(self.node, transform)?;

        sink.on_transform_changed(&self.target, &transform);
        sink.on_gesture_event(&GestureEvent {
            object_name: self.target.clone(),
            transform,
            initial_transform: Some(self.initial_transform),
            kind: GestureEventKind::Rotate { angle: input.angle },
        });
        Ok(())
    }

    /// Places the object at its drag-start position plus the cumulative
    /// offset, so replaying a sample is idempotent.
    fn translate(
        &mut self,
        scene: &mut SceneGraph,
        input: &TranslationInput,
        sink: &mut dyn EventSink,
    ) -> spatia_scene::Result<()> {
        let start = match self.drag_start {
            Some(start) => start,
            None => {
                let start = scene
                    .world_position(self.node)
                    .ok_or(spatia_scene::Error::UnknownNode(self.node))?;
                self.drag_start = Some(start);
                start
            }
        };
        scene.set_world_position(self.node, start + input.offset)?;
        let transform = self.current(scene)?;
        trace!(name = %self.target, location = ?input.location, "drag sample applied");

        sink.on_transform_changed(&self.target, &transform);
        sink.on_gesture_event(&GestureEvent {
            object_name: self.target.clone(),
            transform,
            initial_transform: Some(self.initial_transform),
            kind: GestureEventKind::Drag {
                offset: input.offset,
            },
        });
        Ok(())
    }
}
