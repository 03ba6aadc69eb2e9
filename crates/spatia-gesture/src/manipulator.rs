use spatia_base::ManipulationConfig;
use spatia_registry::{EntityRegistry, TrackedObject};
use spatia_scene::{NodeId, SceneGraph};

use crate::drag::DragRotateGesture;
use crate::event::{EventSink, TraceSink};
use crate::placement::{PlacementState, PlaneAnchor};
use crate::sample::{DragRotateSample, ScaleSample};
use crate::scale::ScaleGesture;

/// Owns the scene, registry, placement state, and one session slot per
/// gesture kind. Hosts feed it samples serially and receive notifications
/// through the sink passed to each call.
#[derive(Clone, Debug, Default)]
pub struct Manipulator {
    scene: SceneGraph,
    registry: EntityRegistry,
    placement: PlacementState,
    config: ManipulationConfig,
    drag_rotate: DragRotateGesture,
    scale: ScaleGesture,
}

impl Manipulator {
    pub fn new(config: ManipulationConfig) -> spatia_base::Result<Self> {
        Self::with_scene(SceneGraph::new(), config)
    }

    /// Fails with [`spatia_base::Error::InvalidConfig`] when `config` does not
    /// validate.
    pub fn with_scene(
        scene: SceneGraph,
        config: ManipulationConfig,
    ) -> spatia_base::Result<Self> {
        config.validate()?;
        Ok(Self {
            scene,
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &ManipulationConfig {
        &self.config
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn placement(&self) -> &PlacementState {
        &self.placement
    }

    pub fn register(&mut self, node: NodeId, name: impl Into<String>) -> &TrackedObject {
        self.registry.register(&self.scene, node, name)
    }

    pub fn unregister(&mut self, name: &str) -> Option<TrackedObject> {
        self.registry.unregister(&self.scene, name)
    }

    pub fn lookup(&self, name: &str) -> Option<&TrackedObject> {
        self.registry.lookup(name)
    }

    pub fn resolve(&self, hit: NodeId) -> Option<&TrackedObject> {
        self.registry.resolve(&self.scene, hit)
    }

    pub fn add_plane(&mut self, plane: PlaneAnchor) {
        self.placement.upsert_plane(plane);
    }

    pub fn remove_plane(&mut self, id: &str) -> Option<PlaneAnchor> {
        self.placement.remove_plane(id)
    }

    /// Uses `indicator` as the placement indicator; it starts hidden.
    pub fn set_placement_indicator(&mut self, indicator: Option<NodeId>) {
        self.placement.set_indicator(indicator);
        self.placement.clear(&mut self.scene);
    }

    pub fn is_drag_rotate_active(&self) -> bool {
        self.drag_rotate.is_active()
    }

    pub fn is_scale_active(&self) -> bool {
        self.scale.is_active()
    }

    pub fn drag_rotate_changed(&mut self, sample: &DragRotateSample, sink: &mut dyn EventSink) {
        let mut sink = TraceSink::new(sink, self.config.debug);
        self.drag_rotate.update(
            &mut self.scene,
            &self.registry,
            &mut self.placement,
            &self.config,
            sample,
            &mut sink,
        );
    }

    pub fn drag_rotate_ended(&mut self, sink: &mut dyn EventSink) {
        let mut sink = TraceSink::new(sink, self.config.debug);
        self.drag_rotate
            .end(&mut self.scene, &mut self.placement, &mut sink);
    }

    pub fn scale_changed(&mut self, sample: &ScaleSample, sink: &mut dyn EventSink) {
        let mut sink = TraceSink::new(sink, self.config.debug);
        self.scale.update(
            &mut self.scene,
            &self.registry,
            &self.config,
            sample,
            &mut sink,
        );
    }

    pub fn scale_ended(&mut self, sink: &mut dyn EventSink) {
        let mut sink = TraceSink::new(sink, self.config.debug);
        self.scale.end(&self.scene, &mut sink);
    }
}
