//! Gesture-driven manipulation of tracked objects: drag and rotate, pinch
//! scale, and snapping dragged objects onto detected floor/table planes.

mod drag;
mod event;
mod manipulator;
mod placement;
mod sample;
mod scale;

pub use drag::DragRotateGesture;
pub use event::{EventSink, GestureEvent, GestureEventKind, ManipulationEvent, TraceSink};
pub use manipulator::Manipulator;
pub use placement::{
    PlacementCandidate, PlacementState, PlaneAnchor, PlaneClassification, snap_decision,
};
pub use sample::{DragRotateSample, RotationInput, ScaleSample, TranslationInput};
pub use scale::ScaleGesture;
