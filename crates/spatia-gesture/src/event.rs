use serde::Serialize;
use spatia_geometry::{Transform, Vec3, quaternion_to_euler};
use std::sync::mpsc::Sender;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GestureEventKind {
    Drag { offset: Vec3 },
    Rotate { angle: Option<f32> },
    Scale { magnification: f32 },
    GestureEnded,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GestureEvent {
    pub object_name: String,
    pub transform: Transform,
    pub initial_transform: Option<Transform>,
    #[serde(flatten)]
    pub kind: GestureEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ManipulationEvent {
    TransformChanged {
        object_name: String,
        transform: Transform,
    },
    Gesture(GestureEvent),
}

/// Receives notifications synchronously, in emission order. Implementations
/// must not mutate the registry that is being manipulated.
pub trait EventSink {
    fn on_transform_changed(&mut self, object_name: &str, transform: &Transform);
    fn on_gesture_event(&mut self, event: &GestureEvent);
}

impl EventSink for Vec<ManipulationEvent> {
    fn on_transform_changed(&mut self, object_name: &str, transform: &Transform) {
        self.push(ManipulationEvent::TransformChanged {
            object_name: object_name.to_string(),
            transform: *transform,
        });
    }

    fn on_gesture_event(&mut self, event: &GestureEvent) {
        self.push(ManipulationEvent::Gesture(event.clone()));
    }
}

impl EventSink for Sender<ManipulationEvent> {
    fn on_transform_changed(&mut self, object_name: &str, transform: &Transform) {
        // A dropped receiver just means nobody is listening anymore.
        let _ = self.send(ManipulationEvent::TransformChanged {
            object_name: object_name.to_string(),
            transform: *transform,
        });
    }

    fn on_gesture_event(&mut self, event: &GestureEvent) {
        let _ = self.send(ManipulationEvent::Gesture(event.clone()));
    }
}

/// Forwards to `inner`, writing a readable line per notification when enabled.
pub struct TraceSink<'a> {
    inner: &'a mut dyn EventSink,
    enabled: bool,
}

impl<'a> TraceSink<'a> {
    pub fn new(inner: &'a mut dyn EventSink, enabled: bool) -> Self {
        Self { inner, enabled }
    }
}

impl EventSink for TraceSink<'_> {
    fn on_transform_changed(&mut self, object_name: &str, transform: &Transform) {
        if self.enabled {
            info!(target: "spatia::trace", "{object_name}: {}", describe(transform));
        }
        self.inner.on_transform_changed(object_name, transform);
    }

    fn on_gesture_event(&mut self, event: &GestureEvent) {
        if self.enabled {
            info!(
                target: "spatia::trace",
                "{} {:?}: {}",
                event.object_name,
                event.kind,
                describe(&event.transform)
            );
        }
        self.inner.on_gesture_event(event);
    }
}

fn describe(transform: &Transform) -> String {
    let t = transform.translation;
    let euler = quaternion_to_euler(transform.rotation);
    let s = transform.scale;
    format!(
        "pos ({:.3}, {:.3}, {:.3}) rot ({:.1}°, {:.1}°, {:.1}°) scale ({:.3}, {:.3}, {:.3})",
        t.x,
        t.y,
        t.z,
        euler.x.to_degrees(),
        euler.y.to_degrees(),
        euler.z.to_degrees(),
        s.x,
        s.y,
        s.z
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn ended(name: &str) -> GestureEvent {
        GestureEvent {
            object_name: name.to_string(),
            transform: Transform::identity(),
            initial_transform: None,
            kind: GestureEventKind::GestureEnded,
        }
    }

    #[test]
    fn channel_sink_preserves_order() {
        let (mut tx, rx) = mpsc::channel();
        tx.on_transform_changed("cube", &Transform::identity());
        tx.on_gesture_event(&ended("cube"));
        drop(tx);
        let events: Vec<ManipulationEvent> = rx.iter().collect();
        assert!(matches!(events[0], ManipulationEvent::TransformChanged { .. }));
        assert_eq!(events[1], ManipulationEvent::Gesture(ended("cube")));
    }

    #[test]
    fn trace_sink_forwards_unchanged() {
        let mut recorded = Vec::new();
        {
            let mut sink = TraceSink::new(&mut recorded, true);
            sink.on_transform_changed("cube", &Transform::identity());
            sink.on_gesture_event(&ended("cube"));
        }
        assert_eq!(recorded.len(), 2);
    }

    #[test]
    fn describe_reports_degrees() {
        let text = describe(&Transform::identity());
        assert!(text.starts_with("pos (0.000, 0.000, 0.000)"));
        assert!(text.contains("scale (1.000, 1.000, 1.000)"));
    }
}
