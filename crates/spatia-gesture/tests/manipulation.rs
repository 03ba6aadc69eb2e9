use cgmath::{Deg, One, Rotation3};
use spatia_base::ManipulationConfig;
use spatia_geometry::{Aabb, Point, Quat, Transform, Vec3};
use spatia_gesture::{
    DragRotateSample, GestureEventKind, ManipulationEvent, Manipulator, PlaneAnchor,
    PlaneClassification, ScaleSample,
};
use spatia_scene::{NodeId, Result};

struct Room {
    manipulator: Manipulator,
    chair: NodeId,
    chair_leg: NodeId,
    lamp: NodeId,
    indicator: NodeId,
}

fn room() -> Result<Room> {
    let mut manipulator =
        Manipulator::new(ManipulationConfig::default()).expect("default config validates");
    let scene = manipulator.scene_mut();
    let chair = scene.spawn(
        "chair",
        Transform::from_translation(Vec3::new(0.0, 2.0, 0.0)),
    );
    scene.set_bounds(
        chair,
        Some(Aabb::from_center_size(
            Point::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
        )),
    )?;
    let chair_leg = scene.spawn_child(chair, "chair-leg", Transform::identity())?;
    let lamp = scene.spawn(
        "lamp",
        Transform::from_translation(Vec3::new(5.0, 0.0, 0.0)),
    );
    let indicator = scene.spawn("indicator", Transform::identity());

    manipulator.register(chair, "chair");
    manipulator.register(lamp, "lamp");
    manipulator.set_placement_indicator(Some(indicator));
    manipulator.add_plane(PlaneAnchor::new(
        "floor-0",
        PlaneClassification::Floor,
        Transform::identity(),
        Vec3::new(6.0, 0.0, 6.0),
    ));
    Ok(Room {
        manipulator,
        chair,
        chair_leg,
        lamp,
        indicator,
    })
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1.0e-4
}

fn drag(hit: NodeId, offset: Vec3) -> DragRotateSample {
    DragRotateSample::drag(hit, Point::new(0.0, 0.0, 0.0), offset)
}

#[test]
fn replayed_drag_sample_is_idempotent() -> Result<()> {
    let mut room = room()?;
    let mut events = Vec::new();
    let sample = drag(room.chair_leg, Vec3::new(1.0, 0.0, -1.0));
    room.manipulator.drag_rotate_changed(&sample, &mut events);
    let first = room.manipulator.scene().world_position(room.chair).unwrap();
    room.manipulator.drag_rotate_changed(&sample, &mut events);
    let second = room.manipulator.scene().world_position(room.chair).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, Point::new(1.0, 2.0, -1.0));
    match &events[1] {
        ManipulationEvent::Gesture(event) => {
            assert_eq!(event.object_name, "chair");
            assert_eq!(
                event.kind,
                GestureEventKind::Drag {
                    offset: Vec3::new(1.0, 0.0, -1.0)
                }
            );
            assert_eq!(
                event.initial_transform.map(|t| t.translation),
                Some(Vec3::new(0.0, 2.0, 0.0))
            );
        }
        other => panic!("unexpected event {other:?}"),
    }
    Ok(())
}

#[test]
fn session_target_is_stable_until_end() -> Result<()> {
    let mut room = room()?;
    let mut events = Vec::new();
    room.manipulator
        .drag_rotate_changed(&drag(room.chair, Vec3::new(0.5, 0.0, 0.0)), &mut events);
    // A later sample hitting a different object still drives the chair.
    room.manipulator
        .drag_rotate_changed(&drag(room.lamp, Vec3::new(1.0, 0.0, 0.0)), &mut events);

    let lamp = room.manipulator.scene().world_position(room.lamp).unwrap();
    let chair = room.manipulator.scene().world_position(room.chair).unwrap();
    assert_eq!(lamp, Point::new(5.0, 0.0, 0.0));
    assert_eq!(chair, Point::new(1.0, 2.0, 0.0));
    assert!(room.manipulator.is_drag_rotate_active());

    room.manipulator.drag_rotate_ended(&mut events);
    assert!(!room.manipulator.is_drag_rotate_active());
    Ok(())
}

#[test]
fn rotation_from_identity_is_the_delta() -> Result<()> {
    let mut room = room()?;
    let delta = Quat::from_angle_y(Deg(40.0));
    let mut events = Vec::new();
    room.manipulator.drag_rotate_changed(
        &DragRotateSample::rotate(room.chair, delta, Some(40f32.to_radians())),
        &mut events,
    );
    let rotation = room.manipulator.scene().transform(room.chair).unwrap().rotation;
    assert_eq!(rotation, delta);
    Ok(())
}

#[test]
fn rotation_from_non_identity_composes() -> Result<()> {
    let mut room = room()?;
    let base = Quat::from_angle_x(Deg(15.0));
    let transform = room
        .manipulator
        .scene()
        .transform(room.lamp)
        .unwrap()
        .with_rotation(base);
    room.manipulator.scene_mut().set_transform(room.lamp, transform)?;

    let delta = Quat::from_angle_y(Deg(40.0));
    let mut events = Vec::new();
    room.manipulator
        .drag_rotate_changed(&DragRotateSample::rotate(room.lamp, delta, None), &mut events);
    let rotation = room.manipulator.scene().transform(room.lamp).unwrap().rotation;
    assert_eq!(rotation, base * delta);
    assert_ne!(rotation, Quat::one());
    Ok(())
}

#[test]
fn scale_clamps_to_configured_range() -> Result<()> {
    let mut room = room()?;
    let mut events = Vec::new();
    let pinch = |magnification| ScaleSample {
        hit: room.chair_leg,
        magnification,
    };

    room.manipulator.scale_changed(&pinch(10.0), &mut events);
    let scale = room.manipulator.scene().transform(room.chair).unwrap().scale;
    assert_eq!(scale, Vec3::new(5.0, 5.0, 5.0));

    room.manipulator.scale_changed(&pinch(0.01), &mut events);
    let scale = room.manipulator.scene().transform(room.chair).unwrap().scale;
    assert_eq!(scale, Vec3::new(0.1, 0.1, 0.1));

    match events.last() {
        Some(ManipulationEvent::Gesture(event)) => {
            assert_eq!(event.kind, GestureEventKind::Scale { magnification: 0.01 });
        }
        other => panic!("unexpected event {other:?}"),
    }
    Ok(())
}

#[test]
fn drag_near_floor_snaps_on_release() -> Result<()> {
    let mut room = room()?;
    let mut events = Vec::new();
    // Chair origin at y = 2 with half height 0.5: bottom ends 0.15 above floor.
    room.manipulator
        .drag_rotate_changed(&drag(room.chair, Vec3::new(0.0, -1.35, 0.0)), &mut events);

    assert!(room.manipulator.placement().is_placeable());
    let indicator = room.manipulator.scene().transform(room.indicator).unwrap();
    assert!(close(indicator.scale.x, 2.5));
    assert!(room.manipulator.scene().is_enabled(room.indicator));

    events.clear();
    room.manipulator.drag_rotate_ended(&mut events);
    let resting = room.manipulator.scene().world_position(room.chair).unwrap();
    assert!(close(resting.y, 0.5));
    assert!(!room.manipulator.placement().is_placeable());
    assert!(!room.manipulator.scene().is_enabled(room.indicator));

    match &events[..] {
        [
            ManipulationEvent::Gesture(ended),
            ManipulationEvent::TransformChanged {
                object_name,
                transform,
            },
        ] => {
            assert_eq!(ended.kind, GestureEventKind::GestureEnded);
            assert!(close(ended.transform.translation.y, 0.65));
            assert_eq!(object_name, "chair");
            assert!(close(transform.translation.y, 0.5));
        }
        other => panic!("unexpected events {other:?}"),
    }
    Ok(())
}

#[test]
fn drag_touching_floor_uses_full_indicator() -> Result<()> {
    let mut room = room()?;
    let mut events = Vec::new();
    room.manipulator
        .drag_rotate_changed(&drag(room.chair, Vec3::new(0.0, -1.5, 0.0)), &mut events);
    let indicator = room.manipulator.scene().transform(room.indicator).unwrap();
    assert_eq!(indicator.scale, Vec3::new(4.0, 4.0, 4.0));
    Ok(())
}

#[test]
fn drag_far_above_floor_is_not_placeable() -> Result<()> {
    let mut room = room()?;
    let mut events = Vec::new();
    room.manipulator
        .drag_rotate_changed(&drag(room.chair, Vec3::new(0.0, -1.0, 0.0)), &mut events);
    assert!(!room.manipulator.placement().is_placeable());
    assert!(!room.manipulator.scene().is_enabled(room.indicator));

    events.clear();
    room.manipulator.drag_rotate_ended(&mut events);
    assert_eq!(events.len(), 1);
    let resting = room.manipulator.scene().world_position(room.chair).unwrap();
    assert!(close(resting.y, 1.0));
    Ok(())
}

#[test]
fn ending_without_a_session_emits_nothing() -> Result<()> {
    let mut room = room()?;
    let mut events = Vec::new();
    room.manipulator.drag_rotate_ended(&mut events);
    room.manipulator.scale_ended(&mut events);
    assert!(events.is_empty());
    assert!(!room.manipulator.is_drag_rotate_active());
    assert!(!room.manipulator.is_scale_active());
    Ok(())
}

#[test]
fn late_child_hit_still_drives_its_object() -> Result<()> {
    let mut room = room()?;
    let late = room
        .manipulator
        .scene_mut()
        .spawn_child(room.chair_leg, "cushion", Transform::identity())?;
    let mut events = Vec::new();
    room.manipulator.scale_changed(
        &ScaleSample {
            hit: late,
            magnification: 2.0,
        },
        &mut events,
    );
    let scale = room.manipulator.scene().transform(room.chair).unwrap().scale;
    assert_eq!(scale, Vec3::new(2.0, 2.0, 2.0));
    Ok(())
}

#[test]
fn unregistered_objects_ignore_gestures() -> Result<()> {
    let mut room = room()?;
    room.manipulator.unregister("chair");
    let mut events = Vec::new();
    room.manipulator
        .drag_rotate_changed(&drag(room.chair_leg, Vec3::new(1.0, 0.0, 0.0)), &mut events);
    assert!(events.is_empty());
    assert!(room.manipulator.lookup("chair").is_none());
    assert!(room.manipulator.resolve(room.chair).is_none());
    Ok(())
}

#[test]
fn events_serialize_with_kind_tags() -> Result<()> {
    let mut room = room()?;
    let mut events = Vec::new();
    room.manipulator.scale_changed(
        &ScaleSample {
            hit: room.lamp,
            magnification: 1.5,
        },
        &mut events,
    );
    room.manipulator.scale_ended(&mut events);

    let lines: Vec<String> = events
        .iter()
        .map(|event| serde_json::to_string(event).unwrap())
        .collect();
    assert!(lines[0].contains(r#""event":"transform_changed""#));
    assert!(lines[1].contains(r#""kind":"scale""#));
    assert!(lines[2].contains(r#""kind":"gestureEnded""#));
    Ok(())
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let config = ManipulationConfig {
        snap_clearance: 0.0,
        ..ManipulationConfig::default()
    };
    assert!(matches!(
        Manipulator::new(config),
        Err(spatia_base::Error::InvalidConfig(_))
    ));

    let config = ManipulationConfig {
        min_scale: 2.0,
        max_scale: 1.0,
        ..ManipulationConfig::default()
    };
    assert!(Manipulator::new(config).is_err());
}
