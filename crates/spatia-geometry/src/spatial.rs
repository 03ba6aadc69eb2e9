use cgmath::{One, SquareMatrix, Transform as _};

use crate::{Euler, Mat4, Point, Quat, Rad, Vec3};

/// Euler angles in radians, `x` = pitch, `y` = yaw, `z` = roll.
pub fn quaternion_to_euler(rotation: Quat) -> Vec3 {
    let euler: Euler<Rad<f32>> = rotation.into();
    Vec3::new(euler.x.0, euler.y.0, euler.z.0)
}

/// Exact comparison; a nearly-identity rotation is still a rotation.
pub fn is_identity(rotation: Quat) -> bool {
    rotation == Quat::one()
}

/// Maps a world-space point into the frame described by `plane`.
pub fn to_plane_local(point: Point, plane: &Mat4) -> Option<Point> {
    let inverse = plane.invert()?;
    Some(inverse.transform_point(point))
}

/// Whether `point` projects inside the plane's rectangle of size
/// `extent.x` by `extent.z`, centered at the plane origin.
pub fn point_in_plane_extent(point: Point, plane: &Mat4, extent: Vec3) -> bool {
    let Some(local) = to_plane_local(point, plane) else {
        return false;
    };
    local.x.abs() <= extent.x * 0.5 && local.z.abs() <= extent.z * 0.5
}
