pub use cgmath::{Deg, Euler, Matrix4, Point3, Quaternion, Rad, Vector3};

mod bounds;
mod spatial;
mod transform;

pub use bounds::{Aabb, merge_bounds};
pub use spatial::{is_identity, point_in_plane_extent, quaternion_to_euler, to_plane_local};
pub use transform::Transform;

pub type Vec3 = Vector3<f32>;
pub type Point = Point3<f32>;
pub type Quat = Quaternion<f32>;
pub type Mat4 = Matrix4<f32>;
