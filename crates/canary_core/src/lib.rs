//! Scene-side math shared by the renderer: the fly camera, its projection and
//! object transforms.

pub mod camera;
pub mod transform;

pub use camera::{CameraMovement, FlyCamera, MouseLook, Projection};
pub use transform::Transform;
