//! Building blocks shared by the scene: asset naming, spin, follow, camera.

pub mod assets;
pub mod follow;
pub mod orbit_camera;
pub mod spin;
