//! Visualization module
//!
//! Celestial bodies, the sun light with its lens flare, and the starfield
//! background. Spawning happens in `scene`; per-frame systems run from `view`.

pub mod config;
pub mod earth;
pub mod factory;
pub mod lens_flare;
pub mod lighting;
pub mod moon;
pub mod skymap;
pub mod specular;
