//! Axis-aligned collision primitives for OpenGlide.

pub mod aabb;
pub mod collision;

pub use aabb::*;
pub use collision::*;
