//! Procedural world content for OpenGlide: the streamed city grid around the
//! player and the fixed decoration field around the runway.

pub mod city;
pub mod decor;

pub use city::*;
pub use decor::*;
