//! Colonnade engine crate.
//!
//! A small wgpu renderer for static scenes built from procedural shapes.
//! The `frame` module keeps several frames of per-frame GPU state in flight so
//! the CPU records frame N+1 while the GPU still draws frame N; everything else
//! (device, scene, renderer, window runtime) is built around it.

pub mod core;
pub mod device;
pub mod frame;
pub mod input;
pub mod logging;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;
