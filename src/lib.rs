#[macro_use] extern crate lazy_static;

pub mod all;
pub mod camera;
pub mod distortion;
pub mod dopesheet;
pub mod keyframes;
pub mod lens_model;
pub mod marker;
pub mod parameters;
pub mod plane_track;
pub mod reconstruction;
pub mod scene_setup;
pub mod session;
pub mod stabilization;
pub mod synthetic;
pub mod track;
pub mod track_merge;
pub mod tracking;
pub mod tracking_object;
pub mod types;
pub mod util;
