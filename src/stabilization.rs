use crate::all::*;

const MAX_SCALE_LIMIT: f64 = 10.;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StabilizationFilter {
  Nearest,
  Bilinear,
  Bicubic,
}

// Settings of 2D stabilization. Only stored here, the stabilization itself
// is computed by the consumer.
#[derive(Clone, Debug)]
pub struct Stabilization {
  pub enabled: bool,
  pub stabilize_rotation: bool,
  pub stabilize_scale: bool,
  pub autoscale: bool,
  pub show_tracks: bool,
  // Frame whose framing is kept.
  pub anchor_frame: FrameNumber,
  pub target_position: Vector2d,
  // Radians.
  pub target_rotation: f64,
  pub filter: StabilizationFilter,
  pub active_track: Option<TrackId>,
  pub active_rotation_track: Option<TrackId>,
  target_scale: f64,
  scale_max: f64,
  influence_location: f64,
  influence_scale: f64,
  influence_rotation: f64,
}

impl Default for Stabilization {
  fn default() -> Stabilization {
    Stabilization {
      enabled: false,
      stabilize_rotation: false,
      stabilize_scale: false,
      autoscale: false,
      show_tracks: true,
      anchor_frame: 1,
      target_position: Vector2d::zeros(),
      target_rotation: 0.,
      filter: StabilizationFilter::Bilinear,
      active_track: None,
      active_rotation_track: None,
      target_scale: 1.,
      scale_max: 2.,
      influence_location: 1.,
      influence_scale: 1.,
      influence_rotation: 1.,
    }
  }
}

macro_rules! clamped_property {
  ($get:ident, $set:ident, $min:expr, $max:expr) => {
    pub fn $get(&self) -> f64 { self.$get }
    pub fn $set(&mut self, value: f64) { self.$get = value.clamp($min, $max) }
  };
}

impl Stabilization {
  clamped_property!(target_scale, set_target_scale, f64::EPSILON, f64::MAX);
  clamped_property!(scale_max, set_scale_max, 0., MAX_SCALE_LIMIT);
  clamped_property!(influence_location, set_influence_location, 0., 1.);
  clamped_property!(influence_scale, set_influence_scale, 0., 1.);
  clamped_property!(influence_rotation, set_influence_rotation, 0., 1.);
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StabilizationTracks {
  pub location: Vec<TrackId>,
  pub rotation: Vec<TrackId>,
}

// Tracks of `object` used for stabilizing location and rotation/scale.
pub fn stabilization_tracks(object: &TrackingObject, tracks: &HashMap<TrackId, Track>) -> StabilizationTracks {
  let mut result = StabilizationTracks::default();
  for id in &object.tracks {
    let track = match tracks.get(id) {
      Some(t) => t,
      None => continue,
    };
    if track.use_2d_stab { result.location.push(*id) }
    if track.use_2d_stab_rot { result.rotation.push(*id) }
  }
  result
}
