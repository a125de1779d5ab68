use crate::all::*;
use std::hash::{Hash, Hasher};

const MIN_FOCAL_MM: f64 = 0.0001;
// Pixels.
const MIN_FOCAL: f64 = 0.0001;
const MIN_PIXEL_ASPECT: f64 = 0.1;

// Lens distortion coefficients of one of the supported models.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DistortionModel {
  Polynomial { k1: f64, k2: f64, k3: f64 },
  Division { k1: f64, k2: f64 },
  Nuke { k1: f64, k2: f64, p1: f64, p2: f64 },
  Brown { k1: f64, k2: f64, k3: f64, k4: f64, p1: f64, p2: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DistortionModelKind {
  Polynomial,
  Division,
  Nuke,
  Brown,
}

impl Default for DistortionModel {
  fn default() -> DistortionModel {
    DistortionModel::Polynomial { k1: 0., k2: 0., k3: 0. }
  }
}

impl DistortionModel {
  // All coefficients zero.
  pub fn identity(kind: DistortionModelKind) -> DistortionModel {
    match kind {
      DistortionModelKind::Polynomial => DistortionModel::Polynomial { k1: 0., k2: 0., k3: 0. },
      DistortionModelKind::Division => DistortionModel::Division { k1: 0., k2: 0. },
      DistortionModelKind::Nuke => DistortionModel::Nuke { k1: 0., k2: 0., p1: 0., p2: 0. },
      DistortionModelKind::Brown => {
        DistortionModel::Brown { k1: 0., k2: 0., k3: 0., k4: 0., p1: 0., p2: 0. }
      },
    }
  }

  pub fn kind(&self) -> DistortionModelKind {
    match self {
      DistortionModel::Polynomial { .. } => DistortionModelKind::Polynomial,
      DistortionModel::Division { .. } => DistortionModelKind::Division,
      DistortionModel::Nuke { .. } => DistortionModelKind::Nuke,
      DistortionModel::Brown { .. } => DistortionModelKind::Brown,
    }
  }

  // Radial coefficients followed by tangential ones.
  pub fn coefficients(&self) -> Vec<f64> {
    match *self {
      DistortionModel::Polynomial { k1, k2, k3 } => vec![k1, k2, k3],
      DistortionModel::Division { k1, k2 } => vec![k1, k2],
      DistortionModel::Nuke { k1, k2, p1, p2 } => vec![k1, k2, p1, p2],
      DistortionModel::Brown { k1, k2, k3, k4, p1, p2 } => vec![k1, k2, k3, k4, p1, p2],
    }
  }
}

// Coefficients last used with each model, restored when switching back to it.
#[derive(Clone, Debug, PartialEq)]
pub struct DistortionPreferences {
  pub polynomial: DistortionModel,
  pub division: DistortionModel,
  pub nuke: DistortionModel,
  pub brown: DistortionModel,
}

impl Default for DistortionPreferences {
  fn default() -> DistortionPreferences {
    DistortionPreferences {
      polynomial: DistortionModel::identity(DistortionModelKind::Polynomial),
      division: DistortionModel::identity(DistortionModelKind::Division),
      nuke: DistortionModel::identity(DistortionModelKind::Nuke),
      brown: DistortionModel::identity(DistortionModelKind::Brown),
    }
  }
}

impl DistortionPreferences {
  pub fn remember(&mut self, model: DistortionModel) {
    match model.kind() {
      DistortionModelKind::Polynomial => self.polynomial = model,
      DistortionModelKind::Division => self.division = model,
      DistortionModelKind::Nuke => self.nuke = model,
      DistortionModelKind::Brown => self.brown = model,
    }
  }

  pub fn recall(&self, kind: DistortionModelKind) -> DistortionModel {
    match kind {
      DistortionModelKind::Polynomial => self.polynomial,
      DistortionModelKind::Division => self.division,
      DistortionModelKind::Nuke => self.nuke,
      DistortionModelKind::Brown => self.brown,
    }
  }
}

// Units the focal length is displayed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraUnits {
  Pixels,
  Millimeters,
}

// Tracking camera intrinsics and lens distortion.
//
// The distortion object is built on first use and dropped by every setter
// which changes the intrinsics, so reads always see the current parameters.
pub struct Camera {
  // Millimeters.
  pub sensor_width: f64,
  pub units: CameraUnits,
  pub preferences: DistortionPreferences,
  // Pixels.
  focal: f64,
  pixel_aspect: f64,
  // Frame center is zero, frame edges are -1 and 1.
  principal_point: Vector2d,
  model: DistortionModel,
  distortion: Option<Distortion>,
}

impl Default for Camera {
  fn default() -> Camera {
    Camera {
      sensor_width: 35.,
      units: CameraUnits::Millimeters,
      preferences: DistortionPreferences::default(),
      focal: 1000.,
      pixel_aspect: 1.,
      principal_point: Vector2d::zeros(),
      model: DistortionModel::default(),
      distortion: None,
    }
  }
}

// The distortion cache is not shared between copies.
impl Clone for Camera {
  fn clone(&self) -> Camera {
    Camera {
      sensor_width: self.sensor_width,
      units: self.units,
      preferences: self.preferences.clone(),
      focal: self.focal,
      pixel_aspect: self.pixel_aspect,
      principal_point: self.principal_point,
      model: self.model,
      distortion: None,
    }
  }
}

impl Camera {
  pub fn focal(&self) -> f64 {
    self.focal
  }

  // Clamped to stay positive, distortion divides by it.
  pub fn set_focal(&mut self, focal: f64) {
    self.focal = focal.max(MIN_FOCAL);
    self.invalidate_distortion();
  }

  pub fn focal_mm(&self, frame_width: usize) -> f64 {
    if frame_width == 0 { return 0. }
    self.focal * self.sensor_width / frame_width as f64
  }

  // Values too small to be a real lens are ignored.
  pub fn set_focal_mm(&mut self, frame_width: usize, focal_mm: f64) {
    if focal_mm < MIN_FOCAL_MM || frame_width == 0 || self.sensor_width <= 0. { return }
    self.set_focal(focal_mm * frame_width as f64 / self.sensor_width);
  }

  pub fn pixel_aspect(&self) -> f64 {
    self.pixel_aspect
  }

  pub fn set_pixel_aspect(&mut self, pixel_aspect: f64) {
    self.pixel_aspect = pixel_aspect.max(MIN_PIXEL_ASPECT);
    self.invalidate_distortion();
  }

  pub fn principal_point(&self) -> Vector2d {
    self.principal_point
  }

  pub fn set_principal_point(&mut self, principal_point: Vector2d) {
    self.principal_point = principal_point;
    self.invalidate_distortion();
  }

  pub fn principal_point_pixels(&self, frame_size: FrameSize) -> Vector2d {
    let center = Vector2d::new(frame_size[0] as f64, frame_size[1] as f64) / 2.;
    center + self.principal_point.component_mul(&center)
  }

  pub fn set_principal_point_pixels(&mut self, principal_point: Vector2d, frame_size: FrameSize) {
    if frame_size[0] == 0 || frame_size[1] == 0 { return }
    let center = Vector2d::new(frame_size[0] as f64, frame_size[1] as f64) / 2.;
    self.set_principal_point((principal_point - center).component_div(&center));
  }

  pub fn distortion_model(&self) -> &DistortionModel {
    &self.model
  }

  pub fn set_distortion_model(&mut self, model: DistortionModel) {
    self.preferences.remember(model);
    self.model = model;
    self.invalidate_distortion();
  }

  // Switches the model, restoring coefficients last used with it.
  pub fn set_distortion_model_kind(&mut self, kind: DistortionModelKind) {
    if self.model.kind() == kind { return }
    let model = self.preferences.recall(kind);
    self.set_distortion_model(model);
  }

  pub fn invalidate_distortion(&mut self) {
    if self.distortion.take().is_some() {
      debug!("Invalidated lens distortion.");
    }
  }

  pub fn is_distortion_built(&self) -> bool {
    self.distortion.is_some()
  }

  // Distortion for footage of `calibration_size`, built if missing or built
  // for another size.
  pub fn distortion(&mut self, calibration_size: FrameSize) -> &Distortion {
    let distortion = match self.distortion.take() {
      Some(d) if d.calibration_size() == calibration_size => d,
      _ => {
        debug!("Building {:?} lens distortion for {}x{}.",
          self.model.kind(), calibration_size[0], calibration_size[1]);
        Distortion::new(self, calibration_size)
      },
    };
    self.distortion.insert(distortion)
  }

  // Pixel coordinates in.
  pub fn distort_point(&mut self, p: Vector2d, calibration_size: FrameSize) -> Vector2d {
    self.distortion(calibration_size).distort(p)
  }

  pub fn undistort_point(&mut self, p: Vector2d, calibration_size: FrameSize) -> Vector2d {
    self.distortion(calibration_size).undistort(p)
  }

  // Without touching the cached distortion.
  pub fn distort_point_once(&self, p: Vector2d, calibration_size: FrameSize) -> Vector2d {
    Distortion::new(self, calibration_size).distort(p)
  }

  pub fn undistort_point_once(&self, p: Vector2d, calibration_size: FrameSize) -> Vector2d {
    Distortion::new(self, calibration_size).undistort(p)
  }

  // Whether both cameras distort images identically.
  pub fn distortion_equal(&self, other: &Camera) -> bool {
    self.focal == other.focal
      && self.pixel_aspect == other.pixel_aspect
      && self.principal_point == other.principal_point
      && self.model == other.model
  }

  // Consistent with `distortion_equal()`.
  pub fn distortion_hash(&self) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    self.model.kind().hash(&mut hasher);
    let values = [self.focal, self.pixel_aspect, self.principal_point[0], self.principal_point[1]];
    for v in values.iter().chain(self.model.coefficients().iter()) {
      // Positive and negative zero compare equal.
      let v = if *v == 0. { 0. } else { *v };
      v.to_bits().hash(&mut hasher);
    }
    hasher.finish()
  }
}
