use crate::all::*;
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistortionMode {
  Distort,
  Undistort,
}

// How far the image edges move, in whole pixels, when the frame is
// distorted or undistorted. Positive values grow the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundsDeltas {
  pub right: i32,
  pub left: i32,
  pub bottom: i32,
  pub top: i32,
}

// Immutable once built, shared read-only by the parallel bounds scan.
pub struct Distortion {
  calibration_size: FrameSize,
  focal: f64,
  // Pixels, vertical coordinate divided by the pixel aspect ratio.
  principal_point: Vector2d,
  intrinsics: CameraIntrinsics,
}

impl Distortion {
  pub fn new(camera: &Camera, calibration_size: FrameSize) -> Distortion {
    let principal = camera.principal_point_pixels(calibration_size);
    let principal_point = Vector2d::new(principal[0], principal[1] / camera.pixel_aspect());
    let intrinsics = CameraIntrinsics::new(
      camera.distortion_model(),
      camera.focal(),
      principal_point,
      calibration_size,
    );
    Distortion {
      calibration_size,
      focal: camera.focal(),
      principal_point,
      intrinsics,
    }
  }

  pub fn calibration_size(&self) -> FrameSize {
    self.calibration_size
  }

  // Undistorted pixel to distorted pixel, in calibration space.
  pub fn distort(&self, p: Vector2d) -> Vector2d {
    let normalized = (p - self.principal_point) / self.focal;
    self.intrinsics.apply(normalized)
  }

  // Distorted pixel to undistorted pixel, in calibration space.
  pub fn undistort(&self, p: Vector2d) -> Vector2d {
    self.intrinsics.invert(p) * self.focal + self.principal_point
  }

  // Margins needed around a `size` frame so the result of `mode` fits.
  //
  // The frame border is mapped with the opposite operation: the pixel which
  // lands on the border after undistortion comes from the distorted border.
  pub fn bounds_deltas(
    &self,
    size: FrameSize,
    calibration_size: FrameSize,
    mode: DistortionMode,
  ) -> BoundsDeltas {
    let chunk = parameters().bounds_chunk_size.max(1);
    let scale = Vector2d::new(
      calibration_size[0] as f64 / size[0].max(1) as f64,
      calibration_size[1] as f64 / size[1].max(1) as f64,
    );
    let map = |p: Vector2d| -> Vector2d {
      let calibrated = p.component_mul(&scale);
      let mapped = match mode {
        DistortionMode::Undistort => self.distort(calibrated),
        DistortionMode::Distort => self.undistort(calibrated),
      };
      mapped.component_div(&scale)
    };

    let (w, h) = (size[0] as f64, size[1] as f64);
    let edge = |len: usize, f: &(dyn Fn(f64) -> f64 + Sync), maximum: bool| -> f64 {
      let samples = (0..len + 1).into_par_iter().with_min_len(chunk).map(|i| f(i as f64));
      if maximum {
        samples.reduce(|| f64::NEG_INFINITY, f64::max)
      }
      else {
        samples.reduce(|| f64::INFINITY, f64::min)
      }
    };

    let max_x = edge(size[1], &|y: f64| map(Vector2d::new(w, y))[0], true);
    let min_x = edge(size[1], &|y: f64| map(Vector2d::new(0., y))[0], false);
    let min_y = edge(size[0], &|x: f64| map(Vector2d::new(x, 0.))[1], false);
    let max_y = edge(size[0], &|x: f64| map(Vector2d::new(x, h))[1], true);

    BoundsDeltas {
      right: (max_x - w).ceil() as i32,
      left: (-min_x).ceil() as i32,
      bottom: (-min_y).ceil() as i32,
      top: (max_y - h).ceil() as i32,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn camera(model: DistortionModel) -> Camera {
    let mut camera = Camera::default();
    camera.set_focal(100.);
    camera.set_distortion_model(model);
    camera
  }

  #[test]
  fn test_identity_bounds() {
    let mut c = camera(DistortionModel::default());
    let d = c.distortion([100, 100]);
    for mode in [DistortionMode::Distort, DistortionMode::Undistort] {
      assert_eq!(d.bounds_deltas([100, 100], [100, 100], mode), BoundsDeltas::default());
    }
  }

  #[test]
  fn test_identity_distort() {
    let mut c = camera(DistortionModel::Nuke { k1: 0., k2: 0., p1: 0., p2: 0. });
    c.set_pixel_aspect(2.);
    c.set_principal_point(Vector2d::new(0.2, 0.4));
    let d = c.distortion([200, 100]);
    let p = Vector2d::new(13., 77.);
    assert!((d.distort(p) - p).norm() < 1e-9);
    assert!((d.undistort(p) - p).norm() < 1e-9);
  }

  #[test]
  fn test_barrel_bounds() {
    // With barrel distortion the two modes move the border in opposite directions.
    let mut c = camera(DistortionModel::Polynomial { k1: -0.05, k2: 0., k3: 0. });
    let d = c.distortion([200, 100]);
    let undistort = d.bounds_deltas([200, 100], [200, 100], DistortionMode::Undistort);
    assert!(undistort.right < 0 && undistort.left < 0);
    let distort = d.bounds_deltas([200, 100], [200, 100], DistortionMode::Distort);
    assert!(distort.right > 0 && distort.left > 0 && distort.top > 0 && distort.bottom > 0);
    // Symmetric around the centered principal point.
    assert_eq!(distort.right, distort.left);
    assert_eq!(distort.top, distort.bottom);
  }

  #[test]
  fn test_bounds_scale_with_frame_size() {
    let mut c = camera(DistortionModel::Polynomial { k1: -0.05, k2: 0., k3: 0. });
    let d = c.distortion([200, 100]);
    let full = d.bounds_deltas([200, 100], [200, 100], DistortionMode::Distort);
    let half = d.bounds_deltas([100, 50], [200, 100], DistortionMode::Distort);
    assert!((half.right - (full.right + 1) / 2).abs() <= 1);
  }
}
