// Closed-form lens distortion models in normalized camera coordinates, and the
// camera intrinsics object which maps between normalized and image space.
//
// Each model has one closed-form direction. The other direction is found with
// a few Newton steps on the closed form, the same way pinhole undistortion is
// usually done.

use crate::all::*;

const SOLVE_MAX_ITERATIONS: usize = 20;
const SOLVE_CONVERGENCE_THRESHOLD: f64 = 1e-12;
const SOLVE_RESIDUAL_THRESHOLD: f64 = 1e-9;
const JACOBIAN_STEP: f64 = 1e-6;

pub trait LensModel: Send + Sync {
  // Undistorted normalized point to distorted normalized point.
  fn distort(&self, p: Vector2d) -> Vector2d;

  // Inverse of `distort()`.
  fn undistort(&self, p: Vector2d) -> Vector2d;
}

// Finds `x` such that `f(x) = target`, starting from `target`. The flag
// tells whether the residual got small, it does not for targets outside the
// range of `f`, such as points beyond the radius where a strong barrel
// distortion folds back.
fn try_solve<F: Fn(Vector2d) -> Vector2d>(f: &F, target: Vector2d) -> (Vector2d, bool) {
  let mut x = target;
  for _ in 0..SOLVE_MAX_ITERATIONS {
    let residual = target - f(x);
    let h = JACOBIAN_STEP;
    let dx = (f(x + Vector2d::new(h, 0.)) - f(x - Vector2d::new(h, 0.))) / (2. * h);
    let dy = (f(x + Vector2d::new(0., h)) - f(x - Vector2d::new(0., h))) / (2. * h);
    let jacobian = Matrix2d::from_columns(&[dx, dy]);
    let delta = match jacobian.try_inverse() {
      Some(inverse) => inverse * residual,
      None => break,
    };
    x += delta;
    if delta.norm() < SOLVE_CONVERGENCE_THRESHOLD { break }
  }
  let converged = (target - f(x)).norm() < SOLVE_RESIDUAL_THRESHOLD;
  (x, converged)
}

// The result is the last estimate even when not converged.
fn solve<F: Fn(Vector2d) -> Vector2d>(f: F, target: Vector2d) -> Vector2d {
  let (x, converged) = try_solve(&f, target);
  if !converged {
    debug!("Lens model inversion did not converge at ({}, {}).", target[0], target[1]);
  }
  x
}

pub struct PolynomialModel {
  pub k: [f64; 3],
}

impl PolynomialModel {
  fn radial(&self, p: Vector2d) -> Vector2d {
    let r2 = p.norm_squared();
    let k = &self.k;
    p * (1. + r2 * (k[0] + r2 * (k[1] + r2 * k[2])))
  }
}

impl LensModel for PolynomialModel {
  fn distort(&self, p: Vector2d) -> Vector2d {
    self.radial(p)
  }

  fn undistort(&self, p: Vector2d) -> Vector2d {
    if self.k.iter().all(|k| *k == 0.) { return p }
    solve(|x| self.radial(x), p)
  }
}

pub struct DivisionModel {
  pub k: [f64; 2],
}

impl DivisionModel {
  fn divide(&self, p: Vector2d) -> Vector2d {
    let r2 = p.norm_squared();
    p / (1. + r2 * (self.k[0] + r2 * self.k[1]))
  }
}

impl LensModel for DivisionModel {
  fn distort(&self, p: Vector2d) -> Vector2d {
    self.divide(p)
  }

  fn undistort(&self, p: Vector2d) -> Vector2d {
    if self.k.iter().all(|k| *k == 0.) { return p }
    solve(|x| self.divide(x), p)
  }
}

// Nuke's lens distortion. The closed form goes from distorted to undistorted
// and is expressed relative to half of the larger image dimension, so points
// are rescaled from focal-length units first.
pub struct NukeModel {
  pub k: [f64; 2],
  pub p: [f64; 2],
  // Focal length divided by half of the larger image dimension.
  pub scale: f64,
}

impl NukeModel {
  fn undistort_scaled(&self, d: Vector2d) -> Vector2d {
    let (x, y) = (d[0], d[1]);
    let r2 = x * x + y * y;
    let radial = 1. + r2 * (self.k[0] + r2 * self.k[1]);
    let [p1, p2] = self.p;
    Vector2d::new(
      x * radial + p1 * (r2 + 2. * x * x) + 2. * p2 * x * y,
      y * radial + p2 * (r2 + 2. * y * y) + 2. * p1 * x * y,
    )
  }
}

impl LensModel for NukeModel {
  fn distort(&self, p: Vector2d) -> Vector2d {
    if self.k.iter().chain(self.p.iter()).all(|k| *k == 0.) { return p }
    solve(|x| self.undistort_scaled(x), p * self.scale) / self.scale
  }

  fn undistort(&self, p: Vector2d) -> Vector2d {
    self.undistort_scaled(p * self.scale) / self.scale
  }
}

// Brown-Conrady with four radial and two tangential terms.
pub struct BrownModel {
  pub k: [f64; 4],
  pub p: [f64; 2],
}

impl BrownModel {
  fn apply(&self, q: Vector2d) -> Vector2d {
    let (x, y) = (q[0], q[1]);
    let r2 = x * x + y * y;
    let k = &self.k;
    let radial = 1. + r2 * (k[0] + r2 * (k[1] + r2 * (k[2] + r2 * k[3])));
    let [p1, p2] = self.p;
    Vector2d::new(
      x * radial + 2. * p1 * x * y + p2 * (r2 + 2. * x * x),
      y * radial + 2. * p2 * x * y + p1 * (r2 + 2. * y * y),
    )
  }
}

impl LensModel for BrownModel {
  fn distort(&self, p: Vector2d) -> Vector2d {
    self.apply(p)
  }

  fn undistort(&self, p: Vector2d) -> Vector2d {
    if self.k.iter().chain(self.p.iter()).all(|k| *k == 0.) { return p }
    solve(|x| self.apply(x), p)
  }
}

// Maps between normalized camera coordinates and image pixels for one
// distortion model.
pub struct CameraIntrinsics {
  pub focal: f64,
  // Pixels, vertical coordinate already divided by the pixel aspect ratio.
  pub principal_point: Vector2d,
  pub image_size: FrameSize,
  model: Box<dyn LensModel>,
}

impl CameraIntrinsics {
  pub fn new(
    model: &DistortionModel,
    focal: f64,
    principal_point: Vector2d,
    image_size: FrameSize,
  ) -> CameraIntrinsics {
    let model: Box<dyn LensModel> = match *model {
      DistortionModel::Polynomial { k1, k2, k3 } => Box::new(PolynomialModel { k: [k1, k2, k3] }),
      DistortionModel::Division { k1, k2 } => Box::new(DivisionModel { k: [k1, k2] }),
      DistortionModel::Nuke { k1, k2, p1, p2 } => {
        let half = 0.5 * image_size[0].max(image_size[1]).max(1) as f64;
        Box::new(NukeModel { k: [k1, k2], p: [p1, p2], scale: focal / half })
      },
      DistortionModel::Brown { k1, k2, k3, k4, p1, p2 } => {
        Box::new(BrownModel { k: [k1, k2, k3, k4], p: [p1, p2] })
      },
    };
    CameraIntrinsics { focal, principal_point, image_size, model }
  }

  // Normalized undistorted point to distorted image pixels.
  pub fn apply(&self, normalized: Vector2d) -> Vector2d {
    self.model.distort(normalized) * self.focal + self.principal_point
  }

  // Distorted image pixels to normalized undistorted point.
  pub fn invert(&self, image: Vector2d) -> Vector2d {
    self.model.undistort((image - self.principal_point) / self.focal)
  }
}
