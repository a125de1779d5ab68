use crate::all::*;

#[derive(Clone, Debug, PartialEq)]
pub struct ReconstructedCamera {
  pub frame: FrameNumber,
  // Camera to world.
  pub matrix: Matrix4d,
  // Average reprojection error on this frame.
  pub error: f64,
}

#[derive(Clone, Debug, Default)]
pub struct Reconstruction {
  // Sorted by frame.
  pub cameras: Vec<ReconstructedCamera>,
  pub reconstructed: bool,
  pub error: f64,
  // Index of the last successful lookup. Sequential playback mostly asks for
  // neighbouring frames, so lookups start walking from here.
  last_camera: Cell<usize>,
}

impl Reconstruction {
  pub fn new(cameras: Vec<ReconstructedCamera>, error: f64) -> Reconstruction {
    let mut cameras = cameras;
    cameras.sort_by_key(|c| c.frame);
    cameras.dedup_by_key(|c| c.frame);
    Reconstruction {
      reconstructed: !cameras.is_empty(),
      cameras,
      error,
      last_camera: Cell::new(0),
    }
  }

  pub fn clear(&mut self) {
    self.cameras.clear();
    self.reconstructed = false;
    self.error = 0.;
    self.last_camera.set(0);
  }

  // Index of the camera solved at `frame`. With `nearest` set, queries outside
  // the solved range clamp to the first or last camera and queries inside a
  // gap give the camera on the left of it.
  pub fn find_camera_index(&self, frame: FrameNumber, nearest: bool) -> Option<usize> {
    let cameras = &self.cameras;
    let n = cameras.len();
    if n == 0 { return None }

    if frame < cameras[0].frame {
      return if nearest { Some(0) } else { None };
    }
    if frame > cameras[n - 1].frame {
      return if nearest { Some(n - 1) } else { None };
    }

    let mut a = self.last_camera.get();
    if a >= n { a = 0 }
    let forward = cameras[a].frame < frame;

    loop {
      let camera_frame = cameras[a].frame;
      if camera_frame == frame {
        self.last_camera.set(a);
        return Some(a);
      }
      // Walked past the requested frame, there is no camera for it.
      if forward && camera_frame > frame {
        return if nearest { Some(a - 1) } else { None };
      }
      if !forward && camera_frame < frame {
        return if nearest { Some(a) } else { None };
      }
      if forward { a += 1 } else { a -= 1 }
      // The range checks above keep `a` within bounds.
      debug_assert!(a < n);
    }
  }

  pub fn camera_at(&self, frame: FrameNumber) -> Option<&ReconstructedCamera> {
    self.find_camera_index(frame, false).map(|i| &self.cameras[i])
  }

  // Camera matrix at a possibly fractional frame, blended per element between
  // the solved cameras around it. Identity when nothing is solved. `scale` is
  // the solved scale of a non-camera object, `None` for the camera object.
  pub fn interpolated_matrix(&self, frame: f64, scale: Option<f64>) -> Matrix4d {
    let a = match self.find_camera_index(frame.floor() as FrameNumber, true) {
      Some(a) => a,
      None => return Matrix4d::identity(),
    };
    let cameras = &self.cameras;
    let mut matrix = if a + 1 < cameras.len() && cameras[a].frame as f64 != frame {
      let t = (frame - cameras[a].frame as f64) / (cameras[a + 1].frame - cameras[a].frame) as f64;
      // Outside the solved range the clamped camera is used as is.
      let t = t.clamp(0., 1.);
      lerp4x4(&cameras[a].matrix, &cameras[a + 1].matrix, t)
    }
    else {
      cameras[a].matrix
    };

    if let Some(scale) = scale {
      if scale != 0. {
        let mut translation = matrix.fixed_slice_mut::<3, 1>(0, 3);
        translation /= scale;
      }
    }
    matrix
  }
}

// Camera shift: offset of the principal point from the frame
// center, in units of the frame width for both axes.
pub fn camera_shift(camera: &Camera, winx: usize, winy: usize) -> Vector2d {
  let principal = camera.principal_point_pixels([winx, winy]);
  Vector2d::new(
    (0.5 * winx as f64 - principal[0]) / winx as f64,
    (0.5 * winy as f64 - principal[1]) / winx as f64,
  )
}

fn perspective(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Matrix4d {
  let x_delta = right - left;
  let y_delta = top - bottom;
  let z_delta = far - near;
  Matrix4d::new(
    2. * near / x_delta, 0., (right + left) / x_delta, 0.,
    0., 2. * near / y_delta, (top + bottom) / y_delta, 0.,
    0., 0., -(far + near) / z_delta, -2. * near * far / z_delta,
    0., 0., -1., 0.,
  )
}

const CLIP_START: f64 = 0.1;
const CLIP_END: f64 = 1000.;

// Projection of the tracking camera for a `winx` x `winy` viewport, combined
// with the inverse solved camera at `frame` when there is one.
pub fn projection_matrix(
  camera: &Camera,
  object: &TrackingObject,
  frame: FrameNumber,
  winx: usize,
  winy: usize,
) -> Matrix4d {
  let sensor_width = camera.sensor_width;
  let lens = camera.focal() * sensor_width / winx as f64;
  let ycor = 1. / camera.pixel_aspect();
  let shift = camera_shift(camera, winx, winy);
  let winside = winx.min(winy) as f64;

  let viewfac = if winx >= winy {
    lens * winx as f64 / sensor_width
  }
  else {
    ycor * lens * winy as f64 / sensor_width
  };
  let pixsize = CLIP_START / viewfac;

  let left = (-0.5 * winx as f64 + shift[0] * winside) * pixsize;
  let right = (0.5 * winx as f64 + shift[0] * winside) * pixsize;
  let bottom = (-0.5 * ycor * winy as f64 + shift[1] * winside) * pixsize;
  let top = (0.5 * ycor * winy as f64 + shift[1] * winside) * pixsize;
  let winmat = perspective(left, right, bottom, top, CLIP_START, CLIP_END);

  match object.reconstruction.camera_at(frame).and_then(|c| c.matrix.try_inverse()) {
    Some(inverse) => winmat * inverse,
    None => winmat,
  }
}
