// Reading a clip's camera, tracks and solved cameras from a JSON file.

use crate::all::*;

#[derive(Deserialize)]
#[allow(non_snake_case)]
pub struct CameraSetup {
  // Pixels.
  pub focalLength: f64,
  pub principalPointX: f64,
  pub principalPointY: f64,
  pub distortionModel: String,
  pub distortionCoefficients: Vec<f64>,
  pub imageWidth: usize,
  pub imageHeight: usize,
  pub pixelAspect: Option<f64>,
  // Millimeters.
  pub sensorWidth: Option<f64>,
}

#[derive(Deserialize)]
pub struct MarkerSetup {
  pub frame: FrameNumber,
  // Pixels.
  pub x: f64,
  pub y: f64,
  #[serde(default)]
  pub disabled: bool,
}

#[derive(Deserialize)]
pub struct TrackSetup {
  pub name: String,
  pub markers: Vec<MarkerSetup>,
  #[serde(default)]
  pub error: f64,
  pub bundle: Option<[f64; 3]>,
}

#[derive(Deserialize)]
#[allow(non_snake_case)]
pub struct CameraPoseSetup {
  pub frame: FrameNumber,
  // Row-major.
  pub cameraToWorld: Vec<Vec<f64>>,
  #[serde(default)]
  pub error: f64,
}

#[derive(Deserialize)]
pub struct ObjectSetup {
  pub name: String,
  #[serde(default)]
  pub tracks: Vec<TrackSetup>,
  #[serde(default)]
  pub cameras: Vec<CameraPoseSetup>,
  pub scale: Option<f64>,
}

#[derive(Deserialize)]
pub struct SceneSetupRoot {
  pub camera: CameraSetup,
  pub objects: Vec<ObjectSetup>,
}

// Tracking data with the frame size it was created for.
pub struct Scene {
  pub tracking: Tracking,
  pub frame_size: FrameSize,
}

const MAX_PARENT_DIRECTORY_HEIGHT: usize = 1;
const SETUP_FILE_NAME: &str = "scene.json";

impl Scene {
  // Loads `path` directly if it is a file, otherwise looks for a scene file
  // in the directory and its parent.
  pub fn load(path: &Path) -> Result<Scene> {
    if path.is_file() {
      return parse_setup(path);
    }
    let mut directory = Some(path);
    for _ in 0..(MAX_PARENT_DIRECTORY_HEIGHT + 1) {
      let d = match directory {
        Some(d) => d,
        None => break,
      };
      let setup_path = d.join(SETUP_FILE_NAME);
      if setup_path.exists() {
        return parse_setup(&setup_path);
      }
      directory = d.parent();
    }
    bail!("Failed to find a {} in {}.", SETUP_FILE_NAME, path.display());
  }
}

fn parse_setup(path: &Path) -> Result<Scene> {
  let s = std::fs::read_to_string(path)
    .context(format!("Failed to read file {}.", path.display()))?;
  parse_scene(&s).context(format!("Failed to parse {}.", path.display()))
}

pub fn parse_scene(s: &str) -> Result<Scene> {
  let root: SceneSetupRoot = serde_json::from_str(s)?;
  let frame_size = [root.camera.imageWidth, root.camera.imageHeight];
  if frame_size[0] == 0 || frame_size[1] == 0 {
    bail!("Invalid image size {}x{}.", frame_size[0], frame_size[1]);
  }

  let mut tracking = Tracking::new();
  tracking.camera = convert_camera(&root.camera)?;
  for object in root.objects {
    convert_object(&mut tracking, object, frame_size)?;
  }
  tracking.set_active_object(tracking.camera_object_index())?;
  Ok(Scene { tracking, frame_size })
}

fn convert_camera(d: &CameraSetup) -> Result<Camera> {
  let mut camera = Camera::default();
  if let Some(sensor_width) = d.sensorWidth {
    camera.sensor_width = sensor_width;
  }
  if d.focalLength <= 0. {
    bail!("Focal length must be positive, got {}.", d.focalLength);
  }
  camera.set_focal(d.focalLength);
  camera.set_pixel_aspect(d.pixelAspect.unwrap_or(1.));
  camera.set_principal_point_pixels(
    Vector2d::new(d.principalPointX, d.principalPointY),
    [d.imageWidth, d.imageHeight],
  );
  camera.set_distortion_model(convert_model(&d.distortionModel, &d.distortionCoefficients)?);
  Ok(camera)
}

fn convert_model(model: &str, c: &[f64]) -> Result<DistortionModel> {
  let expected = match model {
    "polynomial" => 3,
    "division" => 2,
    "nuke" => 4,
    "brown" => 6,
    _ => bail!("Unknown distortion model {}.", model),
  };
  // Missing coefficients are zero.
  if c.len() > expected {
    bail!("Distortion model {} takes {} coefficients, got {}.", model, expected, c.len());
  }
  let k = |i: usize| c.get(i).copied().unwrap_or(0.);
  Ok(match model {
    "polynomial" => DistortionModel::Polynomial { k1: k(0), k2: k(1), k3: k(2) },
    "division" => DistortionModel::Division { k1: k(0), k2: k(1) },
    "nuke" => DistortionModel::Nuke { k1: k(0), k2: k(1), p1: k(2), p2: k(3) },
    _ => DistortionModel::Brown { k1: k(0), k2: k(1), k3: k(2), k4: k(3), p1: k(4), p2: k(5) },
  })
}

fn convert_matrix(rows: &[Vec<f64>]) -> Result<Matrix4d> {
  if rows.len() != 4 || rows.iter().any(|r| r.len() != 4) {
    bail!("Camera matrix must be 4x4.");
  }
  Ok(Matrix4d::from_iterator(rows.iter().flatten().copied()).transpose())
}

fn convert_object(tracking: &mut Tracking, d: ObjectSetup, frame_size: FrameSize) -> Result<()> {
  let object = match tracking.object_named(&d.name) {
    Some(object) => object,
    None => tracking.add_object(&d.name),
  };
  let size = Vector2d::new(frame_size[0] as f64, frame_size[1] as f64);

  for t in d.tracks {
    if t.markers.is_empty() {
      bail!("Track {} of object {} has no markers.", t.name, d.name);
    }
    let id = tracking.add_track_empty(object, &t.name)?;
    let settings = tracking.settings.clone();
    let track = tracking.track_mut(id).ok_or_else(|| anyhow!("Lost track {}.", t.name))?;
    for m in &t.markers {
      let position = Vector2d::new(m.x, m.y).component_div(&size);
      let mut marker = settings.default_marker(m.frame, position, frame_size);
      marker.disabled = m.disabled;
      track.insert(marker);
    }
    track.error = t.error;
    track.bundle = t.bundle.map(|b| Vector3d::new(b[0], b[1], b[2]));
  }

  let cameras = d.cameras.iter()
    .map(|c| Ok(ReconstructedCamera {
      frame: c.frame,
      matrix: convert_matrix(&c.cameraToWorld)?,
      error: c.error,
    }))
    .collect::<Result<Vec<_>>>()?;
  let o = tracking.object_mut(object).ok_or_else(|| anyhow!("Lost object {}.", d.name))?;
  if !cameras.is_empty() {
    let error = cameras.iter().map(|c| c.error).sum::<f64>() / cameras.len() as f64;
    o.reconstruction = Reconstruction::new(cameras, error);
  }
  if let Some(scale) = d.scale {
    o.scale = scale;
  }
  Ok(())
}
