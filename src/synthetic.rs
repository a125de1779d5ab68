// Randomly generated tracking data, for exercising the tools without a clip.

use crate::all::*;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

pub struct SyntheticOptions {
  pub track_count: usize,
  pub frame_count: FrameNumber,
  pub frame_size: FrameSize,
  // Probability that a track loses the feature on a frame.
  pub gap_probability: f64,
  pub seed: u64,
}

impl Default for SyntheticOptions {
  fn default() -> SyntheticOptions {
    SyntheticOptions {
      track_count: 20,
      frame_count: 100,
      frame_size: [1920, 1080],
      gap_probability: 0.05,
      seed: 0,
    }
  }
}

// Tracks drifting across the frame with occasional gaps, a camera sliding
// sideways and a mild barrel distortion. The same seed gives the same scene.
pub fn synthetic_scene(options: &SyntheticOptions) -> Result<Scene> {
  if options.frame_count < 2 {
    bail!("Synthetic scene needs at least 2 frames, got {}.", options.frame_count);
  }
  let mut rng = Xoshiro256PlusPlus::seed_from_u64(options.seed);
  let frame_size = options.frame_size;
  let mut tracking = Tracking::new();
  tracking.camera.set_focal(frame_size[0] as f64);
  tracking.camera.set_distortion_model(DistortionModel::Polynomial { k1: -0.05, k2: 0.01, k3: 0. });

  let object = tracking.camera_object_index();
  for _ in 0..options.track_count {
    let start = rng.gen_range(1..options.frame_count);
    let end = rng.gen_range(start + 1..=options.frame_count);
    let mut position = Vector2d::new(rng.gen_range(0.1..0.9), rng.gen_range(0.1..0.9));
    let velocity = Vector2d::new(rng.gen_range(-0.003..0.003), rng.gen_range(-0.003..0.003));

    let id = tracking.add_track(object, "Track", position, start, frame_size)?;
    let settings = tracking.settings.clone();
    let track = tracking.track_mut(id).ok_or_else(|| anyhow!("Lost track {}.", id))?;
    for frame in (start + 1)..=end {
      position += velocity;
      if rng.gen_bool(options.gap_probability) { continue }
      track.insert(settings.default_marker(frame, position, frame_size));
    }
    track.error = rng.gen_range(0.0..2.0);
    track.bundle = Some(Vector3d::new(
      rng.gen_range(-5.0..5.0),
      rng.gen_range(-5.0..5.0),
      rng.gen_range(5.0..20.0),
    ));
  }

  let cameras = (1..=options.frame_count)
    .map(|frame| {
      let mut matrix = Matrix4d::identity();
      matrix[(0, 3)] = 0.01 * frame as f64;
      ReconstructedCamera { frame, matrix, error: rng.gen_range(0.0..1.0) }
    })
    .collect::<Vec<_>>();
  let error = cameras.iter().map(|c| c.error).sum::<f64>() / cameras.len() as f64;
  if let Some(o) = tracking.object_mut(object) {
    o.reconstruction = Reconstruction::new(cameras, error);
  }
  debug!("Generated {} synthetic tracks with seed {}.", options.track_count, options.seed);
  Ok(Scene { tracking, frame_size })
}
