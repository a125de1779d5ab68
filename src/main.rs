use cliptrack::all::*;

use clap::Parser;

#[derive(Parser)]
struct Args {
  // Scene JSON file, or a folder with a `scene.json` in it or its parent.
  #[clap(short)]
  input: Option<String>,
  // Generate this many random tracks instead of reading a scene.
  #[clap(long)]
  synthetic: Option<usize>,
  #[clap(long, default_value = "0")]
  seed: u64,
  // One of name, longest, total, error, start, end.
  #[clap(long, default_value = "error")]
  sort: String,
  #[clap(long)]
  inverse: Option<bool>,
  // Frame at which to print the camera matrix of each object.
  #[clap(long)]
  frame: Option<f64>,
  #[clap(flatten)]
  parameters: ParameterSet,
}

fn handle_error(err: &anyhow::Error) {
  for (i, e) in err.chain().enumerate() {
    println!("  {}: {}", i + 1, e);
  }
}

fn main() {
  if let Err(err) = run() {
    handle_error(&err);
    std::process::exit(1);
  }
}

fn parse_sort_method(s: &str) -> Result<SortMethod> {
  Ok(match s {
    "name" => SortMethod::Name,
    "longest" => SortMethod::LongestSegment,
    "total" => SortMethod::TotalFrames,
    "error" => SortMethod::AverageError,
    "start" => SortMethod::StartFrame,
    "end" => SortMethod::EndFrame,
    _ => bail!("Unknown sort method {}.", s),
  })
}

fn run() -> Result<()> {
  let args = Args::parse();

  env_logger::Builder::new()
    .filter_level(LevelFilter::Info)
    .format(format_log)
    .init();

  {
    let mut p = PARAMETER_SET.lock().map_err(|_| anyhow!("Parameter set lock is poisoned."))?;
    *p = args.parameters.clone();
  }

  let mut scene = match (&args.input, args.synthetic) {
    (Some(input), _) => Scene::load(Path::new(input))?,
    (None, Some(track_count)) => synthetic_scene(&SyntheticOptions {
      track_count,
      seed: args.seed,
      ..Default::default()
    })?,
    (None, None) => bail!("Give either an input scene with -i or --synthetic <count>."),
  };
  let frame_size = scene.frame_size;
  let tracking = &mut scene.tracking;

  let (_, default_inverse) = tracking.dopesheet.sort_method();
  let method = parse_sort_method(&args.sort)?;
  tracking.dopesheet.set_sort_method(method, args.inverse.unwrap_or(default_inverse));

  for object in 0..tracking.objects().len() {
    tracking.set_active_object(object)?;
    tracking.update_dopesheet();
    let o = tracking.active_object();
    info!("Object {}: {} tracks, {} plane tracks.", o.name, o.tracks.len(), o.plane_tracks.len());
    for channel in &tracking.dopesheet.channels {
      info!("  {:30} frames {:5} longest {:5}", channel.name, channel.total_frames, channel.max_segment);
    }
    for segment in &tracking.dopesheet.coverage {
      info!("  Coverage {:?} on frames {}..{}.", segment.coverage, segment.start, segment.end);
    }
    if let Some(frame) = args.frame {
      info!("  Camera matrix at frame {}: {}", frame, tracking.active_object().camera_matrix(frame));
    }
  }
  tracking.set_active_object(tracking.camera_object_index())?;

  let stabilization = tracking.stabilization_tracks();
  info!("Stabilizing with {} location and {} rotation tracks.",
    stabilization.location.len(), stabilization.rotation.len());

  let distortion = tracking.camera.distortion(frame_size);
  for mode in [DistortionMode::Distort, DistortionMode::Undistort] {
    let deltas = distortion.bounds_deltas(frame_size, frame_size, mode);
    info!("{:?} bounds deltas: {:?}", mode, deltas);
  }
  Ok(())
}
