// NOTE This kind of import-all file isn't a common Rust idiom.

pub use crate::{
  camera::*,
  distortion::*,
  dopesheet::*,
  keyframes::*,
  lens_model::*,
  marker::*,
  parameters::*,
  plane_track::*,
  reconstruction::*,
  scene_setup::*,
  session::*,
  stabilization::*,
  synthetic::*,
  track::*,
  track_merge::*,
  tracking::*,
  tracking_object::*,
  types::*,
  util::*,
};

pub use {
  std::{
    cell::Cell,
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
  },
  log::{debug, error, info, warn, LevelFilter},
  serde::Deserialize,
  anyhow::{anyhow, bail, Context as AnyhowContext, Result},
};
