use crate::all::*;

// Handle of a point track. Assigned sequentially by `Tracking` and never
// reused, so a handle to a removed track fails to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u64);

impl std::fmt::Display for TrackId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "T{}", self.0)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionModel {
  Perspective,
  Affine,
  LocRotScale,
  LocScale,
  LocRot,
  Loc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternMatch {
  Keyframe,
  PreviousFrame,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearPath {
  // Everything after the reference frame.
  Remained,
  // Everything before the reference frame.
  UpTo,
  // Everything except the reference frame.
  All,
}

// Parts of a track that can be selected independently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionArea {
  pub point: bool,
  pub pattern: bool,
  pub search: bool,
}

impl SelectionArea {
  pub const NONE: SelectionArea = SelectionArea { point: false, pattern: false, search: false };
  pub const ALL: SelectionArea = SelectionArea { point: true, pattern: true, search: true };
  pub const POINT: SelectionArea = SelectionArea { point: true, pattern: false, search: false };

  pub fn any(&self) -> bool {
    self.point || self.pattern || self.search
  }

  pub fn set(&mut self, area: SelectionArea, value: bool) {
    if area.point { self.point = value }
    if area.pattern { self.pattern = value }
    if area.search { self.search = value }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelFlags {
  pub disable_red: bool,
  pub disable_green: bool,
  pub disable_blue: bool,
  pub preview_grayscale: bool,
  pub preview_alpha: bool,
}

#[derive(Clone, Debug)]
pub struct Track {
  pub name: String,
  pub motion_model: MotionModel,
  pub pattern_match: PatternMatch,
  pub minimum_correlation: f64,
  // Distance from image boundary at which the tracker stops, in pixels.
  pub margin: usize,
  // Number of frames to track in one go, zero for unlimited.
  pub frames_limit: usize,
  pub use_brute: bool,
  pub use_normalization: bool,
  pub use_mask: bool,
  pub channels: ChannelFlags,
  pub weight: f64,
  pub weight_stab: f64,
  pub offset: Vector2d,
  // Sorted by frame, frames unique.
  pub markers: Vec<Marker>,
  // Set once the track is reconstructed.
  pub bundle: Option<Vector3d>,
  // Average reprojection error after reconstruction.
  pub error: f64,
  pub selection: SelectionArea,
  pub hidden: bool,
  pub locked: bool,
  pub use_2d_stab: bool,
  pub use_2d_stab_rot: bool,
  pub mask: Option<String>,
}

impl Track {
  pub fn new(name: &str, settings: &TrackingSettings) -> Track {
    Track {
      name: name.to_string(),
      motion_model: settings.motion_model,
      pattern_match: settings.pattern_match,
      minimum_correlation: settings.minimum_correlation,
      margin: settings.margin,
      frames_limit: settings.frames_limit,
      use_brute: settings.use_brute,
      use_normalization: settings.use_normalization,
      use_mask: false,
      channels: ChannelFlags::default(),
      weight: settings.weight,
      weight_stab: settings.weight,
      offset: Vector2d::zeros(),
      markers: vec![],
      bundle: None,
      error: 0.,
      selection: SelectionArea::NONE,
      hidden: false,
      locked: false,
      use_2d_stab: false,
      use_2d_stab_rot: false,
      mask: None,
    }
  }

  pub fn has_bundle(&self) -> bool {
    self.bundle.is_some()
  }

  pub fn is_selected(&self) -> bool {
    self.selection.any()
  }

  // Marker at `frame` or the nearest one on its left, the first marker when
  // `frame` precedes the track. `None` only for a degenerate, marker-less track.
  pub fn get(&self, frame: FrameNumber) -> Option<&Marker> {
    debug_assert!(!self.markers.is_empty(), "Detected degenerate track {}.", self.name);
    nearest_index(&self.markers, frame).map(|i| &self.markers[i])
  }

  pub fn get_mut(&mut self, frame: FrameNumber) -> Option<&mut Marker> {
    debug_assert!(!self.markers.is_empty(), "Detected degenerate track {}.", self.name);
    nearest_index(&self.markers, frame).map(move |i| &mut self.markers[i])
  }

  pub fn get_exact(&self, frame: FrameNumber) -> Option<&Marker> {
    exact_index(&self.markers, frame).map(|i| &self.markers[i])
  }

  pub fn get_exact_mut(&mut self, frame: FrameNumber) -> Option<&mut Marker> {
    exact_index(&self.markers, frame).map(move |i| &mut self.markers[i])
  }

  // Marker at exactly `frame`, created as a copy of the nearest marker if missing.
  pub fn ensure(&mut self, frame: FrameNumber) -> Option<&mut Marker> {
    ensure_keyframe(&mut self.markers, frame).map(move |i| &mut self.markers[i])
  }

  pub fn insert(&mut self, marker: Marker) -> &mut Marker {
    let i = insert_keyframe(&mut self.markers, marker);
    &mut self.markers[i]
  }

  // Removing the last marker leaves a degenerate track, callers that expose
  // this to users should use `delete_frame()`.
  pub fn delete(&mut self, frame: FrameNumber) -> Option<Marker> {
    delete_keyframe(&mut self.markers, frame)
  }

  pub fn has_marker_at(&self, frame: FrameNumber) -> bool {
    self.get_exact(frame).is_some()
  }

  pub fn has_enabled_marker_at(&self, frame: FrameNumber) -> bool {
    self.get_exact(frame).map_or(false, |m| m.is_enabled())
  }

  pub fn first_last_frame(&self) -> Option<(FrameNumber, FrameNumber)> {
    Some((self.markers.first()?.frame, self.markers.last()?.frame))
  }

  // Marker state at `frame` from the nearest enabled markers around it.
  pub fn interpolate(&self, frame: FrameNumber) -> Option<Marker> {
    let closest = nearest_index(&self.markers, frame)?;
    let closest_marker = &self.markers[closest];
    if closest_marker.frame == frame && closest_marker.is_enabled() {
      return Some(closest_marker.clone());
    }

    // `closest` is on the right of `frame` only when the query precedes the track.
    let (left, right) = if closest_marker.frame <= frame {
      (
        self.markers[..=closest].iter().rev().find(|m| m.is_enabled()),
        self.markers[closest + 1..].iter().find(|m| m.is_enabled()),
      )
    }
    else {
      (None, self.markers[closest..].iter().find(|m| m.is_enabled()))
    };

    match (left, right) {
      (Some(left), Some(right)) => {
        let t = (frame - left.frame) as f64 / (right.frame - left.frame) as f64;
        let mut m = left.lerp_geometry(right, t);
        m.frame = frame;
        let (disabled, tracked, graph_selected) = if frame == left.frame {
          (left.disabled, left.tracked, left.graph_selected)
        }
        else if frame == right.frame {
          (right.disabled, right.tracked, right.graph_selected)
        }
        else {
          (false, false, false)
        };
        m.disabled = disabled;
        m.tracked = tracked;
        m.graph_selected = graph_selected;
        Some(m)
      },
      (Some(m), None) | (None, Some(m)) => Some(m.clone()),
      (None, None) => None,
    }
  }

  // Position at a fractional frame including the track offset. Sub-frame
  // blending only happens inside a run of consecutive markers.
  pub fn subframe_position(&self, frame: f64) -> Option<Vector2d> {
    let i = nearest_index(&self.markers, frame.floor() as FrameNumber)?;
    let marker = &self.markers[i];
    let position = match self.markers.get(i + 1) {
      Some(next) if next.frame == marker.frame + 1 && frame >= marker.frame as f64 => {
        let t = (frame - marker.frame as f64) / (next.frame - marker.frame) as f64;
        lerp2(marker.position, next.position, t)
      },
      _ => marker.position,
    };
    Some(position + self.offset)
  }

  // Inserts a disabled copy of `reference` one frame before or after it. An
  // existing marker on that frame is only replaced when `overwrite` is set.
  pub fn insert_disabled(&mut self, reference: &Marker, before: bool, overwrite: bool) {
    let marker = reference.disabled_neighbour(before);
    if overwrite || !self.has_marker_at(marker.frame) {
      self.insert(marker);
    }
  }

  pub fn clear_path(&mut self, ref_frame: FrameNumber, action: ClearPath) {
    match action {
      ClearPath::Remained => {
        if let Some(a) = self.markers.iter().skip(1).position(|m| m.frame > ref_frame) {
          self.markers.truncate(a + 1);
        }
        if let Some(last) = self.markers.last().cloned() {
          self.insert_disabled(&last, false, true);
        }
      },
      ClearPath::UpTo => {
        if let Some(a) = self.markers.iter().rposition(|m| m.frame <= ref_frame) {
          self.markers.drain(..a);
        }
        if let Some(first) = self.markers.first().cloned() {
          self.insert_disabled(&first, true, true);
        }
      },
      ClearPath::All => {
        let reference = match self.get(ref_frame) {
          Some(m) => m.clone(),
          None => return,
        };
        self.markers.clear();
        self.insert(reference.clone());
        self.insert_disabled(&reference, true, true);
        self.insert_disabled(&reference, false, true);
      },
    }
  }

  // Scripting surface.

  pub fn find_frame(&self, frame: FrameNumber, exact: bool) -> Option<&Marker> {
    if exact { self.get_exact(frame) } else { self.get(frame) }
  }

  // New marker at `frame` with the pattern shape of the first marker.
  pub fn insert_frame(&mut self, frame: FrameNumber, position: Vector2d) -> &mut Marker {
    let mut marker = Marker::new(frame, position);
    if let Some(first) = self.markers.first() {
      marker.pattern_corners = first.pattern_corners;
    }
    self.insert(marker)
  }

  // Refuses to remove the last remaining marker.
  pub fn delete_frame(&mut self, frame: FrameNumber) -> bool {
    if self.markers.len() <= 1 { return false }
    self.delete(frame).is_some()
  }
}
