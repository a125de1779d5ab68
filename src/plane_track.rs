use crate::all::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneTrackId(pub u64);

impl std::fmt::Display for PlaneTrackId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "P{}", self.0)
  }
}

// Smallest number of point tracks a plane can be solved from.
pub const MIN_PLANE_POINT_TRACKS: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct PlaneMarker {
  pub frame: FrameNumber,
  // Absolute normalized positions, counter-clockwise from bottom-left.
  pub corners: [Vector2d; 4],
  pub disabled: bool,
}

impl Keyframe for PlaneMarker {
  fn frame(&self) -> FrameNumber { self.frame }
  fn set_frame(&mut self, frame: FrameNumber) { self.frame = frame }
}

impl PlaneMarker {
  // Axis-aligned quad covering `min..max`.
  pub fn from_bounds(frame: FrameNumber, min: Vector2d, max: Vector2d) -> PlaneMarker {
    PlaneMarker {
      frame,
      corners: [
        min,
        Vector2d::new(max[0], min[1]),
        max,
        Vector2d::new(min[0], max[1]),
      ],
      disabled: false,
    }
  }
}

#[derive(Clone, Debug)]
pub struct PlaneTrack {
  pub name: String,
  // Not owned, resolved through `Tracking`.
  pub point_tracks: Vec<TrackId>,
  pub markers: Vec<PlaneMarker>,
  pub image_opacity: f64,
  pub selected: bool,
  pub hidden: bool,
  pub auto_keyframe: bool,
}

impl PlaneTrack {
  pub fn new(name: &str, point_tracks: Vec<TrackId>) -> PlaneTrack {
    debug_assert!(point_tracks.len() >= MIN_PLANE_POINT_TRACKS);
    PlaneTrack {
      name: name.to_string(),
      point_tracks,
      markers: vec![],
      image_opacity: 1.,
      selected: false,
      hidden: false,
      auto_keyframe: false,
    }
  }

  pub fn has_point_track(&self, track: TrackId) -> bool {
    self.point_tracks.contains(&track)
  }

  // Fails when the plane would be left with too few point tracks, the caller
  // decides whether to drop the whole plane then.
  pub fn remove_point_track(&mut self, track: TrackId) -> bool {
    if self.point_tracks.len() <= MIN_PLANE_POINT_TRACKS { return false }
    let n = self.point_tracks.len();
    self.point_tracks.retain(|t| *t != track);
    self.point_tracks.len() < n
  }

  pub fn replace_point_track(&mut self, old_track: TrackId, new_track: TrackId) {
    if let Some(t) = self.point_tracks.iter_mut().find(|t| **t == old_track) {
      *t = new_track;
    }
  }

  pub fn get(&self, frame: FrameNumber) -> Option<&PlaneMarker> {
    nearest_index(&self.markers, frame).map(|i| &self.markers[i])
  }

  pub fn get_exact(&self, frame: FrameNumber) -> Option<&PlaneMarker> {
    exact_index(&self.markers, frame).map(|i| &self.markers[i])
  }

  pub fn ensure(&mut self, frame: FrameNumber) -> Option<&mut PlaneMarker> {
    ensure_keyframe(&mut self.markers, frame).map(move |i| &mut self.markers[i])
  }

  pub fn insert(&mut self, marker: PlaneMarker) -> &mut PlaneMarker {
    let i = insert_keyframe(&mut self.markers, marker);
    &mut self.markers[i]
  }

  pub fn delete(&mut self, frame: FrameNumber) -> Option<PlaneMarker> {
    delete_keyframe(&mut self.markers, frame)
  }

  // Corners at a fractional frame, blended only between consecutive frames.
  pub fn subframe_corners(&self, frame: f64) -> Option<[Vector2d; 4]> {
    let i = nearest_index(&self.markers, frame.floor() as FrameNumber)?;
    let marker = &self.markers[i];
    match self.markers.get(i + 1) {
      Some(next) if next.frame == marker.frame + 1 && frame >= marker.frame as f64 => {
        let t = (frame - marker.frame as f64) / (next.frame - marker.frame) as f64;
        let mut corners = marker.corners;
        for (c, n) in corners.iter_mut().zip(next.corners.iter()) {
          *c = lerp2(*c, *n, t);
        }
        Some(corners)
      },
      _ => Some(marker.corners),
    }
  }

  pub fn find_frame(&self, frame: FrameNumber, exact: bool) -> Option<&PlaneMarker> {
    if exact { self.get_exact(frame) } else { self.get(frame) }
  }

  // New marker at `frame` with the corners of the first marker.
  pub fn insert_frame(&mut self, frame: FrameNumber) -> Option<&mut PlaneMarker> {
    let mut marker = self.markers.first()?.clone();
    marker.frame = frame;
    marker.disabled = false;
    Some(self.insert(marker))
  }

  pub fn delete_frame(&mut self, frame: FrameNumber) -> bool {
    if self.markers.len() <= 1 { return false }
    self.delete(frame).is_some()
  }
}
