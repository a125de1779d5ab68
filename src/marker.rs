use crate::all::*;

// State of a point track on a single frame.
//
// Positions are in normalized image coordinates ([0, 1] spans the frame).
// Pattern corners and search bounds are relative to `position`.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
  pub frame: FrameNumber,
  pub position: Vector2d,
  // Counter-clockwise starting from the bottom-left corner.
  pub pattern_corners: [Vector2d; 4],
  pub search_min: Vector2d,
  pub search_max: Vector2d,
  pub disabled: bool,
  // Set by the tracker, cleared for manually placed keyframes.
  pub tracked: bool,
  pub graph_selected: bool,
}

impl Keyframe for Marker {
  fn frame(&self) -> FrameNumber { self.frame }
  fn set_frame(&mut self, frame: FrameNumber) { self.frame = frame }
}

impl Marker {
  pub fn new(frame: FrameNumber, position: Vector2d) -> Marker {
    Marker {
      frame,
      position,
      pattern_corners: [Vector2d::zeros(); 4],
      search_min: Vector2d::zeros(),
      search_max: Vector2d::zeros(),
      disabled: false,
      tracked: false,
      graph_selected: false,
    }
  }

  // Axis-aligned pattern rectangle and search window of the given half sizes.
  pub fn with_size(
    frame: FrameNumber,
    position: Vector2d,
    pattern_half_size: Vector2d,
    search_half_size: Vector2d,
  ) -> Marker {
    let p = pattern_half_size;
    Marker {
      pattern_corners: [
        Vector2d::new(-p[0], -p[1]),
        Vector2d::new(p[0], -p[1]),
        Vector2d::new(p[0], p[1]),
        Vector2d::new(-p[0], p[1]),
      ],
      search_min: -search_half_size,
      search_max: search_half_size,
      ..Marker::new(frame, position)
    }
  }

  pub fn is_enabled(&self) -> bool {
    !self.disabled
  }

  pub fn pattern_bounds(&self) -> (Vector2d, Vector2d) {
    minmax2(&self.pattern_corners)
  }

  // Moves the pattern (keeping its shape) so it fits inside the search window.
  pub fn clamp_pattern_to_search(&mut self) {
    let (pat_min, pat_max) = self.pattern_bounds();
    for a in 0..2 {
      if pat_min[a] < self.search_min[a] {
        let d = self.search_min[a] - pat_min[a];
        for c in self.pattern_corners.iter_mut() { c[a] += d }
      }
      if pat_max[a] > self.search_max[a] {
        let d = pat_max[a] - self.search_max[a];
        for c in self.pattern_corners.iter_mut() { c[a] -= d }
      }
    }
  }

  // Grows the search window so it contains the pattern.
  pub fn clamp_search_to_pattern(&mut self) {
    let (pat_min, pat_max) = self.pattern_bounds();
    for a in 0..2 {
      self.search_min[a] = self.search_min[a].min(pat_min[a]);
      self.search_max[a] = self.search_max[a].max(pat_max[a]);
    }
  }

  // Moves the search window (keeping its size) so it contains the pattern.
  pub fn clamp_search_min_keep_size(&mut self) {
    let (pat_min, pat_max) = self.pattern_bounds();
    let dim = self.search_max - self.search_min;
    for a in 0..2 {
      if self.search_min[a] > pat_min[a] {
        self.search_min[a] = pat_min[a];
        self.search_max[a] = self.search_min[a] + dim[a];
      }
      if self.search_max[a] < pat_max[a] {
        self.search_max[a] = pat_max[a];
        self.search_min[a] = self.search_max[a] - dim[a];
      }
    }
  }

  // Linear blend of all geometry. Frame and flags are left to the caller.
  pub fn lerp_geometry(&self, other: &Marker, t: f64) -> Marker {
    let mut m = self.clone();
    m.position = lerp2(self.position, other.position, t);
    for i in 0..4 {
      m.pattern_corners[i] = lerp2(self.pattern_corners[i], other.pattern_corners[i], t);
    }
    m.search_min = lerp2(self.search_min, other.search_min, t);
    m.search_max = lerp2(self.search_max, other.search_max, t);
    m
  }

  // Disabled copy one frame before or after, used to terminate a tracked segment.
  pub fn disabled_neighbour(&self, before: bool) -> Marker {
    let mut m = self.clone();
    m.tracked = false;
    m.disabled = true;
    m.frame += if before { -1 } else { 1 };
    m
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn marker() -> Marker {
    Marker::with_size(1, Vector2d::new(0.5, 0.5), Vector2d::new(0.1, 0.1), Vector2d::new(0.2, 0.2))
  }

  #[test]
  fn test_clamp_pattern_to_search() {
    let mut m = marker();
    for c in m.pattern_corners.iter_mut() { c[0] += 0.15 }
    m.clamp_pattern_to_search();
    let (min, max) = m.pattern_bounds();
    assert!((max[0] - 0.2).abs() < 1e-12);
    assert!((min[0] - 0.0).abs() < 1e-12);
    assert!((max[1] - 0.1).abs() < 1e-12);
    // Search window is untouched.
    assert_eq!(m.search_max, Vector2d::new(0.2, 0.2));
  }

  #[test]
  fn test_clamp_search_to_pattern() {
    let mut m = marker();
    for c in m.pattern_corners.iter_mut() { c[1] -= 0.15 }
    m.clamp_search_to_pattern();
    assert!((m.search_min[1] + 0.25).abs() < 1e-12);
    assert!((m.search_max[1] - 0.2).abs() < 1e-12);
    assert!((m.search_min[0] + 0.2).abs() < 1e-12);
  }

  #[test]
  fn test_clamp_search_min_keep_size() {
    let mut m = marker();
    for c in m.pattern_corners.iter_mut() { c[0] += 0.15 }
    m.clamp_search_min_keep_size();
    assert!((m.search_max[0] - 0.25).abs() < 1e-12);
    assert!((m.search_min[0] + 0.15).abs() < 1e-12);
    let size = m.search_max - m.search_min;
    assert!((size - Vector2d::new(0.4, 0.4)).norm() < 1e-12);
  }

  #[test]
  fn test_disabled_neighbour() {
    let mut m = marker();
    m.tracked = true;
    let before = m.disabled_neighbour(true);
    assert_eq!(before.frame, 0);
    assert!(before.disabled);
    assert!(!before.tracked);
    assert_eq!(m.disabled_neighbour(false).frame, 2);
  }
}
