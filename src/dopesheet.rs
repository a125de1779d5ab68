// Per-track timeline summary of the active tracking object, rebuilt lazily
// after edits.

use crate::all::*;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortMethod {
  Name,
  LongestSegment,
  TotalFrames,
  AverageError,
  StartFrame,
  EndFrame,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coverage {
  Poor,
  Acceptable,
  Good,
}

// Frames `start..end` with the same coverage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoverageSegment {
  pub start: FrameNumber,
  pub end: FrameNumber,
  pub coverage: Coverage,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DopesheetChannel {
  pub track: TrackId,
  pub track_name: String,
  // Track name, with the solve error appended once the object is solved.
  pub name: String,
  pub error: f64,
  // Maximal runs of consecutive enabled markers, `start..end`.
  pub segments: Vec<(FrameNumber, FrameNumber)>,
  // Frames in the longest segment.
  pub max_segment: usize,
  // Frames with an enabled marker.
  pub total_frames: usize,
  pub first_enabled_frame: Option<FrameNumber>,
  pub last_enabled_frame: Option<FrameNumber>,
}

impl DopesheetChannel {
  pub fn new(id: TrackId, track: &Track, reconstructed: bool) -> DopesheetChannel {
    let mut segments: Vec<(FrameNumber, FrameNumber)> = vec![];
    for marker in track.markers.iter().filter(|m| m.is_enabled()) {
      match segments.last_mut() {
        Some(segment) if segment.1 == marker.frame => segment.1 += 1,
        _ => segments.push((marker.frame, marker.frame + 1)),
      }
    }
    let lengths = segments.iter().map(|(start, end)| (end - start) as usize);

    DopesheetChannel {
      track: id,
      track_name: track.name.clone(),
      name: if reconstructed {
        format!("{} ({:.4})", track.name, track.error)
      }
      else {
        track.name.clone()
      },
      error: track.error,
      max_segment: lengths.clone().max().unwrap_or(0),
      total_frames: lengths.sum(),
      first_enabled_frame: segments.first().map(|s| s.0),
      last_enabled_frame: segments.last().map(|s| s.1 - 1),
      segments,
    }
  }

  pub fn is_markerless(&self) -> bool {
    self.segments.is_empty()
  }
}

fn compare_names(a: &DopesheetChannel, b: &DopesheetChannel) -> Ordering {
  a.track_name.to_lowercase().cmp(&b.track_name.to_lowercase())
}

fn compare_errors(a: &DopesheetChannel, b: &DopesheetChannel) -> Ordering {
  a.error.partial_cmp(&b.error).unwrap_or(Ordering::Equal)
}

// Channels without enabled markers go first in both directions.
fn compare_markerless_first(a: Option<FrameNumber>, b: Option<FrameNumber>, inverse: bool) -> Ordering {
  match (a, b) {
    (None, None) => Ordering::Equal,
    (None, Some(_)) => Ordering::Less,
    (Some(_), None) => Ordering::Greater,
    (Some(a), Some(b)) => if inverse { b.cmp(&a) } else { a.cmp(&b) },
  }
}

pub fn sort_channels(channels: &mut [DopesheetChannel], method: SortMethod, inverse: bool) {
  let flip = |o: Ordering| if inverse { o.reverse() } else { o };
  match method {
    SortMethod::Name => channels.sort_by(|a, b| flip(compare_names(a, b))),
    SortMethod::LongestSegment => channels.sort_by(|a, b| flip(a.max_segment.cmp(&b.max_segment))),
    SortMethod::TotalFrames => channels.sort_by(|a, b| flip(a.total_frames.cmp(&b.total_frames))),
    SortMethod::AverageError => {
      if inverse {
        channels.sort_by(|a, b| compare_errors(b, a));
      }
      else {
        channels.sort_by(|a, b| compare_errors(a, b).then_with(|| compare_names(a, b)));
      }
    },
    SortMethod::StartFrame => channels.sort_by(|a, b| {
      compare_markerless_first(a.first_enabled_frame, b.first_enabled_frame, inverse)
    }),
    SortMethod::EndFrame => channels.sort_by(|a, b| {
      compare_markerless_first(a.last_enabled_frame, b.last_enabled_frame, inverse)
    }),
  }
}

pub fn coverage_from_count(count: usize) -> Coverage {
  let p = parameters();
  if count < p.coverage_acceptable { Coverage::Poor }
  else if count < p.coverage_good { Coverage::Acceptable }
  else { Coverage::Good }
}

// Number of frames in `first..=last`. Wider than `FrameNumber` can hold.
fn frame_span(first: FrameNumber, last: FrameNumber) -> usize {
  (last as i64 - first as i64 + 1) as usize
}

// Coverage of every frame in the marker range of `tracks`, counting tracks
// with an enabled marker on the frame. Empty frames at either end of the
// range only hold disabled markers and are reported as good.
pub fn coverage_segments<'a, I>(tracks: I) -> Vec<CoverageSegment>
  where I: IntoIterator<Item = &'a Track>
{
  let tracks: Vec<&Track> = tracks.into_iter().collect();
  let (first, last) = match tracks_first_last_frame(tracks.iter().copied()) {
    Some(range) => range,
    None => return vec![],
  };

  let mut counts = vec![0usize; frame_span(first, last)];
  for track in &tracks {
    for marker in track.markers.iter().filter(|m| m.is_enabled()) {
      counts[frame_span(first, marker.frame) - 1] += 1;
    }
  }

  let n = counts.len();
  let mut segments: Vec<CoverageSegment> = vec![];
  for (i, count) in counts.into_iter().enumerate() {
    let frame = (first as i64 + i as i64) as FrameNumber;
    let coverage = if count == 0 && (i == 0 || i == n - 1) {
      Coverage::Good
    }
    else {
      coverage_from_count(count)
    };
    match segments.last_mut() {
      Some(segment) if segment.coverage == coverage => segment.end = frame + 1,
      _ => segments.push(CoverageSegment { start: frame, end: frame + 1, coverage }),
    }
  }
  segments
}

#[derive(Clone, Debug)]
pub struct Dopesheet {
  pub channels: Vec<DopesheetChannel>,
  pub coverage: Vec<CoverageSegment>,
  sort_method: SortMethod,
  inverse: bool,
  selected_only: bool,
  show_hidden: bool,
  up_to_date: bool,
}

impl Default for Dopesheet {
  fn default() -> Dopesheet {
    Dopesheet {
      channels: vec![],
      coverage: vec![],
      sort_method: SortMethod::AverageError,
      inverse: true,
      selected_only: false,
      show_hidden: false,
      up_to_date: false,
    }
  }
}

impl Dopesheet {
  pub fn tag_update(&mut self) {
    self.up_to_date = false;
  }

  pub fn is_up_to_date(&self) -> bool {
    self.up_to_date
  }

  pub fn sort_method(&self) -> (SortMethod, bool) {
    (self.sort_method, self.inverse)
  }

  pub fn set_sort_method(&mut self, method: SortMethod, inverse: bool) {
    self.sort_method = method;
    self.inverse = inverse;
    self.tag_update();
  }

  pub fn selected_only(&self) -> bool {
    self.selected_only
  }

  pub fn set_selected_only(&mut self, selected_only: bool) {
    self.selected_only = selected_only;
    self.tag_update();
  }

  pub fn show_hidden(&self) -> bool {
    self.show_hidden
  }

  pub fn set_show_hidden(&mut self, show_hidden: bool) {
    self.show_hidden = show_hidden;
    self.tag_update();
  }

  // Rebuilds channels and coverage for `object` unless nothing changed since
  // the last rebuild.
  pub fn update(&mut self, object: &TrackingObject, tracks: &HashMap<TrackId, Track>) {
    if self.up_to_date { return }

    let reconstructed = object.reconstruction.reconstructed;
    let object_tracks: Vec<(TrackId, &Track)> = object.tracks.iter()
      .filter_map(|id| tracks.get(id).map(|t| (*id, t)))
      .collect();

    self.channels = object_tracks.iter()
      .filter(|(_, t)| self.show_hidden || !t.hidden)
      .filter(|(_, t)| !self.selected_only || t.is_selected())
      .map(|(id, t)| DopesheetChannel::new(*id, t, reconstructed))
      .collect();
    sort_channels(&mut self.channels, self.sort_method, self.inverse);

    self.coverage = coverage_segments(object_tracks.iter().map(|(_, t)| *t));
    self.up_to_date = true;
    debug!("Rebuilt dopesheet of {} with {} channels and {} coverage segments.",
      object.name, self.channels.len(), self.coverage.len());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn track(name: &str, frames: &[FrameNumber]) -> Track {
    let mut t = Track::new(name, &TrackingSettings::default());
    for &frame in frames {
      t.insert(Marker::new(frame, Vector2d::new(0.5, 0.5)));
    }
    t
  }

  fn channel(name: &str, frames: &[FrameNumber], error: f64) -> DopesheetChannel {
    let mut t = track(name, frames);
    t.error = error;
    DopesheetChannel::new(TrackId(0), &t, false)
  }

  fn names(channels: &[DopesheetChannel]) -> Vec<&str> {
    channels.iter().map(|c| c.track_name.as_str()).collect()
  }

  #[test]
  fn test_segments() {
    let mut t = track("Track", &[1, 2, 3, 4, 5, 6, 7, 8]);
    for frame in 4..=6 {
      t.get_exact_mut(frame).unwrap().disabled = true;
    }
    let c = DopesheetChannel::new(TrackId(0), &t, false);
    assert_eq!(c.segments, vec![(1, 4), (7, 9)]);
    assert_eq!(c.max_segment, 3);
    assert_eq!(c.total_frames, 5);
    assert_eq!(c.first_enabled_frame, Some(1));
    assert_eq!(c.last_enabled_frame, Some(8));

    let c = DopesheetChannel::new(TrackId(0), &track("Track", &[1, 2, 3, 7, 8]), false);
    assert_eq!(c.segments, vec![(1, 4), (7, 9)]);
    assert_eq!(c.max_segment, 3);
  }

  #[test]
  fn test_channel_name() {
    let mut t = track("Track", &[1]);
    t.error = 0.123456;
    assert_eq!(DopesheetChannel::new(TrackId(0), &t, false).name, "Track");
    assert_eq!(DopesheetChannel::new(TrackId(0), &t, true).name, "Track (0.1235)");
  }

  #[test]
  fn test_sort() {
    let mut channels = vec![
      channel("b", &[1, 2, 3], 0.5),
      channel("C", &[5], 0.1),
      channel("a", &[2, 3, 4, 5, 7], 0.5),
      channel("empty", &[], 0.),
    ];
    sort_channels(&mut channels, SortMethod::Name, false);
    assert_eq!(names(&channels), vec!["a", "b", "C", "empty"]);
    sort_channels(&mut channels, SortMethod::Name, true);
    assert_eq!(names(&channels), vec!["empty", "C", "b", "a"]);
    sort_channels(&mut channels, SortMethod::TotalFrames, true);
    assert_eq!(names(&channels), vec!["a", "b", "C", "empty"]);
    sort_channels(&mut channels, SortMethod::LongestSegment, false);
    assert_eq!(names(&channels), vec!["empty", "C", "b", "a"]);
    sort_channels(&mut channels, SortMethod::AverageError, false);
    assert_eq!(names(&channels), vec!["empty", "C", "a", "b"]);
    sort_channels(&mut channels, SortMethod::StartFrame, false);
    assert_eq!(names(&channels), vec!["empty", "b", "a", "C"]);
    sort_channels(&mut channels, SortMethod::StartFrame, true);
    assert_eq!(names(&channels), vec!["empty", "C", "a", "b"]);
    sort_channels(&mut channels, SortMethod::EndFrame, true);
    assert_eq!(names(&channels), vec!["empty", "a", "C", "b"]);
  }

  #[test]
  fn test_coverage_thresholds() {
    assert_eq!(coverage_from_count(0), Coverage::Poor);
    assert_eq!(coverage_from_count(7), Coverage::Poor);
    assert_eq!(coverage_from_count(8), Coverage::Acceptable);
    assert_eq!(coverage_from_count(15), Coverage::Acceptable);
    assert_eq!(coverage_from_count(16), Coverage::Good);
  }

  #[test]
  fn test_coverage_segments() {
    let mut tracks: Vec<Track> = (0..16).map(|_| track("Track", &[3, 4, 5, 6])).collect();
    // Eight tracks also cover frames 7 and 8.
    for t in tracks.iter_mut().take(8) {
      t.insert(Marker::new(7, Vector2d::zeros()));
      t.insert(Marker::new(8, Vector2d::zeros()));
    }
    // Lone markers on 9 and 10.
    tracks[0].insert(Marker::new(9, Vector2d::zeros()));
    tracks[0].insert(Marker::new(10, Vector2d::zeros()));
    // Only a disabled marker on 1.
    tracks[1].insert(Marker { disabled: true, ..Marker::new(1, Vector2d::zeros()) });

    let segments = coverage_segments(tracks.iter());
    assert_eq!(segments, vec![
      CoverageSegment { start: 1, end: 2, coverage: Coverage::Good },
      CoverageSegment { start: 2, end: 3, coverage: Coverage::Poor },
      CoverageSegment { start: 3, end: 7, coverage: Coverage::Good },
      CoverageSegment { start: 7, end: 9, coverage: Coverage::Acceptable },
      CoverageSegment { start: 9, end: 11, coverage: Coverage::Poor },
    ]);
    assert!(coverage_segments(Vec::<&Track>::new()).is_empty());
  }

  #[test]
  fn test_frame_span() {
    assert_eq!(frame_span(3, 3), 1);
    assert_eq!(frame_span(-2, 5), 8);
    assert_eq!(frame_span(FrameNumber::MIN, FrameNumber::MAX), 1 << 32);

    let segments = coverage_segments([&track("Track", &[-2_000_000_000, -1_999_999_999])]);
    assert_eq!(segments, vec![
      CoverageSegment { start: -2_000_000_000, end: -1_999_999_998, coverage: Coverage::Poor },
    ]);
  }

  #[test]
  fn test_update_filters() {
    let mut object = TrackingObject::new("Camera", true);
    let mut tracks = HashMap::new();
    let mut hidden = track("hidden", &[1]);
    hidden.hidden = true;
    let mut selected = track("selected", &[1, 2]);
    selected.selection = SelectionArea::ALL;
    for (i, t) in [hidden, selected, track("plain", &[2])].into_iter().enumerate() {
      tracks.insert(TrackId(i as u64), t);
      object.tracks.push(TrackId(i as u64));
    }

    let mut dopesheet = Dopesheet::default();
    dopesheet.set_sort_method(SortMethod::Name, false);
    dopesheet.update(&object, &tracks);
    assert!(dopesheet.is_up_to_date());
    assert_eq!(names(&dopesheet.channels), vec!["plain", "selected"]);

    // Nothing happens until tagged.
    dopesheet.channels.clear();
    dopesheet.update(&object, &tracks);
    assert!(dopesheet.channels.is_empty());

    dopesheet.set_show_hidden(true);
    assert!(!dopesheet.is_up_to_date());
    dopesheet.update(&object, &tracks);
    assert_eq!(names(&dopesheet.channels), vec!["hidden", "plain", "selected"]);

    dopesheet.set_selected_only(true);
    dopesheet.update(&object, &tracks);
    assert_eq!(names(&dopesheet.channels), vec!["selected"]);
    // Coverage always counts every track of the object.
    assert_eq!(dopesheet.coverage, vec![
      CoverageSegment { start: 1, end: 3, coverage: Coverage::Poor },
    ]);
  }
}
