// Combining several point tracks into one.

use crate::all::*;

// Frame range covered by any of `tracks`.
pub fn tracks_first_last_frame<'a, I>(tracks: I) -> Option<(FrameNumber, FrameNumber)>
  where I: IntoIterator<Item = &'a Track>
{
  tracks.into_iter()
    .filter_map(|t| t.first_last_frame())
    .fold(None, |range, (first, last)| match range {
      Some((a, b)) => Some((FrameNumber::min(a, first), FrameNumber::max(b, last))),
      None => Some((first, last)),
    })
}

// Whether the blend over an overlap `first..=last` should start from the
// source track. The blend starts from whichever track is enabled right before
// the overlap, or else ends on whichever track continues after it.
fn blend_starts_from_source(dst: &Track, src: &Track, first: FrameNumber, last: FrameNumber) -> bool {
  let dst_before = dst.has_enabled_marker_at(first - 1);
  let src_before = src.has_enabled_marker_at(first - 1);
  if dst_before != src_before { return src_before }
  let dst_after = dst.has_enabled_marker_at(last + 1);
  let src_after = src.has_enabled_marker_at(last + 1);
  if dst_after != src_after { return dst_after }
  !dst_before
}

// Merges markers of `src` into `dst`. Where both tracks are enabled on a run
// of consecutive frames the positions are cross-faded over the run so the
// joined path has no jump.
pub fn join_tracks(dst: &mut Track, src: &Track) {
  let d = &dst.markers;
  let s = &src.markers;
  let mut markers = Vec::with_capacity(d.len() + s.len());
  let (mut a, mut b) = (0, 0);

  while a < s.len() || b < d.len() {
    if b >= d.len() {
      markers.push(s[a].clone());
      a += 1;
      continue;
    }
    if a >= s.len() {
      markers.push(d[b].clone());
      b += 1;
      continue;
    }
    if s[a].frame < d[b].frame {
      markers.push(s[a].clone());
      a += 1;
      continue;
    }
    if s[a].frame > d[b].frame {
      markers.push(d[b].clone());
      b += 1;
      continue;
    }

    if s[a].disabled {
      markers.push(d[b].clone());
      a += 1;
      b += 1;
    }
    else if d[b].disabled {
      markers.push(s[a].clone());
      a += 1;
      b += 1;
    }
    else {
      let first = s[a].frame;
      let mut len = 0;
      while a + len < s.len() && b + len < d.len() {
        let (ms, md) = (&s[a + len], &d[b + len]);
        let frame = first + len as FrameNumber;
        if ms.disabled || md.disabled || ms.frame != frame || md.frame != frame { break }
        len += 1;
      }
      let inverse = blend_starts_from_source(dst, src, first, first + len as FrameNumber - 1);
      for j in 0..len {
        let mut fac = if len > 1 { j as f64 / (len - 1) as f64 } else { 0.5 };
        if inverse { fac = 1. - fac }
        let mut marker = d[b + j].clone();
        marker.position = lerp2(d[b + j].position, s[a + j].position, fac);
        markers.push(marker);
      }
      a += len;
      b += len;
    }
  }

  debug_assert!(is_sorted(&markers));
  dst.markers = markers;
}

fn accumulate(sum: &mut Marker, marker: &Marker) {
  sum.position += marker.position;
  for i in 0..4 {
    sum.pattern_corners[i] += marker.pattern_corners[i];
  }
  sum.search_min += marker.search_min;
  sum.search_max += marker.search_max;
  sum.disabled = false;
  if !marker.tracked { sum.tracked = false }
}

fn scale(marker: &mut Marker, s: f64) {
  marker.position *= s;
  for c in marker.pattern_corners.iter_mut() { *c *= s }
  marker.search_min *= s;
  marker.search_max *= s;
}

// Stores into `dst` the mean of the interpolated markers of `sources` over
// their combined frame range, and the mean of their offsets. Returns the
// number of averaged frames.
pub fn average_tracks(dst: &mut Track, sources: &[&Track]) -> usize {
  if sources.is_empty() { return 0 }
  let mut averaged = 0;

  if let Some((first, last)) = tracks_first_last_frame(sources.iter().copied()) {
    for frame in first..=last {
      let mut sum = Marker::new(frame, Vector2d::zeros());
      sum.disabled = true;
      sum.tracked = true;
      let mut count = 0;
      for track in sources {
        let marker = match track.interpolate(frame) {
          Some(m) if m.is_enabled() => m,
          _ => continue,
        };
        accumulate(&mut sum, &marker);
        count += 1;
      }
      if count == 0 { continue }
      scale(&mut sum, 1. / count as f64);
      dst.insert(sum);
      averaged += 1;
    }
  }

  dst.offset = sources.iter().map(|t| t.offset).sum::<Vector2d>() / sources.len() as f64;
  averaged
}

#[cfg(test)]
mod tests {
  use super::*;

  fn track(frames: std::ops::RangeInclusive<FrameNumber>, x: f64) -> Track {
    let mut t = Track::new("Track", &TrackingSettings::default());
    for frame in frames {
      t.insert(Marker::with_size(frame, Vector2d::new(x, 0.5), Vector2d::new(0.01, 0.01), Vector2d::new(0.1, 0.1)));
    }
    t
  }

  fn positions(t: &Track) -> Vec<(FrameNumber, f64)> {
    t.markers.iter().map(|m| (m.frame, m.position[0])).collect()
  }

  #[test]
  fn test_join_blends_overlap() {
    let mut dst = track(1..=5, 0.);
    let src = track(3..=8, 1.);
    join_tracks(&mut dst, &src);
    assert_eq!(positions(&dst), vec![
      (1, 0.), (2, 0.), (3, 0.), (4, 0.5), (5, 1.), (6, 1.), (7, 1.), (8, 1.),
    ]);
  }

  #[test]
  fn test_join_blends_from_source() {
    let mut dst = track(3..=8, 0.);
    let src = track(1..=5, 1.);
    join_tracks(&mut dst, &src);
    assert_eq!(positions(&dst), vec![
      (1, 1.), (2, 1.), (3, 1.), (4, 0.5), (5, 0.), (6, 0.), (7, 0.), (8, 0.),
    ]);
  }

  #[test]
  fn test_join_single_frame_overlap() {
    let mut dst = track(1..=3, 0.);
    let src = track(3..=5, 1.);
    join_tracks(&mut dst, &src);
    assert_eq!(dst.markers.len(), 5);
    assert!((dst.get_exact(3).unwrap().position[0] - 0.5).abs() < 1e-12);
  }

  #[test]
  fn test_join_disabled_markers() {
    let mut dst = track(1..=4, 0.);
    dst.get_exact_mut(2).unwrap().disabled = true;
    let mut src = track(1..=4, 1.);
    src.get_exact_mut(3).unwrap().disabled = true;
    join_tracks(&mut dst, &src);
    let m = dst.get_exact(2).unwrap();
    assert!(!m.disabled);
    assert_eq!(m.position[0], 1.);
    let m = dst.get_exact(3).unwrap();
    assert!(!m.disabled);
    assert_eq!(m.position[0], 0.);
    assert!(is_sorted(&dst.markers));
    // Frames are never duplicated.
    assert_eq!(dst.markers.len(), 4);
  }

  #[test]
  fn test_join_disjoint() {
    let mut dst = track(5..=6, 0.);
    let src = track(1..=2, 1.);
    join_tracks(&mut dst, &src);
    assert_eq!(positions(&dst), vec![(1, 1.), (2, 1.), (5, 0.), (6, 0.)]);
  }

  #[test]
  fn test_average() {
    let mut a = track(1..=1, 0.);
    a.insert(Marker::with_size(3, Vector2d::new(0.2, 0.5), Vector2d::new(0.01, 0.01), Vector2d::new(0.1, 0.1)));
    a.offset = Vector2d::new(1., 0.);
    for m in a.markers.iter_mut() { m.tracked = true }
    let mut b = track(1..=3, 1.);
    b.offset = Vector2d::new(0., 1.);

    let mut dst = Track::new("Average", &TrackingSettings::default());
    average_tracks(&mut dst, &[&a, &b]);
    assert_eq!(dst.markers.len(), 3);
    let m = dst.get_exact(2).unwrap();
    assert!((m.position - Vector2d::new(0.55, 0.5)).norm() < 1e-12);
    assert!((m.search_max - Vector2d::new(0.1, 0.1)).norm() < 1e-12);
    assert!(!m.disabled);
    assert!(!m.tracked);
    assert!((dst.offset - Vector2d::new(0.5, 0.5)).norm() < 1e-12);
  }

  #[test]
  fn test_average_skips_disabled_tracks() {
    let a = track(1..=2, 0.4);
    let mut b = track(1..=2, 1.);
    for m in b.markers.iter_mut() {
      m.disabled = true;
      m.tracked = true;
    }
    let mut dst = Track::new("Average", &TrackingSettings::default());
    average_tracks(&mut dst, &[&a, &b]);
    assert_eq!(positions(&dst), vec![(1, 0.4), (2, 0.4)]);

    let mut empty = Track::new("Average", &TrackingSettings::default());
    assert_eq!(average_tracks(&mut empty, &[&b]), 0);
    assert!(empty.markers.is_empty());
  }

  #[test]
  fn test_average_identical_tracks() {
    let mut a = Track::new("Track", &TrackingSettings::default());
    for (i, frame) in [1, 2, 3, 4, 6].into_iter().enumerate() {
      let f = i as f64;
      let mut m = Marker::with_size(
        frame,
        Vector2d::new(0.1 + 0.13 * f, 0.7 - 0.05 * f),
        Vector2d::new(0.01 + 0.002 * f, 0.02),
        Vector2d::new(0.08, 0.05 + 0.01 * f),
      );
      m.pattern_corners[2] += Vector2d::new(0.003 * f, -0.001);
      m.search_min[0] -= 0.02 * f;
      m.tracked = i % 2 == 0;
      a.insert(m);
    }
    let b = a.clone();

    let mut dst = Track::new("Average", &TrackingSettings::default());
    assert_eq!(average_tracks(&mut dst, &[&a, &b]), 6);
    for m in &a.markers {
      let d = dst.get_exact(m.frame).unwrap();
      assert!((d.position - m.position).norm() < 1e-12);
      for i in 0..4 {
        assert!((d.pattern_corners[i] - m.pattern_corners[i]).norm() < 1e-12);
      }
      assert!((d.search_min - m.search_min).norm() < 1e-12);
      assert!((d.search_max - m.search_max).norm() < 1e-12);
      assert_eq!(d.tracked, m.tracked);
      assert!(!d.disabled);
    }
  }

  #[test]
  fn test_tracks_first_last_frame() {
    let a = track(3..=5, 0.);
    let b = track(-2..=1, 0.);
    assert_eq!(tracks_first_last_frame([&a, &b]), Some((-2, 5)));
    assert_eq!(tracks_first_last_frame(Vec::<&Track>::new()), None);
  }
}
