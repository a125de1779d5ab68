// Helpers for arrays of per-frame states kept sorted by ascending, unique
// frame numbers. Shared by point track markers and plane track markers.

use crate::all::*;

pub trait Keyframe: Clone {
  fn frame(&self) -> FrameNumber;
  fn set_frame(&mut self, frame: FrameNumber);
}

// Index of the marker at `frame`, or of the nearest marker on the left of it.
// Queries before the first marker return the first marker. `None` only for an
// empty array.
pub fn nearest_index<K: Keyframe>(keyframes: &[K], frame: FrameNumber) -> Option<usize> {
  if keyframes.is_empty() { return None }
  // Number of entries with frame <= query.
  let n = keyframes.partition_point(|k| k.frame() <= frame);
  Some(if n == 0 { 0 } else { n - 1 })
}

pub fn exact_index<K: Keyframe>(keyframes: &[K], frame: FrameNumber) -> Option<usize> {
  let i = nearest_index(keyframes, frame)?;
  if keyframes[i].frame() == frame { Some(i) } else { None }
}

// Replaces the entry on the same frame, otherwise inserts keeping the order.
// Returns the index of the stored entry.
pub fn insert_keyframe<K: Keyframe>(keyframes: &mut Vec<K>, keyframe: K) -> usize {
  if let Some(i) = exact_index(keyframes, keyframe.frame()) {
    keyframes[i] = keyframe;
    return i;
  }
  // Usually appending at the tail, so scan backwards.
  let mut i = keyframes.len();
  while i > 0 && keyframes[i - 1].frame() > keyframe.frame() {
    i -= 1;
  }
  keyframes.insert(i, keyframe);
  debug_assert!(is_sorted(keyframes));
  i
}

pub fn delete_keyframe<K: Keyframe>(keyframes: &mut Vec<K>, frame: FrameNumber) -> Option<K> {
  let i = exact_index(keyframes, frame)?;
  Some(keyframes.remove(i))
}

// Exact entry at `frame`, created from a copy of the nearest entry if missing.
pub fn ensure_keyframe<K: Keyframe>(keyframes: &mut Vec<K>, frame: FrameNumber) -> Option<usize> {
  let i = nearest_index(keyframes, frame)?;
  if keyframes[i].frame() == frame { return Some(i) }
  let mut keyframe = keyframes[i].clone();
  keyframe.set_frame(frame);
  Some(insert_keyframe(keyframes, keyframe))
}

pub fn is_sorted<K: Keyframe>(keyframes: &[K]) -> bool {
  keyframes.windows(2).all(|w| w[0].frame() < w[1].frame())
}
