use crate::all::*;

// State of one editing session which is not part of the tracking data.
#[derive(Default)]
pub struct EditSession {
  clipboard: Vec<Track>,
}

impl EditSession {
  pub fn new() -> EditSession {
    EditSession::default()
  }

  // Replaces the clipboard with the visible selected tracks of `object`.
  // Returns the number of copied tracks.
  pub fn copy_tracks(&mut self, tracking: &Tracking, object: usize) -> usize {
    self.clipboard = tracking.selected_tracks(object).into_iter()
      .filter_map(|id| tracking.track(id).cloned())
      .collect();
    debug!("Copied {} tracks to the clipboard.", self.clipboard.len());
    self.clipboard.len()
  }

  pub fn has_tracks(&self) -> bool {
    !self.clipboard.is_empty()
  }

  pub fn clear(&mut self) {
    self.clipboard.clear();
  }

  // Adds copies of the clipboard tracks to `object`, renamed when needed.
  // The first pasted track becomes active.
  pub fn paste_tracks(&self, tracking: &mut Tracking, object: usize) -> Result<Vec<TrackId>> {
    let mut pasted = vec![];
    for track in &self.clipboard {
      pasted.push(tracking.add_track_copy(object, track.clone())?);
    }
    if let Some(first) = pasted.first() {
      tracking.set_active_track(object, Some(*first))?;
    }
    Ok(pasted)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_copy_paste() {
    let mut tracking = Tracking::new();
    let size = [100, 100];
    let a = tracking.add_track(0, "A", Vector2d::new(0.2, 0.2), 1, size).unwrap();
    let b = tracking.add_track(0, "B", Vector2d::new(0.4, 0.4), 1, size).unwrap();
    let hidden = tracking.add_track(0, "Hidden", Vector2d::new(0.6, 0.6), 1, size).unwrap();
    tracking.select_all_tracks(0, true).unwrap();
    tracking.track_mut(hidden).unwrap().hidden = true;
    tracking.track_mut(b).unwrap().use_2d_stab = true;

    let mut session = EditSession::new();
    assert!(!session.has_tracks());
    assert_eq!(session.copy_tracks(&tracking, 0), 2);
    assert!(session.has_tracks());

    let pasted = session.paste_tracks(&mut tracking, 0).unwrap();
    assert_eq!(pasted.len(), 2);
    assert_eq!(tracking.track(pasted[0]).unwrap().name, "A.001");
    assert_eq!(tracking.track(pasted[1]).unwrap().name, "B.001");
    assert!(!tracking.track(pasted[1]).unwrap().use_2d_stab);
    assert_eq!(tracking.active_object().active_track, Some(pasted[0]));

    // Into another object the names are free.
    let object = tracking.add_object("Object");
    let pasted = session.paste_tracks(&mut tracking, object).unwrap();
    assert_eq!(tracking.track(pasted[0]).unwrap().name, "A");
    assert_eq!(tracking.track(a).unwrap().name, "A");

    session.clear();
    assert!(!session.has_tracks());
  }
}
