use crate::all::*;

pub const CAMERA_OBJECT_NAME: &str = "Camera";
const DEFAULT_OBJECT_NAME: &str = "Object";
const DEFAULT_TRACK_NAME: &str = "Track";
const DEFAULT_PLANE_TRACK_NAME: &str = "Plane Track";
const AVERAGE_TRACK_NAME: &str = "Average Track";

// Defaults for newly added tracks.
#[derive(Clone, Debug)]
pub struct TrackingSettings {
  pub motion_model: MotionModel,
  pub pattern_match: PatternMatch,
  pub minimum_correlation: f64,
  pub margin: usize,
  pub frames_limit: usize,
  pub use_brute: bool,
  pub use_normalization: bool,
  pub weight: f64,
  // Pixels.
  pub pattern_size: usize,
  pub search_size: usize,
}

impl Default for TrackingSettings {
  fn default() -> TrackingSettings {
    let p = parameters();
    TrackingSettings {
      motion_model: MotionModel::Loc,
      pattern_match: PatternMatch::Keyframe,
      minimum_correlation: p.default_minimum_correlation,
      margin: 0,
      frames_limit: 0,
      use_brute: true,
      use_normalization: false,
      weight: p.default_weight,
      pattern_size: p.default_pattern_size,
      search_size: p.default_search_size,
    }
  }
}

impl TrackingSettings {
  // Marker with the default pattern and search sizes at `position`, in
  // normalized frame coordinates.
  pub fn default_marker(&self, frame: FrameNumber, position: Vector2d, frame_size: FrameSize) -> Marker {
    let size = Vector2d::new(frame_size[0].max(1) as f64, frame_size[1].max(1) as f64);
    let half_size = |pixels: usize| Vector2d::repeat(pixels as f64 / 2.).component_div(&size);
    Marker::with_size(frame, position, half_size(self.pattern_size), half_size(self.search_size))
  }
}

// All tracking data of a clip.
//
// Tracks and plane tracks are owned here and referenced by handle from their
// tracking object. Every mutation goes through this struct so the dopesheet
// can be marked for rebuild.
pub struct Tracking {
  pub settings: TrackingSettings,
  pub camera: Camera,
  pub stabilization: Stabilization,
  pub dopesheet: Dopesheet,
  objects: Vec<TrackingObject>,
  active_object: usize,
  tracks: HashMap<TrackId, Track>,
  plane_tracks: HashMap<PlaneTrackId, PlaneTrack>,
  next_track_id: u64,
  next_plane_track_id: u64,
}

impl Default for Tracking {
  fn default() -> Tracking {
    Tracking::new()
  }
}

impl Tracking {
  pub fn new() -> Tracking {
    Tracking {
      settings: TrackingSettings::default(),
      camera: Camera::default(),
      stabilization: Stabilization::default(),
      dopesheet: Dopesheet::default(),
      objects: vec![TrackingObject::new(CAMERA_OBJECT_NAME, true)],
      active_object: 0,
      tracks: HashMap::new(),
      plane_tracks: HashMap::new(),
      next_track_id: 0,
      next_plane_track_id: 0,
    }
  }

  fn tag_update(&mut self) {
    self.dopesheet.tag_update();
  }

  // Objects.

  pub fn objects(&self) -> &[TrackingObject] {
    &self.objects
  }

  pub fn object(&self, object: usize) -> Option<&TrackingObject> {
    self.objects.get(object)
  }

  pub fn object_mut(&mut self, object: usize) -> Option<&mut TrackingObject> {
    self.dopesheet.tag_update();
    self.objects.get_mut(object)
  }

  fn checked_object(&self, object: usize) -> Result<&TrackingObject> {
    self.objects.get(object).ok_or_else(|| anyhow!("Unknown tracking object {}.", object))
  }

  pub fn active_object_index(&self) -> usize {
    self.active_object
  }

  pub fn active_object(&self) -> &TrackingObject {
    &self.objects[self.active_object]
  }

  pub fn set_active_object(&mut self, object: usize) -> Result<()> {
    self.checked_object(object)?;
    self.active_object = object;
    self.tag_update();
    Ok(())
  }

  pub fn camera_object_index(&self) -> usize {
    self.objects.iter().position(|o| o.is_camera).unwrap_or(0)
  }

  pub fn camera_object(&self) -> &TrackingObject {
    &self.objects[self.camera_object_index()]
  }

  pub fn object_named(&self, name: &str) -> Option<usize> {
    self.objects.iter().position(|o| o.name == name)
  }

  // Adds an object and makes it active. Returns its index.
  pub fn add_object(&mut self, name: &str) -> usize {
    let name = unique_name(name, DEFAULT_OBJECT_NAME, self.objects.iter().map(|o| o.name.as_str()));
    self.objects.push(TrackingObject::new(&name, false));
    self.active_object = self.objects.len() - 1;
    self.tag_update();
    self.active_object
  }

  // Removes an object with its tracks. The camera object can not be removed.
  pub fn remove_object(&mut self, object: usize) -> Result<()> {
    if self.checked_object(object)?.is_camera {
      bail!("The camera object can not be removed.");
    }
    let removed = self.objects.remove(object);
    for id in &removed.tracks {
      self.tracks.remove(id);
      if self.stabilization.active_track == Some(*id) { self.stabilization.active_track = None }
      if self.stabilization.active_rotation_track == Some(*id) { self.stabilization.active_rotation_track = None }
    }
    for id in &removed.plane_tracks {
      self.plane_tracks.remove(id);
    }
    self.active_object = object.saturating_sub(1);
    self.tag_update();
    info!("Removed tracking object {} with {} tracks.", removed.name, removed.tracks.len());
    Ok(())
  }

  pub fn rename_object(&mut self, object: usize, name: &str) -> Result<()> {
    self.checked_object(object)?;
    if name.is_empty() { bail!("Object name can not be empty.") }
    if self.objects.iter().enumerate().any(|(i, o)| i != object && o.name == name) {
      bail!("Object name {} is already taken.", name);
    }
    self.objects[object].name = name.to_string();
    self.tag_update();
    Ok(())
  }

  // Tracks.

  pub fn track(&self, id: TrackId) -> Option<&Track> {
    self.tracks.get(&id)
  }

  pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
    self.dopesheet.tag_update();
    self.tracks.get_mut(&id)
  }

  fn checked_track(&self, id: TrackId) -> Result<&Track> {
    self.tracks.get(&id).ok_or_else(|| anyhow!("Unknown track {}.", id))
  }

  // Tracks of `object` in creation order.
  pub fn object_tracks(&self, object: usize) -> Vec<(TrackId, &Track)> {
    match self.objects.get(object) {
      Some(o) => o.tracks.iter().filter_map(|id| self.tracks.get(id).map(|t| (*id, t))).collect(),
      None => vec![],
    }
  }

  pub fn object_for_track(&self, id: TrackId) -> Option<usize> {
    self.objects.iter().position(|o| o.has_track(id))
  }

  pub fn track_named(&self, object: usize, name: &str) -> Option<TrackId> {
    self.object_tracks(object).into_iter().find(|(_, t)| t.name == name).map(|(id, _)| id)
  }

  fn unique_track_name(&self, object: usize, name: &str) -> String {
    let tracks = self.object_tracks(object);
    unique_name(name, DEFAULT_TRACK_NAME, tracks.iter().map(|(_, t)| t.name.as_str()))
  }

  fn insert_track(&mut self, object: usize, track: Track) -> TrackId {
    let id = TrackId(self.next_track_id);
    self.next_track_id += 1;
    self.tracks.insert(id, track);
    self.objects[object].tracks.push(id);
    self.tag_update();
    id
  }

  // Adds a track with a single marker at `position`, in normalized frame
  // coordinates. Pattern and search areas get the default pixel sizes.
  pub fn add_track(
    &mut self,
    object: usize,
    name: &str,
    position: Vector2d,
    frame: FrameNumber,
    frame_size: FrameSize,
  ) -> Result<TrackId> {
    self.checked_object(object)?;
    if frame_size[0] == 0 || frame_size[1] == 0 {
      bail!("Invalid frame size {}x{}.", frame_size[0], frame_size[1]);
    }
    let marker = self.settings.default_marker(frame, position, frame_size);
    let name = self.unique_track_name(object, name);
    let mut track = Track::new(&name, &self.settings);
    track.insert(marker);
    Ok(self.insert_track(object, track))
  }

  // Track without markers, to be filled by the caller.
  pub fn add_track_empty(&mut self, object: usize, name: &str) -> Result<TrackId> {
    self.checked_object(object)?;
    let name = self.unique_track_name(object, name);
    let track = Track::new(&name, &self.settings);
    Ok(self.insert_track(object, track))
  }

  // Copy of a track in the same object, not used for stabilization.
  pub fn duplicate_track(&mut self, id: TrackId) -> Result<TrackId> {
    let object = self.object_for_track(id).ok_or_else(|| anyhow!("Unknown track {}.", id))?;
    let track = self.checked_track(id)?.clone();
    self.add_track_copy(object, track)
  }

  // Adds a copy of a track from anywhere, such as the clipboard.
  pub fn add_track_copy(&mut self, object: usize, track: Track) -> Result<TrackId> {
    self.checked_object(object)?;
    let mut track = track;
    track.name = self.unique_track_name(object, &track.name);
    track.use_2d_stab = false;
    track.use_2d_stab_rot = false;
    Ok(self.insert_track(object, track))
  }

  // Removes a track. Plane tracks which would be left with too few point
  // tracks are removed as well.
  pub fn remove_track(&mut self, id: TrackId) -> Result<()> {
    let object = self.object_for_track(id).ok_or_else(|| anyhow!("Unknown track {}.", id))?;
    self.remove_point_track_from_planes(object, id);
    let o = &mut self.objects[object];
    o.tracks.retain(|t| *t != id);
    if o.active_track == Some(id) { o.active_track = None }
    if self.stabilization.active_track == Some(id) { self.stabilization.active_track = None }
    if self.stabilization.active_rotation_track == Some(id) { self.stabilization.active_rotation_track = None }
    self.tracks.remove(&id);
    self.tag_update();
    Ok(())
  }

  pub fn rename_track(&mut self, id: TrackId, name: &str) -> Result<()> {
    let object = self.object_for_track(id).ok_or_else(|| anyhow!("Unknown track {}.", id))?;
    if name.is_empty() { bail!("Track name can not be empty.") }
    if self.object_tracks(object).iter().any(|(other, t)| *other != id && t.name == name) {
      bail!("Track name {} is already taken.", name);
    }
    if let Some(track) = self.tracks.get_mut(&id) {
      track.name = name.to_string();
    }
    self.tag_update();
    Ok(())
  }

  pub fn set_active_track(&mut self, object: usize, id: Option<TrackId>) -> Result<()> {
    let o = self.checked_object(object)?;
    if let Some(id) = id {
      if !o.has_track(id) { bail!("Track {} does not belong to object {}.", id, o.name) }
    }
    self.objects[object].active_track = id;
    Ok(())
  }

  // 1-based index among reconstructed tracks of all objects.
  pub fn track_for_bundle_index(&self, index: usize) -> Option<TrackId> {
    if index == 0 { return None }
    self.objects.iter()
      .flat_map(|o| o.tracks.iter())
      .filter(|id| self.tracks.get(id).map_or(false, |t| t.has_bundle()))
      .nth(index - 1)
      .copied()
  }

  pub fn tracks_first_last_frame(&self, ids: &[TrackId]) -> Option<(FrameNumber, FrameNumber)> {
    tracks_first_last_frame(ids.iter().filter_map(|id| self.tracks.get(id)))
  }

  // Selection.

  // Selects `area` of a track. Unless extending, every other visible track of
  // the same object is deselected.
  pub fn select_track(&mut self, id: TrackId, area: SelectionArea, extend: bool) -> Result<()> {
    let object = self.object_for_track(id).ok_or_else(|| anyhow!("Unknown track {}.", id))?;
    if extend {
      if let Some(track) = self.tracks.get_mut(&id) { track.selection.set(area, true) }
    }
    else {
      for other in &self.objects[object].tracks {
        let track = match self.tracks.get_mut(other) {
          Some(t) if !t.hidden => t,
          _ => continue,
        };
        track.selection = SelectionArea::NONE;
        if *other == id { track.selection.set(area, true) }
      }
    }
    self.tag_update();
    Ok(())
  }

  pub fn deselect_track(&mut self, id: TrackId, area: SelectionArea) -> Result<()> {
    match self.tracks.get_mut(&id) {
      Some(track) => track.selection.set(area, false),
      None => bail!("Unknown track {}.", id),
    }
    self.tag_update();
    Ok(())
  }

  // Hidden tracks are left untouched.
  pub fn select_all_tracks(&mut self, object: usize, select: bool) -> Result<()> {
    let ids = self.checked_object(object)?.tracks.clone();
    for id in &ids {
      if let Some(track) = self.tracks.get_mut(id) {
        if !track.hidden { track.selection.set(SelectionArea::ALL, select) }
      }
    }
    self.tag_update();
    Ok(())
  }

  // Hiding also deselects and deactivates the track.
  pub fn set_track_hidden(&mut self, id: TrackId, hidden: bool) -> Result<()> {
    let object = self.object_for_track(id).ok_or_else(|| anyhow!("Unknown track {}.", id))?;
    if let Some(track) = self.tracks.get_mut(&id) {
      track.hidden = hidden;
      if hidden { track.selection = SelectionArea::NONE }
    }
    if hidden && self.objects[object].active_track == Some(id) {
      self.objects[object].active_track = None;
    }
    self.tag_update();
    Ok(())
  }

  // Visible selected tracks of `object`.
  pub fn selected_tracks(&self, object: usize) -> Vec<TrackId> {
    self.object_tracks(object).into_iter()
      .filter(|(_, t)| !t.hidden && t.is_selected())
      .map(|(id, _)| id)
      .collect()
  }

  // Plane tracks.

  pub fn plane_track(&self, id: PlaneTrackId) -> Option<&PlaneTrack> {
    self.plane_tracks.get(&id)
  }

  pub fn plane_track_mut(&mut self, id: PlaneTrackId) -> Option<&mut PlaneTrack> {
    self.plane_tracks.get_mut(&id)
  }

  pub fn object_plane_tracks(&self, object: usize) -> Vec<(PlaneTrackId, &PlaneTrack)> {
    match self.objects.get(object) {
      Some(o) => o.plane_tracks.iter().filter_map(|id| self.plane_tracks.get(id).map(|t| (*id, t))).collect(),
      None => vec![],
    }
  }

  pub fn object_for_plane_track(&self, id: PlaneTrackId) -> Option<usize> {
    self.objects.iter().position(|o| o.has_plane_track(id))
  }

  pub fn plane_track_named(&self, object: usize, name: &str) -> Option<PlaneTrackId> {
    self.object_plane_tracks(object).into_iter().find(|(_, t)| t.name == name).map(|(id, _)| id)
  }

  // Creates a plane track from the selected point tracks of `object`. Its
  // first marker is the bounding box of their patterns at `frame`.
  pub fn add_plane_track(&mut self, object: usize, frame: FrameNumber) -> Result<PlaneTrackId> {
    self.checked_object(object)?;
    let selected: Vec<TrackId> = self.selected_tracks(object).into_iter()
      .filter(|id| self.tracks.get(id).map_or(false, |t| !t.markers.is_empty()))
      .collect();
    if selected.len() < MIN_PLANE_POINT_TRACKS {
      bail!("Need at least {} selected point tracks to create a plane, got {}.",
        MIN_PLANE_POINT_TRACKS, selected.len());
    }

    let mut corners = vec![];
    for id in &selected {
      if let Some(marker) = self.tracks.get(id).and_then(|t| t.get(frame)) {
        corners.extend(marker.pattern_corners.iter().map(|c| c + marker.position));
      }
    }
    let (min, max) = minmax2(&corners);

    let names: Vec<String> = self.object_plane_tracks(object).iter().map(|(_, t)| t.name.clone()).collect();
    let name = unique_name(DEFAULT_PLANE_TRACK_NAME, DEFAULT_PLANE_TRACK_NAME, names.iter().map(|n| n.as_str()));
    let mut plane_track = PlaneTrack::new(&name, selected);
    plane_track.insert(PlaneMarker::from_bounds(frame, min, max));
    plane_track.selected = true;

    for other in &self.objects[object].plane_tracks {
      if let Some(p) = self.plane_tracks.get_mut(other) { p.selected = false }
    }
    let id = PlaneTrackId(self.next_plane_track_id);
    self.next_plane_track_id += 1;
    self.plane_tracks.insert(id, plane_track);
    self.objects[object].plane_tracks.push(id);
    self.objects[object].active_plane_track = Some(id);
    Ok(id)
  }

  pub fn remove_plane_track(&mut self, id: PlaneTrackId) -> Result<()> {
    let object = self.object_for_plane_track(id)
      .ok_or_else(|| anyhow!("Unknown plane track {}.", id))?;
    let o = &mut self.objects[object];
    o.plane_tracks.retain(|p| *p != id);
    if o.active_plane_track == Some(id) { o.active_plane_track = None }
    self.plane_tracks.remove(&id);
    Ok(())
  }

  pub fn rename_plane_track(&mut self, id: PlaneTrackId, name: &str) -> Result<()> {
    let object = self.object_for_plane_track(id)
      .ok_or_else(|| anyhow!("Unknown plane track {}.", id))?;
    if name.is_empty() { bail!("Plane track name can not be empty.") }
    if self.object_plane_tracks(object).iter().any(|(other, p)| *other != id && p.name == name) {
      bail!("Plane track name {} is already taken.", name);
    }
    if let Some(p) = self.plane_tracks.get_mut(&id) {
      p.name = name.to_string();
    }
    Ok(())
  }

  // Drops `track` from the plane tracks of `object` that use it. A plane
  // which can not lose a point track is removed. Returns the removed planes.
  pub fn remove_point_track_from_planes(&mut self, object: usize, track: TrackId) -> Vec<PlaneTrackId> {
    let users: Vec<PlaneTrackId> = self.object_plane_tracks(object).into_iter()
      .filter(|(_, p)| p.has_point_track(track))
      .map(|(id, _)| id)
      .collect();
    let mut removed = vec![];
    for id in users {
      let keep = self.plane_tracks.get_mut(&id).map_or(false, |p| p.remove_point_track(track));
      if !keep {
        info!("Removing plane track {} left without enough point tracks.", id);
        if self.remove_plane_track(id).is_ok() { removed.push(id) }
      }
    }
    removed
  }

  pub fn replace_point_track_in_planes(&mut self, object: usize, old_track: TrackId, new_track: TrackId) {
    let ids = match self.objects.get(object) {
      Some(o) => o.plane_tracks.clone(),
      None => return,
    };
    for id in ids {
      if let Some(p) = self.plane_tracks.get_mut(&id) { p.replace_point_track(old_track, new_track) }
    }
  }

  // Merging.

  // Merges the markers of `src` into `dst`. Both must belong to the same object.
  pub fn join_tracks(&mut self, dst: TrackId, src: TrackId) -> Result<()> {
    if dst == src { bail!("Can not join track {} with itself.", dst) }
    let src_track = self.checked_track(src)?.clone();
    self.checked_track(dst)?;
    if self.object_for_track(dst) != self.object_for_track(src) {
      bail!("Tracks {} and {} belong to different objects.", dst, src);
    }
    if let Some(dst_track) = self.tracks.get_mut(&dst) {
      join_tracks(dst_track, &src_track);
    }
    self.tag_update();
    Ok(())
  }

  // Joins every other selected track of `object` into its active track and
  // removes them. Plane tracks are moved over to the active track.
  pub fn join_selected_tracks(&mut self, object: usize) -> Result<TrackId> {
    let active = self.checked_object(object)?.active_track
      .ok_or_else(|| anyhow!("No active track to join into."))?;
    let sources: Vec<TrackId> = self.selected_tracks(object).into_iter().filter(|id| *id != active).collect();
    if sources.is_empty() { bail!("At least two selected tracks are needed for joining.") }

    for src in sources {
      self.join_tracks(active, src)?;
      let (stab, stab_rot) = {
        let t = self.checked_track(src)?;
        (t.use_2d_stab, t.use_2d_stab_rot)
      };
      if let Some(t) = self.tracks.get_mut(&active) {
        t.use_2d_stab |= stab;
        t.use_2d_stab_rot |= stab_rot;
      }
      self.replace_point_track_in_planes(object, src, active);
      self.remove_track(src)?;
    }
    Ok(active)
  }

  // Fails without touching `dst` when no source has an enabled marker to average.
  pub fn average_tracks(&mut self, dst: TrackId, sources: &[TrackId]) -> Result<()> {
    if sources.contains(&dst) { bail!("Track {} can not be averaged into itself.", dst) }
    let sources = sources.iter()
      .map(|id| self.checked_track(*id).map(|t| t.clone()))
      .collect::<Result<Vec<_>>>()?;
    let mut averaged = self.checked_track(dst)?.clone();
    if average_tracks(&mut averaged, &sources.iter().collect::<Vec<_>>()) == 0 {
      bail!("Tracks have no enabled markers to average into {}.", dst);
    }
    if let Some(dst_track) = self.tracks.get_mut(&dst) {
      *dst_track = averaged;
    }
    self.tag_update();
    Ok(())
  }

  // Averages the selected tracks of `object` into a new track, which becomes
  // the only selected and the active track.
  pub fn average_selected_tracks(&mut self, object: usize) -> Result<TrackId> {
    let sources = self.selected_tracks(object);
    if sources.is_empty() { bail!("No selected tracks to average.") }
    let dst = self.add_track_empty(object, AVERAGE_TRACK_NAME)?;
    if let Err(err) = self.average_tracks(dst, &sources) {
      self.remove_track(dst)?;
      return Err(err);
    }
    self.select_track(dst, SelectionArea::ALL, false)?;
    self.set_active_track(object, Some(dst))?;
    Ok(dst)
  }

  // Derived data.

  pub fn update_dopesheet(&mut self) {
    let object = &self.objects[self.active_object];
    self.dopesheet.update(object, &self.tracks);
  }

  pub fn stabilization_tracks(&self) -> StabilizationTracks {
    stabilization_tracks(self.camera_object(), &self.tracks)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SIZE: FrameSize = [1000, 500];

  fn tracking_with_tracks(n: usize) -> (Tracking, Vec<TrackId>) {
    let mut tracking = Tracking::new();
    let ids = (0..n)
      .map(|i| {
        let p = Vector2d::new(0.1 + 0.1 * i as f64, 0.5);
        tracking.add_track(0, "Track", p, 1, SIZE).unwrap()
      })
      .collect();
    (tracking, ids)
  }

  #[test]
  fn test_new() {
    let tracking = Tracking::new();
    assert_eq!(tracking.objects().len(), 1);
    assert!(tracking.active_object().is_camera);
    assert_eq!(tracking.active_object().name, "Camera");
    assert_eq!(tracking.active_object().keyframe2, 30);
    assert_eq!(tracking.settings.motion_model, MotionModel::Loc);
    assert_eq!(tracking.settings.pattern_size, 21);
    assert!(tracking.settings.use_brute);
  }

  #[test]
  fn test_objects() {
    let mut tracking = Tracking::new();
    assert!(tracking.remove_object(0).is_err());
    assert_eq!(tracking.add_object("Object"), 1);
    assert_eq!(tracking.add_object("Object"), 2);
    assert_eq!(tracking.objects()[2].name, "Object.001");
    assert!(tracking.rename_object(2, "Object").is_err());
    assert_eq!(tracking.objects()[2].name, "Object.001");
    let id = tracking.add_track(2, "Track", Vector2d::new(0.5, 0.5), 1, SIZE).unwrap();
    tracking.remove_object(2).unwrap();
    assert_eq!(tracking.active_object_index(), 1);
    assert!(tracking.track(id).is_none());
    assert!(tracking.remove_object(5).is_err());
  }

  #[test]
  fn test_add_track() {
    let (tracking, ids) = tracking_with_tracks(2);
    let track = tracking.track(ids[0]).unwrap();
    assert_eq!(track.name, "Track");
    assert_eq!(tracking.track(ids[1]).unwrap().name, "Track.001");
    let (min, max) = track.markers[0].pattern_bounds();
    assert!((max - min - Vector2d::new(21. / 1000., 21. / 500.)).norm() < 1e-12);
    assert!((track.markers[0].search_max - Vector2d::new(35.5 / 1000., 35.5 / 500.)).norm() < 1e-12);
    assert!((track.minimum_correlation - 0.75).abs() < 1e-12);
  }

  #[test]
  fn test_stale_handles() {
    let (mut tracking, ids) = tracking_with_tracks(2);
    tracking.remove_track(ids[0]).unwrap();
    assert!(tracking.track(ids[0]).is_none());
    assert!(tracking.remove_track(ids[0]).is_err());
    let id = tracking.add_track(0, "Track", Vector2d::new(0.5, 0.5), 1, SIZE).unwrap();
    assert_ne!(id, ids[0]);
    assert_eq!(tracking.object_tracks(0).len(), 2);
  }

  #[test]
  fn test_rename_track() {
    let (mut tracking, ids) = tracking_with_tracks(2);
    assert!(tracking.rename_track(ids[1], "Track").is_err());
    assert_eq!(tracking.track(ids[1]).unwrap().name, "Track.001");
    tracking.rename_track(ids[1], "Corner").unwrap();
    assert_eq!(tracking.track_named(0, "Corner"), Some(ids[1]));
    // Names only need to be unique within an object.
    let object = tracking.add_object("Object");
    let id = tracking.add_track(object, "Corner", Vector2d::zeros(), 1, SIZE).unwrap();
    assert_eq!(tracking.track(id).unwrap().name, "Corner");
  }

  #[test]
  fn test_duplicate_track() {
    let (mut tracking, ids) = tracking_with_tracks(1);
    tracking.track_mut(ids[0]).unwrap().use_2d_stab = true;
    let copy = tracking.duplicate_track(ids[0]).unwrap();
    let track = tracking.track(copy).unwrap();
    assert_eq!(track.name, "Track.001");
    assert!(!track.use_2d_stab);
    assert_eq!(track.markers, tracking.track(ids[0]).unwrap().markers);
    assert_eq!(tracking.stabilization_tracks().location, vec![ids[0]]);
  }

  #[test]
  fn test_selection() {
    let (mut tracking, ids) = tracking_with_tracks(3);
    tracking.select_track(ids[0], SelectionArea::ALL, false).unwrap();
    tracking.select_track(ids[1], SelectionArea::POINT, true).unwrap();
    assert_eq!(tracking.selected_tracks(0), vec![ids[0], ids[1]]);
    tracking.select_track(ids[2], SelectionArea::POINT, false).unwrap();
    assert_eq!(tracking.selected_tracks(0), vec![ids[2]]);
    tracking.set_track_hidden(ids[2], true).unwrap();
    assert!(tracking.selected_tracks(0).is_empty());
    tracking.select_all_tracks(0, true).unwrap();
    assert_eq!(tracking.selected_tracks(0), vec![ids[0], ids[1]]);
    tracking.deselect_track(ids[0], SelectionArea::ALL).unwrap();
    assert_eq!(tracking.selected_tracks(0), vec![ids[1]]);
  }

  #[test]
  fn test_plane_tracks() {
    let (mut tracking, ids) = tracking_with_tracks(5);
    tracking.select_track(ids[0], SelectionArea::ALL, false).unwrap();
    assert!(tracking.add_plane_track(0, 1).is_err());
    tracking.select_all_tracks(0, true).unwrap();
    let plane = tracking.add_plane_track(0, 1).unwrap();
    let marker = &tracking.plane_track(plane).unwrap().markers[0];
    let half = Vector2d::new(10.5 / 1000., 10.5 / 500.);
    assert!((marker.corners[0] - (Vector2d::new(0.1, 0.5) - half)).norm() < 1e-12);
    assert!((marker.corners[2] - (Vector2d::new(0.5, 0.5) + half)).norm() < 1e-12);
    assert_eq!(tracking.plane_track(plane).unwrap().name, "Plane Track");

    // Five point tracks, the first removal shrinks the plane.
    tracking.remove_track(ids[0]).unwrap();
    assert_eq!(tracking.plane_track(plane).unwrap().point_tracks.len(), 4);
    tracking.remove_track(ids[1]).unwrap();
    assert!(tracking.plane_track(plane).is_none());
    assert!(tracking.object(0).unwrap().plane_tracks.is_empty());
  }

  #[test]
  fn test_join_selected_tracks() {
    let (mut tracking, ids) = tracking_with_tracks(2);
    {
      let t = tracking.track_mut(ids[1]).unwrap();
      t.markers[0].frame = 2;
      t.use_2d_stab = true;
    }
    tracking.select_all_tracks(0, true).unwrap();
    assert!(tracking.join_selected_tracks(0).is_err());
    tracking.set_active_track(0, Some(ids[0])).unwrap();
    assert_eq!(tracking.join_selected_tracks(0).unwrap(), ids[0]);
    assert!(tracking.track(ids[1]).is_none());
    let joined = tracking.track(ids[0]).unwrap();
    assert_eq!(joined.markers.len(), 2);
    assert!(joined.use_2d_stab);
    assert!(tracking.join_tracks(ids[0], ids[0]).is_err());
  }

  #[test]
  fn test_average_selected_tracks() {
    let (mut tracking, ids) = tracking_with_tracks(2);
    tracking.select_all_tracks(0, true).unwrap();
    let average = tracking.average_selected_tracks(0).unwrap();
    let track = tracking.track(average).unwrap();
    assert_eq!(track.name, "Average Track");
    assert!((track.markers[0].position - Vector2d::new(0.15, 0.5)).norm() < 1e-12);
    assert_eq!(tracking.selected_tracks(0), vec![average]);
    assert_eq!(tracking.active_object().active_track, Some(average));
    assert!(tracking.average_tracks(ids[0], &[ids[0]]).is_err());
  }

  #[test]
  fn test_average_disabled_tracks_fails() {
    let (mut tracking, ids) = tracking_with_tracks(2);
    for id in &ids {
      tracking.track_mut(*id).unwrap().markers[0].disabled = true;
    }
    tracking.select_all_tracks(0, true).unwrap();
    assert!(tracking.average_selected_tracks(0).is_err());
    assert_eq!(tracking.object_tracks(0).len(), 2);
    assert!(tracking.track_named(0, "Average Track").is_none());
    assert_eq!(tracking.selected_tracks(0), ids);

    // An existing destination keeps its markers.
    let before = tracking.track(ids[0]).unwrap().markers.clone();
    assert!(tracking.average_tracks(ids[0], &[ids[1]]).is_err());
    assert_eq!(tracking.track(ids[0]).unwrap().markers, before);
  }

  #[test]
  fn test_track_for_bundle_index() {
    let (mut tracking, ids) = tracking_with_tracks(3);
    tracking.track_mut(ids[0]).unwrap().bundle = Some(Vector3d::zeros());
    tracking.track_mut(ids[2]).unwrap().bundle = Some(Vector3d::zeros());
    assert_eq!(tracking.track_for_bundle_index(1), Some(ids[0]));
    assert_eq!(tracking.track_for_bundle_index(2), Some(ids[2]));
    assert_eq!(tracking.track_for_bundle_index(3), None);
    assert_eq!(tracking.track_for_bundle_index(0), None);
  }

  #[test]
  fn test_mutations_invalidate_dopesheet() {
    let (mut tracking, ids) = tracking_with_tracks(2);
    tracking.update_dopesheet();
    assert!(tracking.dopesheet.is_up_to_date());
    assert_eq!(tracking.dopesheet.channels.len(), 2);
    tracking.track_mut(ids[0]).unwrap().insert(Marker::new(5, Vector2d::zeros()));
    assert!(!tracking.dopesheet.is_up_to_date());
    tracking.update_dopesheet();
    tracking.remove_track(ids[1]).unwrap();
    assert!(!tracking.dopesheet.is_up_to_date());
    tracking.update_dopesheet();
    assert_eq!(tracking.dopesheet.channels.len(), 1);
    assert_eq!(tracking.tracks_first_last_frame(&ids), Some((1, 5)));
  }
}
