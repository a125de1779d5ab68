use crate::all::*;

// Moving thing the tracks of a clip belong to: the camera itself or an object
// moving in the scene. Tracks and plane tracks are stored in `Tracking` and
// referenced here by handle, in creation order.
#[derive(Clone, Debug)]
pub struct TrackingObject {
  pub name: String,
  pub is_camera: bool,
  pub tracks: Vec<TrackId>,
  pub plane_tracks: Vec<PlaneTrackId>,
  pub active_track: Option<TrackId>,
  pub active_plane_track: Option<PlaneTrackId>,
  pub reconstruction: Reconstruction,
  // Solved scale of a non-camera object.
  pub scale: f64,
  // Frames used to initialize the solve.
  pub keyframe1: FrameNumber,
  pub keyframe2: FrameNumber,
}

impl TrackingObject {
  pub fn new(name: &str, is_camera: bool) -> TrackingObject {
    TrackingObject {
      name: name.to_string(),
      is_camera,
      tracks: vec![],
      plane_tracks: vec![],
      active_track: None,
      active_plane_track: None,
      reconstruction: Reconstruction::default(),
      scale: 1.,
      keyframe1: 1,
      keyframe2: 30,
    }
  }

  pub fn has_track(&self, track: TrackId) -> bool {
    self.tracks.contains(&track)
  }

  pub fn has_plane_track(&self, plane_track: PlaneTrackId) -> bool {
    self.plane_tracks.contains(&plane_track)
  }

  // Scale applied to solved camera matrices of this object, none for the camera.
  pub fn matrix_scale(&self) -> Option<f64> {
    if self.is_camera { None } else { Some(self.scale) }
  }

  // Camera matrix at a possibly fractional frame.
  pub fn camera_matrix(&self, frame: f64) -> Matrix4d {
    self.reconstruction.interpolated_matrix(frame, self.matrix_scale())
  }
}
